//! # Calculations
//!
//! Delegated functions from `App` which solve the configured model and tabulate the requested quantity
//!

use super::{Calculation, Configuration};
use crate::{
    electron::{ProjectedDos, TracingProgress},
    geometry::{BoundaryCondition, GridBuilder},
    model::TightBinding,
    ElectronError, ElectronState, OperatorSource,
};
use itertools::Itertools;
use ndarray::{Array1, Axis};
use std::fmt;
use tracing::{info, warn};

/// Whitespace separated columns under a commented header
pub(crate) struct Table {
    header: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "# {}", self.header.iter().join(" "))?;
        for row in &self.rows {
            writeln!(f, "{}", row.iter().map(|value| format!("{value:.8e}")).join(" "))?;
        }
        Ok(())
    }
}

fn energies(config: &Configuration) -> Array1<f64> {
    Array1::linspace(
        config.spectral.minimum_energy,
        config.spectral.maximum_energy,
        config.spectral.number_of_energy_points,
    )
}

pub(crate) fn calculate(
    model: &TightBinding,
    config: &Configuration,
    calculation: Calculation,
) -> Result<Table, ElectronError> {
    let gauge = config.states.gauge;
    let kpoint = config.states.kpoint;
    match calculation {
        Calculation::Dos => {
            let state = model.eigenstate(kpoint, gauge)?;
            let energies = energies(config);
            let dos = state.dos(&energies, &config.distribution);
            Ok(Table {
                header: vec!["energy".into(), "dos".into()],
                rows: energies.iter().zip(dos.iter()).map(|(&e, &d)| vec![e, d]).collect(),
            })
        }
        Calculation::Pdos => {
            let state = model.eigenstate(kpoint, gauge)?;
            let energies = energies(config);
            let pdos = state.pdos(&energies, &config.distribution)?;
            let orbitals = pdos.orbitals();
            let (header, columns): (Vec<String>, Vec<Array1<f64>>) = match pdos {
                ProjectedDos::Collinear(pdos) => (
                    (0..orbitals).map(|o| format!("orbital_{o}")).collect(),
                    pdos.axis_iter(Axis(0)).map(|row| row.to_owned()).collect(),
                ),
                ProjectedDos::NonCollinear(pdos) => (0..orbitals)
                    .cartesian_product(["total", "x", "y", "z"].into_iter().enumerate())
                    .map(|(o, (channel, name))| {
                        (format!("orbital_{o}_{name}"), pdos.index_axis(Axis(0), channel).row(o).to_owned())
                    })
                    .unzip(),
            };
            Ok(Table {
                header: std::iter::once("energy".to_string()).chain(header).collect(),
                rows: energies
                    .iter()
                    .enumerate()
                    .map(|(i, &e)| std::iter::once(e).chain(columns.iter().map(|c| c[i])).collect())
                    .collect(),
            })
        }
        Calculation::Velocity => {
            let state = model.eigenstate(kpoint, gauge)?;
            let velocities = state.velocity(config.states.degeneracy_tolerance)?;
            Ok(per_state(&["vx", "vy", "vz"], state.eigenvalues(), velocities.rows()))
        }
        Calculation::SpinMoment => {
            if !model.spin().map_or(false, |spin| spin.is_noncollinear()) {
                warn!("spin moments of collinear states carry no physical meaning");
            }
            let state = model.eigenstate(kpoint, gauge)?;
            let moments = state.spin_moment()?;
            Ok(per_state(&["sx", "sy", "sz"], state.eigenvalues(), moments.rows()))
        }
        Calculation::Wavefunction => {
            if kpoint.iter().any(|&k| k != 0.) {
                info!("wavefunctions are projected at the Gamma point");
            }
            let state = model.eigenstate([0.; 3], gauge)?;
            let geometry = model.geometry().ok_or(ElectronError::MissingGeometry)?;
            let spinor = match model.spin() {
                Some(spin) if spin.is_noncollinear() => config.states.spinor,
                _ => 0,
            };
            let mut rows = Vec::with_capacity(state.len());
            for (index, &energy) in state.eigenvalues().iter().enumerate() {
                let mut grid = GridBuilder::new()
                    .with_shape(config.states.grid_shape)
                    .with_lattice(geometry.lattice().clone())
                    .with_boundary_conditions([
                        BoundaryCondition::Periodic,
                        BoundaryCondition::Open,
                        BoundaryCondition::Open,
                    ])
                    .complex()
                    .build()?;
                let progress = TracingProgress::new("wavefunction");
                state.sub(&[index])?.wavefunction(&mut grid, spinor, &progress)?;
                rows.push(vec![energy, grid.integrate_density()]);
            }
            Ok(Table {
                header: vec!["energy".into(), "integrated_density".into()],
                rows,
            })
        }
    }
}

fn per_state<'a>(
    names: &[&str],
    eigenvalues: &[f64],
    values: impl IntoIterator<Item = ndarray::ArrayView1<'a, f64>>,
) -> Table {
    Table {
        header: std::iter::once("energy")
            .chain(names.iter().copied())
            .map(String::from)
            .collect(),
        rows: eigenvalues
            .iter()
            .zip(values)
            .map(|(&e, row)| std::iter::once(e).chain(row.iter().copied()).collect())
            .collect(),
    }
}

#[cfg(test)]
mod test {
    use super::{calculate, Table};
    use crate::app::{
        configuration::{SpectralConfiguration, StatesConfiguration},
        Calculation, Configuration,
    };
    use crate::{model::ChainParameters, Distribution, Gauge, Spin};
    use approx::assert_relative_eq;

    fn configuration(spin: Spin) -> Configuration {
        Configuration {
            model: ChainParameters {
                lattice_constant: 2.5,
                number_of_atoms: 2,
                onsite_energy: 0.,
                hopping_energy: -1.,
                hopping_overlap: 0.05,
                spin,
                zeeman_field: [0., 0., 0.1],
                orbital_radius: 2.,
                slater_exponent: 1.2,
            },
            spectral: SpectralConfiguration {
                minimum_energy: -3.,
                maximum_energy: 3.,
                number_of_energy_points: 61,
            },
            distribution: Distribution::gaussian(0.1),
            states: StatesConfiguration {
                kpoint: [0.2, 0., 0.],
                gauge: Gauge::Cell,
                degeneracy_tolerance: 1e-6,
                grid_shape: [20, 16, 16],
                spinor: 0,
            },
        }
    }

    fn run(spin: Spin, calculation: Calculation) -> Table {
        let config = configuration(spin);
        let model = config.model.build().unwrap();
        calculate(&model, &config, calculation).unwrap()
    }

    #[test]
    fn tables_have_one_column_per_header_entry() {
        for (spin, calculation, columns) in [
            (Spin::Unpolarized, Calculation::Dos, 2),
            (Spin::Unpolarized, Calculation::Pdos, 3),
            (Spin::NonCollinear, Calculation::Pdos, 9),
            (Spin::Unpolarized, Calculation::Velocity, 4),
            (Spin::NonCollinear, Calculation::SpinMoment, 4),
        ] {
            let table = run(spin, calculation);
            assert_eq!(table.header.len(), columns);
            assert!(table.rows.iter().all(|row| row.len() == columns));
        }
    }

    #[test]
    fn wavefunctions_are_tabulated_per_state() {
        let table = run(Spin::Unpolarized, Calculation::Wavefunction);
        assert_eq!(table.rows.len(), 2);
        for row in &table.rows {
            assert!(row[1] > 0.);
        }
    }

    #[test]
    fn tables_render_a_commented_header() {
        let table = Table {
            header: vec!["energy".into(), "dos".into()],
            rows: vec![vec![0.5, 2.]],
        };
        let rendered = table.to_string();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("# energy dos"));
        let values = lines
            .next()
            .unwrap()
            .split_whitespace()
            .map(|value| value.parse::<f64>().unwrap())
            .collect::<Vec<_>>();
        assert_relative_eq!(values[1], 2.);
    }
}
