use super::{Hopping, TightBinding, TightBindingBuilder};
use crate::{ElectronError, Spin};
use electron_geometry::{Atom, Geometry, Lattice, Orbital, RadialFunction};
use nalgebra::Vector3;
use serde::Deserialize;

/// Vacuum padding around the chain in the transverse directions, in Å
const TRANSVERSE_CELL: f64 = 10.;

/// A periodic linear chain of identical single-orbital atoms along `x`
#[derive(Clone, Debug, Deserialize)]
pub struct ChainParameters {
    /// Distance between neighbouring atoms in Å
    pub lattice_constant: f64,
    /// Atoms in the unit cell
    pub number_of_atoms: usize,
    /// On-site energy in eV
    pub onsite_energy: f64,
    /// Nearest neighbour hopping in eV
    pub hopping_energy: f64,
    /// Nearest neighbour overlap, zero for an orthogonal basis
    #[serde(default)]
    pub hopping_overlap: f64,
    /// Spin configuration of the model
    #[serde(default)]
    pub spin: Spin,
    /// On-site Zeeman field in eV
    #[serde(default)]
    pub zeeman_field: [f64; 3],
    /// Cutoff radius of the atomic orbitals in Å
    pub orbital_radius: f64,
    /// Exponent of the Slater s orbitals in 1 / Å
    pub slater_exponent: f64,
}

impl ChainParameters {
    /// The chain geometry, atoms centred in their segment of the cell
    pub fn geometry(&self) -> Result<Geometry, ElectronError> {
        let length = self.lattice_constant * self.number_of_atoms as f64;
        let lattice =
            Lattice::cuboid([length, TRANSVERSE_CELL, TRANSVERSE_CELL])?.with_nsc([3, 1, 1])?;
        let orbital = Orbital::new(
            0,
            0,
            self.orbital_radius,
            RadialFunction::Slater {
                n: 1,
                zeta: self.slater_exponent,
            },
        )?;
        let xyz = (0..self.number_of_atoms)
            .map(|i| {
                Vector3::new(
                    self.lattice_constant * (i as f64 + 0.5),
                    TRANSVERSE_CELL / 2.,
                    TRANSVERSE_CELL / 2.,
                )
            })
            .collect();
        let atoms = vec![Atom::new("C", vec![orbital]); self.number_of_atoms];
        Ok(Geometry::new(lattice, xyz, atoms)?)
    }

    /// Build the tight-binding model, the final atom coupling to the first atom of the next cell
    pub fn build(&self) -> Result<TightBinding, ElectronError> {
        let atoms = self.number_of_atoms;
        if atoms == 0 {
            return Err(ElectronError::InconsistentDimensions(
                "a chain needs at least one atom".into(),
            ));
        }
        let hoppings = (0..atoms)
            .map(|i| {
                let isc = if i + 1 == atoms { [1, 0, 0] } else { [0; 3] };
                Hopping::new(i, (i + 1) % atoms, isc, self.hopping_energy)
                    .with_overlap(self.hopping_overlap)
            })
            .collect();
        TightBindingBuilder::new()
            .with_geometry(self.geometry()?)
            .with_onsite(vec![self.onsite_energy; atoms])
            .with_hoppings(hoppings)
            .with_spin(self.spin)
            .with_zeeman(self.zeeman_field)
            .build()
    }
}

#[cfg(test)]
mod test {
    use super::ChainParameters;
    use crate::{Gauge, OperatorSource, Spin};
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn parameters(atoms: usize) -> ChainParameters {
        ChainParameters {
            lattice_constant: 2.5,
            number_of_atoms: atoms,
            onsite_energy: 0.5,
            hopping_energy: -1.,
            hopping_overlap: 0.,
            spin: Spin::Unpolarized,
            zeeman_field: [0.; 3],
            orbital_radius: 2.,
            slater_exponent: 1.2,
        }
    }

    #[test]
    fn supercells_fold_the_single_atom_band() {
        let k = 0.15;
        let single = parameters(1).build().unwrap();
        let double = parameters(2).build().unwrap();
        let folded = double.eigenstate([k, 0., 0.], Gauge::Cell).unwrap();
        // The doubled cell folds E(k / 2) and E(k / 2 + 1 / 2) of the primitive chain
        for (band, k_primitive) in [(0, k / 2.), (1, k / 2. + 0.5)] {
            let primitive = single.eigenstate([k_primitive, 0., 0.], Gauge::Cell).unwrap();
            assert_relative_eq!(
                folded.eigenvalues()[band],
                primitive.eigenvalues()[0],
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(
            single.eigenstate([0.2, 0., 0.], Gauge::Cell).unwrap().eigenvalues()[0],
            0.5 - 2. * (TAU * 0.2).cos(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn chains_report_their_geometry() {
        let model = parameters(3).build().unwrap();
        let geometry = model.geometry().unwrap();
        assert_eq!(geometry.na(), 3);
        assert_relative_eq!(geometry.xyz(2).x, 6.25);
        assert!(parameters(0).build().is_err());
    }
}
