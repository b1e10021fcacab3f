// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::{
    utilities::matrices::{eigh_sorted, generalized_eigh},
    ElectronError, Gauge, Operator, OperatorSource, Overlap, Spin, StateBuilder, StateC, StateInfo,
};
use electron_geometry::Geometry;
use nalgebra::Vector3;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use num_complex::Complex;
use tracing::instrument;

/// A coupling between orbital `from` in the home cell and orbital `to` in the supercell image `isc`
///
/// Each hopping also implies its Hermitian conjugate, so every bond is listed once. On-site terms belong in the
/// on-site energies rather than in a hopping with `from == to` and `isc == [0, 0, 0]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hopping {
    /// Orbital in the home cell
    pub from: usize,
    /// Orbital in the image cell
    pub to: usize,
    /// The image cell, in units of the lattice vectors
    pub isc: [i32; 3],
    /// Hopping energy in eV
    pub energy: f64,
    /// Overlap between the two orbitals
    pub overlap: f64,
}

impl Hopping {
    /// An orthogonal hopping
    pub fn new(from: usize, to: usize, isc: [i32; 3], energy: f64) -> Self {
        Self {
            from,
            to,
            isc,
            energy,
            overlap: 0.,
        }
    }

    /// Attach an overlap to the hopping
    pub fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = overlap;
        self
    }
}

/// A tight-binding Hamiltonian on a periodic geometry
///
/// Reciprocal points are given in reduced coordinates. For non-collinear spin the orbital basis is expanded to
/// interleaved `(up, down)` pairs and an on-site Zeeman term `B . sigma` is added.
#[derive(Clone, Debug)]
pub struct TightBinding {
    geometry: Geometry,
    onsite: Vec<f64>,
    hoppings: Vec<Hopping>,
    spin: Spin,
    zeeman: Vector3<f64>,
}

/// Typestate builder for a `TightBinding`, requiring a geometry and on-site energies
pub struct TightBindingBuilder<Geom, Onsite> {
    geometry: Geom,
    onsite: Onsite,
    hoppings: Vec<Hopping>,
    spin: Spin,
    zeeman: Vector3<f64>,
}

impl Default for TightBindingBuilder<(), ()> {
    fn default() -> Self {
        Self {
            geometry: (),
            onsite: (),
            hoppings: Vec::new(),
            spin: Spin::default(),
            zeeman: Vector3::zeros(),
        }
    }
}

impl TightBindingBuilder<(), ()> {
    /// An empty builder
    pub fn new() -> Self {
        Self::default()
    }
}

impl<Geom, Onsite> TightBindingBuilder<Geom, Onsite> {
    /// Attach the geometry holding the orbitals
    pub fn with_geometry(self, geometry: Geometry) -> TightBindingBuilder<Geometry, Onsite> {
        TightBindingBuilder {
            geometry,
            onsite: self.onsite,
            hoppings: self.hoppings,
            spin: self.spin,
            zeeman: self.zeeman,
        }
    }

    /// Attach the on-site energy of each orbital
    pub fn with_onsite(self, onsite: Vec<f64>) -> TightBindingBuilder<Geom, Vec<f64>> {
        TightBindingBuilder {
            geometry: self.geometry,
            onsite,
            hoppings: self.hoppings,
            spin: self.spin,
            zeeman: self.zeeman,
        }
    }

    /// Attach the couplings between orbitals
    pub fn with_hoppings(mut self, hoppings: Vec<Hopping>) -> Self {
        self.hoppings = hoppings;
        self
    }

    /// Set the spin configuration
    pub fn with_spin(mut self, spin: Spin) -> Self {
        self.spin = spin;
        self
    }

    /// Set the on-site Zeeman field in eV, only used for non-collinear spin
    pub fn with_zeeman(mut self, field: [f64; 3]) -> Self {
        self.zeeman = Vector3::from(field);
        self
    }
}

impl TightBindingBuilder<Geometry, Vec<f64>> {
    /// Build the model, checking every orbital index against the geometry
    #[instrument(name = "TightBinding builder", level = "debug", skip(self))]
    pub fn build(self) -> Result<TightBinding, ElectronError> {
        let orbitals = self.geometry.no();
        if self.onsite.len() != orbitals {
            return Err(ElectronError::InconsistentDimensions(format!(
                "{} on-site energies were passed for {orbitals} orbitals",
                self.onsite.len()
            )));
        }
        if let Some(hopping) = self
            .hoppings
            .iter()
            .find(|hopping| hopping.from >= orbitals || hopping.to >= orbitals)
        {
            return Err(ElectronError::InconsistentDimensions(format!(
                "hopping {} -> {} is out of range for {orbitals} orbitals",
                hopping.from, hopping.to
            )));
        }
        Ok(TightBinding {
            geometry: self.geometry,
            onsite: self.onsite,
            hoppings: self.hoppings,
            spin: self.spin,
            zeeman: self.zeeman,
        })
    }
}

/// Sparse triplets `(row, column, value)`
type Triplets = Vec<(usize, usize, Complex<f64>)>;

impl TightBinding {
    /// Number of rows in the Hamiltonian
    pub fn width(&self) -> usize {
        self.geometry.no() * self.spin.spinor_width()
    }

    /// The Zeeman field in eV
    pub fn zeeman(&self) -> &Vector3<f64> {
        &self.zeeman
    }

    /// The Hamiltonian at the reduced reciprocal point `k`
    pub fn hk(&self, k: [f64; 3], gauge: Gauge) -> Result<Operator, ElectronError> {
        let mut triplets = self
            .onsite
            .iter()
            .enumerate()
            .map(|(i, &energy)| (i, i, Complex::new(energy, 0.)))
            .collect::<Triplets>();
        for (hopping, _, phase) in self.bonds(k, gauge) {
            push_hermitian(&mut triplets, hopping.from, hopping.to, phase * hopping.energy);
        }
        let mut triplets = self.expand(triplets, 1);
        if self.spin.is_noncollinear() {
            let b = self.zeeman;
            for orbital in 0..self.geometry.no() {
                let (up, down) = (2 * orbital, 2 * orbital + 1);
                triplets.push((up, up, Complex::new(b.z, 0.)));
                triplets.push((down, down, Complex::new(-b.z, 0.)));
                triplets.push((up, down, Complex::new(b.x, -b.y)));
                triplets.push((down, up, Complex::new(b.x, b.y)));
            }
        }
        assemble(self.width(), self.width(), triplets)
    }

    /// The overlap matrix at `k`, assembled even when the basis is orthogonal
    fn overlap_matrix(&self, k: [f64; 3], gauge: Gauge) -> Result<Operator, ElectronError> {
        let mut triplets = (0..self.geometry.no())
            .map(|i| (i, i, Complex::new(1., 0.)))
            .collect::<Triplets>();
        for (hopping, _, phase) in self.bonds(k, gauge) {
            if hopping.overlap != 0. {
                push_hermitian(&mut triplets, hopping.from, hopping.to, phase * hopping.overlap);
            }
        }
        assemble(self.width(), self.width(), self.expand(triplets, 1))
    }

    /// The Cartesian derivative of a bond sum weighted by `weight`, rows `3 i + a` hold `d/dk_a`
    fn derivative(
        &self,
        k: [f64; 3],
        gauge: Gauge,
        weight: impl Fn(&Hopping) -> f64,
    ) -> Result<Operator, ElectronError> {
        let mut triplets = Triplets::new();
        for (hopping, displacement, phase) in self.bonds(k, gauge) {
            let value = phase * weight(hopping);
            if value == Complex::new(0., 0.) {
                continue;
            }
            for axis in 0..3 {
                let element = Complex::i() * displacement[axis] * value;
                triplets.push((3 * hopping.from + axis, hopping.to, element));
                triplets.push((3 * hopping.to + axis, hopping.from, element.conj()));
            }
        }
        assemble(3 * self.width(), self.width(), self.expand(triplets, 3))
    }

    /// Each hopping with its bond vector and Bloch phase `exp(i k . d)`
    ///
    /// The bond vector is the lattice translation in the cell gauge, and the full inter-orbital vector in the
    /// orbital gauge.
    fn bonds(
        &self,
        k: [f64; 3],
        gauge: Gauge,
    ) -> impl Iterator<Item = (&Hopping, Vector3<f64>, Complex<f64>)> + '_ {
        let lattice = self.geometry.lattice();
        let k = lattice.rcell().transpose() * Vector3::from(k);
        self.hoppings.iter().map(move |hopping| {
            let mut displacement = lattice.offset(hopping.isc);
            if gauge == Gauge::Orbital {
                displacement += self.geometry.orbital_xyz(hopping.to)
                    - self.geometry.orbital_xyz(hopping.from);
            }
            let phase = Complex::from_polar(1., k.dot(&displacement));
            (hopping, displacement, phase)
        })
    }

    /// Expand orbital triplets to the spinor basis, `stride` rows per orbital
    fn expand(&self, triplets: Triplets, stride: usize) -> Triplets {
        if !self.spin.is_noncollinear() {
            return triplets;
        }
        triplets
            .into_iter()
            .flat_map(|(row, column, value)| {
                let (orbital, axis) = (row / stride, row % stride);
                (0..2).map(move |sigma| {
                    (stride * (2 * orbital + sigma) + axis, 2 * column + sigma, value)
                })
            })
            .collect()
    }

    /// Solve for every eigenstate at `k`, eigenvalues ascending
    #[instrument(level = "debug", skip(self))]
    pub fn eigenstate(&self, k: [f64; 3], gauge: Gauge) -> Result<StateC<'_, Self>, ElectronError> {
        let hamiltonian = self.hk(k, gauge)?.to_dense();
        let (eigenvalues, eigenvectors) = if self.orthogonal() {
            eigh_sorted(hamiltonian)?
        } else {
            generalized_eigh(hamiltonian, self.overlap_matrix(k, gauge)?.to_dense())?
        };
        StateBuilder::new()
            .with_states(eigenvectors.transpose())
            .with_parent(self)
            .with_info(StateInfo { k, gauge })
            .with_eigenvalues(eigenvalues.iter().copied().collect())
            .build()
    }
}

fn push_hermitian(triplets: &mut Triplets, from: usize, to: usize, value: Complex<f64>) {
    triplets.push((from, to, value));
    triplets.push((to, from, value.conj()));
}

fn assemble(rows: usize, columns: usize, triplets: Triplets) -> Result<Operator, ElectronError> {
    let (row_indices, rest): (Vec<_>, Vec<_>) = triplets
        .into_iter()
        .map(|(row, column, value)| (row, (column, value)))
        .unzip();
    let (column_indices, values): (Vec<_>, Vec<_>) = rest.into_iter().unzip();
    let coo = CooMatrix::try_from_triplets(rows, columns, row_indices, column_indices, values)
        .map_err(|e| ElectronError::SparseFormat(e.to_string()))?;
    Ok(Operator::Sparse(CsrMatrix::from(&coo)))
}

impl OperatorSource for TightBinding {
    fn spin(&self) -> Option<Spin> {
        Some(self.spin)
    }

    fn orthogonal(&self) -> bool {
        self.hoppings.iter().all(|hopping| hopping.overlap == 0.)
    }

    fn geometry(&self) -> Option<&Geometry> {
        Some(&self.geometry)
    }

    fn sk(&self, k: [f64; 3], gauge: Gauge) -> Result<Overlap, ElectronError> {
        if self.orthogonal() {
            Ok(Overlap::Identity)
        } else {
            Ok(Overlap::Explicit(self.overlap_matrix(k, gauge)?))
        }
    }

    fn dhk(&self, k: [f64; 3], gauge: Gauge) -> Result<Operator, ElectronError> {
        self.derivative(k, gauge, |hopping| hopping.energy)
    }

    fn dsk(&self, k: [f64; 3], gauge: Gauge) -> Result<Operator, ElectronError> {
        self.derivative(k, gauge, |hopping| hopping.overlap)
    }
}

#[cfg(test)]
mod test {
    use super::{assemble, Hopping, TightBinding, TightBindingBuilder};
    use crate::{
        constants::VELOCITY_CONVERSION, ElectronError, ElectronState, Gauge, OperatorSource,
        Overlap, Spin,
    };
    use approx::assert_relative_eq;
    use electron_geometry::{Atom, Geometry, Lattice, Orbital, RadialFunction};
    use nalgebra::Vector3;
    use num_complex::Complex;
    use std::f64::consts::TAU;

    const LATTICE_CONSTANT: f64 = 2.5;

    fn chain(atoms: usize, spin: Spin, overlap: f64, zeeman: [f64; 3]) -> TightBinding {
        let length = LATTICE_CONSTANT * atoms as f64;
        let lattice = Lattice::cuboid([length, 10., 10.])
            .unwrap()
            .with_nsc([3, 1, 1])
            .unwrap();
        let orbital = Orbital::new(0, 0, 2., RadialFunction::Slater { n: 1, zeta: 1.2 }).unwrap();
        let xyz = (0..atoms)
            .map(|i| Vector3::new(LATTICE_CONSTANT * (i as f64 + 0.5), 5., 5.))
            .collect::<Vec<_>>();
        let geometry = Geometry::new(lattice, xyz, vec![Atom::new("C", vec![orbital]); atoms]).unwrap();
        let hoppings = (0..atoms)
            .map(|i| {
                let isc = if i + 1 == atoms { [1, 0, 0] } else { [0, 0, 0] };
                Hopping::new(i, (i + 1) % atoms, isc, -1.).with_overlap(overlap)
            })
            .collect();
        TightBindingBuilder::new()
            .with_geometry(geometry)
            .with_onsite((0..atoms).map(|i| 0.1 * i as f64).collect())
            .with_hoppings(hoppings)
            .with_spin(spin)
            .with_zeeman(zeeman)
            .build()
            .unwrap()
    }

    fn band_energy(model: &TightBinding, k: f64, band: usize, gauge: Gauge) -> f64 {
        model.eigenstate([k, 0., 0.], gauge).unwrap().eigenvalues()[band]
    }

    #[test]
    fn operators_are_hermitian() {
        let model = chain(3, Spin::NonCollinear, 0.1, [0.1, -0.2, 0.3]);
        for gauge in [Gauge::Cell, Gauge::Orbital] {
            assert!(model.hk([0.23, 0., 0.], gauge).unwrap().is_hermitian());
            let Overlap::Explicit(overlap) = model.sk([0.23, 0., 0.], gauge).unwrap() else {
                panic!("expected a non-orthogonal basis");
            };
            assert!(overlap.is_hermitian());
            let dhk = model.dhk([0.23, 0., 0.], gauge).unwrap();
            assert_eq!((dhk.nrows(), dhk.ncols()), (18, 6));
            for axis in 0..3 {
                assert!(dhk.strided_rows(axis, 3).is_hermitian());
            }
        }
    }

    #[test]
    fn single_atom_chains_follow_the_cosine_band() {
        let model = chain(1, Spin::Unpolarized, 0., [0.; 3]);
        for k in [0., 0.1, 0.25, 0.4] {
            assert_relative_eq!(
                band_energy(&model, k, 0, Gauge::Cell),
                -2. * (TAU * k).cos(),
                epsilon = 1e-12
            );
        }
        assert!(model.orthogonal());
        assert!(model.sk([0.1, 0., 0.], Gauge::Cell).unwrap().is_identity());
    }

    #[test]
    fn eigenstates_solve_the_generalised_problem() {
        let model = chain(3, Spin::Unpolarized, 0.15, [0.; 3]);
        let k = [0.17, 0., 0.];
        let state = model.eigenstate(k, Gauge::Orbital).unwrap();
        let hamiltonian = model.hk(k, Gauge::Orbital).unwrap();
        let overlap = model.sk(k, Gauge::Orbital).unwrap();
        for (i, &energy) in state.eigenvalues().iter().enumerate() {
            let psi = state.states().row(i).transpose();
            let residual =
                hamiltonian.apply(&psi) - overlap.apply(&psi).into_owned() * Complex::new(energy, 0.);
            assert!(residual.norm() < 1e-10);
        }
        for norm in state.norm2().unwrap().iter() {
            assert_relative_eq!(*norm, 1., epsilon = 1e-10);
        }
    }

    #[test]
    fn velocities_match_the_band_slope() {
        for (overlap, gauge) in [(0., Gauge::Cell), (0.15, Gauge::Cell), (0.15, Gauge::Orbital)] {
            let model = chain(2, Spin::Unpolarized, overlap, [0.; 3]);
            let k = 0.13;
            let state = model.eigenstate([k, 0., 0.], gauge).unwrap();
            let velocities = state.velocity(1e-6).unwrap();
            // Reduced to Cartesian: dk_x = 2 pi dk / L
            let step = 1e-5;
            let length = 2. * LATTICE_CONSTANT;
            for band in 0..2 {
                let slope = (band_energy(&model, k + step, band, gauge)
                    - band_energy(&model, k - step, band, gauge))
                    / (2. * step)
                    * length
                    / TAU;
                assert_relative_eq!(
                    velocities[[band, 0]],
                    slope * VELOCITY_CONVERSION,
                    max_relative = 1e-5
                );
                assert_relative_eq!(velocities[[band, 1]], 0., epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn degenerate_spinors_share_the_band_velocity() {
        let model = chain(1, Spin::NonCollinear, 0., [0.; 3]);
        let k = 0.1;
        let state = model.eigenstate([k, 0., 0.], Gauge::Cell).unwrap();
        assert_eq!(state.degenerate(1e-8), vec![vec![0, 1]]);
        let velocities = state.velocity(1e-8).unwrap();
        let expected = 2. * (TAU * k).sin() * LATTICE_CONSTANT * VELOCITY_CONVERSION;
        assert_relative_eq!(velocities[[0, 0]], expected, max_relative = 1e-8);
        assert_relative_eq!(velocities[[1, 0]], expected, max_relative = 1e-8);
    }

    #[test]
    fn zeeman_fields_align_the_ground_state_spin() {
        let model = chain(1, Spin::NonCollinear, 0., [0.2, 0., 0.]);
        let state = model.eigenstate([0.3, 0., 0.], Gauge::Cell).unwrap();
        assert_eq!(model.width(), 2);
        let moments = state.spin_moment().unwrap();
        assert_relative_eq!(moments[[0, 0]], -1., epsilon = 1e-10);
        assert_relative_eq!(moments[[0, 2]], 0., epsilon = 1e-10);
        assert_relative_eq!(moments[[1, 0]], 1., epsilon = 1e-10);
        assert_relative_eq!(
            state.eigenvalues()[1] - state.eigenvalues()[0],
            0.4,
            epsilon = 1e-10
        );
    }

    #[test]
    fn out_of_range_hoppings_are_rejected() {
        let model = chain(2, Spin::Unpolarized, 0., [0.; 3]);
        let result = TightBindingBuilder::new()
            .with_geometry(model.geometry().unwrap().clone())
            .with_onsite(vec![0.; 2])
            .with_hoppings(vec![Hopping::new(0, 2, [0; 3], -1.)])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn triplets_outside_the_matrix_are_reported() {
        let triplets = vec![(0, 0, Complex::new(1., 0.)), (3, 0, Complex::new(1., 0.))];
        let Err(ElectronError::SparseFormat(message)) = assemble(2, 2, triplets) else {
            panic!("an out of bounds triplet should fail to assemble");
        };
        assert!(!message.is_empty());
    }
}
