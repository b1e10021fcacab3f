// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # State
//!
//! Eigenvectors bound to the operator source they were computed from.
//!
//! A [`State`] carries eigenvectors, a [`StateC`] additionally carries their eigenvalues. Both remember the
//! reciprocal point and gauge they were evaluated at, so the overlap and Hamiltonian derivatives handed to the
//! engines in [`crate::electron`] are always consistent with the states. The shared behaviour lives on the
//! [`ElectronState`] trait:
//!
//! ```ignore
//! let state = model.eigenstate([0.1, 0., 0.], Gauge::Cell)?;
//! let velocities = state.velocity(1e-4)?;
//! let moments = state.spin_moment()?;
//! ```

mod builder;

pub use builder::StateBuilder;

use crate::{
    electron::{self, ProgressSink, ProjectedDos},
    spin::{classify, overlap_product},
    DistributionFn, ElectronError, Gauge, OperatorSource, Overlap, Spin,
};
use electron_geometry::Grid;
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, Axis};
use num_complex::Complex;
use tracing::instrument;

/// The reciprocal point and gauge a set of states was evaluated at
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StateInfo {
    /// The reciprocal point in reduced coordinates
    pub k: [f64; 3],
    /// The phase convention of the parent operators
    pub gauge: Gauge,
}

/// Behaviour shared by every container of eigenvectors with a parent
pub trait ElectronState {
    /// The operator source the states belong to
    type Parent: OperatorSource + ?Sized;

    /// The eigenvectors, one state per row
    fn states(&self) -> &DMatrix<Complex<f64>>;

    /// The operator source the states were computed from
    fn parent(&self) -> &Self::Parent;

    /// Where the states were evaluated
    fn info(&self) -> &StateInfo;

    /// The energy of each state, if known
    fn energies(&self) -> Option<&[f64]> {
        None
    }

    /// The overlap at the reciprocal point of the states, the identity for orthogonal parents
    fn sk(&self) -> Result<Overlap, ElectronError> {
        let info = self.info();
        self.parent().sk(info.k, info.gauge)
    }

    /// The spin configuration of the states
    ///
    /// The parent's configuration is used when it declares one. Otherwise states with two coefficients per orbital of
    /// the parent geometry, or an overlap of half their width, are taken to be non-collinear.
    fn spin(&self) -> Result<Spin, ElectronError> {
        if let Some(spin) = self.parent().spin() {
            return Ok(spin);
        }
        let width = self.states().ncols();
        match self.parent().geometry() {
            Some(geometry) if geometry.no() > 0 && width == 2 * geometry.no() => {
                Ok(Spin::NonCollinear)
            }
            _ => Ok(classify(None, &self.sk()?, width)),
        }
    }

    /// Contribution of each orbital to the norm of each state, shape `(states, orbitals)`
    ///
    /// The contribution of orbital `nu` is `Re(conj(psi_nu) (S psi)_nu)`, summed over both spinor components for
    /// non-collinear states.
    fn norm2_per_orbital(&self) -> Result<Array2<f64>, ElectronError> {
        let spin = self.spin()?;
        let overlap = self.sk()?;
        let states = self.states();
        let width = states.ncols();
        let spinor = spin.spinor_width();
        if width % spinor != 0 {
            return Err(ElectronError::InconsistentDimensions(format!(
                "{spin} states need an even number of coefficients, got {width}"
            )));
        }
        let mut norms = Array2::zeros((states.nrows(), width / spinor));
        for (state, mut norm) in states.row_iter().zip(norms.rows_mut()) {
            let state = state.transpose();
            let product = overlap_product(&overlap, &state, spin)?;
            for (i, (psi, s_psi)) in state.iter().zip(product.iter()).enumerate() {
                norm[i / spinor] += (psi.conj() * s_psi).re;
            }
        }
        Ok(norms)
    }

    /// The squared norm `<psi|S|psi>` of each state
    fn norm2(&self) -> Result<Array1<f64>, ElectronError> {
        Ok(self.norm2_per_orbital()?.sum_axis(Axis(1)))
    }

    /// The spin moment of each state, shape `(states, 3)`
    fn spin_moment(&self) -> Result<Array2<f64>, ElectronError> {
        electron::spin_moment(self.states(), &self.sk()?)
    }

    /// The group velocity of each state in Å / ps
    ///
    /// When the energies are known states within `eps` of one another are decoupled before evaluation. A
    /// non-orthogonal parent must provide `dS/dk` as well as `dH/dk`.
    fn velocity(&self, eps: f64) -> Result<Array2<f64>, ElectronError> {
        let StateInfo { k, gauge } = *self.info();
        let parent = self.parent();
        let dhk = parent.dhk(k, gauge)?;
        let dsk = if parent.orthogonal() {
            None
        } else {
            Some(parent.dsk(k, gauge)?)
        };
        let degenerate = self
            .energies()
            .map(|energies| degenerate_groups(energies, eps))
            .unwrap_or_default();
        electron::velocity(
            self.states(),
            &dhk,
            self.energies(),
            dsk.as_ref(),
            &degenerate,
        )
    }

    /// Add the superposition of all carried states to `grid`
    ///
    /// The parent geometry is used when there is one, otherwise the geometry attached to the grid. For
    /// non-collinear states `spinor` selects the up (0) or down (1) component.
    fn wavefunction<P: ProgressSink + ?Sized>(
        &self,
        grid: &mut Grid,
        spinor: usize,
        progress: &P,
    ) -> Result<(), ElectronError> {
        let coefficients = self.states().row_sum().transpose();
        let spin = self.spin()?;
        electron::wavefunction(
            &coefficients,
            grid,
            self.parent().geometry(),
            Some(self.info().k),
            spinor,
            Some(spin),
            progress,
        )
    }
}

/// Group the indices of eigenvalues closer than `eps` to their sorted neighbour
///
/// Only groups of two or more states are returned.
pub(crate) fn degenerate_groups(eigenvalues: &[f64], eps: f64) -> Vec<Vec<usize>> {
    let mut order = (0..eigenvalues.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| eigenvalues[a].total_cmp(&eigenvalues[b]));

    let mut groups = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for index in order {
        match current.last() {
            Some(&last) if eigenvalues[index] - eigenvalues[last] < eps => current.push(index),
            _ => {
                let finished = std::mem::replace(&mut current, vec![index]);
                if finished.len() > 1 {
                    groups.push(finished);
                }
            }
        }
    }
    if current.len() > 1 {
        groups.push(current);
    }
    groups
}

/// Eigenvectors of a parent operator source
#[derive(Debug)]
pub struct State<'a, P: ?Sized> {
    states: DMatrix<Complex<f64>>,
    parent: &'a P,
    info: StateInfo,
}

impl<P: ?Sized> Clone for State<'_, P> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            parent: self.parent,
            info: self.info,
        }
    }
}

impl<'a, P: OperatorSource + ?Sized> State<'a, P> {
    /// Number of states
    pub fn len(&self) -> usize {
        self.states.nrows()
    }

    /// Whether there are no states
    pub fn is_empty(&self) -> bool {
        self.states.nrows() == 0
    }

    /// A new container holding the states at `indices`, in that order
    pub fn sub(&self, indices: &[usize]) -> Result<Self, ElectronError> {
        check_indices(indices, self.len())?;
        Ok(Self {
            states: self.states.select_rows(indices),
            parent: self.parent,
            info: self.info,
        })
    }

    /// The states rescaled to unit norm under the overlap of the parent
    #[instrument(skip_all, fields(states = self.len()))]
    pub fn normalize(&self) -> Result<Self, ElectronError> {
        let norms = self.norm2()?;
        let mut states = self.states.clone();
        for (mut row, norm) in states.row_iter_mut().zip(norms.iter()) {
            if *norm > 0. {
                row *= Complex::new(norm.sqrt().recip(), 0.);
            }
        }
        Ok(Self {
            states,
            parent: self.parent,
            info: self.info,
        })
    }
}

impl<P: OperatorSource + ?Sized> ElectronState for State<'_, P> {
    type Parent = P;

    fn states(&self) -> &DMatrix<Complex<f64>> {
        &self.states
    }

    fn parent(&self) -> &P {
        self.parent
    }

    fn info(&self) -> &StateInfo {
        &self.info
    }
}

/// Eigenvectors of a parent operator source together with their eigenvalues
#[derive(Debug)]
pub struct StateC<'a, P: ?Sized> {
    state: State<'a, P>,
    eigenvalues: Vec<f64>,
}

impl<P: ?Sized> Clone for StateC<'_, P> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            eigenvalues: self.eigenvalues.clone(),
        }
    }
}

impl<'a, P: OperatorSource + ?Sized> StateC<'a, P> {
    /// The eigenvalue of each state
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// The eigenvectors without their eigenvalues
    pub fn state(&self) -> &State<'a, P> {
        &self.state
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether there are no states
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Groups of states whose eigenvalues lie within `eps` of one another
    pub fn degenerate(&self, eps: f64) -> Vec<Vec<usize>> {
        degenerate_groups(&self.eigenvalues, eps)
    }

    /// The density of states at `energies`
    pub fn dos<D: DistributionFn + ?Sized>(
        &self,
        energies: &Array1<f64>,
        distribution: &D,
    ) -> Array1<f64> {
        electron::dos(energies, &self.eigenvalues, distribution)
    }

    /// The projected density of states at `energies`, spin resolved for non-collinear parents
    pub fn pdos<D: DistributionFn + ?Sized>(
        &self,
        energies: &Array1<f64>,
        distribution: &D,
    ) -> Result<ProjectedDos, ElectronError> {
        electron::pdos(
            energies,
            &self.eigenvalues,
            self.states(),
            &self.sk()?,
            distribution,
            Some(self.spin()?),
        )
    }

    /// A new container holding the states and eigenvalues at `indices`, in that order
    pub fn sub(&self, indices: &[usize]) -> Result<Self, ElectronError> {
        Ok(Self {
            state: self.state.sub(indices)?,
            eigenvalues: indices.iter().map(|&i| self.eigenvalues[i]).collect(),
        })
    }

    /// The states rescaled to unit norm under the overlap of the parent
    pub fn normalize(&self) -> Result<Self, ElectronError> {
        Ok(Self {
            state: self.state.normalize()?,
            eigenvalues: self.eigenvalues.clone(),
        })
    }
}

impl<P: OperatorSource + ?Sized> ElectronState for StateC<'_, P> {
    type Parent = P;

    fn states(&self) -> &DMatrix<Complex<f64>> {
        &self.state.states
    }

    fn parent(&self) -> &P {
        self.state.parent
    }

    fn info(&self) -> &StateInfo {
        &self.state.info
    }

    fn energies(&self) -> Option<&[f64]> {
        Some(&self.eigenvalues)
    }
}

fn check_indices(indices: &[usize], len: usize) -> Result<(), ElectronError> {
    match indices.iter().find(|&&i| i >= len) {
        Some(index) => Err(ElectronError::InconsistentDimensions(format!(
            "state {index} is out of range for {len} states"
        ))),
        None => Ok(()),
    }
}

/// A bare set of eigenvalues
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Eigenvalues(Vec<f64>);

impl From<Vec<f64>> for Eigenvalues {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl Eigenvalues {
    /// The eigenvalues as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of eigenvalues
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no eigenvalues
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The density of states at `energies`
    pub fn dos<D: DistributionFn + ?Sized>(
        &self,
        energies: &Array1<f64>,
        distribution: &D,
    ) -> Array1<f64> {
        electron::dos(energies, &self.0, distribution)
    }
}
