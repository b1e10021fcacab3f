// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Electron-post derives physical observables from the eigenstates of tight-binding Hamiltonians
//!
//! # Overview
//! Given the eigenvalues and eigenvectors of a Hamiltonian sampled at a single reciprocal point, together with the
//! overlap matrix of the basis when it is non-orthogonal, electron-post computes
//! - the density of states (DOS) broadened by a distribution function,
//! - the orbital and spin resolved projected density of states (PDOS),
//! - the spin moment (spin texture) of non-collinear states,
//! - the group velocity of each state, decoupling degenerate subspaces,
//! - the real-space wavefunction, projected onto a three dimensional grid of atom-centred orbitals.
//!
//! The engines are free functions in [`electron`], they are tied to a parent Hamiltonian through the
//! [`State`] and [`StateC`] containers which resolve the overlap matrix and the Hamiltonian derivatives
//! at the reciprocal point the states were evaluated at.
//!
//! # Usage
//! The library can be driven directly, or through the binary which solves a configurable tight-binding chain:
//!
//! ```toml
//! [model]
//! lattice_constant = 2.5
//! number_of_atoms = 2
//! hopping_energy = -1.0
//! spin = "unpolarized"
//! ```
//!
//! with the calculation selected on the command line as `electron-post --calculation dos --log-level info`.

#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

/// The command line application, configuration and tracing
pub mod app;

/// Physical constants
pub mod constants;

/// Broadening kernels for densities of states
pub mod distribution;

/// The post-processing engines
pub mod electron;

/// Error handling
mod error;

/// Reference tight-binding models
pub mod model;

/// Hamiltonian-like operators and the overlap abstraction
pub mod operator;

/// The interface to Hamiltonians which produce eigenstates
pub mod source;

/// Spin configurations
pub mod spin;

/// Eigenstates bound to their parent Hamiltonian
pub mod state;

/// Helper functions and traits
mod utilities;

pub use distribution::{Distribution, DistributionFn};
pub use electron_geometry as geometry;
pub use error::ElectronError;
pub use operator::{Operator, Overlap};
pub use source::{Gauge, OperatorSource};
pub use spin::Spin;
pub use state::{ElectronState, Eigenvalues, State, StateBuilder, StateC, StateInfo};
