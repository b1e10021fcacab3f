// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Electron
//!
//! Post-processing engines acting on the eigenpairs of a Hamiltonian at a single reciprocal point.
//!
//! Eigenvectors are passed as a matrix whose rows are the states. For non-collinear calculations each row holds
//! `2 * no` coefficients interleaved as `(up, down)` pairs. The engines are pure functions of their inputs with the
//! exception of [`wavefunction`], which accumulates into a caller owned grid.

mod dos;
mod pdos;
mod progress;
mod spin_moment;
mod velocity;
mod wavefunction;

pub use dos::dos;
pub use pdos::{pdos, ProjectedDos};
pub use progress::{ProgressSink, TracingProgress};
pub use spin_moment::spin_moment;
pub use velocity::velocity;
pub use wavefunction::{wavefunction, Coefficient};
