//! Atomic geometries, localised orbitals and real-space grids
//!
//! These are the containers consumed by the post-processing engines in `electron-post`. A `Geometry` owns
//! the atoms of a periodic `Lattice`, each `Atom` owns the `Orbital`s centred on it and a `Grid` holds
//! the real-space amplitudes that wavefunctions are projected onto.

mod atom;
mod error;
mod geometry;
mod grid;
mod lattice;
mod orbital;

pub use atom::Atom;
pub use error::GeometryError;
pub use geometry::{AtomImage, Geometry};
pub use grid::{BoundaryCondition, Grid, GridBuilder, GridValues};
pub use lattice::Lattice;
pub use orbital::{spherical_angles, Orbital, RadialFunction};
