use crate::{ElectronError, Operator, Overlap, Spin};
use electron_geometry::Geometry;
use serde::Deserialize;

/// The convention for Bloch phases
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gauge {
    /// Phases depend only on the lattice vector connecting two cells
    #[default]
    Cell,
    /// Phases depend on the vector connecting the two orbitals
    Orbital,
}

/// A Hamiltonian-like object whose eigenstates can be post-processed
///
/// Every capability has a default so a minimal parent only overrides what it knows: an orthogonal parent
/// without derivatives supports densities of states and norms but no velocities.
pub trait OperatorSource {
    /// The spin configuration of the eigenvectors, `None` when unknown
    fn spin(&self) -> Option<Spin> {
        None
    }

    /// Whether the basis is orthogonal
    fn orthogonal(&self) -> bool {
        true
    }

    /// The atoms and orbitals of the basis, when available
    fn geometry(&self) -> Option<&Geometry> {
        None
    }

    /// The overlap at the reduced reciprocal point `k`
    fn sk(&self, _k: [f64; 3], _gauge: Gauge) -> Result<Overlap, ElectronError> {
        Ok(Overlap::Identity)
    }

    /// The Cartesian derivative `dH/dk`, three interleaved components per orbital row
    fn dhk(&self, _k: [f64; 3], _gauge: Gauge) -> Result<Operator, ElectronError> {
        Err(ElectronError::MissingSpinContext(
            "the parent does not provide the Hamiltonian derivative dH/dk".into(),
        ))
    }

    /// The Cartesian derivative `dS/dk`, laid out like `dhk`
    fn dsk(&self, _k: [f64; 3], _gauge: Gauge) -> Result<Operator, ElectronError> {
        Err(ElectronError::MissingSpinContext(
            "the parent does not provide the overlap derivative dS/dk".into(),
        ))
    }
}

/// A bare geometry is an orthogonal basis without operators
impl OperatorSource for Geometry {
    fn geometry(&self) -> Option<&Geometry> {
        Some(self)
    }
}

/// A fixed overlap, independent of the reciprocal point
impl OperatorSource for Overlap {
    fn orthogonal(&self) -> bool {
        self.is_identity()
    }

    fn sk(&self, _k: [f64; 3], _gauge: Gauge) -> Result<Overlap, ElectronError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::{Gauge, OperatorSource};
    use crate::{ElectronError, Operator, Overlap};
    use nalgebra::DMatrix;
    use num_complex::Complex;

    #[test]
    fn overlaps_are_their_own_parent() {
        let overlap = Overlap::Explicit(Operator::Dense(DMatrix::from_element(
            2,
            2,
            Complex::new(0.5, 0.),
        )));
        assert!(!overlap.orthogonal());
        assert_eq!(overlap.sk([0.; 3], Gauge::Cell).unwrap().ncols(), Some(2));
        assert!(Overlap::Identity.orthogonal());
    }

    #[test]
    fn missing_derivatives_are_reported() {
        let result = Overlap::Identity.dhk([0.; 3], Gauge::Orbital);
        assert!(matches!(result, Err(ElectronError::MissingSpinContext(_))));
        assert!(Overlap::Identity.spin().is_none());
    }
}
