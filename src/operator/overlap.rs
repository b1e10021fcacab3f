use super::Operator;
use nalgebra::DVector;
use num_complex::Complex;
use std::borrow::Cow;

#[derive(Clone, Debug)]
/// The overlap operator of a basis at a fixed reciprocal point
///
/// Orthogonal bases carry the identity, which is never materialised: applying it hands back the input.
pub enum Overlap {
    /// The overlap of an orthogonal basis
    Identity,
    /// An explicit overlap matrix
    Explicit(Operator),
}

impl Default for Overlap {
    fn default() -> Self {
        Self::Identity
    }
}

impl From<Operator> for Overlap {
    fn from(operator: Operator) -> Self {
        Self::Explicit(operator)
    }
}

impl Overlap {
    /// The product `S v`, borrowing `v` when the overlap is the identity
    pub fn apply<'a>(&self, vector: &'a DVector<Complex<f64>>) -> Cow<'a, DVector<Complex<f64>>> {
        match self {
            Self::Identity => Cow::Borrowed(vector),
            Self::Explicit(operator) => Cow::Owned(operator.apply(vector)),
        }
    }

    /// The number of columns of an explicit overlap, the identity adapts to any width
    pub fn ncols(&self) -> Option<usize> {
        match self {
            Self::Identity => None,
            Self::Explicit(operator) => Some(operator.ncols()),
        }
    }

    /// Whether the basis is orthogonal
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// The spin-diagonal block of an overlap in an interleaved spinor basis
    pub fn spin_diagonal(&self) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Explicit(operator) => Self::Explicit(operator.spin_diagonal()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Overlap;
    use crate::Operator;
    use nalgebra::{DMatrix, DVector};
    use num_complex::Complex;
    use std::borrow::Cow;

    #[test]
    fn identity_borrows_its_input() {
        let vector = DVector::from_element(4, Complex::new(0.5, -0.5));
        let product = Overlap::Identity.apply(&vector);
        assert!(matches!(product, Cow::Borrowed(_)));
        assert_eq!(*product, vector);
    }

    #[test]
    fn explicit_overlaps_multiply() {
        let matrix = DMatrix::from_fn(2, 2, |i, j| Complex::new(if i == j { 1. } else { 0.25 }, 0.));
        let overlap = Overlap::from(Operator::Dense(matrix));
        let vector = DVector::from_vec(vec![Complex::new(1., 0.), Complex::new(0., 2.)]);
        let product = overlap.apply(&vector);
        assert_eq!(product[0], Complex::new(1., 0.5));
        assert_eq!(product[1], Complex::new(0.25, 2.));
        assert_eq!(overlap.ncols(), Some(2));
    }
}
