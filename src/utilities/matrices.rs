use crate::ElectronError;
use nalgebra::{Cholesky, DMatrix, DVector, SymmetricEigen};
use num_complex::Complex;
use std::cmp::Ordering;

/// Tests for hermiticity of a matrix
pub(crate) fn is_hermitian(matrix: &DMatrix<Complex<f64>>) -> bool {
    let scale = matrix.iter().map(|x| x.norm()).fold(1_f64, f64::max);
    matrix.is_square()
        && matrix
            .iter()
            .zip(matrix.adjoint().iter())
            .all(|(element, adjoint_element)| {
                (element - adjoint_element).norm() / scale < std::f64::EPSILON * 100_f64
            })
}

/// Eigendecomposition of a Hermitian matrix with the eigenvalues in ascending order
///
/// The eigenvectors are the columns of the returned matrix, in the order of the eigenvalues.
pub(crate) fn eigh_sorted(
    matrix: DMatrix<Complex<f64>>,
) -> Result<(DVector<f64>, DMatrix<Complex<f64>>), ElectronError> {
    let dimension = matrix.nrows();
    let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, 0).ok_or_else(|| {
        ElectronError::Eigensolver(format!(
            "the Hermitian eigensolver did not converge for a {dimension}x{dimension} matrix"
        ))
    })?;
    let mut order = (0..dimension).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });
    let eigenvalues = DVector::from_iterator(dimension, order.iter().map(|&i| eigen.eigenvalues[i]));
    let eigenvectors = eigen.eigenvectors.select_columns(order.iter());
    Ok((eigenvalues, eigenvectors))
}

/// Solves the generalised Hermitian problem `H c = e S c` for positive definite `S`
///
/// The problem is reduced to standard form through the Cholesky factor `S = L L^H`, the returned eigenvectors
/// are normalised so that `c^H S c = 1`.
pub(crate) fn generalized_eigh(
    hamiltonian: DMatrix<Complex<f64>>,
    overlap: DMatrix<Complex<f64>>,
) -> Result<(DVector<f64>, DMatrix<Complex<f64>>), ElectronError> {
    let cholesky = Cholesky::new(overlap).ok_or_else(|| {
        ElectronError::Eigensolver("the overlap matrix is not positive definite".into())
    })?;
    let l = cholesky.l();
    let singular = || ElectronError::Eigensolver("the Cholesky factor is singular".into());
    // L^-1 H, then L^-1 (L^-1 H)^H = L^-1 H L^-H as H is Hermitian
    let half = l.solve_lower_triangular(&hamiltonian).ok_or_else(singular)?;
    let reduced = l.solve_lower_triangular(&half.adjoint()).ok_or_else(singular)?;
    let (eigenvalues, vectors) = eigh_sorted(reduced)?;
    let eigenvectors = l.adjoint().solve_upper_triangular(&vectors).ok_or_else(singular)?;
    Ok((eigenvalues, eigenvectors))
}

#[cfg(test)]
mod test {
    use super::{eigh_sorted, generalized_eigh, is_hermitian};
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use num_complex::Complex;

    fn hermitian() -> DMatrix<Complex<f64>> {
        DMatrix::from_row_slice(
            3,
            3,
            &[
                Complex::new(1., 0.),
                Complex::new(1., -2.),
                Complex::new(0., 0.),
                Complex::new(1., 2.),
                Complex::new(0., 0.),
                Complex::new(0., -1.),
                Complex::new(0., 0.),
                Complex::new(0., 1.),
                Complex::new(1., 0.),
            ],
        )
    }

    #[test]
    fn real_non_hermitian_matrix_returns_false() {
        let matrix = DMatrix::from_row_slice(3, 3, &[1., 2., 3., 4., 5., 6., 7., 8., 9.])
            .map(|x| Complex::new(x, 0.));
        assert!(!is_hermitian(&matrix));
    }

    #[test]
    fn complex_hermitian_matrices_return_true() {
        assert!(is_hermitian(&hermitian()));
        let mut matrix = hermitian();
        matrix[(0, 1)] = Complex::new(1., 2.);
        assert!(!is_hermitian(&matrix));
    }

    #[test]
    fn eigenvalues_are_sorted_and_eigenvectors_satisfy_the_problem() {
        let matrix = hermitian();
        let (values, vectors) = eigh_sorted(matrix.clone()).unwrap();
        assert!(values.as_slice().windows(2).all(|pair| pair[0] <= pair[1]));
        for (n, value) in values.iter().enumerate() {
            let vector = vectors.column(n);
            let residual = &matrix * vector - vector * Complex::new(*value, 0.);
            assert_relative_eq!(residual.norm(), 0., epsilon = 1e-10);
        }
    }

    #[test]
    fn generalized_eigenvectors_are_overlap_normalised() {
        let hamiltonian = hermitian();
        let overlap = DMatrix::from_fn(3, 3, |i, j| match (i as i32 - j as i32).abs() {
            0 => Complex::new(1., 0.),
            1 => Complex::new(0.2, 0.1 * (i as f64 - j as f64)),
            _ => Complex::new(0., 0.),
        });
        let (values, vectors) = generalized_eigh(hamiltonian.clone(), overlap.clone()).unwrap();
        assert!(values.as_slice().windows(2).all(|pair| pair[0] <= pair[1]));
        let gram = vectors.adjoint() * &overlap * &vectors;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1. } else { 0. };
                assert_relative_eq!(gram[(i, j)].re, expected, epsilon = 1e-10);
                assert_relative_eq!(gram[(i, j)].im, 0., epsilon = 1e-10);
            }
            let vector = vectors.column(i);
            let residual = &hamiltonian * vector - &overlap * vector * Complex::new(values[i], 0.);
            assert_relative_eq!(residual.norm(), 0., epsilon = 1e-10);
        }
    }
}
