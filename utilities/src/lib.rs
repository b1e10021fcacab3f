//! Random fixtures for the tests and benches of `electron-post`

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use num_complex::Complex;
use rand::{thread_rng, Rng};

fn random_complex(rng: &mut impl Rng) -> Complex<f64> {
    Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
}

/// A random complex matrix with entries in the unit square
pub fn random_matrix(rows: usize, columns: usize) -> DMatrix<Complex<f64>> {
    let mut rng = thread_rng();
    DMatrix::from_fn(rows, columns, |_, _| random_complex(&mut rng))
}

/// A random Hermitian matrix
pub fn random_hermitian(dimension: usize) -> DMatrix<Complex<f64>> {
    let matrix = random_matrix(dimension, dimension);
    (&matrix + matrix.adjoint()) * Complex::new(0.5, 0.)
}

/// A random Hermitian positive definite matrix, suitable as an overlap
pub fn random_positive_definite(dimension: usize) -> DMatrix<Complex<f64>> {
    let matrix = random_matrix(dimension, dimension);
    &matrix * matrix.adjoint() / Complex::new(dimension as f64, 0.)
        + DMatrix::identity(dimension, dimension)
}

/// A random unitary matrix from the QR decomposition of a random matrix
pub fn random_unitary(dimension: usize) -> DMatrix<Complex<f64>> {
    random_matrix(dimension, dimension).qr().q()
}

/// `count` random, unnormalised states of `width` coefficients, one per row
pub fn random_states(count: usize, width: usize) -> DMatrix<Complex<f64>> {
    random_matrix(count, width)
}

/// `count` states orthonormal under `overlap` and sorted random energies
///
/// The rows `psi_i` satisfy `psi_i^H S psi_j = delta_ij`, they are the eigenvectors of the Hamiltonian
/// `S C diag(e) C^H S` where `C` holds the states as columns.
pub fn random_eigenpairs(
    overlap: &DMatrix<Complex<f64>>,
    count: usize,
) -> (Vec<f64>, DMatrix<Complex<f64>>) {
    let mut rng = thread_rng();
    let dimension = overlap.nrows();
    let unitary = random_unitary(dimension).columns(0, count).into_owned();
    let cholesky = overlap
        .clone()
        .cholesky()
        .expect("overlap must be positive definite");
    let columns = cholesky
        .l()
        .adjoint()
        .solve_upper_triangular(&unitary)
        .expect("Cholesky factor must be invertible");
    let mut energies = (0..count)
        .map(|_| rng.gen_range(-3.0..3.0))
        .collect::<Vec<f64>>();
    energies.sort_by(|a, b| a.partial_cmp(b).unwrap());
    (energies, columns.transpose())
}

/// A random Hermitian tridiagonal matrix in compressed sparse row format
pub fn random_tridiagonal(dimension: usize) -> CsrMatrix<Complex<f64>> {
    let mut rng = thread_rng();
    let mut coo = CooMatrix::new(dimension, dimension);
    for i in 0..dimension {
        coo.push(i, i, Complex::new(rng.gen_range(-1.0..1.0), 0.));
        if i + 1 < dimension {
            let hopping = random_complex(&mut rng);
            coo.push(i, i + 1, hopping);
            coo.push(i + 1, i, hopping.conj());
        }
    }
    CsrMatrix::from(&coo)
}
