//! # Operator
//!
//! Hamiltonian-like matrices evaluated at a single reciprocal point. Operators are either dense or stored in
//! compressed sparse row format, the engines only ever act with them on vectors so the storage is hidden
//! behind [`Operator::apply`].
//!
//! Derivative operators hold the three Cartesian components interleaved along the rows, row `3 i + a` being
//! component `a` of orbital row `i`. [`Operator::strided_rows`] splits out a single component.

mod overlap;

pub use overlap::Overlap;

use crate::utilities::matrices::is_hermitian;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{convert::serial::convert_csr_dense, CooMatrix, CsrMatrix};
use num_complex::Complex;

#[derive(Clone, Debug)]
/// A complex matrix at a fixed reciprocal point
pub enum Operator {
    /// Dense storage
    Dense(DMatrix<Complex<f64>>),
    /// Compressed sparse row storage
    Sparse(CsrMatrix<Complex<f64>>),
}

impl From<DMatrix<Complex<f64>>> for Operator {
    fn from(matrix: DMatrix<Complex<f64>>) -> Self {
        Self::Dense(matrix)
    }
}

impl From<CsrMatrix<Complex<f64>>> for Operator {
    fn from(matrix: CsrMatrix<Complex<f64>>) -> Self {
        Self::Sparse(matrix)
    }
}

impl Operator {
    /// Number of rows
    pub fn nrows(&self) -> usize {
        match self {
            Self::Dense(matrix) => matrix.nrows(),
            Self::Sparse(matrix) => matrix.nrows(),
        }
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        match self {
            Self::Dense(matrix) => matrix.ncols(),
            Self::Sparse(matrix) => matrix.ncols(),
        }
    }

    /// The matrix-vector product `A v`
    ///
    /// The caller guarantees that `v` has `ncols` elements.
    pub fn apply(&self, vector: &DVector<Complex<f64>>) -> DVector<Complex<f64>> {
        match self {
            Self::Dense(matrix) => matrix * vector,
            Self::Sparse(matrix) => DVector::from_iterator(
                matrix.nrows(),
                matrix.row_iter().map(|row| {
                    row.col_indices()
                        .iter()
                        .zip(row.values())
                        .map(|(&column, value)| value * vector[column])
                        .sum::<Complex<f64>>()
                }),
            ),
        }
    }

    /// The matrix element `<left| A |right>`
    pub fn matrix_element(
        &self,
        left: &DVector<Complex<f64>>,
        right: &DVector<Complex<f64>>,
    ) -> Complex<f64> {
        left.dotc(&self.apply(right))
    }

    /// The operator built from rows `offset`, `offset + stride`, `offset + 2 stride`, ...
    pub fn strided_rows(&self, offset: usize, stride: usize) -> Self {
        let rows = (offset..self.nrows()).step_by(stride).collect::<Vec<_>>();
        match self {
            Self::Dense(matrix) => Self::Dense(matrix.select_rows(rows.iter())),
            Self::Sparse(matrix) => {
                let mut coo = CooMatrix::new(rows.len(), matrix.ncols());
                for (new_row, &row) in rows.iter().enumerate() {
                    let row = matrix.row(row);
                    for (&column, &value) in row.col_indices().iter().zip(row.values()) {
                        coo.push(new_row, column, value);
                    }
                }
                Self::Sparse(CsrMatrix::from(&coo))
            }
        }
    }

    /// The spin-diagonal block of an operator in an interleaved spinor basis, every other row and column
    pub fn spin_diagonal(&self) -> Self {
        match self {
            Self::Dense(matrix) => {
                let rows = (0..matrix.nrows()).step_by(2).collect::<Vec<_>>();
                let columns = (0..matrix.ncols()).step_by(2).collect::<Vec<_>>();
                Self::Dense(matrix.select_rows(rows.iter()).select_columns(columns.iter()))
            }
            Self::Sparse(matrix) => {
                let mut coo = CooMatrix::new((matrix.nrows() + 1) / 2, (matrix.ncols() + 1) / 2);
                for (row, column, &value) in matrix.triplet_iter() {
                    if row % 2 == 0 && column % 2 == 0 {
                        coo.push(row / 2, column / 2, value);
                    }
                }
                Self::Sparse(CsrMatrix::from(&coo))
            }
        }
    }

    /// A dense copy of the operator
    pub fn to_dense(&self) -> DMatrix<Complex<f64>> {
        match self {
            Self::Dense(matrix) => matrix.clone(),
            Self::Sparse(matrix) => convert_csr_dense(matrix),
        }
    }

    /// Whether the operator equals its own conjugate transpose
    pub fn is_hermitian(&self) -> bool {
        self.nrows() == self.ncols() && is_hermitian(&self.to_dense())
    }
}
