use crate::{
    spin::{effective_overlap, split_spinor},
    ElectronError, Overlap, Spin,
};
use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex;
use tracing::instrument;

/// The spin moment (spin texture) of each state, an array of shape `(states, 3)`
///
/// For each state the expectation values of the Pauli matrices are
///
/// ```text
/// S_x = 2 Re <up| S |down>,  S_y = 2 Im <up| S |down>,  S_z = <up| S |up> - <down| S |down>
/// ```
///
/// States must be non-collinear spinors, a full width overlap is reduced to its spin-diagonal block. Collinear
/// states with an even number of coefficients are accepted but the result has no physical meaning.
#[instrument(skip_all, fields(states = states.nrows()))]
pub fn spin_moment(
    states: &DMatrix<Complex<f64>>,
    overlap: &Overlap,
) -> Result<Array2<f64>, ElectronError> {
    let overlap = effective_overlap(Spin::NonCollinear, overlap, states.ncols())?;
    let mut moments = Array2::zeros((states.nrows(), 3));
    for (state, mut moment) in states.row_iter().zip(moments.rows_mut()) {
        let (up, down) = split_spinor(&state.transpose());
        let (s_up, s_down) = (overlap.apply(&up), overlap.apply(&down));
        let cross = up.dotc(&*s_down) * 2.;
        moment[0] = cross.re;
        moment[1] = cross.im;
        moment[2] = up.dotc(&*s_up).re - down.dotc(&*s_down).re;
    }
    Ok(moments)
}
