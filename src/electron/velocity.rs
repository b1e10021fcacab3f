use crate::{
    constants::VELOCITY_CONVERSION, utilities::matrices::eigh_sorted, ElectronError, Operator,
};
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use num_complex::Complex;
use tracing::{debug, instrument};

/// The Cartesian components of `dH/dk` and, in a non-orthogonal basis, `dS/dk`
struct VelocityOperator {
    hamiltonian: Vec<Operator>,
    overlap: Option<Vec<Operator>>,
}

impl VelocityOperator {
    fn new(dhk: &Operator, dsk: Option<&Operator>, width: usize) -> Result<Self, ElectronError> {
        let hamiltonian = components(dhk, width)?;
        let overlap = dsk.map(|dsk| components(dsk, width)).transpose()?;
        // dH/dk and dS/dk must resolve the same directions
        if let (Some(dsk), Some(overlap)) = (dsk, &overlap) {
            if overlap.len() != hamiltonian.len() {
                return Err(ElectronError::UnsupportedShape {
                    rows: dsk.nrows(),
                    columns: dsk.ncols(),
                    width,
                });
            }
        }
        Ok(Self {
            hamiltonian,
            overlap,
        })
    }

    fn directions(&self) -> usize {
        self.hamiltonian.len()
    }

    /// `<left| dH_a - energy dS_a |right>`
    fn element(
        &self,
        axis: usize,
        left: &DVector<Complex<f64>>,
        right: &DVector<Complex<f64>>,
        energy: f64,
    ) -> Complex<f64> {
        let element = self.hamiltonian[axis].matrix_element(left, right);
        match &self.overlap {
            Some(overlap) => element - overlap[axis].matrix_element(left, right) * energy,
            None => element,
        }
    }
}

/// Split a derivative operator into its Cartesian components
///
/// A `3 no x no` operator holds all three components interleaved along the rows, a square `no x no` operator is
/// the derivative along a single direction.
fn components(operator: &Operator, width: usize) -> Result<Vec<Operator>, ElectronError> {
    match (operator.nrows(), operator.ncols()) {
        (rows, columns) if columns == width && rows == 3 * width => {
            Ok((0..3).map(|axis| operator.strided_rows(axis, 3)).collect())
        }
        (rows, columns) if columns == width && rows == width => Ok(vec![operator.clone()]),
        (rows, columns) => Err(ElectronError::UnsupportedShape {
            rows,
            columns,
            width,
        }),
    }
}

/// The group velocity of each state in Å / ps
///
/// The velocity along `a` is `Re <psi| dH/dk_a - e dS/dk_a |psi> / hbar`, the overlap term only entering in a
/// non-orthogonal basis where `energies` must be given. The result has shape `(states, 3)`, or `(states, 1)` when
/// `dhk` is a square single-direction derivative.
///
/// States within each of the `degenerate` groups are only defined up to a unitary rotation of their subspace. Each
/// group is rotated onto the eigenvectors of the velocity operator restricted to the subspace, one direction at a
/// time in the order `x`, `y`, `z`, each step acting on the basis left by the previous one. The rotation uses the
/// mean energy of the group while the final velocities use the energy of each state.
#[instrument(skip_all, fields(states = states.nrows(), groups = degenerate.len()))]
pub fn velocity(
    states: &DMatrix<Complex<f64>>,
    dhk: &Operator,
    energies: Option<&[f64]>,
    dsk: Option<&Operator>,
    degenerate: &[Vec<usize>],
) -> Result<Array2<f64>, ElectronError> {
    let width = states.ncols();
    let operator = VelocityOperator::new(dhk, dsk, width)?;
    let energies = match (dsk, energies) {
        (Some(_), None) => return Err(ElectronError::MissingEnergy),
        (Some(_), Some(energies)) if energies.len() != states.nrows() => {
            return Err(ElectronError::InconsistentDimensions(format!(
                "{} energies were passed for {} states",
                energies.len(),
                states.nrows()
            )))
        }
        (Some(_), Some(energies)) => energies.to_vec(),
        // Energies only enter through dS/dk
        (None, _) => vec![0.; states.nrows()],
    };
    if let Some(index) = degenerate.iter().flatten().find(|&&i| i >= states.nrows()) {
        return Err(ElectronError::InconsistentDimensions(format!(
            "degenerate state {index} is out of range for {} states",
            states.nrows()
        )));
    }

    let mut velocities = Array2::zeros((states.nrows(), operator.directions()));
    for (i, mut velocity) in velocities.rows_mut().into_iter().enumerate() {
        let state = states.row(i).transpose();
        for (axis, v) in velocity.iter_mut().enumerate() {
            *v = operator.element(axis, &state, &state, energies[i]).re;
        }
    }

    for group in degenerate.iter().filter(|group| group.len() > 1) {
        debug!(states = ?group, "decoupling degenerate states");
        let mean = group.iter().map(|&i| energies[i]).sum::<f64>() / group.len() as f64;
        let mut basis = group
            .iter()
            .map(|&i| states.row(i).transpose())
            .collect::<Vec<_>>();
        for axis in 0..operator.directions() {
            basis = decouple(&operator, axis, &basis, mean)?;
        }
        for (state, &i) in basis.iter().zip(group) {
            for axis in 0..operator.directions() {
                velocities[[i, axis]] = operator.element(axis, state, state, energies[i]).re;
            }
        }
    }

    Ok(velocities * VELOCITY_CONVERSION)
}

/// Rotate a degenerate basis onto the eigenvectors of the velocity operator along `axis`
fn decouple(
    operator: &VelocityOperator,
    axis: usize,
    basis: &[DVector<Complex<f64>>],
    energy: f64,
) -> Result<Vec<DVector<Complex<f64>>>, ElectronError> {
    let n = basis.len();
    let projected = DMatrix::from_fn(n, n, |a, b| operator.element(axis, &basis[a], &basis[b], energy));
    let hermitian = (&projected + projected.adjoint()) * Complex::new(0.5, 0.);
    let (_, rotation) = eigh_sorted(hermitian)?;
    Ok((0..n)
        .map(|c| {
            basis
                .iter()
                .enumerate()
                .fold(DVector::zeros(basis[0].len()), |rotated, (a, state)| {
                    rotated + state * rotation[(a, c)]
                })
        })
        .collect())
}
