use crate::{
    spin::{classify, effective_overlap, split_spinor},
    DistributionFn, ElectronError, Overlap, Spin,
};
use nalgebra::DMatrix;
use ndarray::{s, Array1, Array2, Array3, Axis};
use num_complex::Complex;
use tracing::instrument;

/// The projected density of states
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectedDos {
    /// Collinear PDOS of shape `(orbitals, energies)`
    Collinear(Array2<f64>),
    /// Non-collinear PDOS of shape `(4, orbitals, energies)`
    ///
    /// The leading axis holds the total PDOS followed by the spin projections along `x`, `y` and `z`.
    NonCollinear(Array3<f64>),
}

impl ProjectedDos {
    /// The total density of states, summed over orbitals
    pub fn total(&self) -> Array1<f64> {
        match self {
            Self::Collinear(pdos) => pdos.sum_axis(Axis(0)),
            Self::NonCollinear(pdos) => pdos.index_axis(Axis(0), 0).sum_axis(Axis(0)),
        }
    }

    /// Number of orbitals projected onto
    pub fn orbitals(&self) -> usize {
        match self {
            Self::Collinear(pdos) => pdos.nrows(),
            Self::NonCollinear(pdos) => pdos.len_of(Axis(1)),
        }
    }

    /// Whether the projection carries spin resolved channels
    pub fn is_noncollinear(&self) -> bool {
        matches!(self, Self::NonCollinear(_))
    }
}

/// The orbital (and for non-collinear states spin) resolved density of states
///
/// A collinear projection weighs each state by `Re(conj(psi_nu) (S psi)_nu)` on orbital `nu`. For non-collinear
/// states the spinor block of every orbital is decomposed on the Pauli matrices, giving the total and the `x`, `y`,
/// `z` spin projected densities.
///
/// When `spin` is `None` the configuration is inferred from the overlap: a matrix of half the eigenvector width
/// implies non-collinear states.
#[instrument(skip_all, fields(states = states.nrows(), energies = energies.len()))]
pub fn pdos<D>(
    energies: &Array1<f64>,
    eigenvalues: &[f64],
    states: &DMatrix<Complex<f64>>,
    overlap: &Overlap,
    distribution: &D,
    spin: Option<Spin>,
) -> Result<ProjectedDos, ElectronError>
where
    D: DistributionFn + ?Sized,
{
    if eigenvalues.len() != states.nrows() {
        return Err(ElectronError::InconsistentDimensions(format!(
            "{} eigenvalues were passed for {} states",
            eigenvalues.len(),
            states.nrows()
        )));
    }
    let width = states.ncols();
    let spin = classify(spin, overlap, width);
    let overlap = effective_overlap(spin, overlap, width)?;

    if spin.is_noncollinear() {
        let orbitals = width / 2;
        let mut pdos = Array3::zeros((4, orbitals, energies.len()));
        for (i, &eigenvalue) in eigenvalues.iter().enumerate() {
            let weight = distribution.broaden(energies, eigenvalue);
            let (up, down) = split_spinor(&states.row(i).transpose());
            let (s_up, s_down) = (overlap.apply(&up), overlap.apply(&down));
            for nu in 0..orbitals {
                let d_up = (up[nu].conj() * s_up[nu]).re;
                let d_down = (down[nu].conj() * s_down[nu]).re;
                let cross = up[nu].conj() * s_down[nu] * 2.;
                for (channel, projection) in [d_up + d_down, cross.re, cross.im, d_up - d_down]
                    .into_iter()
                    .enumerate()
                {
                    pdos.slice_mut(s![channel, nu, ..])
                        .scaled_add(projection, &weight);
                }
            }
        }
        Ok(ProjectedDos::NonCollinear(pdos))
    } else {
        let mut pdos = Array2::zeros((width, energies.len()));
        for (i, &eigenvalue) in eigenvalues.iter().enumerate() {
            let weight = distribution.broaden(energies, eigenvalue);
            let state = states.row(i).transpose();
            let s_state = overlap.apply(&state);
            for (nu, mut row) in pdos.axis_iter_mut(Axis(0)).enumerate() {
                row.scaled_add((state[nu].conj() * s_state[nu]).re, &weight);
            }
        }
        Ok(ProjectedDos::Collinear(pdos))
    }
}

#[cfg(test)]
mod test {
    use super::{pdos, ProjectedDos};
    use crate::{electron::dos, Distribution, Operator, Overlap, Spin};
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use ndarray::{s, Array1};
    use num_complex::Complex;

    #[test]
    fn collinear_pdos_sums_to_the_dos() {
        let width = 6;
        let overlap = utilities::random_positive_definite(width);
        let (eigenvalues, states) = utilities::random_eigenpairs(&overlap, width);
        let energies = Array1::linspace(-4., 4., 81);
        let distribution = Distribution::gaussian(0.2);
        let pdos = pdos(
            &energies,
            &eigenvalues,
            &states,
            &Overlap::Explicit(Operator::Dense(overlap)),
            &distribution,
            Some(Spin::Unpolarized),
        )
        .unwrap();
        assert!(matches!(pdos, ProjectedDos::Collinear(_)));
        assert_eq!(pdos.orbitals(), width);
        let dos = dos(&energies, &eigenvalues, &distribution);
        for (a, b) in pdos.total().iter().zip(dos.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn spin_up_states_project_onto_z() {
        // One up state on the second orbital of two
        let mut state = DVector::zeros(4);
        state[2] = Complex::new(0.6, 0.8);
        let states = DMatrix::from_rows(&[state.transpose()]);
        let energies = Array1::linspace(-1., 1., 21);
        let distribution = Distribution::gaussian(0.3);
        let pdos = pdos(
            &energies,
            &[0.2],
            &states,
            &Overlap::Identity,
            &distribution,
            Some(Spin::NonCollinear),
        )
        .unwrap();
        let ProjectedDos::NonCollinear(pdos) = pdos else {
            panic!("expected a spin resolved projection");
        };
        assert_eq!(pdos.dim(), (4, 2, 21));
        let weight = dos(&energies, &[0.2], &distribution);
        for (channel, expected) in [1., 0., 0., 1.].into_iter().enumerate() {
            for (a, b) in pdos.slice(s![channel, 1, ..]).iter().zip(weight.iter()) {
                assert_relative_eq!(*a, expected * b, epsilon = 1e-12);
            }
        }
        assert!(pdos.slice(s![.., 0, ..]).iter().all(|&x| x == 0.));
    }

    #[test]
    fn in_plane_spinors_project_onto_x_and_y() {
        // (up, down) = (1, i) / sqrt(2) points along +y
        let amplitude = 0.5_f64.sqrt();
        let states = DMatrix::from_row_slice(
            1,
            2,
            &[Complex::new(amplitude, 0.), Complex::new(0., amplitude)],
        );
        let energies = Array1::from(vec![0.]);
        let distribution = |_: f64| 1.;
        let pdos = pdos(
            &energies,
            &[0.],
            &states,
            &Overlap::Identity,
            &distribution,
            Some(Spin::SpinOrbit),
        )
        .unwrap();
        let ProjectedDos::NonCollinear(pdos) = pdos else {
            panic!("expected a spin resolved projection");
        };
        assert_relative_eq!(pdos[[0, 0, 0]], 1., epsilon = 1e-12);
        assert_relative_eq!(pdos[[1, 0, 0]], 0., epsilon = 1e-12);
        assert_relative_eq!(pdos[[2, 0, 0]], 1., epsilon = 1e-12);
        assert_relative_eq!(pdos[[3, 0, 0]], 0., epsilon = 1e-12);
    }

    #[test]
    fn half_width_overlaps_select_the_non_collinear_path() {
        let states = DMatrix::from_element(1, 4, Complex::new(0.5, 0.));
        let overlap = Overlap::Explicit(Operator::Dense(DMatrix::identity(2, 2)));
        let energies = Array1::from(vec![0.]);
        let pdos = pdos(
            &energies,
            &[0.],
            &states,
            &overlap,
            &Distribution::gaussian(0.1),
            None,
        )
        .unwrap();
        assert!(pdos.is_noncollinear());
        assert_eq!(pdos.orbitals(), 2);
    }

    #[test]
    fn mismatched_overlaps_are_rejected() {
        let states = DMatrix::from_element(1, 4, Complex::new(0.5, 0.));
        let overlap = Overlap::Explicit(Operator::Dense(DMatrix::identity(3, 3)));
        let energies = Array1::from(vec![0.]);
        assert!(pdos(
            &energies,
            &[0.],
            &states,
            &overlap,
            &Distribution::gaussian(0.1),
            Some(Spin::Unpolarized),
        )
        .is_err());
    }
}
