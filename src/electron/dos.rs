use crate::DistributionFn;
use ndarray::Array1;

/// The density of states at each of `energies`
///
/// Each eigenvalue contributes the kernel `distribution(E - eig)`, so the result is additive and does not depend on
/// the order of the eigenvalues.
pub fn dos<D>(energies: &Array1<f64>, eigenvalues: &[f64], distribution: &D) -> Array1<f64>
where
    D: DistributionFn + ?Sized,
{
    eigenvalues
        .iter()
        .fold(Array1::zeros(energies.len()), |mut dos, &eigenvalue| {
            dos += &distribution.broaden(energies, eigenvalue);
            dos
        })
}

#[cfg(test)]
mod test {
    use super::dos;
    use crate::Distribution;
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use proptest::prelude::*;
    use rand::{seq::SliceRandom, thread_rng, Rng};

    #[test]
    fn dos_integrates_to_the_number_of_states() {
        let mut rng = thread_rng();
        let eigenvalues = (0..12).map(|_| rng.gen_range(-1.0..1.0)).collect::<Vec<f64>>();
        let energies = Array1::linspace(-3., 3., 60_001);
        let de = 6. / 60_000.;
        let distribution = Distribution::gaussian(0.05);
        let dos = dos(&energies, &eigenvalues, &distribution);
        assert!(dos.iter().all(|&x| x >= 0.));
        assert_relative_eq!(dos.sum() * de, 12., epsilon = 1e-6);
    }

    #[test]
    fn dos_is_independent_of_the_eigenvalue_order() {
        let mut rng = thread_rng();
        let mut eigenvalues = (0..20).map(|_| rng.gen_range(-2.0..2.0)).collect::<Vec<f64>>();
        let energies = Array1::linspace(-2., 2., 101);
        let distribution = Distribution::lorentzian(0.1);
        let reference = dos(&energies, &eigenvalues, &distribution);
        eigenvalues.shuffle(&mut rng);
        let shuffled = dos(&energies, &eigenvalues, &distribution);
        for (a, b) in reference.iter().zip(shuffled.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    fn empty_spectra_have_no_states() {
        let energies = Array1::linspace(-1., 1., 11);
        let dos = dos(&energies, &[], &Distribution::gaussian(0.1));
        assert_eq!(dos.len(), 11);
        assert!(dos.iter().all(|&x| x == 0.));
    }

    proptest! {
        #[test]
        fn reversing_the_spectrum_leaves_the_dos_unchanged(
            eigenvalues in proptest::collection::vec(-5.0..5.0f64, 1..30),
            sigma in 0.01..1.0f64,
        ) {
            let energies = Array1::linspace(-6., 6., 121);
            let distribution = Distribution::gaussian(sigma);
            let forward = dos(&energies, &eigenvalues, &distribution);
            let reversed = eigenvalues.iter().rev().copied().collect::<Vec<_>>();
            let backward = dos(&energies, &reversed, &distribution);
            for (a, b) in forward.iter().zip(backward.iter()) {
                prop_assert!(*a >= 0.);
                prop_assert!((a - b).abs() <= 1e-9 * (1. + a.abs()));
            }
        }
    }
}
