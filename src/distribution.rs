//! # Distribution
//!
//! Broadening kernels used to turn a discrete set of eigenvalues into a continuous density of states. Every
//! kernel integrates to one over the real line, so a density built from `n` eigenvalues integrates to `n`.
//!
//! The built-in kernels are closed over in [`Distribution`]. Any `Fn(f64) -> f64` closure also acts as a
//! kernel, which lets callers pass their own broadening directly.

use crate::{constants::DEFAULT_DISTRIBUTION_WIDTH, ElectronError};
use ndarray::Array1;
use serde::Deserialize;
use std::f64::consts::PI;
use std::str::FromStr;

/// A stateless broadening kernel of the energy difference `E - eig`
pub trait DistributionFn {
    /// Evaluate the kernel at a single energy difference
    fn evaluate(&self, x: f64) -> f64;

    /// Evaluate the kernel element-wise over an array of energy differences
    fn evaluate_array(&self, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|x| self.evaluate(x))
    }

    /// The weight of a state at `eigenvalue` for each query energy
    fn broaden(&self, energies: &Array1<f64>, eigenvalue: f64) -> Array1<f64> {
        energies.mapv(|energy| self.evaluate(energy - eigenvalue))
    }
}

impl<F> DistributionFn for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}

/// The registered broadening kernels
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Distribution {
    /// A normal distribution of standard deviation `sigma` centred at `x0`
    Gaussian {
        /// Standard deviation in eV
        sigma: f64,
        /// Centre of the distribution
        #[serde(default)]
        x0: f64,
    },
    /// A Cauchy distribution of half width `gamma` centred at `x0`
    Lorentzian {
        /// Half width at half maximum in eV
        gamma: f64,
        /// Centre of the distribution
        #[serde(default)]
        x0: f64,
    },
}

impl Distribution {
    /// A Gaussian kernel centred on zero
    pub fn gaussian(sigma: f64) -> Self {
        Self::Gaussian { sigma, x0: 0. }
    }

    /// A Lorentzian kernel centred on zero
    pub fn lorentzian(gamma: f64) -> Self {
        Self::Lorentzian { gamma, x0: 0. }
    }

    /// Look up a kernel by name, case-insensitively, with the given width and centre
    pub fn from_name(name: &str, width: f64, x0: f64) -> Result<Self, ElectronError> {
        match name.trim().to_lowercase().as_str() {
            "gaussian" => Ok(Self::Gaussian { sigma: width, x0 }),
            "lorentzian" => Ok(Self::Lorentzian { gamma: width, x0 }),
            _ => Err(ElectronError::UnknownDistribution(name.to_string())),
        }
    }

    /// Look up a kernel by name with the default width of 0.1 eV
    pub fn get(name: &str) -> Result<Self, ElectronError> {
        Self::from_name(name, DEFAULT_DISTRIBUTION_WIDTH, 0.)
    }

    /// The width parameter of the kernel
    pub fn width(&self) -> f64 {
        match self {
            Self::Gaussian { sigma, .. } => *sigma,
            Self::Lorentzian { gamma, .. } => *gamma,
        }
    }
}

impl FromStr for Distribution {
    type Err = ElectronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::get(s)
    }
}

impl DistributionFn for Distribution {
    fn evaluate(&self, x: f64) -> f64 {
        match *self {
            Self::Gaussian { sigma, x0 } => {
                let z = (x - x0) / sigma;
                (-0.5 * z * z).exp() / (sigma * (2. * PI).sqrt())
            }
            Self::Lorentzian { gamma, x0 } => gamma / PI / ((x - x0).powi(2) + gamma * gamma),
        }
    }
}
