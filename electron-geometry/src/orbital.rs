//! Atom-centred basis functions
//!
//! An orbital is the product of a radial function and a real spherical harmonic,
//!
//! φ(r, θ, φ) = R(r) Y_lm(θ, φ),
//!
//! truncated at a cutoff radius. Angles follow the convention of the wavefunction engine: `theta` is the
//! azimuthal angle in the xy-plane and `phi` the polar angle measured from the z-axis, passed as `cos(phi)`.

use crate::GeometryError;
use nalgebra::Vector3;

/// The radial part of a localised orbital
#[derive(Clone, Debug, PartialEq)]
pub enum RadialFunction {
    /// A normalised Slater function, N r^(n-1) exp(-zeta r), with principal number `n >= 1` and `zeta > 0`
    Slater { n: u32, zeta: f64 },
    /// A tabulated function, linearly interpolated between the points and zero beyond the final point
    Tabulated { r: Vec<f64>, f: Vec<f64> },
}

impl RadialFunction {
    /// Construct a Slater function, rejecting parameters for which it cannot be normalised
    pub fn slater(n: u32, zeta: f64) -> Result<Self, GeometryError> {
        let slater = Self::Slater { n, zeta };
        slater.validate()?;
        Ok(slater)
    }

    /// Construct a tabulated radial function from strictly increasing radii
    pub fn tabulated(r: Vec<f64>, f: Vec<f64>) -> Result<Self, GeometryError> {
        if r.len() != f.len() || r.len() < 2 {
            return Err(GeometryError::InvalidRadialTable(format!(
                "a radial table needs at least two points and matching lengths, got {} radii and {} values",
                r.len(),
                f.len()
            )));
        }
        if r.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(GeometryError::InvalidRadialTable(
                "radial table points must be strictly increasing".into(),
            ));
        }
        Ok(Self::Tabulated { r, f })
    }

    fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Self::Slater { n, zeta } if *n == 0 || *zeta <= 0. || zeta.is_nan() => {
                Err(GeometryError::InvalidSlater { n: *n, zeta: *zeta })
            }
            _ => Ok(()),
        }
    }

    /// The value of the radial function at distance `r` from the centre
    pub fn evaluate(&self, r: f64) -> f64 {
        match self {
            Self::Slater { n, zeta } => {
                let n = *n as i32;
                let factorial: f64 = (1..=2 * n).map(f64::from).product();
                let normalisation = (2. * zeta).powi(n) * (2. * zeta / factorial).sqrt();
                normalisation * r.powi(n - 1) * (-zeta * r).exp()
            }
            Self::Tabulated { r: radii, f } => {
                let last = radii.len() - 1;
                if r < radii[0] {
                    return f[0];
                }
                if r > radii[last] {
                    return 0.;
                }
                // First tabulated radius strictly above r, clamped to the final interval
                let upper = radii.partition_point(|&x| x <= r).clamp(1, last);
                let lower = upper - 1;
                let t = (r - radii[lower]) / (radii[upper] - radii[lower]);
                f[lower] + t * (f[upper] - f[lower])
            }
        }
    }
}

/// A localised orbital with angular momentum `l`, projection `m` and cutoff `radius`
#[derive(Clone, Debug, PartialEq)]
pub struct Orbital {
    l: u32,
    m: i32,
    radius: f64,
    radial: RadialFunction,
}

impl Orbital {
    /// Construct an orbital, validating the angular momentum and the radial parameters
    pub fn new(l: u32, m: i32, radius: f64, radial: RadialFunction) -> Result<Self, GeometryError> {
        if l > 2 || m.unsigned_abs() > l {
            return Err(GeometryError::UnsupportedAngularMomentum { l, m });
        }
        radial.validate()?;
        Ok(Self {
            l,
            m,
            radius,
            radial,
        })
    }

    /// Angular momentum quantum number
    pub fn l(&self) -> u32 {
        self.l
    }

    /// Projection of the angular momentum, `-l <= m <= l`
    pub fn m(&self) -> i32 {
        self.m
    }

    /// The cutoff radius, a non-positive radius marks an orbital without a real-space representation
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The radial part of the orbital
    pub fn radial(&self) -> &RadialFunction {
        &self.radial
    }

    /// Evaluate the orbital at spherical coordinates relative to its centre
    pub fn psi_spherical(&self, r: f64, theta: f64, cos_phi: f64) -> f64 {
        if r > self.radius {
            return 0.;
        }
        self.radial.evaluate(r) * real_spherical_harmonic(self.l, self.m, theta, cos_phi)
    }

    /// Evaluate the orbital at a Cartesian displacement from its centre
    pub fn psi(&self, r: &Vector3<f64>) -> f64 {
        let distance = r.norm();
        let (theta, cos_phi) = spherical_angles(r, distance);
        self.psi_spherical(distance, theta, cos_phi)
    }
}

/// Azimuthal angle and polar cosine of a displacement, the origin is assigned to the +z direction
pub fn spherical_angles(r: &Vector3<f64>, distance: f64) -> (f64, f64) {
    if distance > 0. {
        (r.y.atan2(r.x), r.z / distance)
    } else {
        (0., 1.)
    }
}

fn real_spherical_harmonic(l: u32, m: i32, theta: f64, cos_phi: f64) -> f64 {
    let sin_phi = (1. - cos_phi * cos_phi).max(0.).sqrt();
    match (l, m) {
        (0, _) => 0.282_094_791_773_878_14,
        (1, -1) => 0.488_602_511_902_919_9 * sin_phi * theta.sin(),
        (1, 0) => 0.488_602_511_902_919_9 * cos_phi,
        (1, _) => 0.488_602_511_902_919_9 * sin_phi * theta.cos(),
        (2, -2) => 0.546_274_215_296_039_6 * sin_phi * sin_phi * (2. * theta).sin(),
        (2, -1) => 1.092_548_430_592_079_2 * sin_phi * cos_phi * theta.sin(),
        (2, 0) => 0.315_391_565_252_520_05 * (3. * cos_phi * cos_phi - 1.),
        (2, 1) => 1.092_548_430_592_079_2 * sin_phi * cos_phi * theta.cos(),
        _ => 0.546_274_215_296_039_6 * sin_phi * sin_phi * (2. * theta).cos(),
    }
}
