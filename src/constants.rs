/// The reduced Planck constant in eV s
pub const HBAR_EV: f64 = 6.582_119_514e-16;

/// Converts a Hamiltonian derivative in eV Å into a velocity in Å / ps
pub const VELOCITY_CONVERSION: f64 = 1e-12 / HBAR_EV;

/// Reciprocal points with a norm below this are treated as the Gamma point
pub const GAMMA_TOLERANCE: f64 = 1e-6;

/// Width of a distribution requested by name alone, in eV
pub const DEFAULT_DISTRIBUTION_WIDTH: f64 = 0.1;
