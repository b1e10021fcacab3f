use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while constructing lattices, orbitals, geometries and grids
pub enum GeometryError {
    #[error("the lattice vectors are linearly dependent (volume {0})")]
    SingularCell(f64),
    #[error("supercell image counts must be odd, got {0:?}")]
    EvenSupercell([usize; 3]),
    #[error("real spherical harmonics are implemented for l <= 2, got l = {l}, m = {m}")]
    UnsupportedAngularMomentum { l: u32, m: i32 },
    #[error("{0}")]
    InvalidRadialTable(String),
    #[error("a Slater function needs n >= 1 and zeta > 0, got n = {n}, zeta = {zeta}")]
    InvalidSlater { n: u32, zeta: f64 },
    #[error("{xyz} atomic positions were given for {atoms} atoms")]
    MismatchedAtoms { xyz: usize, atoms: usize },
    #[error("grid shape {0:?} must be non-zero along every axis")]
    ZeroShape([usize; 3]),
    #[error("grid values of shape {values:?} do not match the grid shape {shape:?}")]
    MismatchedValues { values: [usize; 3], shape: [usize; 3] },
}
