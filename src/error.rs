use electron_geometry::GeometryError;
use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised by the post-processing engines and the state layer
///
/// All variants describe malformed input, none of them are transient.
pub enum ElectronError {
    /// A distribution was requested by a name with no registered kernel
    #[error("unknown distribution `{0}`, expected `gaussian` or `lorentzian`")]
    UnknownDistribution(String),
    /// The overlap matrix fits neither the orbital count nor the full spinor width
    #[error("an overlap with {columns} columns cannot act on {orbitals} orbitals")]
    InvalidOverlapShape {
        /// Columns in the overlap matrix
        columns: usize,
        /// Orbitals the overlap was expected to act on
        orbitals: usize,
    },
    /// A derivative operator holds neither one nor three components per orbital
    #[error("a derivative operator of shape {rows}x{columns} cannot act on states of width {width}")]
    UnsupportedShape {
        /// Rows in the derivative operator
        rows: usize,
        /// Columns in the derivative operator
        columns: usize,
        /// Number of coefficients in each state
        width: usize,
    },
    /// Wavefunctions are only implemented at the Gamma point
    #[error("wavefunctions can only be projected at the Gamma point, got k = {0:?}")]
    UnsupportedKPoint([f64; 3]),
    /// Complex coefficients were projected onto a real grid
    #[error("complex coefficients cannot be accumulated into a real valued grid")]
    TypeConflict,
    /// The parent of a state cannot provide the operators a calculation needs
    #[error("{0}")]
    MissingSpinContext(String),
    /// Array dimensions disagree with one another
    #[error("{0}")]
    InconsistentDimensions(String),
    /// Velocities in a non-orthogonal basis need the state energies
    #[error("energies are required to compute velocities in a non-orthogonal basis")]
    MissingEnergy,
    /// A wavefunction was requested without a geometry
    #[error("no geometry was passed and the grid carries none")]
    MissingGeometry,
    /// Spinor components are indexed by 0 (up) or 1 (down)
    #[error("the spinor index must be 0 or 1, got {0}")]
    InvalidSpinor(usize),
    /// A dense eigendecomposition or factorisation failed
    #[error("{0}")]
    Eigensolver(String),
    /// Errors from the geometry and grid containers
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// Errors in sparse matrix assembly
    #[error("sparse assembly failed: {0}")]
    SparseFormat(String),
}
