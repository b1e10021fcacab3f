use crate::{Geometry, GeometryError, Lattice};
use nalgebra::{Matrix3, Vector3};
use ndarray::Array3;
use num_complex::Complex;

/// The boundary condition along one lattice vector of a `Grid`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// Amplitudes leaving one face re-enter through the opposite face
    Periodic,
    /// Amplitudes beyond the cell are discarded
    Open,
}

/// The amplitude array of a `Grid`, either real or complex valued
#[derive(Clone, Debug, PartialEq)]
pub enum GridValues {
    /// Real amplitudes
    Real(Array3<f64>),
    /// Complex amplitudes
    Complex(Array3<Complex<f64>>),
}

impl GridValues {
    /// Number of values along each axis
    pub fn shape(&self) -> [usize; 3] {
        let dim = match self {
            Self::Real(values) => values.dim(),
            Self::Complex(values) => values.dim(),
        };
        [dim.0, dim.1, dim.2]
    }

    /// Whether the values are complex
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    /// Sum of the squared modulus of all values
    pub fn sum_squared_modulus(&self) -> f64 {
        match self {
            Self::Real(values) => values.iter().map(|x| x * x).sum(),
            Self::Complex(values) => values.iter().map(|x| x.norm_sqr()).sum(),
        }
    }

    /// Reset every value to zero
    pub fn fill_zero(&mut self) {
        match self {
            Self::Real(values) => values.fill(0.),
            Self::Complex(values) => values.fill(Complex::new(0., 0.)),
        }
    }
}

/// A real-space grid spanning a `Lattice`
///
/// Value `[i, j, k]` sits at `origin + i * dcell[0] + j * dcell[1] + k * dcell[2]` where `dcell[a]` is the
/// lattice vector `a` divided by the number of points along that axis.
#[derive(Clone, Debug)]
pub struct Grid {
    lattice: Lattice,
    values: GridValues,
    boundary: [BoundaryCondition; 3],
    geometry: Option<Geometry>,
}

impl Grid {
    /// Number of grid points along each lattice vector
    pub fn shape(&self) -> [usize; 3] {
        self.values.shape()
    }

    /// The cell spanned by the grid
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Boundary conditions along each lattice vector
    pub fn boundary(&self) -> [BoundaryCondition; 3] {
        self.boundary
    }

    /// The amplitudes on the grid
    pub fn values(&self) -> &GridValues {
        &self.values
    }

    /// Mutable access to the amplitudes, writes accumulate into the existing values
    pub fn values_mut(&mut self) -> &mut GridValues {
        &mut self.values
    }

    /// Whether the grid holds complex amplitudes
    pub fn is_complex(&self) -> bool {
        self.values.is_complex()
    }

    /// The atoms attached to the grid, if any
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Attach a geometry, replacing any existing one
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = Some(geometry);
    }

    /// The voxel vectors, lattice vectors divided by the number of points along them (as rows)
    pub fn dcell(&self) -> Matrix3<f64> {
        let shape = self.shape();
        let mut dcell = *self.lattice.cell();
        for (axis, &n) in shape.iter().enumerate() {
            dcell.row_mut(axis).scale_mut(1. / n as f64);
        }
        dcell
    }

    /// Volume of a single voxel
    pub fn dvolume(&self) -> f64 {
        self.lattice.volume() / self.shape().iter().product::<usize>() as f64
    }

    /// Maps a Cartesian displacement from the grid origin onto fractional grid indices
    pub fn index_cell(&self) -> Matrix3<f64> {
        let shape = self.shape();
        let mut index_cell = self.lattice.icell();
        for (axis, &n) in shape.iter().enumerate() {
            index_cell.row_mut(axis).scale_mut(n as f64);
        }
        index_cell
    }

    /// Cartesian position of grid point `index`
    pub fn position(&self, index: [usize; 3]) -> Vector3<f64> {
        self.lattice.origin()
            + self.dcell().transpose()
                * Vector3::new(index[0] as f64, index[1] as f64, index[2] as f64)
    }

    /// The integral of the squared modulus of the values over the grid volume
    pub fn integrate_density(&self) -> f64 {
        self.values.sum_squared_modulus() * self.dvolume()
    }

    /// Reset every amplitude to zero, keeping the geometry
    pub fn fill_zero(&mut self) {
        self.values.fill_zero()
    }
}

/// Builder for a `Grid` from a shape and a `Lattice`
pub struct GridBuilder<Shape, Cell> {
    shape: Shape,
    lattice: Cell,
    complex: bool,
    boundary: [BoundaryCondition; 3],
    geometry: Option<Geometry>,
}

impl GridBuilder<(), ()> {
    /// An empty builder, grids are real and periodic unless configured otherwise
    pub fn new() -> Self {
        Self {
            shape: (),
            lattice: (),
            complex: false,
            boundary: [BoundaryCondition::Periodic; 3],
            geometry: None,
        }
    }
}

impl Default for GridBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Shape, Cell> GridBuilder<Shape, Cell> {
    /// Number of grid points along each lattice vector
    pub fn with_shape(self, shape: [usize; 3]) -> GridBuilder<[usize; 3], Cell> {
        GridBuilder {
            shape,
            lattice: self.lattice,
            complex: self.complex,
            boundary: self.boundary,
            geometry: self.geometry,
        }
    }

    /// The cell spanned by the grid
    pub fn with_lattice(self, lattice: Lattice) -> GridBuilder<Shape, Lattice> {
        GridBuilder {
            shape: self.shape,
            lattice,
            complex: self.complex,
            boundary: self.boundary,
            geometry: self.geometry,
        }
    }

    /// Allocate complex values, grids are real by default
    pub fn complex(mut self) -> Self {
        self.complex = true;
        self
    }

    /// Boundary conditions along each lattice vector, periodic by default
    pub fn with_boundary_conditions(mut self, boundary: [BoundaryCondition; 3]) -> Self {
        self.boundary = boundary;
        self
    }

    /// Attach a geometry to the grid
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

impl GridBuilder<[usize; 3], Lattice> {
    /// Allocate a zeroed grid
    pub fn build(self) -> Result<Grid, GeometryError> {
        if self.shape.iter().any(|&n| n == 0) {
            return Err(GeometryError::ZeroShape(self.shape));
        }
        let dim = (self.shape[0], self.shape[1], self.shape[2]);
        let values = if self.complex {
            GridValues::Complex(Array3::zeros(dim))
        } else {
            GridValues::Real(Array3::zeros(dim))
        };
        Ok(Grid {
            lattice: self.lattice,
            values,
            boundary: self.boundary,
            geometry: self.geometry,
        })
    }

    /// Build the grid around an existing value array, which must match the requested shape
    pub fn build_with_values(self, values: GridValues) -> Result<Grid, GeometryError> {
        if values.shape() != self.shape {
            return Err(GeometryError::MismatchedValues {
                values: values.shape(),
                shape: self.shape,
            });
        }
        Ok(Grid {
            lattice: self.lattice,
            values,
            boundary: self.boundary,
            geometry: self.geometry,
        })
    }
}
