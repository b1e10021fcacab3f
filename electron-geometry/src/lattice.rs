use crate::GeometryError;
use nalgebra::{Matrix3, Vector3};

/// Fractional coordinates this close below zero still count as inside a cell
const FRACTIONAL_TOLERANCE: f64 = 1e-8;

/// A periodic cell, stored as three lattice vectors in the rows of `cell`
///
/// `nsc` holds the number of periodic images along each lattice vector which couple to the home cell
/// (always odd, `1` meaning the axis is not periodic for the attached operators).
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    cell: Matrix3<f64>,
    origin: Vector3<f64>,
    nsc: [usize; 3],
}

impl Lattice {
    /// Construct a lattice from the matrix of row lattice vectors
    pub fn new(cell: Matrix3<f64>) -> Result<Self, GeometryError> {
        let volume = cell.determinant();
        if volume.abs() < f64::EPSILON {
            return Err(GeometryError::SingularCell(volume));
        }
        Ok(Self {
            cell,
            origin: Vector3::zeros(),
            nsc: [1, 1, 1],
        })
    }

    /// Construct a lattice from three lattice vectors
    pub fn from_vectors(vectors: [[f64; 3]; 3]) -> Result<Self, GeometryError> {
        Self::new(Matrix3::from_fn(|i, j| vectors[i][j]))
    }

    /// An orthorhombic cell with the given side lengths
    pub fn cuboid(lengths: [f64; 3]) -> Result<Self, GeometryError> {
        Self::new(Matrix3::from_diagonal(&Vector3::from(lengths)))
    }

    /// Shift the cell so that it starts at `origin`
    pub fn with_origin(mut self, origin: Vector3<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Set the number of coupled periodic images along each lattice vector, each count must be odd
    pub fn with_nsc(mut self, nsc: [usize; 3]) -> Result<Self, GeometryError> {
        if nsc.iter().any(|n| n % 2 == 0) {
            return Err(GeometryError::EvenSupercell(nsc));
        }
        self.nsc = nsc;
        Ok(self)
    }

    /// The lattice vectors as the rows of a matrix
    pub fn cell(&self) -> &Matrix3<f64> {
        &self.cell
    }

    /// Cartesian position of the cell corner
    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }

    /// Number of coupled periodic images along each lattice vector
    pub fn nsc(&self) -> [usize; 3] {
        self.nsc
    }

    /// The lattice vector along `axis`
    pub fn vector(&self, axis: usize) -> Vector3<f64> {
        self.cell.row(axis).transpose()
    }

    /// Volume of the cell, always positive
    pub fn volume(&self) -> f64 {
        self.cell.determinant().abs()
    }

    /// The inverse cell, whose rows `b_i` satisfy `b_i . a_j = delta_ij`
    pub fn icell(&self) -> Matrix3<f64> {
        // The determinant was checked on construction
        self.cell
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix3::zeros)
    }

    /// The reciprocal cell, `2 pi` times the inverse cell
    pub fn rcell(&self) -> Matrix3<f64> {
        self.icell() * std::f64::consts::TAU
    }

    /// Fractional coordinates of a Cartesian point, measured from the lattice origin
    pub fn fractional(&self, xyz: &Vector3<f64>) -> Vector3<f64> {
        self.icell() * (xyz - self.origin)
    }

    /// The Cartesian displacement of the supercell image `isc`
    pub fn offset(&self, isc: [i32; 3]) -> Vector3<f64> {
        self.cell.transpose() * Vector3::new(isc[0] as f64, isc[1] as f64, isc[2] as f64)
    }

    /// The eight corners of the cell in Cartesian coordinates
    pub fn corners(&self) -> [Vector3<f64>; 8] {
        let mut corners = [self.origin; 8];
        for (index, corner) in corners.iter_mut().enumerate() {
            let isc = [(index & 1) as i32, ((index >> 1) & 1) as i32, ((index >> 2) & 1) as i32];
            *corner += self.offset(isc);
        }
        corners
    }

    /// The smallest axis-aligned cell enclosing this one
    pub fn to_cuboid(&self) -> Self {
        let corners = self.corners();
        let (minimum, maximum) = corners.iter().skip(1).fold(
            (corners[0], corners[0]),
            |(minimum, maximum), corner| (minimum.inf(corner), maximum.sup(corner)),
        );
        Self {
            cell: Matrix3::from_diagonal(&(maximum - minimum)),
            origin: minimum,
            nsc: self.nsc,
        }
    }

    /// The enclosing cuboid grown by `padding` on every face
    pub fn padded_cuboid(&self, padding: f64) -> Self {
        let cuboid = self.to_cuboid();
        Self {
            cell: cuboid.cell + Matrix3::from_diagonal_element(2. * padding),
            origin: cuboid.origin - Vector3::repeat(padding),
            nsc: self.nsc,
        }
    }

    /// Whether the Cartesian point lies inside the cell, lower faces included and upper faces excluded
    pub fn contains(&self, xyz: &Vector3<f64>) -> bool {
        self.fractional(xyz)
            .iter()
            .all(|&f| f >= -FRACTIONAL_TOLERANCE && f < 1. - FRACTIONAL_TOLERANCE)
    }
}
