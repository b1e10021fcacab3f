use super::ProgressSink;
use crate::{constants::GAMMA_TOLERANCE, ElectronError, Spin};
use electron_geometry::{
    spherical_angles, AtomImage, BoundaryCondition, Geometry, Grid, GridValues, Orbital,
};
use nalgebra::{DVector, Matrix3, Scalar, Vector3};
use ndarray::{s, Array3};
use num_complex::Complex;
use num_traits::Zero;
use rayon::prelude::*;
use std::borrow::Cow;
use std::ops::AddAssign;
use tracing::{debug, info, instrument, warn};

/// Orbital expansion coefficients which can be projected onto a `Grid`
pub trait Coefficient: Scalar + Copy + Zero + AddAssign + Send + Sync {
    /// Whether the coefficient needs a complex valued grid
    const IS_COMPLEX: bool;

    /// The coefficient multiplied by a real basis function value
    fn scale(self, value: f64) -> Self;

    /// Add `block` into the grid values, its first element landing on `offset`
    fn accumulate(
        values: &mut GridValues,
        offset: [usize; 3],
        block: &Array3<Self>,
    ) -> Result<(), ElectronError>;
}

impl Coefficient for f64 {
    const IS_COMPLEX: bool = false;

    fn scale(self, value: f64) -> Self {
        self * value
    }

    fn accumulate(
        values: &mut GridValues,
        offset: [usize; 3],
        block: &Array3<Self>,
    ) -> Result<(), ElectronError> {
        let (ni, nj, nk) = block.dim();
        let [i, j, k] = offset;
        match values {
            GridValues::Real(grid) => {
                let mut view = grid.slice_mut(s![i..i + ni, j..j + nj, k..k + nk]);
                view += block;
            }
            GridValues::Complex(grid) => grid
                .slice_mut(s![i..i + ni, j..j + nj, k..k + nk])
                .zip_mut_with(block, |x, &y| *x += y),
        }
        Ok(())
    }
}

impl Coefficient for Complex<f64> {
    const IS_COMPLEX: bool = true;

    fn scale(self, value: f64) -> Self {
        self * value
    }

    fn accumulate(
        values: &mut GridValues,
        offset: [usize; 3],
        block: &Array3<Self>,
    ) -> Result<(), ElectronError> {
        let (ni, nj, nk) = block.dim();
        let [i, j, k] = offset;
        match values {
            GridValues::Complex(grid) => {
                let mut view = grid.slice_mut(s![i..i + ni, j..j + nj, k..k + nk]);
                view += block;
                Ok(())
            }
            GridValues::Real(_) => Err(ElectronError::TypeConflict),
        }
    }
}

/// Everything needed to evaluate the contribution of a single atom image
struct Projection<'a, C> {
    geometry: &'a Geometry,
    coefficients: &'a [C],
    index_cell: Matrix3<f64>,
    voxel: Matrix3<f64>,
    origin: Vector3<f64>,
    shape: [usize; 3],
}

impl<C: Coefficient> Projection<'_, C> {
    /// The amplitudes of one atom image on the grid points within its cutoff
    ///
    /// Returns the offset of the block in the grid, or `None` when the atom does not reach the grid.
    fn block(&self, image: &AtomImage) -> Option<([usize; 3], Array3<C>)> {
        let atom = self.geometry.atom(image.ia);
        let radius = atom.max_radius();
        if radius <= 0. {
            return None;
        }
        let relative = image.xyz - self.origin;
        let centre = self.index_cell * relative;

        // A sphere of radius R spans R |row_a| grid indices along axis a
        let mut lower = [0; 3];
        let mut upper = [0; 3];
        for axis in 0..3 {
            let reach = radius * self.index_cell.row(axis).norm();
            let first = (centre[axis] - reach).floor() as i64;
            let last = (centre[axis] + reach).ceil() as i64 + 1;
            let points = self.shape[axis] as i64;
            if first >= points || last <= 0 {
                return None;
            }
            lower[axis] = first.max(0) as usize;
            upper[axis] = last.min(points) as usize;
        }

        let first_orbital = self.geometry.a2o(image.ia);
        let orbitals = atom
            .orbitals()
            .iter()
            .enumerate()
            .filter(|(_, orbital)| orbital.radius() > 0.)
            .map(|(offset, orbital)| (first_orbital + offset, orbital))
            .collect::<Vec<(usize, &Orbital)>>();

        let mut block = Array3::from_elem(
            (
                upper[0] - lower[0],
                upper[1] - lower[1],
                upper[2] - lower[2],
            ),
            C::zero(),
        );
        for ((i, j, k), value) in block.indexed_iter_mut() {
            let index = Vector3::new(
                (lower[0] + i) as f64,
                (lower[1] + j) as f64,
                (lower[2] + k) as f64,
            );
            let r = self.voxel * index - relative;
            let distance = r.norm();
            if distance > radius {
                continue;
            }
            let (theta, cos_phi) = spherical_angles(&r, distance);
            for &(io, orbital) in &orbitals {
                let psi = orbital.psi_spherical(distance, theta, cos_phi);
                if psi != 0. {
                    *value += self.coefficients[io].scale(psi);
                }
            }
        }
        Some((lower, block))
    }
}

/// Project orbital expansion coefficients onto a real-space grid
///
/// The wavefunction `psi(r) = sum_i c_i phi_i(r - R_i)` is *added* to the values already in `grid`, so repeated
/// calls superimpose states. Callers wanting a single state must zero the grid first.
///
/// - `coefficients` hold one entry per orbital of `geometry`. Non-collinear coefficients (selected by `spin`, or
///   inferred when `spin` is `None` and there are two per orbital) are reduced to the `spinor` component.
/// - `geometry` defaults to the geometry attached to the grid. A grid without a geometry has one attached,
///   built from the atoms inside the grid cell.
/// - Only the Gamma point is supported, any other `k` is rejected.
/// - Complex coefficients need a complex valued grid.
///
/// Atoms are included together with every periodic image within their cutoff of the grid cell, along the axes
/// which are periodic in the grid or coupled to neighbouring cells in the geometry. The images are evaluated in
/// parallel into partial blocks which are then summed into the grid.
#[instrument(skip_all, fields(coefficients = coefficients.len(), spinor))]
pub fn wavefunction<C, P>(
    coefficients: &DVector<C>,
    grid: &mut Grid,
    geometry: Option<&Geometry>,
    k: Option<[f64; 3]>,
    spinor: usize,
    spin: Option<Spin>,
    progress: &P,
) -> Result<(), ElectronError>
where
    C: Coefficient,
    P: ProgressSink + ?Sized,
{
    if spinor > 1 {
        return Err(ElectronError::InvalidSpinor(spinor));
    }
    let geometry = match geometry {
        Some(geometry) => Cow::Borrowed(geometry),
        None => {
            warn!("no geometry was passed, using the geometry attached to the grid");
            Cow::Owned(grid.geometry().cloned().ok_or(ElectronError::MissingGeometry)?)
        }
    };

    let orbitals = geometry.no();
    let select = |coefficients: &DVector<C>| {
        coefficients
            .iter()
            .skip(spinor)
            .step_by(2)
            .copied()
            .collect::<Vec<_>>()
    };
    let coefficients = match spin {
        Some(spin) if spin.is_noncollinear() => select(coefficients),
        None if orbitals > 0 && coefficients.len() == 2 * orbitals => {
            info!("two coefficients per orbital, treating them as non-collinear spinors");
            select(coefficients)
        }
        _ => coefficients.iter().copied().collect(),
    };
    if coefficients.len() != orbitals {
        return Err(ElectronError::InconsistentDimensions(format!(
            "{} coefficients were passed for a geometry with {} orbitals",
            coefficients.len(),
            orbitals
        )));
    }

    if let Some(k) = k {
        if k.iter().map(|x| x * x).sum::<f64>().sqrt() > GAMMA_TOLERANCE {
            return Err(ElectronError::UnsupportedKPoint(k));
        }
    }
    if C::IS_COMPLEX && !grid.is_complex() {
        return Err(ElectronError::TypeConflict);
    }

    for atom in geometry.atoms() {
        if atom.max_radius() <= 0. {
            warn!(atom = atom.symbol(), "atom has no orbital with a real-space extent, skipping");
        } else if atom.orbitals().iter().any(|orbital| orbital.radius() <= 0.) {
            warn!(atom = atom.symbol(), "skipping orbitals without a real-space extent");
        }
    }

    let boundary = grid.boundary();
    let nsc = geometry.lattice().nsc();
    let periodic = [0, 1, 2].map(|axis| boundary[axis] == BoundaryCondition::Periodic || nsc[axis] > 1);

    if grid.geometry().is_none() {
        let images = geometry.within_inf(grid.lattice(), periodic);
        if !images.is_empty() {
            debug!(atoms = images.len(), "attaching a geometry to the grid");
            let attached = geometry.from_images(&images, grid.lattice().clone())?;
            grid.set_geometry(attached);
        }
    }

    // Every image whose cutoff sphere can reach into the grid cell
    let search = grid.lattice().padded_cuboid(geometry.max_radius());
    let images = geometry.within_inf(&search, periodic);

    let projection = Projection {
        geometry: &geometry,
        coefficients: &coefficients,
        index_cell: grid.index_cell(),
        voxel: grid.dcell().transpose(),
        origin: *grid.lattice().origin(),
        shape: grid.shape(),
    };

    progress.start(images.len());
    let blocks = images
        .par_iter()
        .filter_map(|image| {
            let block = projection.block(image);
            progress.advance(1);
            block
        })
        .collect::<Vec<_>>();
    for (offset, block) in &blocks {
        C::accumulate(grid.values_mut(), *offset, block)?;
    }
    progress.finish();
    debug!(images = images.len(), blocks = blocks.len(), "wavefunction accumulated");

    Ok(())
}
