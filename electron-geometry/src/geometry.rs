use crate::{Atom, GeometryError, Lattice};
use itertools::iproduct;
use nalgebra::Vector3;

/// A periodic image of an atom: the atom index, its Cartesian position and the supercell it sits in
#[derive(Clone, Debug, PartialEq)]
pub struct AtomImage {
    pub ia: usize,
    pub xyz: Vector3<f64>,
    pub isc: [i32; 3],
}

/// Atoms placed in a periodic `Lattice`
///
/// Orbitals are numbered consecutively atom by atom, so the orbitals of atom `ia` occupy
/// `a2o(ia)..a2o(ia) + atom(ia).no()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    lattice: Lattice,
    xyz: Vec<Vector3<f64>>,
    atoms: Vec<Atom>,
    first_orbital: Vec<usize>,
}

impl Geometry {
    /// Place `atoms` at the Cartesian positions `xyz` inside `lattice`
    pub fn new(
        lattice: Lattice,
        xyz: Vec<Vector3<f64>>,
        atoms: Vec<Atom>,
    ) -> Result<Self, GeometryError> {
        if xyz.len() != atoms.len() {
            return Err(GeometryError::MismatchedAtoms {
                xyz: xyz.len(),
                atoms: atoms.len(),
            });
        }
        let first_orbital = atoms
            .iter()
            .scan(0, |count, atom| {
                let first = *count;
                *count += atom.no();
                Some(first)
            })
            .collect();
        Ok(Self {
            lattice,
            xyz,
            atoms,
            first_orbital,
        })
    }

    /// The periodic cell of the geometry
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Number of atoms
    pub fn na(&self) -> usize {
        self.atoms.len()
    }

    /// Number of orbitals
    pub fn no(&self) -> usize {
        self.atoms.iter().map(Atom::no).sum()
    }

    /// Atom `ia`
    pub fn atom(&self, ia: usize) -> &Atom {
        &self.atoms[ia]
    }

    /// All atoms, in the order of their positions
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Cartesian position of atom `ia`
    pub fn xyz(&self, ia: usize) -> &Vector3<f64> {
        &self.xyz[ia]
    }

    /// Index of the first orbital on atom `ia`
    pub fn a2o(&self, ia: usize) -> usize {
        self.first_orbital[ia]
    }

    /// Position of orbital `io`, which is the position of the atom it is centred on
    pub fn orbital_xyz(&self, io: usize) -> &Vector3<f64> {
        let ia = self.first_orbital.partition_point(|&first| first <= io) - 1;
        &self.xyz[ia]
    }

    /// The largest orbital cutoff in the geometry
    pub fn max_radius(&self) -> f64 {
        self.atoms.iter().map(Atom::max_radius).fold(0., f64::max)
    }

    /// Find every periodic image of every atom which lies inside `target`
    ///
    /// Images are only generated along axes flagged in `periodic`, along the remaining axes only the
    /// home cell is considered.
    pub fn within_inf(&self, target: &Lattice, periodic: [bool; 3]) -> Vec<AtomImage> {
        let corners = target
            .corners()
            .map(|corner| self.lattice.fractional(&corner));
        let mut images = Vec::new();
        for (ia, xyz) in self.xyz.iter().enumerate() {
            let fractional = self.lattice.fractional(xyz);
            let ranges: Vec<(i32, i32)> = (0..3)
                .map(|axis| {
                    if !periodic[axis] {
                        return (0, 0);
                    }
                    let (lower, upper) = corners.iter().fold(
                        (f64::INFINITY, f64::NEG_INFINITY),
                        |(lower, upper), corner| (lower.min(corner[axis]), upper.max(corner[axis])),
                    );
                    (
                        (lower - fractional[axis]).floor() as i32,
                        (upper - fractional[axis]).ceil() as i32,
                    )
                })
                .collect();
            for (i, j, k) in iproduct!(
                ranges[0].0..=ranges[0].1,
                ranges[1].0..=ranges[1].1,
                ranges[2].0..=ranges[2].1
            ) {
                let isc = [i, j, k];
                let image = xyz + self.lattice.offset(isc);
                if target.contains(&image) {
                    images.push(AtomImage {
                        ia,
                        xyz: image,
                        isc,
                    });
                }
            }
        }
        images
    }

    /// A new geometry holding the given atom images in `lattice`
    pub fn from_images(&self, images: &[AtomImage], lattice: Lattice) -> Result<Self, GeometryError> {
        Self::new(
            lattice,
            images.iter().map(|image| image.xyz).collect(),
            images
                .iter()
                .map(|image| self.atoms[image.ia].clone())
                .collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::Geometry;
    use crate::{Atom, Lattice, Orbital, RadialFunction};
    use nalgebra::Vector3;

    fn hydrogen() -> Atom {
        Atom::new(
            "H",
            vec![Orbital::new(0, 0, 1.5, RadialFunction::Slater { n: 1, zeta: 1. }).unwrap()],
        )
    }

    fn chain() -> Geometry {
        let lattice = Lattice::cuboid([2., 10., 10.]).unwrap();
        Geometry::new(
            lattice,
            vec![Vector3::new(0., 5., 5.), Vector3::new(1., 5., 5.)],
            vec![hydrogen(), hydrogen()],
        )
        .unwrap()
    }

    #[test]
    fn orbitals_are_numbered_atom_by_atom() {
        let carbon = Atom::new(
            "C",
            (0..4)
                .map(|m| {
                    let (l, m) = if m == 0 { (0, 0) } else { (1, m - 2) };
                    Orbital::new(l, m, 2., RadialFunction::Slater { n: 2, zeta: 1.6 }).unwrap()
                })
                .collect(),
        );
        let geometry = Geometry::new(
            Lattice::cuboid([5., 5., 5.]).unwrap(),
            vec![Vector3::zeros(), Vector3::new(1., 0., 0.), Vector3::new(2., 0., 0.)],
            vec![hydrogen(), carbon, hydrogen()],
        )
        .unwrap();
        assert_eq!(geometry.no(), 6);
        assert_eq!(geometry.a2o(2), 5);
        assert_eq!(geometry.orbital_xyz(3), &Vector3::new(1., 0., 0.));
        assert_eq!(geometry.orbital_xyz(5), &Vector3::new(2., 0., 0.));
        assert!((geometry.max_radius() - 2.).abs() < f64::EPSILON);
    }

    #[test]
    fn mismatched_positions_are_rejected() {
        let lattice = Lattice::cuboid([2., 10., 10.]).unwrap();
        assert!(Geometry::new(lattice, vec![Vector3::zeros()], vec![]).is_err());
    }

    #[test]
    fn periodic_images_are_found_in_an_extended_cell() {
        let geometry = chain();
        let target = Lattice::cuboid([2., 10., 10.])
            .unwrap()
            .padded_cuboid(1.5);
        let images = geometry.within_inf(&target, [true, false, false]);
        // Atom 0 at x = 0, 2 and atom 1 at x = -1, 1, 3
        assert_eq!(images.len(), 5);
        assert!(images
            .iter()
            .any(|image| image.ia == 1 && image.isc == [-1, 0, 0]));
        assert!(images
            .iter()
            .any(|image| image.ia == 0 && image.isc == [1, 0, 0]));
    }

    #[test]
    fn non_periodic_axes_only_hold_the_home_cell() {
        let geometry = chain();
        let target = Lattice::cuboid([2., 10., 10.])
            .unwrap()
            .padded_cuboid(1.5);
        let images = geometry.within_inf(&target, [false; 3]);
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|image| image.isc == [0, 0, 0]));
    }
}
