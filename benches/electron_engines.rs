use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use electron_post::{
    electron::{pdos, velocity, wavefunction},
    geometry::{Atom, BoundaryCondition, Geometry, GridBuilder, Lattice, Orbital, RadialFunction},
    Distribution, Operator, Overlap, Spin,
};
use nalgebra::{DVector, Vector3};
use ndarray::Array1;
use num_complex::Complex;
use utilities::{random_eigenpairs, random_positive_definite, random_tridiagonal};

pub fn bench_pdos(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdos");
    let energies = Array1::linspace(-3., 3., 601);
    let distribution = Distribution::gaussian(0.05);

    for width in [16, 64, 256].into_iter() {
        let overlap = random_positive_definite(width);
        let (eigenvalues, states) = random_eigenpairs(&overlap, width);
        let overlap = Overlap::Explicit(Operator::Dense(overlap));
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| {
                pdos(
                    black_box(&energies),
                    black_box(&eigenvalues),
                    black_box(&states),
                    black_box(&overlap),
                    &distribution,
                    Some(Spin::Unpolarized),
                )
            })
        });
    }
    group.finish();
}

pub fn bench_velocity(c: &mut Criterion) {
    let mut group = c.benchmark_group("velocity");

    for width in [64, 256, 1024].into_iter() {
        let dhk = Operator::Sparse(random_tridiagonal(width));
        let (_, states) = random_eigenpairs(&nalgebra::DMatrix::identity(width, width), width);
        let degenerate = vec![vec![0, 1], vec![2, 3, 4]];
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| velocity(black_box(&states), black_box(&dhk), None, None, &degenerate))
        });
    }
    group.finish();
}

pub fn bench_wavefunction(c: &mut Criterion) {
    let mut group = c.benchmark_group("wavefunction");
    group.sample_size(10);

    let orbitals = vec![
        Orbital::new(0, 0, 3., RadialFunction::Slater { n: 1, zeta: 1.5 }).unwrap(),
        Orbital::new(1, -1, 3., RadialFunction::Slater { n: 2, zeta: 1.2 }).unwrap(),
        Orbital::new(1, 0, 3., RadialFunction::Slater { n: 2, zeta: 1.2 }).unwrap(),
        Orbital::new(1, 1, 3., RadialFunction::Slater { n: 2, zeta: 1.2 }).unwrap(),
    ];
    let lattice = Lattice::cuboid([8., 8., 8.]).unwrap();

    for atoms in [1, 8, 27].into_iter() {
        let side = (atoms as f64).cbrt().round() as usize;
        let xyz = (0..atoms)
            .map(|i| {
                let spacing = 8. / side as f64;
                Vector3::new(
                    spacing * ((i % side) as f64 + 0.5),
                    spacing * ((i / side % side) as f64 + 0.5),
                    spacing * ((i / (side * side)) as f64 + 0.5),
                )
            })
            .collect();
        let geometry = Geometry::new(
            lattice.clone(),
            xyz,
            vec![Atom::new("C", orbitals.clone()); atoms],
        )
        .unwrap();
        let coefficients = DVector::from_element(geometry.no(), Complex::new(0.5, 0.1));
        let mut grid = GridBuilder::new()
            .with_shape([48, 48, 48])
            .with_lattice(lattice.clone())
            .with_boundary_conditions([BoundaryCondition::Periodic; 3])
            .complex()
            .build()
            .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(atoms), &atoms, |b, _| {
            b.iter(|| {
                wavefunction(
                    black_box(&coefficients),
                    &mut grid,
                    Some(&geometry),
                    None,
                    0,
                    None,
                    &(),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pdos, bench_velocity, bench_wavefunction);
criterion_main!(benches);
