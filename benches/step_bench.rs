//! Benchmarks for the barotropic short step.
//!
//! Run with: `cargo bench --bench step_bench`
//!
//! Benchmarks single short steps, full long steps and diagnostics on closed
//! basins of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use baro_rs::{
    BarotropicConfig, BarotropicDiagnostics, BarotropicSolver, BoundaryForcing,
    CoriolisParameter, Grid2D, NoExchange, WaveBreakingConfig,
};

/// Seiche in a closed basin, 10 m deep with 200 m cells.
fn setup_solver(n: usize, config: BarotropicConfig) -> BarotropicSolver {
    let grid = Grid2D::closed_basin(n, n, 1, 200.0, 200.0, 10.0).unwrap();
    let mut solver = BarotropicSolver::new(grid, config, BoundaryForcing::closed()).unwrap();
    let length = n as f64 * 200.0;
    solver.set_initial_elevation(|x, _| 0.1 * (std::f64::consts::PI * x / length).cos());
    solver
}

fn full_physics() -> BarotropicConfig {
    BarotropicConfig::new(5.0, 20)
        .with_advection(true)
        .with_lateral_diffusion(true)
        .with_coriolis(CoriolisParameter::f_plane(1.2e-4))
}

/// Benchmark one short step with and without the optional terms.
fn bench_short_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("short_step");

    for n in [32, 64, 128] {
        let n_cells = n * n;
        let mut linear = setup_solver(n, BarotropicConfig::new(5.0, 20));
        group.bench_with_input(
            BenchmarkId::new("linear", format!("{}_cells", n_cells)),
            &n_cells,
            |b, _| {
                b.iter(|| linear.step(black_box(&mut NoExchange)).unwrap());
            },
        );

        let mut full = setup_solver(n, full_physics());
        group.bench_with_input(
            BenchmarkId::new("full_physics", format!("{}_cells", n_cells)),
            &n_cells,
            |b, _| {
                b.iter(|| full.step(black_box(&mut NoExchange)).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark a complete long step (mode_split short steps plus averaging).
fn bench_long_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_step");
    group.sample_size(20);

    for n in [32, 64] {
        let n_cells = n * n;
        let mut solver = setup_solver(n, full_physics());
        group.bench_with_input(
            BenchmarkId::new("mode_split_20", format!("{}_cells", n_cells)),
            &n_cells,
            |b, _| {
                b.iter(|| {
                    let out = solver.run_long_step(&mut NoExchange).unwrap();
                    black_box(out.u_int.max_abs())
                });
            },
        );

        let breaking = full_physics().with_breaking(WaveBreakingConfig::default());
        let mut solver = setup_solver(n, breaking);
        group.bench_with_input(
            BenchmarkId::new("with_breaking", format!("{}_cells", n_cells)),
            &n_cells,
            |b, _| {
                b.iter(|| {
                    let out = solver.run_long_step(&mut NoExchange).unwrap();
                    black_box(out.u_int.max_abs())
                });
            },
        );
    }

    group.finish();
}

/// Benchmark diagnostics computation.
fn bench_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics");

    for n in [32, 64, 128] {
        let n_cells = n * n;
        let mut solver = setup_solver(n, BarotropicConfig::new(5.0, 20));
        solver.run_long_step(&mut NoExchange).unwrap();

        group.bench_with_input(
            BenchmarkId::new("compute", format!("{}_cells", n_cells)),
            &n_cells,
            |b, _| {
                b.iter(|| {
                    BarotropicDiagnostics::compute(
                        black_box(solver.grid()),
                        black_box(solver.state()),
                        black_box(solver.config()),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_short_step, bench_long_step, bench_diagnostics);
criterion_main!(benches);
