//! Integration tests for restart files.
//!
//! These tests verify:
//! - A saved run reloads bit for bit into a fresh solver
//! - Continuing from the restart reproduces the uninterrupted run exactly
//! - Restarts from another grid are rejected without touching the state

use baro_rs::{
    BarotropicConfig, BarotropicError, BarotropicSolver, BoundaryForcing, FieldId, Grid2D,
    NoExchange,
};
use tempfile::tempdir;

fn config() -> BarotropicConfig {
    BarotropicConfig::new(4.0, 10)
        .with_advection(true)
        .with_lateral_diffusion(true)
}

fn spun_up_solver() -> BarotropicSolver {
    let grid = Grid2D::closed_basin(20, 12, 1, 300.0, 300.0, 12.0).unwrap();
    let mut solver = BarotropicSolver::new(grid, config(), BoundaryForcing::closed()).unwrap();
    solver.set_initial_elevation(|x, y| {
        let r = ((x - 3000.0).powi(2) + (y - 1800.0).powi(2)).sqrt();
        0.1 * r / 3000.0
    });
    for _ in 0..2 {
        solver.run_long_step(&mut NoExchange).unwrap();
    }
    solver
}

fn fresh_solver() -> BarotropicSolver {
    let grid = Grid2D::closed_basin(20, 12, 1, 300.0, 300.0, 12.0).unwrap();
    BarotropicSolver::new(grid, config(), BoundaryForcing::closed()).unwrap()
}

fn assert_bitwise_equal(a: &BarotropicSolver, b: &BarotropicSolver) {
    for id in FieldId::ALL {
        let (fa, fb) = (a.state().field(id), b.state().field(id));
        let same = fa
            .as_slice()
            .iter()
            .zip(fb.as_slice())
            .all(|(x, y)| x.to_bits() == y.to_bits());
        assert!(same, "field {} differs after restart", id.name());
    }
}

/// Save and reload: fields, boundary arrays and clock are identical.
#[test]
fn test_restart_round_trip_is_bit_identical() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("baro.restart");

    let original = spun_up_solver();
    original.save_restart(&path).unwrap();

    let mut restored = fresh_solver();
    restored.load_restart(&path).unwrap();

    assert_eq!(restored.step_count(), original.step_count());
    assert_eq!(restored.time().to_bits(), original.time().to_bits());
    assert_bitwise_equal(&original, &restored);
    assert_eq!(
        restored.state().boundary_arrays(),
        original.state().boundary_arrays()
    );
}

/// Continuing from a restart at a long-step boundary gives the same answer
/// as never stopping.
#[test]
fn test_continued_run_matches_uninterrupted_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("baro.restart");

    let mut original = spun_up_solver();
    original.save_restart(&path).unwrap();
    let mut restored = fresh_solver();
    restored.load_restart(&path).unwrap();

    for _ in 0..2 {
        original.run_long_step(&mut NoExchange).unwrap();
        restored.run_long_step(&mut NoExchange).unwrap();
    }
    assert_eq!(restored.step_count(), 40);
    assert_bitwise_equal(&original, &restored);
}

/// A restart written on another grid is refused and the state is kept.
#[test]
fn test_restart_from_other_grid_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.restart");

    let small = Grid2D::closed_basin(8, 8, 1, 300.0, 300.0, 12.0).unwrap();
    let other = BarotropicSolver::new(small, config(), BoundaryForcing::closed()).unwrap();
    other.save_restart(&path).unwrap();

    let mut solver = spun_up_solver();
    let z_before = solver.state().elevation().z.clone();
    let err = solver.load_restart(&path).unwrap_err();

    assert!(matches!(err, BarotropicError::Restart(_)), "got {}", err);
    assert_eq!(solver.state().elevation().z, z_before);
    assert_eq!(solver.step_count(), 20);
}
