//! Integration tests for open-boundary elevation forcing.
//!
//! These tests verify:
//! - Linear interpolation of the boundary series inside the solver loop
//! - OutOfDomain once the clock passes the end of the series
//! - Holding the end records when extrapolation is allowed
//! - Configuration errors for missing or misplaced series

use baro_rs::types::Side;
use baro_rs::{
    BarotropicConfig, BarotropicError, BarotropicSolver, BoundaryForcing, ElevationSeries,
    ExtrapolationPolicy, Grid2D, NoExchange,
};

fn channel() -> Grid2D {
    Grid2D::channel(20, 4, 1, 100.0, 100.0, 5.0).unwrap()
}

fn tidal_forcing() -> BoundaryForcing {
    BoundaryForcing::closed()
        .with_series(
            Side::West,
            ElevationSeries::uniform(&[0.0, 10.0], &[1.0, 2.0], 4).unwrap(),
        )
        .with_series(
            Side::East,
            ElevationSeries::uniform(&[0.0, 10.0], &[0.0, 0.0], 4).unwrap(),
        )
}

/// Half way through the series the boundary cells hold the mean elevation.
#[test]
fn test_boundary_elevation_interpolated() {
    let mut solver =
        BarotropicSolver::new(channel(), BarotropicConfig::new(1.0, 5), tidal_forcing()).unwrap();

    for _ in 0..5 {
        solver.step(&mut NoExchange).unwrap();
    }
    assert!((solver.time() - 5.0).abs() < 1e-12);

    let state = solver.state();
    for &value in state.boundary_array(Side::West) {
        assert!((value - 1.5).abs() < 1e-12, "west boundary {} != 1.5", value);
    }
    for j in 0..4 {
        assert!((state.elevation().z.get(0, j) - 1.5).abs() < 1e-12);
        assert!((state.depth().d.get(0, j) - 6.5).abs() < 1e-12);
        assert_eq!(state.elevation().z.get(19, j), 0.0);
    }
    // Water flows in from the raised west end
    assert!(state.transport().u.get(0, 1) > 0.0);
}

/// Without extrapolation the run stops at the end of the series.
#[test]
fn test_series_end_is_out_of_domain() {
    let mut solver =
        BarotropicSolver::new(channel(), BarotropicConfig::new(1.0, 5), tidal_forcing()).unwrap();
    for _ in 0..10 {
        solver.step(&mut NoExchange).unwrap();
    }

    let err = solver.step(&mut NoExchange).unwrap_err();
    match err {
        BarotropicError::OutOfDomain { time, end, .. } => {
            assert!((time - 11.0).abs() < 1e-12);
            assert_eq!(end, 10.0);
        }
        other => panic!("expected OutOfDomain, got {}", other),
    }
    // The failed step did not advance the clock
    assert_eq!(solver.step_count(), 10);
    assert!((solver.time() - 10.0).abs() < 1e-12);
}

/// With HoldEnds the last record keeps forcing the boundary.
#[test]
fn test_hold_ends_past_series() {
    let forcing = tidal_forcing().with_extrapolation(ExtrapolationPolicy::HoldEnds);
    let mut solver =
        BarotropicSolver::new(channel(), BarotropicConfig::new(1.0, 5), forcing).unwrap();

    for _ in 0..3 {
        solver.run_long_step(&mut NoExchange).unwrap();
    }
    assert_eq!(solver.step_count(), 15);
    for &value in solver.state().boundary_array(Side::West) {
        assert_eq!(value, 2.0);
    }
    assert!(solver.diagnostics().is_finite());
}

/// Open sides need a series, closed sides must not have one.
#[test]
fn test_forcing_configuration_errors() {
    let config = BarotropicConfig::new(1.0, 5);
    let west_only = BoundaryForcing::closed().with_series(
        Side::West,
        ElevationSeries::uniform(&[0.0, 10.0], &[1.0, 2.0], 4).unwrap(),
    );
    let err = BarotropicSolver::new(channel(), config.clone(), west_only).unwrap_err();
    assert!(matches!(
        err,
        BarotropicError::MissingBoundarySeries { side: Side::East }
    ));

    let closed = Grid2D::flat(20, 4, 1, 100.0, 100.0, 5.0).unwrap();
    let err = BarotropicSolver::new(closed, config, tidal_forcing()).unwrap_err();
    assert!(err.is_configuration(), "unexpected error: {}", err);
}
