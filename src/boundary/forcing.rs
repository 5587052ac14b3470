//! Elevation forcing of the open-boundary cells.

use tracing::debug;

use crate::boundary::series::{ElevationSeries, ExtrapolationPolicy};
use crate::error::{BarotropicError, Result};
use crate::grid::Grid2D;
use crate::state::{BoundaryArrays, Field2D};
use crate::types::{Side, SideBoundaries};

/// Per-side elevation series and the rules to apply them.
///
/// Sides are applied in west, north, east, south order; a corner cell open on
/// two sides takes the value of the later side.
///
/// # Example
///
/// ```
/// use baro_rs::boundary::{BoundaryForcing, ElevationSeries};
/// use baro_rs::grid::Grid2D;
/// use baro_rs::types::Side;
///
/// let grid = Grid2D::flat(10, 4, 1, 100.0, 100.0, 5.0)
///     .unwrap()
///     .with_open_side(Side::West);
/// let tide = ElevationSeries::uniform(&[0.0, 3600.0], &[0.0, 0.5], 4).unwrap();
/// let forcing = BoundaryForcing::closed()
///     .with_series(Side::West, tide)
///     .with_ramp_up(600.0);
/// assert!(forcing.validate(&grid).is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryForcing {
    series: SideBoundaries<Option<ElevationSeries>>,
    policy: ExtrapolationPolicy,
    ramp_duration: Option<f64>,
}

impl BoundaryForcing {
    /// No forcing: suitable for grids without open boundaries.
    pub fn closed() -> Self {
        Self::default()
    }

    /// Attach a series to one side.
    pub fn with_series(mut self, side: Side, series: ElevationSeries) -> Self {
        self.series[side] = Some(series);
        self
    }

    /// Set how times outside the series are handled.
    pub fn with_extrapolation(mut self, policy: ExtrapolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable smooth ramp-up of the forced elevation.
    ///
    /// The prescribed elevation is scaled from 0 at t = 0 to full amplitude at
    /// `duration`, with Hermite smoothing.
    pub fn with_ramp_up(mut self, duration: f64) -> Self {
        self.ramp_duration = Some(duration);
        self
    }

    /// Series of one side, if any.
    pub fn series(&self, side: Side) -> Option<&ElevationSeries> {
        self.series[side].as_ref()
    }

    /// Extrapolation policy.
    pub fn policy(&self) -> ExtrapolationPolicy {
        self.policy
    }

    /// Ramp factor at time t: 0 at t=0, 1 after the ramp-up duration.
    pub fn ramp_factor(&self, t: f64) -> f64 {
        match self.ramp_duration {
            None => 1.0,
            Some(duration) if duration <= 0.0 => 1.0,
            Some(duration) => {
                if t <= 0.0 {
                    0.0
                } else if t >= duration {
                    1.0
                } else {
                    let tau = t / duration;
                    tau * tau * (3.0 - 2.0 * tau)
                }
            }
        }
    }

    /// Check the series against the open sides of the grid.
    ///
    /// # Errors
    /// - `MissingBoundarySeries` if an open side has no series
    /// - `InvalidConfig` if a closed side has one
    /// - `ShapeMismatch` if a series has the wrong number of points
    /// - `InvalidConfig` if the ramp-up duration is negative or not finite
    pub fn validate(&self, grid: &Grid2D) -> Result<()> {
        let open = grid.open_sides();
        for (side, series) in self.series.iter() {
            match (open[side], series) {
                (true, None) => return Err(BarotropicError::MissingBoundarySeries { side }),
                (false, Some(_)) => {
                    return Err(BarotropicError::InvalidConfig(format!(
                        "elevation series given for closed {} side",
                        side
                    )));
                }
                (true, Some(series)) => {
                    let expected = grid.boundary_len(side);
                    if series.n_points() != expected {
                        return Err(BarotropicError::length_mismatch(
                            side.bdy_name(),
                            expected,
                            series.n_points(),
                        ));
                    }
                }
                (false, None) => {}
            }
        }
        if let Some(duration) = self.ramp_duration {
            if !(duration.is_finite() && duration >= 0.0) {
                return Err(BarotropicError::InvalidConfig(format!(
                    "ramp-up duration must be finite and non-negative, got {}",
                    duration
                )));
            }
        }
        Ok(())
    }

    /// Prescribed elevation profile of one side at time t.
    pub fn elevation_at(&self, side: Side, t: f64, out: &mut [f64]) -> Result<()> {
        let Some(series) = &self.series[side] else {
            return Err(BarotropicError::MissingBoundarySeries { side });
        };
        series
            .interpolate_into(t, self.policy, out)
            .map_err(|e| e.on(side))?;
        let ramp = self.ramp_factor(t);
        if ramp < 1.0 {
            out.iter_mut().for_each(|v| *v *= ramp);
        }
        Ok(())
    }

    /// Fill the boundary arrays for time t and impose them on the elevation
    /// and depth of open-boundary cells.
    ///
    /// Forced elevations are lifted where they would leave less than `d_min`
    /// of water. Every side is interpolated before anything is written, so on
    /// error `bdy`, `z` and `d` are left untouched.
    pub fn apply(
        &self,
        grid: &Grid2D,
        t: f64,
        d_min: f64,
        bdy: &mut BoundaryArrays,
        z: &mut Field2D,
        d: &mut Field2D,
    ) -> Result<()> {
        let mut profiles: SideBoundaries<Option<Vec<f64>>> = SideBoundaries::default();
        for side in Side::ALL {
            if self.series[side].is_some() {
                let mut profile = vec![0.0; bdy[side].len()];
                self.elevation_at(side, t, &mut profile)?;
                profiles[side] = Some(profile);
            }
        }

        for side in Side::ALL {
            let Some(profile) = profiles[side].take() else {
                continue;
            };
            for (k, &value) in profile.iter().enumerate() {
                let (i, j) = grid.boundary_cell(side, k);
                if !grid.mask().is_open_boundary(i, j) {
                    continue;
                }
                let h = grid.h(i, j);
                let zb = value.max(d_min - h);
                z.set(i, j, zb);
                d.set(i, j, h + zb);
            }
            bdy[side] = profile;
        }
        debug!(time = t, "open boundary elevations applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridExtent;
    use crate::types::GridLocation;

    fn west_open_grid() -> Grid2D {
        Grid2D::flat(6, 3, 1, 10.0, 10.0, 4.0)
            .unwrap()
            .with_open_side(Side::West)
    }

    fn fields(extent: GridExtent) -> (BoundaryArrays, Field2D, Field2D) {
        let bdy = SideBoundaries::from_fn(|side| {
            vec![0.0; if side.is_meridional() { extent.ny } else { extent.nx }]
        });
        (
            bdy,
            Field2D::zeros(extent, GridLocation::Center),
            Field2D::filled(extent, GridLocation::Center, 4.0),
        )
    }

    #[test]
    fn test_missing_series_rejected() {
        let grid = west_open_grid();
        let err = BoundaryForcing::closed().validate(&grid);
        assert!(matches!(
            err,
            Err(BarotropicError::MissingBoundarySeries { side: Side::West })
        ));
    }

    #[test]
    fn test_series_on_closed_side_rejected() {
        let grid = west_open_grid();
        let forcing = BoundaryForcing::closed()
            .with_series(Side::West, ElevationSeries::uniform(&[0.0], &[0.0], 3).unwrap())
            .with_series(Side::East, ElevationSeries::uniform(&[0.0], &[0.0], 3).unwrap());
        assert!(matches!(
            forcing.validate(&grid),
            Err(BarotropicError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_wrong_length_rejected() {
        let grid = west_open_grid();
        let forcing = BoundaryForcing::closed()
            .with_series(Side::West, ElevationSeries::uniform(&[0.0], &[0.0], 6).unwrap());
        assert!(matches!(
            forcing.validate(&grid),
            Err(BarotropicError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_sets_boundary_cells_only() {
        let grid = west_open_grid();
        let forcing = BoundaryForcing::closed().with_series(
            Side::West,
            ElevationSeries::uniform(&[0.0, 10.0], &[1.0, 2.0], 3).unwrap(),
        );
        forcing.validate(&grid).unwrap();

        let (mut bdy, mut z, mut d) = fields(grid.extent());
        forcing.apply(&grid, 5.0, 0.05, &mut bdy, &mut z, &mut d).unwrap();

        assert_eq!(bdy[Side::West], vec![1.5; 3]);
        for j in 0..3 {
            assert!((z.get(0, j) - 1.5).abs() < 1e-12);
            assert!((d.get(0, j) - 5.5).abs() < 1e-12);
            assert_eq!(z.get(1, j), 0.0);
        }

        let err = forcing.apply(&grid, 15.0, 0.05, &mut bdy, &mut z, &mut d);
        assert!(matches!(err, Err(BarotropicError::OutOfDomain { .. })));
    }

    #[test]
    fn test_forced_elevation_respects_min_depth() {
        let grid = west_open_grid();
        let forcing = BoundaryForcing::closed().with_series(
            Side::West,
            ElevationSeries::uniform(&[0.0], &[-10.0], 3).unwrap(),
        );
        let (mut bdy, mut z, mut d) = fields(grid.extent());
        forcing.apply(&grid, 0.0, 0.05, &mut bdy, &mut z, &mut d).unwrap();
        assert!((d.get(0, 1) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_failed_apply_leaves_fields_untouched() {
        let grid = Grid2D::flat(6, 3, 1, 10.0, 10.0, 4.0)
            .unwrap()
            .with_open_side(Side::West)
            .with_open_side(Side::East);
        // The east series ends long before the west one
        let forcing = BoundaryForcing::closed()
            .with_series(
                Side::West,
                ElevationSeries::uniform(&[0.0, 100.0], &[1.0, 2.0], 3).unwrap(),
            )
            .with_series(
                Side::East,
                ElevationSeries::uniform(&[0.0, 10.0], &[0.5, 0.5], 3).unwrap(),
            );
        forcing.validate(&grid).unwrap();

        let (mut bdy, mut z, mut d) = fields(grid.extent());
        forcing.apply(&grid, 5.0, 0.05, &mut bdy, &mut z, &mut d).unwrap();
        let (bdy_before, z_before, d_before) = (bdy.clone(), z.clone(), d.clone());

        let err = forcing.apply(&grid, 50.0, 0.05, &mut bdy, &mut z, &mut d);
        assert!(matches!(err, Err(BarotropicError::OutOfDomain { .. })));
        // West would have been valid at t = 50, but nothing was written
        assert_eq!(bdy, bdy_before);
        assert_eq!(z, z_before);
        assert_eq!(d, d_before);
        assert!((z.get(0, 1) - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_negative_ramp_rejected() {
        let grid = west_open_grid();
        let tide = ElevationSeries::uniform(&[0.0, 100.0], &[0.0, 1.0], 3).unwrap();
        let forcing = BoundaryForcing::closed().with_series(Side::West, tide.clone());
        assert!(forcing.clone().with_ramp_up(0.0).validate(&grid).is_ok());
        for duration in [-60.0, f64::NAN, f64::INFINITY] {
            let result = forcing.clone().with_ramp_up(duration).validate(&grid);
            assert!(
                matches!(result, Err(BarotropicError::InvalidConfig(_))),
                "duration {}",
                duration
            );
        }
    }

    #[test]
    fn test_ramp_up() {
        let forcing = BoundaryForcing::closed()
            .with_series(Side::West, ElevationSeries::uniform(&[0.0, 100.0], &[1.0, 1.0], 3).unwrap())
            .with_ramp_up(50.0);
        assert_eq!(forcing.ramp_factor(0.0), 0.0);
        assert!((forcing.ramp_factor(25.0) - 0.5).abs() < 1e-12);
        assert_eq!(forcing.ramp_factor(80.0), 1.0);

        let mut out = [0.0; 3];
        forcing.elevation_at(Side::West, 25.0, &mut out).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-12);
    }
}
