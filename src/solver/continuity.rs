//! Sea-surface elevation update from the transport divergence.
//!
//! ```text
//! zo = z
//! z  = zo - Δt·(∂U/∂x + ∂V/∂y) + Δt·fwf     on prognostic water cells
//! D  = H + z,  lifted to d_min where the cell would fall dry
//! ```
//!
//! Open-boundary cells keep the elevation imposed by the boundary forcing.
//! Without open boundaries and clamping the update conserves the total volume
//! up to the freshwater input, since every face flux leaves one cell and
//! enters its neighbour.

use crate::grid::Grid2D;
use crate::solver::config::BarotropicConfig;
use crate::solver::kernel::{map_rows, RowStats};
use crate::state::BarotropicState;

/// Depth deficit (m) below `d_min` attributed to floating-point rounding.
const ROUNDING_SLACK: f64 = 1e-12;

/// Advance `z` and `D` by one short step and integrate the freshwater flux.
///
/// `window_start` resets `fwf_int` before accumulating, so it always holds the
/// freshwater input of the current long step.
pub(crate) fn continuity_step(
    grid: &Grid2D,
    config: &BarotropicConfig,
    state: &mut BarotropicState,
    window_start: bool,
) -> RowStats {
    let ext = grid.extent();
    let mask = grid.mask();
    let (dx, dy, dt) = (grid.dx(), grid.dy(), config.dt);
    let d_min = config.wet_dry.d_min;

    state.elevation.zo.copy_from(&state.elevation.z);

    let zo = &state.elevation.zo;
    let u = &state.transport.u;
    let v = &state.transport.v;
    let fwf = &state.forcing.fwf;
    let stats = map_rows(&mut state.elevation.z, |j, row| {
        let mut stats = RowStats::default();
        for i in ext.interior_i() {
            if !mask.is_water(i, j) {
                continue;
            }
            let div = (u.get(i, j) - u.get(i - 1, j)) / dx + (v.get(i, j) - v.get(i, j - 1)) / dy;
            let mut z_new = zo.get(i, j) - dt * div + dt * fwf.get(i, j);

            if !z_new.is_finite() {
                stats.non_finite += 1;
            } else if grid.h(i, j) + z_new < d_min {
                // Outflow is capped in the momentum step; anything beyond
                // rounding left here means the cell was really overdrawn
                if d_min - (grid.h(i, j) + z_new) > ROUNDING_SLACK {
                    stats.clamped += 1;
                }
                z_new = d_min - grid.h(i, j);
            }
            row[ext.col_of(i)] = z_new;
        }
        stats
    });

    let z = &state.elevation.z;
    map_rows(&mut state.depth.d, |j, row| {
        for i in ext.interior_i() {
            row[ext.col_of(i)] = if mask.is_wet_capable(i, j) {
                grid.h(i, j) + z.get(i, j)
            } else {
                0.0
            };
        }
        RowStats::default()
    });

    if window_start {
        state.forcing.fwf_int.fill(0.0);
    }
    let fwf = &state.forcing.fwf;
    map_rows(&mut state.forcing.fwf_int, |j, row| {
        for i in ext.interior_i() {
            if mask.is_water(i, j) {
                row[ext.col_of(i)] += dt * fwf.get(i, j);
            }
        }
        RowStats::default()
    });

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_volume(grid: &Grid2D, state: &BarotropicState) -> f64 {
        grid.extent()
            .interior()
            .filter(|&(i, j)| grid.mask().is_wet_capable(i, j))
            .map(|(i, j)| state.depth().d.get(i, j) * grid.cell_area())
            .sum()
    }

    #[test]
    fn test_divergence_moves_water() {
        let grid = Grid2D::flat(4, 3, 1, 10.0, 10.0, 5.0).unwrap();
        let config = BarotropicConfig::new(1.0, 10);
        let mut state = BarotropicState::new(&grid, false);
        // 0.5 m²/s through the face between cells 1 and 2
        state.transport_mut().u.set(1, 1, 0.5);

        let before = total_volume(&grid, &state);
        let stats = continuity_step(&grid, &config, &mut state, true);
        assert_eq!(stats, RowStats::default());

        let z = &state.elevation().z;
        assert!((z.get(1, 1) + 0.05).abs() < 1e-14);
        assert!((z.get(2, 1) - 0.05).abs() < 1e-14);
        assert_eq!(z.get(0, 1), 0.0);
        assert_eq!(state.elevation().zo.get(1, 1), 0.0);
        assert!((state.depth().d.get(2, 1) - 5.05).abs() < 1e-14);
        assert!((total_volume(&grid, &state) - before).abs() < 1e-9);
    }

    #[test]
    fn test_freshwater_flux_accumulates() {
        let grid = Grid2D::flat(3, 3, 1, 10.0, 10.0, 5.0).unwrap();
        let config = BarotropicConfig::new(2.0, 10);
        let mut state = BarotropicState::new(&grid, false);
        state.forcing.fwf.fill(1e-3);

        continuity_step(&grid, &config, &mut state, true);
        continuity_step(&grid, &config, &mut state, false);
        assert!((state.elevation().z.get(1, 1) - 4e-3).abs() < 1e-15);
        assert!((state.forcing().fwf_int.get(1, 1) - 4e-3).abs() < 1e-15);

        // New window restarts the integral
        continuity_step(&grid, &config, &mut state, true);
        assert!((state.forcing().fwf_int.get(1, 1) - 2e-3).abs() < 1e-15);
    }

    #[test]
    fn test_drying_clamped_to_min_depth() {
        let grid = Grid2D::flat(3, 1, 1, 1.0, 1.0, 0.1).unwrap();
        let config = BarotropicConfig::new(1.0, 10);
        let mut state = BarotropicState::new(&grid, false);
        // Strong outflow from the middle cell
        state.transport_mut().u.set(1, 0, 1.0);
        state.transport_mut().u.set(0, 0, -1.0);

        let stats = continuity_step(&grid, &config, &mut state, true);
        assert_eq!(stats.clamped, 1);
        assert!((state.depth().d.get(1, 0) - config.wet_dry.d_min).abs() < 1e-15);
    }

    #[test]
    fn test_land_and_boundary_cells_untouched() {
        let grid = Grid2D::flat(4, 2, 1, 10.0, 10.0, 5.0)
            .unwrap()
            .with_land(3, 0)
            .with_open_side(crate::types::Side::West);
        let config = BarotropicConfig::new(1.0, 10);
        let mut state = BarotropicState::new(&grid, false);
        state.elevation_mut().z.set(0, 0, 0.3);
        state.transport_mut().u.set(0, 0, 1.0);

        continuity_step(&grid, &config, &mut state, true);
        assert_eq!(state.elevation().z.get(0, 0), 0.3);
        assert_eq!(state.depth().d.get(3, 0), 0.0);
        assert!((state.elevation().z.get(1, 0) - 0.1).abs() < 1e-14);
    }
}
