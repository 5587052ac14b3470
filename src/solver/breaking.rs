//! Depth-limited wave breaking.
//!
//! Cells whose flow becomes supercritical or whose surface slope steepens
//! past a threshold are flagged as breaking. Breaking cells, and for a few
//! steps afterwards recovering cells, dissipate energy in two ways:
//!
//! - transports on adjacent faces are damped by `1 / (1 + Δt·w·rate)`
//! - the surface elevation is smoothed by mass-conserving flux-form diffusion
//!
//! where the weight `w` is 1 while breaking and decays linearly to zero over
//! the recovery period.
//!
//! # State machine
//!
//! ```text
//! Inactive --criterion--> Breaking --clears--> Recovering --n steps--> Inactive
//!                            ^                     |
//!                            +-----criterion-------+
//! ```

use crate::grid::Grid2D;
use crate::solver::config::{BarotropicConfig, WaveBreakingConfig};
use crate::state::{BarotropicState, BreakStatus};

/// Counts of a breaking pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BreakingCounts {
    /// Cells breaking after the pass
    pub breaking: usize,
    /// Cells recovering after the pass
    pub recovering: usize,
    /// Cells lifted back to the minimum depth after smoothing
    pub clamped: usize,
}

/// Status transition of one cell.
///
/// Returns the new status and the recovery steps left.
pub fn next_status(
    status: BreakStatus,
    remaining: u32,
    criterion: bool,
    relaxation_steps: u32,
) -> (BreakStatus, u32) {
    match (status, criterion) {
        (_, true) => (BreakStatus::Breaking, 0),
        (BreakStatus::Inactive, false) => (BreakStatus::Inactive, 0),
        (BreakStatus::Breaking, false) => (BreakStatus::Recovering, relaxation_steps.max(1)),
        (BreakStatus::Recovering, false) => {
            if remaining <= 1 {
                (BreakStatus::Inactive, 0)
            } else {
                (BreakStatus::Recovering, remaining - 1)
            }
        }
    }
}

/// Dissipation weight of a cell in [0, 1].
#[inline]
pub fn dissipation_weight(status: BreakStatus, remaining: u32, relaxation_steps: u32) -> f64 {
    match status {
        BreakStatus::Inactive => 0.0,
        BreakStatus::Breaking => 1.0,
        BreakStatus::Recovering => remaining as f64 / relaxation_steps.max(1) as f64,
    }
}

/// Diffusion number `κ·Δt/Δx²` per direction kept below this bound.
const MAX_DIFFUSION_NUMBER: f64 = 0.125;

/// Detect breaking, advance the status of every cell and apply dissipation.
///
/// Does nothing and returns zero counts when the breaking fields are absent.
pub(crate) fn breaking_step(
    grid: &Grid2D,
    config: &BarotropicConfig,
    params: &WaveBreakingConfig,
    state: &mut BarotropicState,
) -> BreakingCounts {
    let Some(fields) = state.breaking.as_mut() else {
        return BreakingCounts::default();
    };
    let ext = grid.extent();
    let mask = grid.mask();
    let (dx, dy, dt, g) = (grid.dx(), grid.dy(), config.dt, config.g);
    let d_crit = config.wet_dry.d_crit;
    let n_relax = params.relaxation_steps;

    let d = &state.depth.d;
    let z = &state.elevation.z;
    let u = &state.transport.u;
    let v = &state.transport.v;

    // Detection and status update
    let mut counts = BreakingCounts::default();
    for (i, j) in ext.interior() {
        let depth = d.get(i, j);
        let criterion = mask.is_water(i, j) && depth > d_crit && {
            let uc = 0.5 * (u.get(i - 1, j) + u.get(i, j)) / depth;
            let vc = 0.5 * (v.get(i, j - 1) + v.get(i, j)) / depth;
            let froude = (uc * uc + vc * vc).sqrt() / (g * depth).sqrt();

            let gx = gradient(
                (z.get(i - 1, j), z.get(i, j), z.get(i + 1, j)),
                (mask.is_wet_capable(i - 1, j), mask.is_wet_capable(i + 1, j)),
                dx,
            );
            let gy = gradient(
                (z.get(i, j - 1), z.get(i, j), z.get(i, j + 1)),
                (mask.is_wet_capable(i, j - 1), mask.is_wet_capable(i, j + 1)),
                dy,
            );
            let slope = (gx * gx + gy * gy).sqrt();

            froude > params.froude_threshold || slope > params.slope_threshold
        };

        let (status, remaining) = next_status(
            fields.break_stat.get(i, j),
            fields.recovery.get(i, j),
            criterion,
            n_relax,
        );
        fields.break_mask.set(i, j, criterion);
        fields.break_stat.set(i, j, status);
        fields.recovery.set(i, j, remaining);
        match status {
            BreakStatus::Breaking => counts.breaking += 1,
            BreakStatus::Recovering => counts.recovering += 1,
            BreakStatus::Inactive => {}
        }
    }
    if counts.breaking + counts.recovering == 0 {
        return counts;
    }

    let weight = |i: isize, j: isize| {
        if ext.contains(i, j) {
            dissipation_weight(fields.break_stat.get(i, j), fields.recovery.get(i, j), n_relax)
        } else {
            0.0
        }
    };

    // Transport damping
    for (i, j) in ext.interior() {
        if mask.u_active(i, j) {
            let w = weight(i, j).max(weight(i + 1, j));
            if w > 0.0 {
                let damped = state.transport.u.get(i, j) / (1.0 + dt * w * params.damping_rate);
                state.transport.u.set(i, j, damped);
            }
        }
        if mask.v_active(i, j) {
            let w = weight(i, j).max(weight(i, j + 1));
            if w > 0.0 {
                let damped = state.transport.v.get(i, j) / (1.0 + dt * w * params.damping_rate);
                state.transport.v.set(i, j, damped);
            }
        }
    }

    // Flux-form elevation smoothing between wet water cells
    let kappa_max = MAX_DIFFUSION_NUMBER * dx.min(dy).powi(2) / dt;
    let diffusive = |i: isize, j: isize| mask.is_water(i, j) && d.get(i, j) > d_crit;
    let mut dz = vec![0.0; ext.len()];
    for (i, j) in ext.interior() {
        if !diffusive(i, j) {
            continue;
        }
        for (ni, nj, spacing) in [(i + 1, j, dx), (i, j + 1, dy)] {
            if !ext.is_interior(ni, nj) || !diffusive(ni, nj) {
                continue;
            }
            let w = weight(i, j).max(weight(ni, nj));
            if w <= 0.0 {
                continue;
            }
            let kappa = (w * params.diffusivity).min(kappa_max);
            let transfer = dt * kappa * (z.get(ni, nj) - z.get(i, j)) / (spacing * spacing);
            dz[ext.index(i, j)] += transfer;
            dz[ext.index(ni, nj)] -= transfer;
        }
    }

    let d_min = config.wet_dry.d_min;
    for (i, j) in ext.interior() {
        let delta = dz[ext.index(i, j)];
        if delta == 0.0 {
            continue;
        }
        let h = grid.h(i, j);
        let mut z_new = state.elevation.z.get(i, j) + delta;
        if h + z_new < d_min {
            z_new = d_min - h;
            counts.clamped += 1;
        }
        state.elevation.z.set(i, j, z_new);
        state.depth.d.set(i, j, h + z_new);
    }

    counts
}

/// Surface gradient from the wet neighbours only.
#[inline]
fn gradient((zm, z0, zp): (f64, f64, f64), (wet_m, wet_p): (bool, bool), spacing: f64) -> f64 {
    match (wet_m, wet_p) {
        (true, true) => (zp - zm) / (2.0 * spacing),
        (true, false) => (z0 - zm) / spacing,
        (false, true) => (zp - z0) / spacing,
        (false, false) => 0.0,
    }
}
