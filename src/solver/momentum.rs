//! Depth-integrated momentum equations on the C grid.
//!
//! Per short step, on every active U face (V faces analogous):
//!
//! ```text
//! UEx = U + Δt·( -g·DU·∂z/∂x + fU - adv(U) + diff(U) - (SlUx + Slr) )
//! U   = α(DU) · UEx / (1 + Δt·ru/DU)
//! ```
//!
//! with `α` the wet/dry blending factor, `ru` the linearised bottom friction
//! and `Slr` the slow friction limited to oppose the current transport. The
//! U and V updates alternate in order every step; the component updated second
//! sees the Coriolis term of the freshly updated first component.
//!
//! After both updates every transport leaving a prognostic water cell is
//! capped so that the cell cannot be drained below the minimum depth within
//! the step (see [`crate::solver::WetDryConfig::max_outflow`]).
//!
//! Each term is evaluated by a separate row kernel writing a single output
//! field, so inputs are never aliased with outputs.

use crate::grid::Grid2D;
use crate::solver::config::BarotropicConfig;
use crate::solver::coriolis::four_point_transport;
use crate::solver::friction::{implicit_correction, limited_slow_friction};
use crate::solver::kernel::{map_rows, RowStats};
use crate::state::{BarotropicState, Field2D};
use crate::types::GridLocation;
use tracing::trace;

/// Order of the two transport updates within one short step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOrder {
    UFirst,
    VFirst,
}

impl UpdateOrder {
    /// Order used at a given step number: U first on even steps.
    pub fn for_step(step: u64) -> Self {
        if step % 2 == 0 {
            UpdateOrder::UFirst
        } else {
            UpdateOrder::VFirst
        }
    }
}

/// Velocity from transport and depth; zero on dry faces.
#[inline(always)]
fn vel(q: f64, d: f64) -> f64 {
    if d > 0.0 { q / d } else { 0.0 }
}

/// Advance both transport components by one short step.
pub(crate) fn momentum_step(
    grid: &Grid2D,
    config: &BarotropicConfig,
    state: &mut BarotropicState,
    order: UpdateOrder,
) -> RowStats {
    refresh_face_depths(grid, state);
    friction_terms(grid, config, state);

    let stats = match order {
        UpdateOrder::UFirst => {
            let a = update_u(grid, config, state);
            let b = update_v(grid, config, state);
            a.merge(b)
        }
        UpdateOrder::VFirst => {
            let a = update_v(grid, config, state);
            let b = update_u(grid, config, state);
            a.merge(b)
        }
    };

    let limited = limit_drying_outflow(grid, config, state);
    if limited > 0 {
        trace!(faces = limited, "outflow limited at drying cells");
    }
    stats
}

/// Cap transports leaving prognostic water cells so that no cell is drained
/// below `d_min` in the coming continuity update. Returns the number of
/// faces whose transport was reduced.
///
/// The donor of a face is the cell the transport flows out of. Open-boundary
/// and halo donors are left alone; their elevation is imposed or owned by a
/// neighbouring tile.
pub(crate) fn limit_drying_outflow(
    grid: &Grid2D,
    config: &BarotropicConfig,
    state: &mut BarotropicState,
) -> usize {
    let ext = grid.extent();
    let mask = grid.mask();
    let (nx, ny) = (ext.nx as isize, ext.ny as isize);
    let (dx, dy, dt) = (grid.dx(), grid.dy(), config.dt);
    let wet_dry = &config.wet_dry;
    let d = &state.depth.d;
    let fwf = &state.forcing.fwf;

    let cap = |i: isize, j: isize, spacing: f64| -> f64 {
        let inside = (0..nx).contains(&i) && (0..ny).contains(&j);
        if inside && mask.is_water(i, j) {
            let evaporation = (-fwf.get(i, j)).max(0.0);
            wet_dry.max_outflow(d.get(i, j), evaporation, spacing, dt)
        } else {
            f64::INFINITY
        }
    };

    let u_stats = map_rows(&mut state.transport.u, |j, row| {
        let mut stats = RowStats::default();
        for i in ext.interior_i() {
            let c = ext.col_of(i);
            let q = row[c];
            if q == 0.0 || q.is_nan() || !mask.u_active(i, j) {
                continue;
            }
            let donor = if q > 0.0 { i } else { i + 1 };
            let max = cap(donor, j, dx);
            if q.abs() > max {
                row[c] = max.copysign(q);
                stats.clamped += 1;
            }
        }
        stats
    });
    let v_stats = map_rows(&mut state.transport.v, |j, row| {
        let mut stats = RowStats::default();
        for i in ext.interior_i() {
            let c = ext.col_of(i);
            let q = row[c];
            if q == 0.0 || q.is_nan() || !mask.v_active(i, j) {
                continue;
            }
            let donor = if q > 0.0 { j } else { j + 1 };
            let max = cap(i, donor, dy);
            if q.abs() > max {
                row[c] = max.copysign(q);
                stats.clamped += 1;
            }
        }
        stats
    });

    u_stats.clamped + v_stats.clamped
}

/// Face depths `DU`, `DV` from the cell depths over the whole tile.
///
/// Inactive faces get zero depth.
pub(crate) fn refresh_face_depths(grid: &Grid2D, state: &mut BarotropicState) {
    let ext = grid.extent();
    let mask = grid.mask();
    let h = ext.halo as isize;
    let (nx, ny) = (ext.nx as isize, ext.ny as isize);
    let d = &state.depth.d;

    for j in -h..ny + h {
        for i in -h..nx + h {
            let du = if i + 1 < nx + h && mask.u_active(i, j) {
                0.5 * (d.get(i, j) + d.get(i + 1, j))
            } else {
                0.0
            };
            let dv = if j + 1 < ny + h && mask.v_active(i, j) {
                0.5 * (d.get(i, j) + d.get(i, j + 1))
            } else {
                0.0
            };
            state.depth.du.set(i, j, du);
            state.depth.dv.set(i, j, dv);
        }
    }
}

/// Effective roughness, drag coefficients and linearised friction at both
/// face families, all from the transports at the start of the step.
pub(crate) fn friction_terms(grid: &Grid2D, config: &BarotropicConfig, state: &mut BarotropicState) {
    let ext = grid.extent();
    let mask = grid.mask();
    let fr = &config.friction;

    let zub0 = &state.forcing.zub0;
    map_rows(&mut state.momentum.zub, |j, row| {
        for i in ext.interior_i() {
            row[ext.col_of(i)] = fr.effective_roughness(zub0.get(i, j));
        }
        RowStats::default()
    });
    let zvb0 = &state.forcing.zvb0;
    map_rows(&mut state.momentum.zvb, |j, row| {
        for i in ext.interior_i() {
            row[ext.col_of(i)] = fr.effective_roughness(zvb0.get(i, j));
        }
        RowStats::default()
    });

    let du = &state.depth.du;
    let dv = &state.depth.dv;
    let zub = &state.momentum.zub;
    map_rows(&mut state.momentum.ruu, |j, row| {
        for i in ext.interior_i() {
            row[ext.col_of(i)] = if mask.u_active(i, j) {
                fr.drag_coefficient(du.get(i, j), zub.get(i, j))
            } else {
                0.0
            };
        }
        RowStats::default()
    });
    let zvb = &state.momentum.zvb;
    map_rows(&mut state.momentum.rvv, |j, row| {
        for i in ext.interior_i() {
            row[ext.col_of(i)] = if mask.v_active(i, j) {
                fr.drag_coefficient(dv.get(i, j), zvb.get(i, j))
            } else {
                0.0
            };
        }
        RowStats::default()
    });

    let u = &state.transport.u;
    let v = &state.transport.v;
    let ruu = &state.momentum.ruu;
    map_rows(&mut state.momentum.ru, |j, row| {
        for i in ext.interior_i() {
            let d = du.get(i, j);
            row[ext.col_of(i)] = if mask.u_active(i, j) && d > 0.0 {
                let vbar = 0.25
                    * (v.get(i, j) + v.get(i + 1, j) + v.get(i, j - 1) + v.get(i + 1, j - 1));
                let uu = u.get(i, j) / d;
                let vv = vbar / d;
                ruu.get(i, j) * (uu * uu + vv * vv).sqrt()
            } else {
                0.0
            };
        }
        RowStats::default()
    });
    let rvv = &state.momentum.rvv;
    map_rows(&mut state.momentum.rv, |j, row| {
        for i in ext.interior_i() {
            let d = dv.get(i, j);
            row[ext.col_of(i)] = if mask.v_active(i, j) && d > 0.0 {
                let ubar = 0.25
                    * (u.get(i, j) + u.get(i - 1, j) + u.get(i, j + 1) + u.get(i - 1, j + 1));
                let uu = ubar / d;
                let vv = v.get(i, j) / d;
                rvv.get(i, j) * (uu * uu + vv * vv).sqrt()
            } else {
                0.0
            };
        }
        RowStats::default()
    });
}

/// x-transport update: Coriolis, explicit step into `UEx`, friction into `U`.
fn update_u(grid: &Grid2D, config: &BarotropicConfig, state: &mut BarotropicState) -> RowStats {
    let ext = grid.extent();
    let mask = grid.mask();
    let (dx, dy, dt, g) = (grid.dx(), grid.dy(), config.dt, config.g);

    // fU = f·V̄
    {
        let v = &state.transport.v;
        let du = &state.depth.du;
        let dv = &state.depth.dv;
        map_rows(&mut state.momentum.f_u, |j, row| {
            let f = config.coriolis.f_at(grid.y_of(j, GridLocation::EastFace));
            for i in ext.interior_i() {
                row[ext.col_of(i)] = if f != 0.0 && mask.u_active(i, j) {
                    let vbar = four_point_transport(
                        [
                            (v.get(i, j), dv.get(i, j)),
                            (v.get(i + 1, j), dv.get(i + 1, j)),
                            (v.get(i, j - 1), dv.get(i, j - 1)),
                            (v.get(i + 1, j - 1), dv.get(i + 1, j - 1)),
                        ],
                        du.get(i, j),
                    );
                    f * vbar
                } else {
                    0.0
                };
            }
            RowStats::default()
        });
    }

    // UEx
    {
        let u = &state.transport.u;
        let v = &state.transport.v;
        let d = &state.depth.d;
        let du = &state.depth.du;
        let z = &state.elevation.z;
        let f_u = &state.momentum.f_u;
        let sl_ux = &state.slow.sl_ux;
        let sl_ru = &state.slow.sl_ru;
        let an = &state.forcing.an;
        let an_x = &state.forcing.an_x;
        let wet_dry = &config.wet_dry;

        map_rows(&mut state.transport.u_ex, |j, row| {
            for i in ext.interior_i() {
                let c = ext.col_of(i);
                if !mask.u_active(i, j) {
                    row[c] = 0.0;
                    continue;
                }
                let face_d = du.get(i, j);
                let (zl, zr) = wet_dry.limited_elevations(
                    (z.get(i, j), grid.h(i, j), d.get(i, j)),
                    (z.get(i + 1, j), grid.h(i + 1, j), d.get(i + 1, j)),
                );
                let mut tendency = -g * face_d * (zr - zl) / dx + f_u.get(i, j);

                if config.advection {
                    tendency -= advection_u(u, v, du, i, j, dx, dy);
                }
                if config.lateral_diffusion {
                    tendency += diffusion_u(grid, u, d, du, an, an_x, i, j);
                }

                let u0 = u.get(i, j);
                let slr = limited_slow_friction(sl_ru.get(i, j), u0);
                tendency -= sl_ux.get(i, j) + slr;

                row[c] = u0 + dt * tendency;
            }
            RowStats::default()
        });
    }

    // U
    let u_ex = &state.transport.u_ex;
    let ru = &state.momentum.ru;
    let du = &state.depth.du;
    map_rows(&mut state.transport.u, |j, row| {
        let mut stats = RowStats::default();
        for i in ext.interior_i() {
            let c = ext.col_of(i);
            if !mask.u_active(i, j) {
                row[c] = 0.0;
                continue;
            }
            let face_d = du.get(i, j);
            let alpha = config.wet_dry.blending_factor(face_d);
            let value = if alpha > 0.0 {
                alpha * implicit_correction(u_ex.get(i, j), ru.get(i, j), face_d, dt)
            } else {
                0.0
            };
            row[c] = bounded(value, config.max_transport, &mut stats);
        }
        stats
    })
}

/// y-transport update: Coriolis, explicit step into `VEx`, friction into `V`.
fn update_v(grid: &Grid2D, config: &BarotropicConfig, state: &mut BarotropicState) -> RowStats {
    let ext = grid.extent();
    let mask = grid.mask();
    let (dx, dy, dt, g) = (grid.dx(), grid.dy(), config.dt, config.g);

    // fV = -f·Ū
    {
        let u = &state.transport.u;
        let du = &state.depth.du;
        let dv = &state.depth.dv;
        map_rows(&mut state.momentum.f_v, |j, row| {
            let f = config.coriolis.f_at(grid.y_of(j, GridLocation::NorthFace));
            for i in ext.interior_i() {
                row[ext.col_of(i)] = if f != 0.0 && mask.v_active(i, j) {
                    let ubar = four_point_transport(
                        [
                            (u.get(i, j), du.get(i, j)),
                            (u.get(i - 1, j), du.get(i - 1, j)),
                            (u.get(i, j + 1), du.get(i, j + 1)),
                            (u.get(i - 1, j + 1), du.get(i - 1, j + 1)),
                        ],
                        dv.get(i, j),
                    );
                    -f * ubar
                } else {
                    0.0
                };
            }
            RowStats::default()
        });
    }

    // VEx
    {
        let u = &state.transport.u;
        let v = &state.transport.v;
        let d = &state.depth.d;
        let dv = &state.depth.dv;
        let z = &state.elevation.z;
        let f_v = &state.momentum.f_v;
        let sl_vx = &state.slow.sl_vx;
        let sl_rv = &state.slow.sl_rv;
        let an = &state.forcing.an;
        let an_x = &state.forcing.an_x;
        let wet_dry = &config.wet_dry;

        map_rows(&mut state.transport.v_ex, |j, row| {
            for i in ext.interior_i() {
                let c = ext.col_of(i);
                if !mask.v_active(i, j) {
                    row[c] = 0.0;
                    continue;
                }
                let face_d = dv.get(i, j);
                let (zl, zr) = wet_dry.limited_elevations(
                    (z.get(i, j), grid.h(i, j), d.get(i, j)),
                    (z.get(i, j + 1), grid.h(i, j + 1), d.get(i, j + 1)),
                );
                let mut tendency = -g * face_d * (zr - zl) / dy + f_v.get(i, j);

                if config.advection {
                    tendency -= advection_v(u, v, dv, i, j, dx, dy);
                }
                if config.lateral_diffusion {
                    tendency += diffusion_v(grid, v, d, dv, an, an_x, i, j);
                }

                let v0 = v.get(i, j);
                let slr = limited_slow_friction(sl_rv.get(i, j), v0);
                tendency -= sl_vx.get(i, j) + slr;

                row[c] = v0 + dt * tendency;
            }
            RowStats::default()
        });
    }

    // V
    let v_ex = &state.transport.v_ex;
    let rv = &state.momentum.rv;
    let dv = &state.depth.dv;
    map_rows(&mut state.transport.v, |j, row| {
        let mut stats = RowStats::default();
        for i in ext.interior_i() {
            let c = ext.col_of(i);
            if !mask.v_active(i, j) {
                row[c] = 0.0;
                continue;
            }
            let face_d = dv.get(i, j);
            let alpha = config.wet_dry.blending_factor(face_d);
            let value = if alpha > 0.0 {
                alpha * implicit_correction(v_ex.get(i, j), rv.get(i, j), face_d, dt)
            } else {
                0.0
            };
            row[c] = bounded(value, config.max_transport, &mut stats);
        }
        stats
    })
}

/// Clamp a transport to the sanity bound, counting clamped and non-finite values.
#[inline(always)]
fn bounded(value: f64, max_transport: f64, stats: &mut RowStats) -> f64 {
    if !value.is_finite() {
        stats.non_finite += 1;
        value
    } else if value.abs() > max_transport {
        stats.clamped += 1;
        max_transport.copysign(value)
    } else {
        value
    }
}

/// First-order upwind flux divergence of x-momentum at U(i, j).
#[allow(clippy::too_many_arguments)]
#[inline(always)]
fn advection_u(
    u: &Field2D,
    v: &Field2D,
    du: &Field2D,
    i: isize,
    j: isize,
    dx: f64,
    dy: f64,
) -> f64 {
    let uvel = |i: isize, j: isize| vel(u.get(i, j), du.get(i, j));

    // x-fluxes at the T-points east and west of the face
    let ue = 0.5 * (u.get(i, j) + u.get(i + 1, j));
    let fe = ue * if ue >= 0.0 { uvel(i, j) } else { uvel(i + 1, j) };
    let uw = 0.5 * (u.get(i - 1, j) + u.get(i, j));
    let fw = uw * if uw >= 0.0 { uvel(i - 1, j) } else { uvel(i, j) };

    // y-fluxes at the X-points north and south of the face
    let vn = 0.5 * (v.get(i, j) + v.get(i + 1, j));
    let f_n = vn * if vn >= 0.0 { uvel(i, j) } else { uvel(i, j + 1) };
    let vs = 0.5 * (v.get(i, j - 1) + v.get(i + 1, j - 1));
    let fs = vs * if vs >= 0.0 { uvel(i, j - 1) } else { uvel(i, j) };

    (fe - fw) / dx + (f_n - fs) / dy
}

/// First-order upwind flux divergence of y-momentum at V(i, j).
#[allow(clippy::too_many_arguments)]
#[inline(always)]
fn advection_v(
    u: &Field2D,
    v: &Field2D,
    dv: &Field2D,
    i: isize,
    j: isize,
    dx: f64,
    dy: f64,
) -> f64 {
    let vvel = |i: isize, j: isize| vel(v.get(i, j), dv.get(i, j));

    // x-fluxes at the X-points east and west of the face
    let ue = 0.5 * (u.get(i, j) + u.get(i, j + 1));
    let fe = ue * if ue >= 0.0 { vvel(i, j) } else { vvel(i + 1, j) };
    let uw = 0.5 * (u.get(i - 1, j) + u.get(i - 1, j + 1));
    let fw = uw * if uw >= 0.0 { vvel(i - 1, j) } else { vvel(i, j) };

    // y-fluxes at the T-points north and south of the face
    let vn = 0.5 * (v.get(i, j) + v.get(i, j + 1));
    let f_n = vn * if vn >= 0.0 { vvel(i, j) } else { vvel(i, j + 1) };
    let vs = 0.5 * (v.get(i, j - 1) + v.get(i, j));
    let fs = vs * if vs >= 0.0 { vvel(i, j - 1) } else { vvel(i, j) };

    (fe - fw) / dx + (f_n - fs) / dy
}

/// Lateral diffusion of x-transport at U(i, j).
///
/// Fluxes `An·D·∂u/∂x` at T-points and `AnX·D·∂u/∂y` at X-points, only
/// toward active neighbouring faces.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
fn diffusion_u(
    grid: &Grid2D,
    u: &Field2D,
    d: &Field2D,
    du: &Field2D,
    an: &Field2D,
    an_x: &Field2D,
    i: isize,
    j: isize,
) -> f64 {
    let mask = grid.mask();
    let (dx, dy) = (grid.dx(), grid.dy());
    let uvel = |i: isize, j: isize| vel(u.get(i, j), du.get(i, j));
    let u0 = uvel(i, j);

    let fe = if mask.u_active(i + 1, j) {
        an.get(i + 1, j) * d.get(i + 1, j) * (uvel(i + 1, j) - u0) / dx
    } else {
        0.0
    };
    let fw = if mask.u_active(i - 1, j) {
        an.get(i, j) * d.get(i, j) * (u0 - uvel(i - 1, j)) / dx
    } else {
        0.0
    };
    let f_n = if mask.u_active(i, j + 1) {
        let dx_n = 0.5 * (du.get(i, j) + du.get(i, j + 1));
        an_x.get(i, j) * dx_n * (uvel(i, j + 1) - u0) / dy
    } else {
        0.0
    };
    let fs = if mask.u_active(i, j - 1) {
        let dx_s = 0.5 * (du.get(i, j - 1) + du.get(i, j));
        an_x.get(i, j - 1) * dx_s * (u0 - uvel(i, j - 1)) / dy
    } else {
        0.0
    };

    (fe - fw) / dx + (f_n - fs) / dy
}

/// Lateral diffusion of y-transport at V(i, j).
#[allow(clippy::too_many_arguments)]
#[inline(always)]
fn diffusion_v(
    grid: &Grid2D,
    v: &Field2D,
    d: &Field2D,
    dv: &Field2D,
    an: &Field2D,
    an_x: &Field2D,
    i: isize,
    j: isize,
) -> f64 {
    let mask = grid.mask();
    let (dx, dy) = (grid.dx(), grid.dy());
    let vvel = |i: isize, j: isize| vel(v.get(i, j), dv.get(i, j));
    let v0 = vvel(i, j);

    let fe = if mask.v_active(i + 1, j) {
        let dx_e = 0.5 * (dv.get(i, j) + dv.get(i + 1, j));
        an_x.get(i, j) * dx_e * (vvel(i + 1, j) - v0) / dx
    } else {
        0.0
    };
    let fw = if mask.v_active(i - 1, j) {
        let dx_w = 0.5 * (dv.get(i - 1, j) + dv.get(i, j));
        an_x.get(i - 1, j) * dx_w * (v0 - vvel(i - 1, j)) / dx
    } else {
        0.0
    };
    let f_n = if mask.v_active(i, j + 1) {
        an.get(i, j + 1) * d.get(i, j + 1) * (vvel(i, j + 1) - v0) / dy
    } else {
        0.0
    };
    let fs = if mask.v_active(i, j - 1) {
        an.get(i, j) * d.get(i, j) * (v0 - vvel(i, j - 1)) / dy
    } else {
        0.0
    };

    (fe - fw) / dx + (f_n - fs) / dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::coriolis::CoriolisParameter;
    use crate::solver::friction::FrictionConfig;

    fn basin() -> Grid2D {
        Grid2D::flat(8, 6, 1, 100.0, 100.0, 10.0).unwrap()
    }

    fn frictionless(dt: f64) -> BarotropicConfig {
        BarotropicConfig::new(dt, 10).with_friction(FrictionConfig::frictionless())
    }

    #[test]
    fn test_lake_at_rest_stays_at_rest() {
        let grid = Grid2D::new(8, 6, 1, 100.0, 100.0, |x, y| 5.0 + 0.01 * x + 0.005 * y).unwrap();
        let config = BarotropicConfig::new(1.0, 10)
            .with_coriolis(CoriolisParameter::f_plane(1e-4))
            .with_advection(true);
        let mut state = BarotropicState::new(&grid, false);

        for step in 0..5 {
            momentum_step(&grid, &config, &mut state, UpdateOrder::for_step(step));
        }
        assert_eq!(state.transport().u.max_abs(), 0.0);
        assert_eq!(state.transport().v.max_abs(), 0.0);
    }

    #[test]
    fn test_pressure_gradient_drives_flow_downhill() {
        let grid = basin();
        let config = frictionless(1.0);
        let mut state = BarotropicState::new(&grid, false);
        // Surface raised in the west half
        for (i, j) in grid.extent().interior() {
            if i < 4 {
                state.elevation_mut().z.set(i, j, 0.1);
            }
        }
        state.update_depth(&grid, config.wet_dry.d_min);

        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);

        let u = &state.transport().u;
        // Face between i=3 and i=4: g·DU·Δz/dx·dt = 9.81·10.05·0.1/100·1
        let expected = 9.81 * 10.05 * 0.1 / 100.0;
        assert!((u.get(3, 2) - expected).abs() < 1e-10);
        assert_eq!(u.get(1, 2), 0.0);
        // Walls are closed
        assert_eq!(u.get(7, 2), 0.0);
        assert_eq!(state.transport().v.max_abs(), 0.0);
    }

    #[test]
    fn test_face_depths_follow_mask() {
        let grid = basin().with_land(2, 2);
        let mut state = BarotropicState::new(&grid, false);
        refresh_face_depths(&grid, &mut state);
        let du = &state.depth().du;
        assert!((du.get(0, 0) - 10.0).abs() < 1e-12);
        assert_eq!(du.get(1, 2), 0.0);
        assert_eq!(du.get(2, 2), 0.0);
        assert_eq!(du.get(7, 0), 0.0);
        assert!((state.depth().dv.get(2, 0) - 10.0).abs() < 1e-12);
        assert_eq!(state.depth().dv.get(2, 1), 0.0);
    }

    #[test]
    fn test_friction_decelerates() {
        let grid = basin();
        let config = BarotropicConfig::new(10.0, 10);
        let mut state = BarotropicState::new(&grid, false);
        state.forcing.zub0.fill(config.friction.z0);
        state.forcing.zvb0.fill(config.friction.z0);
        for (i, j) in grid.extent().interior() {
            if grid.mask().u_active(i, j) {
                state.transport_mut().u.set(i, j, 5.0);
            }
        }

        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);

        let cd = config.friction.drag_coefficient(10.0, 0.01);
        let ru = cd * 0.5;
        assert!((state.momentum_terms().ruu.get(3, 3) - cd).abs() < 1e-14);
        assert!((state.momentum_terms().ru.get(3, 3) - ru).abs() < 1e-14);
        let expected = 5.0 / (1.0 + 10.0 * ru / 10.0);
        assert!((state.transport().u.get(3, 3) - expected).abs() < 1e-12);
        assert!((state.transport().u_ex.get(3, 3) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_coriolis_turns_flow_right() {
        let grid = basin();
        let config = frictionless(10.0).with_coriolis(CoriolisParameter::f_plane(1e-4));
        let mut state = BarotropicState::new(&grid, false);
        for (i, j) in grid.extent().interior() {
            if grid.mask().u_active(i, j) {
                state.transport_mut().u.set(i, j, 1.0);
            }
        }

        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);

        // Eastward flow in the northern hemisphere is deflected southward
        let fv = state.momentum_terms().f_v.get(3, 2);
        assert!((fv + 1e-4).abs() < 1e-12);
        assert!(state.transport().v.get(3, 2) < 0.0);
    }

    #[test]
    fn test_slow_terms_force_transport() {
        let grid = basin();
        let config = frictionless(2.0);
        let mut state = BarotropicState::new(&grid, false);
        state.slow.sl_ux.fill(-0.01);

        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);
        assert!((state.transport().u.get(3, 3) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_transport_clamped() {
        let grid = basin();
        let config = frictionless(1.0).with_max_transport(1.0);
        let mut state = BarotropicState::new(&grid, false);
        state.transport_mut().u.set(3, 3, 50.0);

        let stats = momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);
        assert_eq!(stats.clamped, 1);
        assert_eq!(state.transport().u.get(3, 3), 1.0);
    }

    #[test]
    fn test_dry_faces_carry_no_transport() {
        let grid = basin();
        let config = frictionless(1.0);
        let mut state = BarotropicState::new(&grid, false);
        state.elevation_mut().z.set(4, 3, -20.0);
        state.update_depth(&grid, config.wet_dry.d_min);
        state.transport_mut().u.set(3, 3, 0.5);

        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);
        // A face between a wet and a dry cell can still wet the dry one
        assert!(state.transport().u.get(3, 3) > 0.0);

        // Two dry neighbours: face depth at d_min, blending factor zero
        state.elevation_mut().z.set(3, 3, -20.0);
        state.update_depth(&grid, config.wet_dry.d_min);
        state.transport_mut().u.set(3, 3, 0.5);
        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);
        assert_eq!(state.transport().u.get(3, 3), 0.0);
    }

    /// 3x1 closed basin with a shallow shelf cell in the middle.
    fn shelf() -> Grid2D {
        Grid2D::new(3, 1, 1, 10.0, 10.0, |x, _| if (10.0..20.0).contains(&x) { 0.05 } else { 10.0 })
            .unwrap()
    }

    #[test]
    fn test_cell_at_min_depth_exports_nothing() {
        let grid = shelf();
        let config = frictionless(1.0);
        let mut state = BarotropicState::new(&grid, false);
        let d_min = config.wet_dry.d_min;
        // Middle cell drained to d_min, deep wet neighbours on both sides
        state.elevation_mut().z.set(1, 0, d_min - 0.05);
        state.update_depth(&grid, d_min);
        assert!((state.depth().d.get(1, 0) - d_min).abs() < 1e-15);
        state.transport_mut().u.set(0, 0, -0.5);
        state.transport_mut().u.set(1, 0, 0.5);

        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);

        // Face depths are well above d_crit, so only the outflow cap stops these
        assert_eq!(config.wet_dry.blending_factor(state.depth().du.get(1, 0)), 1.0);
        assert!(state.transport().u_ex.get(1, 0) > 0.0);
        assert!(state.transport().u_ex.get(0, 0) < 0.0);
        assert_eq!(state.transport().u.get(0, 0), 0.0);
        assert_eq!(state.transport().u.get(1, 0), 0.0);
    }

    #[test]
    fn test_inflow_to_dry_cell_not_limited() {
        let grid = shelf();
        let config = frictionless(1.0);
        let mut state = BarotropicState::new(&grid, false);
        let d_min = config.wet_dry.d_min;
        state.elevation_mut().z.set(1, 0, d_min - 0.05);
        state.update_depth(&grid, d_min);

        momentum_step(&grid, &config, &mut state, UpdateOrder::UFirst);

        // Higher surface on both sides pushes water onto the shelf
        assert!(state.transport().u.get(0, 0) > 0.0);
        assert!(state.transport().u.get(1, 0) < 0.0);
    }

    #[test]
    fn test_shelf_drains_without_creating_water() {
        use crate::solver::continuity::continuity_step;

        let grid = shelf();
        let config = frictionless(0.1);
        let d_min = config.wet_dry.d_min;
        let mut state = BarotropicState::new(&grid, false);
        state.transport_mut().u.set(0, 0, -0.5);
        state.transport_mut().u.set(1, 0, 0.5);

        let volume = |state: &BarotropicState| -> f64 {
            (0..3).map(|i| state.depth().d.get(i, 0)).sum::<f64>() * grid.cell_area()
        };
        let before = volume(&state);
        let mut limited_once = false;

        for step in 0..200 {
            let d_mid = state.depth().d.get(1, 0);
            momentum_step(&grid, &config, &mut state, UpdateOrder::for_step(step));

            let cap = config.wet_dry.max_outflow(d_mid, 0.0, grid.dx(), config.dt);
            let west_out = (-state.transport().u.get(0, 0)).max(0.0);
            let east_out = state.transport().u.get(1, 0).max(0.0);
            assert!(west_out <= cap && east_out <= cap, "step {step}");
            if d_mid <= d_min {
                assert_eq!(west_out, 0.0);
                assert_eq!(east_out, 0.0);
            }
            limited_once |= east_out > 0.0 && east_out == cap;

            let stats = continuity_step(&grid, &config, &mut state, step == 0);
            assert_eq!(stats.clamped, 0, "step {step}");
            assert!(state.depth().d.get(1, 0) >= d_min - 1e-15);
        }

        assert!(limited_once);
        assert!(((volume(&state) - before) / before).abs() < 1e-10);
    }

    #[test]
    fn test_update_order_alternates() {
        assert_eq!(UpdateOrder::for_step(0), UpdateOrder::UFirst);
        assert_eq!(UpdateOrder::for_step(1), UpdateOrder::VFirst);
        assert_eq!(UpdateOrder::for_step(2), UpdateOrder::UFirst);
    }
}
