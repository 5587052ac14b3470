//! Runtime diagnostics for the barotropic mode.
//!
//! Provides:
//! - Volume of water in the tile (for conservation checks)
//! - Solution bounds (elevation, depth, transport, velocity)
//! - Courant and Froude numbers of the current state
//!
//! # Example
//!
//! ```
//! use baro_rs::analysis::{BarotropicDiagnostics, DiagnosticsTracker};
//! use baro_rs::grid::Grid2D;
//! use baro_rs::solver::BarotropicConfig;
//! use baro_rs::state::BarotropicState;
//!
//! let grid = Grid2D::flat(10, 10, 1, 100.0, 100.0, 5.0).unwrap();
//! let state = BarotropicState::new(&grid, false);
//! let config = BarotropicConfig::new(1.0, 10);
//!
//! let diag = BarotropicDiagnostics::compute(&grid, &state, &config);
//! assert!((diag.total_volume - 5.0 * 1.0e6).abs() < 1e-6);
//!
//! let tracker = DiagnosticsTracker::new(diag);
//! assert_eq!(tracker.volume_error(), 0.0);
//! ```

use crate::grid::Grid2D;
use crate::solver::BarotropicConfig;
use crate::state::BarotropicState;

/// Snapshot of diagnostic quantities of one tile.
#[derive(Clone, Debug, PartialEq)]
pub struct BarotropicDiagnostics {
    /// Water volume over wet-capable interior cells (m³)
    pub total_volume: f64,
    /// Largest |z| (m)
    pub max_elevation: f64,
    /// Smallest total depth on wet-capable cells (m)
    pub min_depth: f64,
    /// Largest total depth (m)
    pub max_depth: f64,
    /// Largest |U| or |V| on interior faces (m²/s)
    pub max_transport: f64,
    /// Largest cell-centred current speed (m/s)
    pub max_velocity: f64,
    /// Cell of the largest current speed
    pub max_velocity_at: (isize, isize),
    /// Largest Froude number |u|/√(gD)
    pub max_froude: f64,
    /// Advective plus gravity-wave Courant number
    pub courant_number: f64,
    /// Cells deeper than the critical depth
    pub wet_cells: usize,
    /// Cells at or below the minimum depth
    pub dry_cells: usize,
    /// Non-finite values among z, D, U and V
    pub non_finite: usize,
}

impl BarotropicDiagnostics {
    /// Compute all diagnostics from the current state.
    pub fn compute(grid: &Grid2D, state: &BarotropicState, config: &BarotropicConfig) -> Self {
        let ext = grid.extent();
        let mask = grid.mask();
        let (g, dt) = (config.g, config.dt);
        let area = grid.cell_area();

        let d = &state.depth().d;
        let z = &state.elevation().z;
        let u = &state.transport().u;
        let v = &state.transport().v;

        let mut diag = Self {
            total_volume: 0.0,
            max_elevation: 0.0,
            min_depth: f64::INFINITY,
            max_depth: 0.0,
            max_transport: 0.0,
            max_velocity: 0.0,
            max_velocity_at: (0, 0),
            max_froude: 0.0,
            courant_number: 0.0,
            wet_cells: 0,
            dry_cells: 0,
            non_finite: 0,
        };

        for (i, j) in ext.interior() {
            for q in [u.get(i, j), v.get(i, j)] {
                if q.is_finite() {
                    diag.max_transport = diag.max_transport.max(q.abs());
                } else {
                    diag.non_finite += 1;
                }
            }

            if !mask.is_wet_capable(i, j) {
                continue;
            }
            let depth = d.get(i, j);
            let elev = z.get(i, j);
            if !(depth.is_finite() && elev.is_finite()) {
                diag.non_finite += 1;
                continue;
            }

            diag.total_volume += depth * area;
            diag.max_elevation = diag.max_elevation.max(elev.abs());
            diag.min_depth = diag.min_depth.min(depth);
            diag.max_depth = diag.max_depth.max(depth);

            if depth <= config.wet_dry.d_min {
                diag.dry_cells += 1;
            }
            if depth <= config.wet_dry.d_crit {
                continue;
            }
            diag.wet_cells += 1;

            let uc = 0.5 * (u.get(i - 1, j) + u.get(i, j)) / depth;
            let vc = 0.5 * (v.get(i, j - 1) + v.get(i, j)) / depth;
            let speed = (uc * uc + vc * vc).sqrt();
            let c = (g * depth).sqrt();

            if speed > diag.max_velocity {
                diag.max_velocity = speed;
                diag.max_velocity_at = (i, j);
            }
            diag.max_froude = diag.max_froude.max(speed / c);
            let courant = dt * ((uc.abs() + c) / grid.dx() + (vc.abs() + c) / grid.dy());
            diag.courant_number = diag.courant_number.max(courant);
        }

        if !diag.min_depth.is_finite() {
            diag.min_depth = 0.0;
        }
        diag
    }

    /// Whether no non-finite value was found.
    pub fn is_finite(&self) -> bool {
        self.non_finite == 0 && self.total_volume.is_finite()
    }

    /// Format diagnostics as a single-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "V={:.6e} |z|_max={:.3} D=[{:.3},{:.3}] |U|_max={:.3} |u|_max={:.3} Fr={:.3} C={:.3} wet={}",
            self.total_volume,
            self.max_elevation,
            self.min_depth,
            self.max_depth,
            self.max_transport,
            self.max_velocity,
            self.max_froude,
            self.courant_number,
            self.wet_cells
        )
    }
}

/// Track diagnostics over time for monitoring conservation and stability.
#[derive(Clone, Debug)]
pub struct DiagnosticsTracker {
    initial: BarotropicDiagnostics,
    current: BarotropicDiagnostics,
    current_time: f64,
    n_updates: usize,
    max_courant_seen: f64,
    max_velocity_seen: f64,
    min_depth_seen: f64,
}

impl DiagnosticsTracker {
    /// Create a new tracker with initial diagnostics.
    pub fn new(initial: BarotropicDiagnostics) -> Self {
        Self {
            current: initial.clone(),
            current_time: 0.0,
            n_updates: 0,
            max_courant_seen: initial.courant_number,
            max_velocity_seen: initial.max_velocity,
            min_depth_seen: initial.min_depth,
            initial,
        }
    }

    /// Update tracker with new diagnostics.
    pub fn update(&mut self, time: f64, diag: BarotropicDiagnostics) {
        self.current_time = time;
        self.n_updates += 1;
        self.max_courant_seen = self.max_courant_seen.max(diag.courant_number);
        self.max_velocity_seen = self.max_velocity_seen.max(diag.max_velocity);
        self.min_depth_seen = self.min_depth_seen.min(diag.min_depth);
        self.current = diag;
    }

    /// Relative change of the water volume since the first snapshot.
    pub fn volume_error(&self) -> f64 {
        if self.initial.total_volume.abs() > 1e-14 {
            (self.current.total_volume - self.initial.total_volume).abs()
                / self.initial.total_volume.abs()
        } else {
            0.0
        }
    }

    /// Most recent diagnostics.
    pub fn current(&self) -> &BarotropicDiagnostics {
        &self.current
    }

    /// First diagnostics.
    pub fn initial(&self) -> &BarotropicDiagnostics {
        &self.initial
    }

    /// Model time of the last update.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Number of updates so far.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// Largest Courant number seen.
    pub fn max_courant_seen(&self) -> f64 {
        self.max_courant_seen
    }

    /// Largest current speed seen.
    pub fn max_velocity_seen(&self) -> f64 {
        self.max_velocity_seen
    }

    /// Smallest depth seen.
    pub fn min_depth_seen(&self) -> f64 {
        self.min_depth_seen
    }
}
