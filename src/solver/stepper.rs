//! Short-step driver of the barotropic mode.
//!
//! One short step runs, in order:
//!
//! 1. open-boundary elevations for the new time level
//! 2. momentum (U/V order alternating), then halo sync `AfterMomentum`
//! 3. continuity, then halo sync `AfterContinuity`
//! 4. wave breaking when enabled, then halo sync `AfterBreaking`
//! 5. time filter; every `mode_split` steps the long-step averages are handed off
//!
//! Non-finite values are always fatal. Clamping of transports or depths is
//! counted and logged, and fatal only in strict mode.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::analysis::{BarotropicDiagnostics, StabilityMonitor};
use crate::boundary::BoundaryForcing;
use crate::error::{BarotropicError, Result};
use crate::grid::Grid2D;
use crate::io::{self, RestartMeta};
use crate::solver::averaging::{LongStepOutput, TimeFilter};
use crate::solver::breaking::{breaking_step, BreakingCounts};
use crate::solver::config::BarotropicConfig;
use crate::solver::continuity::continuity_step;
use crate::solver::halo::{exchange_at, HaloExchange, SyncPoint};
use crate::solver::kernel::RowStats;
use crate::solver::momentum::{momentum_step, UpdateOrder};
use crate::state::{BarotropicState, BreakingFields, Field2D, FieldId, SlowTerms};
use crate::types::GridLocation;

// =============================================================================
// Step report
// =============================================================================

/// Outcome of one short step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Steps taken after this one
    pub step: u64,
    /// Model time after this step (s)
    pub time: f64,
    /// Order of the transport updates
    pub order: UpdateOrder,
    /// Transports clamped to the sanity bound
    pub clamped_transports: usize,
    /// Cells lifted to the minimum depth
    pub clamped_depths: usize,
    /// Wave-breaking cell counts (zero when disabled)
    pub breaking: BreakingCounts,
    /// Whether this step closed a long-step window
    pub window_closed: bool,
}

// =============================================================================
// External inputs
// =============================================================================

/// Fields supplied by forcing providers between short steps.
///
/// Only the fields that are `Some` are replaced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalForcing {
    /// Bed roughness length at U-points (m)
    pub zub0: Option<Field2D>,
    /// Bed roughness length at V-points (m)
    pub zvb0: Option<Field2D>,
    /// Horizontal dissipation coefficient at T-points (m²/s)
    pub an: Option<Field2D>,
    /// Horizontal dissipation coefficient at X-points (m²/s)
    pub an_x: Option<Field2D>,
    /// Freshwater flux (m/s)
    pub fwf: Option<Field2D>,
}

impl ExternalForcing {
    pub fn with_roughness(mut self, zub0: Field2D, zvb0: Field2D) -> Self {
        self.zub0 = Some(zub0);
        self.zvb0 = Some(zvb0);
        self
    }

    pub fn with_dissipation(mut self, an: Field2D, an_x: Field2D) -> Self {
        self.an = Some(an);
        self.an_x = Some(an_x);
        self
    }

    pub fn with_freshwater(mut self, fwf: Field2D) -> Self {
        self.fwf = Some(fwf);
        self
    }

    fn fields(&self) -> [(FieldId, Option<&Field2D>); 5] {
        [
            (FieldId::Zub0, self.zub0.as_ref()),
            (FieldId::Zvb0, self.zvb0.as_ref()),
            (FieldId::An, self.an.as_ref()),
            (FieldId::AnX, self.an_x.as_ref()),
            (FieldId::Fwf, self.fwf.as_ref()),
        ]
    }
}

// =============================================================================
// Solver
// =============================================================================

/// Barotropic mode of one tile.
///
/// # Example
///
/// ```
/// use baro_rs::boundary::BoundaryForcing;
/// use baro_rs::grid::Grid2D;
/// use baro_rs::solver::{BarotropicConfig, BarotropicSolver, NoExchange};
///
/// let grid = Grid2D::closed_basin(20, 10, 1, 100.0, 100.0, 5.0).unwrap();
/// let config = BarotropicConfig::new(2.0, 10);
/// let mut solver = BarotropicSolver::new(grid, config, BoundaryForcing::closed()).unwrap();
///
/// solver.set_initial_elevation(|x, _| if x < 1000.0 { 0.1 } else { 0.0 });
/// let output = solver.run_long_step(&mut NoExchange).unwrap();
/// assert_eq!(output.time, 20.0);
/// ```
#[derive(Debug)]
pub struct BarotropicSolver {
    grid: Grid2D,
    config: BarotropicConfig,
    forcing: BoundaryForcing,
    state: BarotropicState,
    filter: TimeFilter,
    monitor: Option<StabilityMonitor>,
    time: f64,
    step: u64,
}

impl BarotropicSolver {
    /// Validate the configuration against the grid and allocate the state.
    ///
    /// # Errors
    /// - `InvalidConfig` for bad parameters or a gravity-wave Courant number above one
    /// - `MissingBoundarySeries`/`ShapeMismatch` for inconsistent boundary forcing
    pub fn new(grid: Grid2D, config: BarotropicConfig, forcing: BoundaryForcing) -> Result<Self> {
        config.validate()?;
        check_courant(&grid, &config)?;
        forcing.validate(&grid)?;

        let state = BarotropicState::new(&grid, config.breaking.is_some());
        let filter = TimeFilter::new(grid.extent(), config.mode_split);
        let mut solver = Self {
            grid,
            config,
            forcing,
            state,
            filter,
            monitor: None,
            time: 0.0,
            step: 0,
        };
        solver.initialise_fields();

        info!(
            grid = %solver.grid.extent(),
            dt = solver.config.dt,
            mode_split = solver.config.mode_split,
            breaking = solver.config.breaking.is_some(),
            "barotropic solver initialised"
        );
        Ok(solver)
    }

    /// Check stability at the end of every long step.
    pub fn with_stability_monitor(mut self, monitor: StabilityMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    fn initialise_fields(&mut self) {
        let z0 = self.config.friction.z0;
        self.state.forcing.zub0.fill(z0);
        self.state.forcing.zvb0.fill(z0);
        let lifted = self.state.update_depth(&self.grid, self.config.wet_dry.d_min);
        if lifted > 0 {
            debug!(cells = lifted, "initial elevation lifted to minimum depth");
        }
    }

    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    pub fn config(&self) -> &BarotropicConfig {
        &self.config
    }

    pub fn state(&self) -> &BarotropicState {
        &self.state
    }

    /// Mutable state for setting initial transports.
    pub fn state_mut(&mut self) -> &mut BarotropicState {
        &mut self.state
    }

    /// Model time (s).
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Short steps taken.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Long-step time filter.
    pub fn filter(&self) -> &TimeFilter {
        &self.filter
    }

    /// Attached stability monitor.
    pub fn monitor(&self) -> Option<&StabilityMonitor> {
        self.monitor.as_ref()
    }

    /// Set `z` on water cells from cell-centre coordinates and refresh `D`.
    ///
    /// Returns the number of cells lifted to the minimum depth.
    pub fn set_initial_elevation<F>(&mut self, elevation: F) -> usize
    where
        F: Fn(f64, f64) -> f64,
    {
        for (i, j) in self.grid.extent().cells() {
            if self.grid.mask().is_wet_capable(i, j) {
                let x = self.grid.x_of(i, GridLocation::Center);
                let y = self.grid.y_of(j, GridLocation::Center);
                self.state.elevation.z.set(i, j, elevation(x, y));
            }
        }
        let lifted = self.state.update_depth(&self.grid, self.config.wet_dry.d_min);
        self.state.elevation.zo.copy_from(&self.state.elevation.z);
        lifted
    }

    /// Hand over new slow terms from the 3D solver.
    pub fn set_slow_terms(&mut self, slow: SlowTerms) -> Result<()> {
        slow.ensure(self.state.extent())?;
        self.state.slow = slow;
        Ok(())
    }

    /// Replace externally supplied fields.
    ///
    /// All fields are checked before any is copied.
    pub fn set_external_forcing(&mut self, forcing: &ExternalForcing) -> Result<()> {
        let extent = self.state.extent();
        for (id, field) in forcing.fields() {
            if let Some(field) = field {
                field.ensure(id.name(), extent, id.location())?;
            }
        }
        for (id, field) in forcing.fields() {
            if let Some(field) = field {
                self.state.field_mut(id).copy_from(field);
            }
        }
        Ok(())
    }

    /// Advance one short step.
    pub fn step<E>(&mut self, exchange: &mut E) -> Result<StepReport>
    where
        E: HaloExchange + ?Sized,
    {
        let t_new = self.time + self.config.dt;
        let d_min = self.config.wet_dry.d_min;

        self.forcing.apply(
            &self.grid,
            t_new,
            d_min,
            &mut self.state.boundary,
            &mut self.state.elevation.z,
            &mut self.state.depth.d,
        )?;

        let order = UpdateOrder::for_step(self.step);
        let stats = momentum_step(&self.grid, &self.config, &mut self.state, order);
        let clamped_transports = self.absorb("transport bound", stats)?;
        exchange_at(exchange, SyncPoint::AfterMomentum, &mut self.state)?;

        let window_start = !self.filter.is_window_open();
        let stats = continuity_step(&self.grid, &self.config, &mut self.state, window_start);
        let mut clamped_depths = self.absorb("minimum depth", stats)?;
        exchange_at(exchange, SyncPoint::AfterContinuity, &mut self.state)?;

        let mut breaking = BreakingCounts::default();
        if let Some(params) = &self.config.breaking {
            breaking = breaking_step(&self.grid, &self.config, params, &mut self.state);
            clamped_depths += self.absorb(
                "breaking minimum depth",
                RowStats {
                    clamped: breaking.clamped,
                    non_finite: 0,
                },
            )?;
            exchange_at(exchange, SyncPoint::AfterBreaking, &mut self.state)?;
        }

        let window_closed = self.filter.accumulate(&mut self.state, self.config.long_dt());
        self.time = t_new;
        self.step += 1;

        if window_closed {
            self.check_stability()?;
        }

        Ok(StepReport {
            step: self.step,
            time: self.time,
            order,
            clamped_transports,
            clamped_depths,
            breaking,
            window_closed,
        })
    }

    /// Run short steps until the current long-step window closes.
    pub fn run_long_step<E>(&mut self, exchange: &mut E) -> Result<LongStepOutput<'_>>
    where
        E: HaloExchange + ?Sized,
    {
        loop {
            if self.step(exchange)?.window_closed {
                break;
            }
        }
        Ok(self.long_step_output())
    }

    /// Averages of the most recently closed window.
    pub fn long_step_output(&self) -> LongStepOutput<'_> {
        LongStepOutput::new(&self.state, self.time, self.config.long_dt())
    }

    /// Diagnostics of the current state.
    pub fn diagnostics(&self) -> BarotropicDiagnostics {
        BarotropicDiagnostics::compute(&self.grid, &self.state, &self.config)
    }

    /// Switch to a new grid, reallocating all fields to zero.
    ///
    /// # Errors
    /// - `WindowOpen` while short steps of the current long step are pending
    /// - any configuration error of [`BarotropicSolver::new`] for the new grid
    pub fn resize(&mut self, grid: Grid2D, forcing: BoundaryForcing) -> Result<()> {
        if self.filter.is_window_open() {
            return Err(BarotropicError::WindowOpen {
                position: self.filter.window_position(),
                mode_split: self.filter.mode_split(),
            });
        }
        check_courant(&grid, &self.config)?;
        forcing.validate(&grid)?;

        self.state.reallocate(&grid);
        self.filter.reallocate(grid.extent());
        self.grid = grid;
        self.forcing = forcing;
        self.initialise_fields();
        info!(grid = %self.grid.extent(), "barotropic solver resized");
        Ok(())
    }

    /// Write a restart file of the current state.
    pub fn save_restart(&self, path: impl AsRef<Path>) -> Result<()> {
        let meta = RestartMeta {
            time: self.time,
            step: self.step,
        };
        io::save_restart(path, &self.state, meta)?;
        Ok(())
    }

    /// Restore the state and clock from a restart file.
    ///
    /// The averaging window restarts empty and wave-breaking cells start
    /// inactive, since neither is persisted.
    pub fn load_restart(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let meta = io::load_restart(path, &mut self.state)?;
        self.state.check_consistency()?;
        if let Some(breaking) = self.state.breaking.as_mut() {
            *breaking = BreakingFields::new(self.grid.extent());
        }
        self.filter.reset();
        self.time = meta.time;
        self.step = meta.step;
        Ok(())
    }

    /// Finish the run and hand back the state.
    pub fn teardown(self) -> BarotropicState {
        info!(time = self.time, steps = self.step, "barotropic solver torn down");
        self.state
    }

    /// Turn kernel counters into log events or errors.
    fn absorb(&self, bound: &str, stats: RowStats) -> Result<usize> {
        let step = self.step;
        if stats.non_finite > 0 {
            error!(step, count = stats.non_finite, bound, "non-finite values");
            return Err(BarotropicError::Instability {
                step,
                message: format!("{} non-finite values ({})", stats.non_finite, bound),
            });
        }
        if stats.clamped > 0 {
            if self.config.strict {
                return Err(BarotropicError::Instability {
                    step,
                    message: format!("{} values clamped to {}", stats.clamped, bound),
                });
            }
            warn!(step, count = stats.clamped, bound, "values clamped");
        }
        Ok(stats.clamped)
    }

    fn check_stability(&mut self) -> Result<()> {
        let Some(monitor) = self.monitor.as_mut() else {
            return Ok(());
        };
        let diag = BarotropicDiagnostics::compute(&self.grid, &self.state, &self.config);
        debug!(time = self.time, summary = %diag.summary_line(), "long step diagnostics");
        let status = monitor.check(&diag);
        if !status.is_stable {
            monitor.log_report(self.time, self.step);
        }
        if monitor.should_stop() {
            return Err(BarotropicError::Instability {
                step: self.step,
                message: format!(
                    "stability monitor stopped the run after {} consecutive warnings",
                    monitor.consecutive_warnings()
                ),
            });
        }
        Ok(())
    }
}

fn check_courant(grid: &Grid2D, config: &BarotropicConfig) -> Result<()> {
    let courant = grid.gravity_wave_courant(config.g, config.dt);
    if courant > 1.0 {
        return Err(BarotropicError::InvalidConfig(format!(
            "gravity-wave Courant number {:.3} exceeds 1 (dt = {} s)",
            courant, config.dt
        )));
    }
    Ok(())
}
