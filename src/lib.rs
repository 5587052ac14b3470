//! # baro-rs
//!
//! Split-explicit barotropic (2D) mode for free-surface ocean and estuary
//! models.
//!
//! The depth-integrated shallow-water equations are advanced with a short time
//! step on an Arakawa C grid, while a 3D model advances baroclinic processes
//! with a long step of `mode_split` short steps. This crate provides:
//! - The 2D state store (33 persisted fields plus open-boundary arrays)
//! - Momentum and continuity steppers with wetting/drying, log-law bottom
//!   friction, Coriolis, upwind advection and lateral diffusion
//! - Time-varying open-boundary elevation forcing
//! - The long-step time filter handing averaged transports to the 3D model
//! - Optional depth-limited wave breaking
//! - Halo-exchange hooks for domain decomposition
//! - Binary restart files, diagnostics and stability monitoring
//!
//! # Example
//!
//! ```
//! use baro_rs::{BarotropicConfig, BarotropicSolver, BoundaryForcing, Grid2D, NoExchange};
//!
//! let grid = Grid2D::closed_basin(30, 10, 1, 200.0, 200.0, 8.0).unwrap();
//! let config = BarotropicConfig::new(5.0, 12);
//! let mut solver = BarotropicSolver::new(grid, config, BoundaryForcing::closed()).unwrap();
//!
//! solver.set_initial_elevation(|x, _| 0.05 * (x / 6000.0 - 0.5));
//! let volume = solver.diagnostics().total_volume;
//! for _ in 0..3 {
//!     solver.run_long_step(&mut NoExchange).unwrap();
//! }
//! assert!((solver.diagnostics().total_volume - volume).abs() / volume < 1e-12);
//! ```

pub mod analysis;
pub mod boundary;
pub mod error;
pub mod grid;
pub mod io;
pub mod solver;
pub mod state;
pub mod types;

pub use analysis::{BarotropicDiagnostics, StabilityMonitor, StabilityThresholds};
pub use boundary::{BoundaryForcing, ElevationSeries, ExtrapolationPolicy};
pub use error::{BarotropicError, Result};
pub use grid::{CellKind, Grid2D, GridExtent};
pub use solver::{
    BarotropicConfig, BarotropicSolver, CoriolisParameter, ExternalForcing, FrictionConfig,
    HaloExchange, LongStepOutput, NoExchange, StepReport, SyncPoint, WaveBreakingConfig,
    WetDryConfig,
};
pub use state::{BarotropicState, BreakStatus, Field2D, FieldId, N2D_FIELDS};
pub use types::{GridLocation, Side, SideBoundaries};
