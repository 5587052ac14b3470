//! Barotropic solver components.
//!
//! # Submodules
//!
//! - `momentum`: depth-integrated momentum with friction, Coriolis, advection
//!   and lateral diffusion
//! - `continuity`: elevation and depth update from the transport divergence
//! - `averaging`: long-step time filter and the hand-off to the 3D solver
//! - `breaking`: optional depth-limited wave breaking
//! - `halo`: halo-exchange hooks between the stages ([`HaloExchange`])
//! - `stepper`: [`BarotropicSolver`], which runs the stages in order
//!
//! Parameter types live in `config`, `friction`, `coriolis` and
//! `wetting_drying`.

mod averaging;
mod breaking;
mod config;
mod continuity;
mod coriolis;
mod friction;
mod halo;
mod kernel;
mod momentum;
mod stepper;
mod wetting_drying;

pub use averaging::{LongStepOutput, TimeFilter};
pub use breaking::{dissipation_weight, next_status, BreakingCounts};
pub use config::{BarotropicConfig, WaveBreakingConfig};
pub use coriolis::{four_point_transport, CoriolisParameter};
pub use friction::{implicit_correction, limited_slow_friction, FrictionConfig};
pub use halo::{HaloExchange, HaloField, NoExchange, SyncPoint};
pub use momentum::UpdateOrder;
pub use stepper::{BarotropicSolver, ExternalForcing, StepReport};
pub use wetting_drying::WetDryConfig;
