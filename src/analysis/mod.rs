//! Diagnostics and stability monitoring.

mod diagnostics;
mod stability;

pub use diagnostics::{BarotropicDiagnostics, DiagnosticsTracker};
pub use stability::{StabilityMonitor, StabilityStatus, StabilityThresholds, StabilityWarning};
