//! Stability monitoring of the barotropic mode.
//!
//! Checks a [`BarotropicDiagnostics`] snapshot against thresholds and keeps
//! track of how many checks in a row raised warnings. The solver runs a check
//! at the end of every long step when a monitor is attached.
//!
//! # Example
//!
//! ```
//! use baro_rs::analysis::{BarotropicDiagnostics, StabilityMonitor, StabilityThresholds};
//! use baro_rs::grid::Grid2D;
//! use baro_rs::solver::BarotropicConfig;
//! use baro_rs::state::BarotropicState;
//!
//! let grid = Grid2D::flat(8, 8, 1, 200.0, 200.0, 10.0).unwrap();
//! let state = BarotropicState::new(&grid, false);
//! let diag = BarotropicDiagnostics::compute(&grid, &state, &BarotropicConfig::new(5.0, 20));
//!
//! let mut monitor = StabilityMonitor::new(StabilityThresholds::coastal_default());
//! let status = monitor.check(&diag);
//! assert!(status.is_stable);
//! assert!(!monitor.should_stop());
//! ```

use std::fmt;

use tracing::warn;

use crate::analysis::BarotropicDiagnostics;

/// Thresholds for stability monitoring.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct StabilityThresholds {
    /// Maximum |z| (m).
    pub max_elevation: f64,
    /// Minimum total depth (m).
    pub min_depth: f64,
    /// Maximum current speed (m/s).
    pub max_velocity: f64,
    /// Maximum Courant number.
    pub max_courant: f64,
    /// Maximum Froude number.
    pub max_froude: f64,
    /// Maximum consecutive warnings before recommending stop.
    pub max_consecutive_warnings: usize,
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self::coastal_default()
    }
}

impl StabilityThresholds {
    /// Default thresholds for tidal estuaries and shelf seas.
    ///
    /// - max_elevation: 20 m
    /// - min_depth: 0 m
    /// - max_velocity: 10 m/s
    /// - max_courant: 1.0
    /// - max_froude: 2.0
    /// - max_consecutive_warnings: 10
    pub fn coastal_default() -> Self {
        Self {
            max_elevation: 20.0,
            min_depth: 0.0,
            max_velocity: 10.0,
            max_courant: 1.0,
            max_froude: 2.0,
            max_consecutive_warnings: 10,
        }
    }

    /// Strict thresholds for detecting issues early.
    pub fn strict() -> Self {
        Self {
            max_elevation: 5.0,
            min_depth: 0.0,
            max_velocity: 3.0,
            max_courant: 0.8,
            max_froude: 1.0,
            max_consecutive_warnings: 3,
        }
    }

    /// Relaxed thresholds that only catch catastrophic blow-up.
    pub fn relaxed() -> Self {
        Self {
            max_elevation: 1000.0,
            min_depth: -1.0,
            max_velocity: 1000.0,
            max_courant: 10.0,
            max_froude: 100.0,
            max_consecutive_warnings: 100,
        }
    }

    /// Set maximum elevation threshold.
    pub fn with_max_elevation(mut self, max_elevation: f64) -> Self {
        self.max_elevation = max_elevation;
        self
    }

    /// Set minimum depth threshold.
    pub fn with_min_depth(mut self, min_depth: f64) -> Self {
        self.min_depth = min_depth;
        self
    }

    /// Set maximum velocity threshold.
    pub fn with_max_velocity(mut self, max_velocity: f64) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    /// Set maximum Courant number.
    pub fn with_max_courant(mut self, max_courant: f64) -> Self {
        self.max_courant = max_courant;
        self
    }

    /// Set maximum Froude number.
    pub fn with_max_froude(mut self, max_froude: f64) -> Self {
        self.max_froude = max_froude;
        self
    }
}

/// Types of stability warnings.
#[derive(Debug, Clone, PartialEq)]
pub enum StabilityWarning {
    /// Surface elevation exceeds the threshold.
    ElevationExceedsMax { value: f64, threshold: f64 },
    /// Total depth below the threshold.
    DepthBelowMin { value: f64, threshold: f64 },
    /// Current speed exceeds the threshold.
    VelocityExceedsMax {
        i: isize,
        j: isize,
        value: f64,
        threshold: f64,
    },
    /// Courant number exceeds the threshold.
    CourantExceedsMax { value: f64, threshold: f64 },
    /// Froude number exceeds the threshold.
    FroudeExceedsMax { value: f64, threshold: f64 },
    /// Non-finite values detected (NaN or Inf).
    NonFiniteValues { count: usize },
    /// Solution has blown up catastrophically.
    SolutionBlowUp,
}

impl fmt::Display for StabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElevationExceedsMax { value, threshold } => {
                write!(f, "Elevation exceeds max: |z|={:.3}m > {:.3}m", value, threshold)
            }
            Self::DepthBelowMin { value, threshold } => {
                write!(f, "Depth below min: D={:.6}m < {:.6}m", value, threshold)
            }
            Self::VelocityExceedsMax {
                i,
                j,
                value,
                threshold,
            } => write!(
                f,
                "Velocity exceeds max: |u|={:.2}m/s > {:.2}m/s at cell ({}, {})",
                value, threshold, i, j
            ),
            Self::CourantExceedsMax { value, threshold } => {
                write!(f, "Courant number exceeds max: {:.3} > {:.3}", value, threshold)
            }
            Self::FroudeExceedsMax { value, threshold } => {
                write!(f, "Froude number exceeds max: {:.3} > {:.3}", value, threshold)
            }
            Self::NonFiniteValues { count } => write!(f, "{} non-finite values", count),
            Self::SolutionBlowUp => write!(f, "SOLUTION BLOW-UP DETECTED"),
        }
    }
}

/// Result of one stability check.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityStatus {
    /// Total depth range (min, max).
    pub depth_range: (f64, f64),
    /// Largest current speed.
    pub max_velocity: f64,
    /// Courant number.
    pub courant_number: f64,
    /// Whether no warning was raised.
    pub is_stable: bool,
    /// Warnings raised.
    pub warnings: Vec<StabilityWarning>,
}

impl StabilityStatus {
    /// Check if any warnings were generated.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if any critical warnings (blow-up, non-finite) were detected.
    pub fn has_critical_warnings(&self) -> bool {
        self.warnings.iter().any(|w| {
            matches!(
                w,
                StabilityWarning::SolutionBlowUp | StabilityWarning::NonFiniteValues { .. }
            )
        })
    }
}

/// Monitor for tracking solution stability.
#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    thresholds: StabilityThresholds,
    consecutive_warnings: usize,
    total_checks: usize,
    total_warnings: usize,
    last_status: Option<StabilityStatus>,
}

impl Default for StabilityMonitor {
    fn default() -> Self {
        Self::new(StabilityThresholds::default())
    }
}

impl StabilityMonitor {
    /// Create a new stability monitor with the given thresholds.
    pub fn new(thresholds: StabilityThresholds) -> Self {
        Self {
            thresholds,
            consecutive_warnings: 0,
            total_checks: 0,
            total_warnings: 0,
            last_status: None,
        }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> &StabilityThresholds {
        &self.thresholds
    }

    /// Number of consecutive checks with warnings.
    pub fn consecutive_warnings(&self) -> usize {
        self.consecutive_warnings
    }

    /// Total number of checks performed.
    pub fn total_checks(&self) -> usize {
        self.total_checks
    }

    /// Total number of warnings generated.
    pub fn total_warnings(&self) -> usize {
        self.total_warnings
    }

    /// Last stability status.
    pub fn last_status(&self) -> Option<&StabilityStatus> {
        self.last_status.as_ref()
    }

    /// Check a diagnostics snapshot against the thresholds.
    pub fn check(&mut self, diag: &BarotropicDiagnostics) -> StabilityStatus {
        self.total_checks += 1;
        let t = &self.thresholds;
        let mut warnings = Vec::new();

        if diag.non_finite > 0 {
            warnings.push(StabilityWarning::NonFiniteValues {
                count: diag.non_finite,
            });
        }
        if diag.max_elevation > t.max_elevation {
            warnings.push(StabilityWarning::ElevationExceedsMax {
                value: diag.max_elevation,
                threshold: t.max_elevation,
            });
        }
        if diag.min_depth < t.min_depth {
            warnings.push(StabilityWarning::DepthBelowMin {
                value: diag.min_depth,
                threshold: t.min_depth,
            });
        }
        if diag.max_velocity > t.max_velocity {
            let (i, j) = diag.max_velocity_at;
            warnings.push(StabilityWarning::VelocityExceedsMax {
                i,
                j,
                value: diag.max_velocity,
                threshold: t.max_velocity,
            });
        }
        if diag.courant_number > t.max_courant {
            warnings.push(StabilityWarning::CourantExceedsMax {
                value: diag.courant_number,
                threshold: t.max_courant,
            });
        }
        if diag.max_froude > t.max_froude {
            warnings.push(StabilityWarning::FroudeExceedsMax {
                value: diag.max_froude,
                threshold: t.max_froude,
            });
        }

        // Catastrophic blow-up
        if diag.non_finite > 0 || diag.max_velocity > 1e3 || diag.max_elevation > 1e4 {
            warnings.push(StabilityWarning::SolutionBlowUp);
        }

        let is_stable = warnings.is_empty();
        if is_stable {
            self.consecutive_warnings = 0;
        } else {
            self.consecutive_warnings += 1;
            self.total_warnings += warnings.len();
        }

        let status = StabilityStatus {
            depth_range: (diag.min_depth, diag.max_depth),
            max_velocity: diag.max_velocity,
            courant_number: diag.courant_number,
            is_stable,
            warnings,
        };
        self.last_status = Some(status.clone());
        status
    }

    /// Check if the simulation should be stopped based on warning history.
    pub fn should_stop(&self) -> bool {
        if self.consecutive_warnings >= self.thresholds.max_consecutive_warnings {
            return true;
        }
        self.last_status
            .as_ref()
            .is_some_and(StabilityStatus::has_critical_warnings)
    }

    /// Suggested remediation actions for the last warnings.
    pub fn suggest_remediation(&self) -> Vec<String> {
        let mut suggestions = Vec::new();

        if let Some(status) = &self.last_status {
            for warning in &status.warnings {
                let hint = match warning {
                    StabilityWarning::ElevationExceedsMax { .. } => {
                        "Elevation exceeds threshold: check open-boundary series and their units"
                    }
                    StabilityWarning::DepthBelowMin { .. } => {
                        "Depth below threshold: check minimum depth and bathymetry sign (positive down)"
                    }
                    StabilityWarning::VelocityExceedsMax { .. } => {
                        "Velocity exceeds threshold: increase bottom roughness or lateral dissipation"
                    }
                    StabilityWarning::CourantExceedsMax { .. } => {
                        "Courant number too large: reduce the short time step"
                    }
                    StabilityWarning::FroudeExceedsMax { .. } => {
                        "Supercritical flow: consider enabling wave breaking"
                    }
                    StabilityWarning::NonFiniteValues { .. } | StabilityWarning::SolutionBlowUp => {
                        "Solution blow-up: reduce the short time step or ramp up boundary forcing"
                    }
                };
                suggestions.push(hint.to_string());
            }
        }

        suggestions.sort();
        suggestions.dedup();
        suggestions
    }

    /// Log the last status through `tracing` if it raised warnings.
    pub fn log_report(&self, time: f64, step: u64) {
        let Some(status) = &self.last_status else {
            return;
        };
        if status.is_stable {
            return;
        }
        for warning in &status.warnings {
            warn!(time, step, %warning, "stability warning");
        }
        if self.should_stop() {
            for suggestion in self.suggest_remediation() {
                warn!(time, step, %suggestion, "recommend stopping the run");
            }
        }
    }
}
