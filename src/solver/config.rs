//! Configuration of the barotropic solver.

use crate::error::{BarotropicError, Result};
use crate::solver::coriolis::CoriolisParameter;
use crate::solver::friction::FrictionConfig;
use crate::solver::wetting_drying::WetDryConfig;

/// Wave-breaking parameters.
///
/// Supplying this in [`BarotropicConfig::breaking`] allocates the breaking
/// mask and status fields and enables the breaking pass.
#[derive(Clone, Copy, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct WaveBreakingConfig {
    /// Froude number |u|/√(gD) above which a cell breaks
    pub froude_threshold: f64,
    /// Surface slope |∇z| above which a cell breaks
    pub slope_threshold: f64,
    /// Short steps of decaying dissipation after breaking stops (≥ 1)
    pub relaxation_steps: u32,
    /// Transport damping rate at full breaking (1/s)
    pub damping_rate: f64,
    /// Elevation diffusivity at full breaking (m²/s)
    pub diffusivity: f64,
}

impl Default for WaveBreakingConfig {
    fn default() -> Self {
        Self {
            froude_threshold: 0.8,
            slope_threshold: 0.3,
            relaxation_steps: 10,
            damping_rate: 0.05,
            diffusivity: 1.0,
        }
    }
}

impl WaveBreakingConfig {
    /// Set the Froude threshold.
    pub fn with_froude_threshold(mut self, threshold: f64) -> Self {
        self.froude_threshold = threshold;
        self
    }

    /// Set the slope threshold.
    pub fn with_slope_threshold(mut self, threshold: f64) -> Self {
        self.slope_threshold = threshold;
        self
    }

    /// Set the number of recovery steps.
    pub fn with_relaxation_steps(mut self, steps: u32) -> Self {
        self.relaxation_steps = steps;
        self
    }

    /// Set damping rate and elevation diffusivity.
    pub fn with_dissipation(mut self, damping_rate: f64, diffusivity: f64) -> Self {
        self.damping_rate = damping_rate;
        self.diffusivity = diffusivity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.relaxation_steps == 0 {
            return Err(BarotropicError::InvalidConfig(
                "wave breaking needs at least one relaxation step".into(),
            ));
        }
        for (name, value) in [
            ("froude_threshold", self.froude_threshold),
            ("slope_threshold", self.slope_threshold),
            ("damping_rate", self.damping_rate),
            ("diffusivity", self.diffusivity),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(BarotropicError::InvalidConfig(format!(
                    "wave breaking {} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Complete configuration of the barotropic mode.
///
/// # Example
///
/// ```
/// use baro_rs::solver::{BarotropicConfig, CoriolisParameter};
///
/// let config = BarotropicConfig::new(5.0, 20)
///     .with_coriolis(CoriolisParameter::f_plane(1e-4))
///     .with_advection(true);
/// assert!(config.validate().is_ok());
/// assert!((config.long_dt() - 100.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BarotropicConfig {
    /// Gravitational acceleration (m/s²)
    pub g: f64,
    /// Short (barotropic) time step (s)
    pub dt: f64,
    /// Short steps per long (3D) step
    pub mode_split: usize,
    /// Wetting/drying thresholds
    pub wet_dry: WetDryConfig,
    /// Bottom friction
    pub friction: FrictionConfig,
    /// Rotation
    pub coriolis: CoriolisParameter,
    /// First-order upwind momentum advection
    pub advection: bool,
    /// Lateral transport diffusion with `An`/`AnX`
    pub lateral_diffusion: bool,
    /// Transport magnitude (m²/s) above which values are clamped
    pub max_transport: f64,
    /// Promote clamping events to fatal errors
    pub strict: bool,
    /// Wave breaking, if enabled
    pub breaking: Option<WaveBreakingConfig>,
}

impl Default for BarotropicConfig {
    fn default() -> Self {
        Self::new(10.0, 30)
    }
}

impl BarotropicConfig {
    /// Configuration with the given short step and mode-splitting ratio.
    pub fn new(dt: f64, mode_split: usize) -> Self {
        Self {
            g: 9.81,
            dt,
            mode_split,
            wet_dry: WetDryConfig::default(),
            friction: FrictionConfig::default(),
            coriolis: CoriolisParameter::none(),
            advection: false,
            lateral_diffusion: false,
            max_transport: 1.0e3,
            strict: false,
            breaking: None,
        }
    }

    /// Set gravitational acceleration.
    pub fn with_gravity(mut self, g: f64) -> Self {
        self.g = g;
        self
    }

    pub fn with_wet_dry(mut self, wet_dry: WetDryConfig) -> Self {
        self.wet_dry = wet_dry;
        self
    }

    pub fn with_friction(mut self, friction: FrictionConfig) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_coriolis(mut self, coriolis: CoriolisParameter) -> Self {
        self.coriolis = coriolis;
        self
    }

    /// Enable or disable momentum advection.
    pub fn with_advection(mut self, enabled: bool) -> Self {
        self.advection = enabled;
        self
    }

    /// Enable or disable lateral diffusion.
    pub fn with_lateral_diffusion(mut self, enabled: bool) -> Self {
        self.lateral_diffusion = enabled;
        self
    }

    /// Set the transport sanity bound.
    pub fn with_max_transport(mut self, max_transport: f64) -> Self {
        self.max_transport = max_transport;
        self
    }

    /// Treat clamping events as fatal.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable wave breaking.
    pub fn with_breaking(mut self, breaking: WaveBreakingConfig) -> Self {
        self.breaking = Some(breaking);
        self
    }

    /// Length of the long step, `mode_split · dt`.
    #[inline]
    pub fn long_dt(&self) -> f64 {
        self.mode_split as f64 * self.dt
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<()> {
        if !(self.g.is_finite() && self.g > 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "gravity must be positive, got {}",
                self.g
            )));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "time step must be positive, got {}",
                self.dt
            )));
        }
        if self.mode_split == 0 {
            return Err(BarotropicError::InvalidConfig(
                "mode_split must be at least 1".into(),
            ));
        }
        if !(self.max_transport > 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "max_transport must be positive, got {}",
                self.max_transport
            )));
        }
        if !(self.coriolis.f0.is_finite() && self.coriolis.beta.is_finite()) {
            return Err(BarotropicError::InvalidConfig(
                "Coriolis parameters must be finite".into(),
            ));
        }
        self.wet_dry.validate()?;
        self.friction.validate()?;
        if let Some(breaking) = &self.breaking {
            breaking.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BarotropicConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.breaking.is_none());
        assert!((config.long_dt() - 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(BarotropicConfig::new(0.0, 10).validate().is_err());
        assert!(BarotropicConfig::new(1.0, 0).validate().is_err());
        assert!(BarotropicConfig::new(1.0, 10)
            .with_gravity(-9.81)
            .validate()
            .is_err());
        assert!(BarotropicConfig::new(1.0, 10)
            .with_max_transport(f64::NAN)
            .validate()
            .is_err());
        assert!(BarotropicConfig::new(1.0, 10)
            .with_wet_dry(WetDryConfig::new(0.1).with_d_crit(0.1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_breaking_validation() {
        let bad = WaveBreakingConfig::default().with_relaxation_steps(0);
        let err = BarotropicConfig::new(1.0, 10).with_breaking(bad).validate();
        assert!(matches!(err, Err(BarotropicError::InvalidConfig(_))));

        let good = BarotropicConfig::new(1.0, 10).with_breaking(WaveBreakingConfig::default());
        assert!(good.validate().is_ok());
    }
}
