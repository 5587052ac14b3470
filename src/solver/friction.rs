//! Quadratic bottom friction with a logarithmic drag law.
//!
//! Bottom stress is linearised per face as `τ/ρ = ru · U / D` with
//!
//! ```text
//! ruu = (κ / ln((z0 + D/2) / z0))²      drag coefficient, floored by cd_min
//! ru  = ruu · |u|                        |u| from both transport components
//! ```
//!
//! and applied implicitly, `U = UEx / (1 + Δt·ru/D)`, so the correction can
//! never reverse the flow.

use crate::error::{BarotropicError, Result};

/// Bottom friction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct FrictionConfig {
    /// von Kármán constant
    pub kappa: f64,
    /// Default bed roughness length (m), used for `zub0`/`zvb0`
    pub z0: f64,
    /// Lower bound on the effective roughness length (m)
    pub z0_min: f64,
    /// Lower bound on the drag coefficient
    pub cd_min: f64,
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self {
            kappa: 0.4,
            z0: 0.01,
            z0_min: 1e-4,
            cd_min: 2.5e-3,
        }
    }
}

impl FrictionConfig {
    /// Frictionless bottom (zero drag everywhere).
    pub fn frictionless() -> Self {
        Self {
            kappa: 0.0,
            cd_min: 0.0,
            ..Self::default()
        }
    }

    /// Set the default bed roughness.
    pub fn with_z0(mut self, z0: f64) -> Self {
        self.z0 = z0;
        self
    }

    /// Set the drag coefficient floor.
    pub fn with_cd_min(mut self, cd_min: f64) -> Self {
        self.cd_min = cd_min;
        self
    }

    /// Check all parameters are finite and non-negative, roughness positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.kappa.is_finite() && self.kappa >= 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "kappa must be non-negative, got {}",
                self.kappa
            )));
        }
        if !(self.z0_min.is_finite() && self.z0_min > 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "z0_min must be positive, got {}",
                self.z0_min
            )));
        }
        if !(self.z0.is_finite() && self.z0 >= 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "z0 must be non-negative, got {}",
                self.z0
            )));
        }
        if !(self.cd_min.is_finite() && self.cd_min >= 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "cd_min must be non-negative, got {}",
                self.cd_min
            )));
        }
        Ok(())
    }

    /// Effective roughness length from the bed roughness.
    #[inline(always)]
    pub fn effective_roughness(&self, z0_bed: f64) -> f64 {
        z0_bed.max(self.z0_min)
    }

    /// Drag coefficient at a face of depth `d` and effective roughness `zb`.
    #[inline(always)]
    pub fn drag_coefficient(&self, d: f64, zb: f64) -> f64 {
        if d <= 0.0 {
            return self.cd_min;
        }
        let log = ((zb + 0.5 * d) / zb).ln();
        let cd = (self.kappa / log).powi(2);
        cd.max(self.cd_min)
    }
}

/// Implicit friction correction `UEx / (1 + Δt·ru/D)`.
#[inline(always)]
pub fn implicit_correction(u_ex: f64, ru: f64, d: f64, dt: f64) -> f64 {
    if d <= 0.0 {
        return 0.0;
    }
    u_ex / (1.0 + dt * ru / d)
}

/// Slow friction limited to act against the current transport.
///
/// A positive slow friction only brakes a positive transport and vice versa.
#[inline(always)]
pub fn limited_slow_friction(slow_friction: f64, transport: f64) -> f64 {
    if transport > 0.0 {
        slow_friction.max(0.0)
    } else {
        slow_friction.min(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_law_drag() {
        let cfg = FrictionConfig::default().with_cd_min(0.0);
        // D = 10, z0 = 0.01: ln(5.01/0.01) = ln(501)
        let expected = (0.4 / 501.0_f64.ln()).powi(2);
        assert!((cfg.drag_coefficient(10.0, 0.01) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_drag_floor() {
        let cfg = FrictionConfig::default();
        // Deep water gives a tiny log-law value, floored at cd_min
        let cd = cfg.drag_coefficient(5000.0, 1e-4);
        assert!((cd - cfg.cd_min).abs() < 1e-15);
    }

    #[test]
    fn test_roughness_floor() {
        let cfg = FrictionConfig::default();
        assert!((cfg.effective_roughness(0.0) - cfg.z0_min).abs() < 1e-15);
        assert!((cfg.effective_roughness(0.05) - 0.05).abs() < 1e-15);
    }

    #[test]
    fn test_implicit_correction_never_reverses() {
        for u in [-3.0, -0.1, 0.0, 0.4, 12.0] {
            let corrected = implicit_correction(u, 10.0, 0.5, 100.0);
            assert!(corrected * u >= 0.0);
            assert!(corrected.abs() <= u.abs());
        }
        assert_eq!(implicit_correction(1.0, 1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_slow_friction_sign_limit() {
        assert_eq!(limited_slow_friction(0.3, 1.0), 0.3);
        assert_eq!(limited_slow_friction(-0.3, 1.0), 0.0);
        assert_eq!(limited_slow_friction(-0.3, -1.0), -0.3);
        assert_eq!(limited_slow_friction(0.3, -1.0), 0.0);
        assert_eq!(limited_slow_friction(0.3, 0.0), 0.0);
    }

    #[test]
    fn test_frictionless() {
        let cfg = FrictionConfig::frictionless();
        assert_eq!(cfg.drag_coefficient(1.0, 0.01), 0.0);
        assert!(cfg.validate().is_ok());
    }
}
