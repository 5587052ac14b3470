//! Coriolis parameter and the staggered Coriolis terms.
//!
//! On the C grid the transport across the other face family has to be
//! averaged onto the point being updated:
//!
//! ```text
//! fU(i,j) =  f · V̄   V̄ = four V faces around U(i,j)
//! fV(i,j) = -f · Ū   Ū = four U faces around V(i,j)
//! ```
//!
//! Following GETM, the average is taken over velocities weighted by the square
//! root of the face depth, so a deep neighbour does not dominate a shallow face.
//!
//! # Example
//!
//! ```
//! use baro_rs::solver::CoriolisParameter;
//!
//! // 60°N on an f-plane
//! let coriolis = CoriolisParameter::f_plane(1.2e-4);
//! assert!((coriolis.f_at(5.0e4) - 1.2e-4).abs() < 1e-18);
//! ```

/// Coriolis parameter `f(y) = f₀ + β(y - y₀)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CoriolisParameter {
    /// Coriolis parameter f₀ (s⁻¹)
    pub f0: f64,
    /// Beta-plane parameter β = ∂f/∂y (m⁻¹ s⁻¹)
    pub beta: f64,
    /// Reference y-coordinate for the beta-plane (m)
    pub y0: f64,
}

impl Default for CoriolisParameter {
    fn default() -> Self {
        Self::none()
    }
}

impl CoriolisParameter {
    /// No rotation.
    pub fn none() -> Self {
        Self::f_plane(0.0)
    }

    /// Constant f.
    pub fn f_plane(f: f64) -> Self {
        Self {
            f0: f,
            beta: 0.0,
            y0: 0.0,
        }
    }

    /// Beta-plane: f(y) = f₀ + β(y - y₀).
    pub fn beta_plane(f0: f64, beta: f64, y0: f64) -> Self {
        Self { f0, beta, y0 }
    }

    /// Coriolis parameter at a given y-coordinate.
    #[inline]
    pub fn f_at(&self, y: f64) -> f64 {
        self.f0 + self.beta * (y - self.y0)
    }

    /// True if rotation vanishes everywhere.
    pub fn is_none(&self) -> bool {
        self.f0 == 0.0 && self.beta == 0.0
    }
}

/// Depth-weighted average of four transports onto a face of depth `d_target`.
///
/// `faces` holds `(transport, face depth)` pairs; faces with non-positive depth
/// carry no transport and contribute nothing.
#[inline(always)]
pub fn four_point_transport(faces: [(f64, f64); 4], d_target: f64) -> f64 {
    if d_target <= 0.0 {
        return 0.0;
    }
    let sum: f64 = faces
        .iter()
        .filter(|(_, d)| *d > 0.0)
        .map(|(q, d)| q / d.sqrt())
        .sum();
    0.25 * sum * d_target.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_plane() {
        let c = CoriolisParameter::beta_plane(1e-4, 2e-11, 1000.0);
        assert!((c.f_at(1000.0) - 1e-4).abs() < 1e-18);
        assert!((c.f_at(2000.0) - (1e-4 + 2e-8)).abs() < 1e-18);
        assert!(!c.is_none());
        assert!(CoriolisParameter::default().is_none());
    }

    #[test]
    fn test_uniform_average() {
        // Equal depths: plain four-point average
        let avg = four_point_transport([(1.0, 4.0), (2.0, 4.0), (3.0, 4.0), (2.0, 4.0)], 4.0);
        assert!((avg - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_dry_faces_ignored() {
        let avg = four_point_transport([(8.0, 4.0), (5.0, 0.0), (0.0, -1.0), (0.0, 4.0)], 4.0);
        assert!((avg - 2.0).abs() < 1e-12);
        assert_eq!(four_point_transport([(1.0, 1.0); 4], 0.0), 0.0);
    }
}
