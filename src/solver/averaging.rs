//! Long-step time filter of the barotropic transports.
//!
//! Over one long (3D) step of `M = mode_split` short steps the transports are
//! averaged with an incremental mean, which reproduces a constant signal
//! exactly. When the window closes:
//!
//! ```text
//! Uinto  = Uint
//! Uint   = mean(U)
//! res_u  = U - Uint
//! res_du = (Uint - Uinto) / Δt_long
//! ```
//!
//! and the same for V. The averaged transports and residuals are handed to the
//! 3D solver through [`LongStepOutput`].

use tracing::debug;

use crate::grid::GridExtent;
use crate::state::{BarotropicState, Field2D};
use crate::types::GridLocation;

/// Running mean of U and V over the current long step.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeFilter {
    mode_split: usize,
    position: usize,
    mean_u: Field2D,
    mean_v: Field2D,
}

impl TimeFilter {
    /// Closed filter for the given extent and mode-splitting ratio.
    pub fn new(extent: GridExtent, mode_split: usize) -> Self {
        Self {
            mode_split,
            position: 0,
            mean_u: Field2D::zeros(extent, GridLocation::EastFace),
            mean_v: Field2D::zeros(extent, GridLocation::NorthFace),
        }
    }

    /// Short steps per window.
    #[inline]
    pub fn mode_split(&self) -> usize {
        self.mode_split
    }

    /// Short steps accumulated in the current window.
    #[inline]
    pub fn window_position(&self) -> usize {
        self.position
    }

    /// Whether a window has started but not yet closed.
    #[inline]
    pub fn is_window_open(&self) -> bool {
        self.position > 0
    }

    /// Discard the partial window.
    pub fn reset(&mut self) {
        self.position = 0;
        self.mean_u.fill(0.0);
        self.mean_v.fill(0.0);
    }

    /// Resize the accumulators; the filter is closed afterwards.
    pub(crate) fn reallocate(&mut self, extent: GridExtent) {
        *self = Self::new(extent, self.mode_split);
    }

    /// Add the current transports to the running mean.
    ///
    /// Returns `true` when this step closed the window and the averaged
    /// transports and residuals in `state` were updated.
    pub(crate) fn accumulate(&mut self, state: &mut BarotropicState, long_dt: f64) -> bool {
        self.position += 1;
        let inv_n = 1.0 / self.position as f64;

        running_mean(self.mean_u.as_mut_slice(), state.transport.u.as_slice(), inv_n);
        running_mean(self.mean_v.as_mut_slice(), state.transport.v.as_slice(), inv_n);

        if self.position < self.mode_split {
            return false;
        }

        let avg = &mut state.averages;
        close_window(
            &self.mean_u,
            &state.transport.u,
            &mut avg.u_int,
            &mut avg.u_into,
            &mut avg.res_u,
            &mut avg.res_du,
            long_dt,
        );
        close_window(
            &self.mean_v,
            &state.transport.v,
            &mut avg.v_int,
            &mut avg.v_into,
            &mut avg.res_v,
            &mut avg.res_dv,
            long_dt,
        );

        debug!(
            steps = self.position,
            max_u_int = avg.u_int.max_abs(),
            max_v_int = avg.v_int.max_abs(),
            "long-step window closed"
        );
        self.reset();
        true
    }
}

#[inline]
fn running_mean(mean: &mut [f64], sample: &[f64], inv_n: f64) {
    for (m, s) in mean.iter_mut().zip(sample) {
        *m += (s - *m) * inv_n;
    }
}

fn close_window(
    mean: &Field2D,
    current: &Field2D,
    int: &mut Field2D,
    into: &mut Field2D,
    res: &mut Field2D,
    res_d: &mut Field2D,
    long_dt: f64,
) {
    into.copy_from(int);
    int.copy_from(mean);
    let inv_dt = 1.0 / long_dt;
    for (((r, rd), (&q, &m)), &o) in res
        .as_mut_slice()
        .iter_mut()
        .zip(res_d.as_mut_slice().iter_mut())
        .zip(current.as_slice().iter().zip(int.as_slice()))
        .zip(into.as_slice())
    {
        *r = q - m;
        *rd = (m - o) * inv_dt;
    }
}

/// Averaged transports of a closed window, borrowed for the 3D solver.
#[derive(Clone, Copy, Debug)]
pub struct LongStepOutput<'a> {
    /// Model time at the end of the window (s)
    pub time: f64,
    /// Length of the window (s)
    pub long_dt: f64,
    pub u_int: &'a Field2D,
    pub v_int: &'a Field2D,
    pub u_into: &'a Field2D,
    pub v_into: &'a Field2D,
    pub res_u: &'a Field2D,
    pub res_v: &'a Field2D,
    pub res_du: &'a Field2D,
    pub res_dv: &'a Field2D,
    /// Freshwater input over the window (m)
    pub fwf_int: &'a Field2D,
}

impl<'a> LongStepOutput<'a> {
    pub(crate) fn new(state: &'a BarotropicState, time: f64, long_dt: f64) -> Self {
        let avg = &state.averages;
        Self {
            time,
            long_dt,
            u_int: &avg.u_int,
            v_int: &avg.v_int,
            u_into: &avg.u_into,
            v_into: &avg.v_into,
            res_u: &avg.res_u,
            res_v: &avg.res_v,
            res_du: &avg.res_du,
            res_dv: &avg.res_dv,
            fwf_int: &state.forcing.fwf_int,
        }
    }
}
