//! Open-boundary elevation forcing.
//!
//! Sides of the domain that the grid marks open receive prescribed surface
//! elevation from externally supplied time series. Every short step the
//! series are interpolated to the current time, stored in the per-side
//! boundary arrays (`EWbdy`, `ENbdy`, `EEbdy`, `ESbdy`) and imposed on the
//! open-boundary cells before momentum and continuity run.
//!
//! | Type | Role |
//! |------|------|
//! | [`ElevationSeries`] | Validated records of elevation along one side |
//! | [`ExtrapolationPolicy`] | Error or hold outside the covered time range |
//! | [`BoundaryForcing`] | Series per side, ramp-up, application to the state |

mod forcing;
mod series;

pub use forcing::BoundaryForcing;
pub use series::{ElevationRecord, ElevationSeries, ExtrapolationPolicy, OutOfRange};
