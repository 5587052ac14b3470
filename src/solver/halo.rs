//! Halo exchange hooks.
//!
//! The core never communicates between tiles itself. After each stage that
//! changes fields read by neighbouring stencils, the solver hands the affected
//! fields to a [`HaloExchange`] collaborator, which must fill every halo row
//! and column before returning.
//!
//! | Sync point | Fields |
//! |------------|--------|
//! | [`SyncPoint::AfterMomentum`] | `U`, `V`, `UEx`, `VEx`, `fU`, `fV`, `ru`, `rv`, `ruu`, `rvv`, `DU`, `DV` |
//! | [`SyncPoint::AfterContinuity`] | `z`, `zo`, `D` |
//! | [`SyncPoint::AfterBreaking`] | `U`, `V`, `z`, `D` (only with wave breaking enabled) |

use std::fmt;

use crate::error::Result;
use crate::state::{BarotropicState, Field2D};

/// Points in the short step at which halos must be refreshed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncPoint {
    AfterMomentum,
    AfterContinuity,
    AfterBreaking,
}

impl SyncPoint {
    /// Names of the fields exchanged at this point, in the order handed over.
    pub const fn field_names(self) -> &'static [&'static str] {
        match self {
            SyncPoint::AfterMomentum => &[
                "U", "V", "UEx", "VEx", "fU", "fV", "ru", "rv", "ruu", "rvv", "DU", "DV",
            ],
            SyncPoint::AfterContinuity => &["z", "zo", "D"],
            SyncPoint::AfterBreaking => &["U", "V", "z", "D"],
        }
    }
}

impl fmt::Display for SyncPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPoint::AfterMomentum => write!(f, "after momentum"),
            SyncPoint::AfterContinuity => write!(f, "after continuity"),
            SyncPoint::AfterBreaking => write!(f, "after wave breaking"),
        }
    }
}

/// A named field whose halo is to be refreshed.
#[derive(Debug)]
pub struct HaloField<'a> {
    pub name: &'static str,
    pub field: &'a mut Field2D,
}

/// Halo-exchange collaborator supplied by the domain decomposition.
///
/// Any `FnMut(SyncPoint, &mut [HaloField<'_>]) -> Result<()>` closure
/// implements it.
pub trait HaloExchange {
    /// Fill the halos of `fields`.
    fn exchange(&mut self, point: SyncPoint, fields: &mut [HaloField<'_>]) -> Result<()>;
}

/// Exchange for a single tile with closed outer boundaries: halos are left
/// as they are.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExchange;

impl HaloExchange for NoExchange {
    #[inline]
    fn exchange(&mut self, _point: SyncPoint, _fields: &mut [HaloField<'_>]) -> Result<()> {
        Ok(())
    }
}

impl<F> HaloExchange for F
where
    F: FnMut(SyncPoint, &mut [HaloField<'_>]) -> Result<()>,
{
    fn exchange(&mut self, point: SyncPoint, fields: &mut [HaloField<'_>]) -> Result<()> {
        self(point, fields)
    }
}

/// Borrow the fields of `state` exchanged at `point`.
pub(crate) fn sync_fields(state: &mut BarotropicState, point: SyncPoint) -> Vec<HaloField<'_>> {
    let names = point.field_names();
    let fields: Vec<&mut Field2D> = match point {
        SyncPoint::AfterMomentum => {
            let t = &mut state.transport;
            let m = &mut state.momentum;
            let d = &mut state.depth;
            vec![
                &mut t.u, &mut t.v, &mut t.u_ex, &mut t.v_ex, &mut m.f_u, &mut m.f_v, &mut m.ru,
                &mut m.rv, &mut m.ruu, &mut m.rvv, &mut d.du, &mut d.dv,
            ]
        }
        SyncPoint::AfterContinuity => vec![
            &mut state.elevation.z,
            &mut state.elevation.zo,
            &mut state.depth.d,
        ],
        SyncPoint::AfterBreaking => vec![
            &mut state.transport.u,
            &mut state.transport.v,
            &mut state.elevation.z,
            &mut state.depth.d,
        ],
    };
    names
        .iter()
        .zip(fields)
        .map(|(&name, field)| HaloField { name, field })
        .collect()
}

/// Hand the fields of `point` to the collaborator.
pub(crate) fn exchange_at<E>(exchange: &mut E, point: SyncPoint, state: &mut BarotropicState) -> Result<()>
where
    E: HaloExchange + ?Sized,
{
    let mut fields = sync_fields(state, point);
    exchange.exchange(point, &mut fields)
}
