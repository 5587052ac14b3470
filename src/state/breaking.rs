//! Wave-breaking mask and status fields.
//!
//! These exist only when wave breaking is enabled; the state holds them as
//! `Option<BreakingFields>` so consumers must branch on availability.

use crate::grid::GridExtent;
use crate::state::Field2D;
use crate::types::GridLocation;

/// Breaking status of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BreakStatus {
    /// No breaking, no residual dissipation
    #[default]
    Inactive = 0,
    /// Criterion currently exceeded
    Breaking = 1,
    /// Criterion cleared, dissipation ramping down
    Recovering = 2,
}

impl BreakStatus {
    /// Integer status code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Per-cell breaking state (T-points).
#[derive(Clone, Debug, PartialEq)]
pub struct BreakingFields {
    /// Criterion exceeded during the last step
    pub break_mask: Field2D<bool>,
    /// Status after the last step
    pub break_stat: Field2D<BreakStatus>,
    /// Recovery steps left for `Recovering` cells
    pub(crate) recovery: Field2D<u32>,
}

impl BreakingFields {
    /// All cells inactive.
    pub fn new(extent: GridExtent) -> Self {
        Self {
            break_mask: Field2D::zeros(extent, GridLocation::Center),
            break_stat: Field2D::zeros(extent, GridLocation::Center),
            recovery: Field2D::zeros(extent, GridLocation::Center),
        }
    }

    /// Recovery steps left at (i, j).
    #[inline]
    pub fn remaining(&self, i: isize, j: isize) -> u32 {
        self.recovery.get(i, j)
    }

    /// Number of interior cells with the given status.
    pub fn count(&self, status: BreakStatus) -> usize {
        self.break_stat
            .interior_values()
            .filter(|s| *s == status)
            .count()
    }

    /// Tile extent of the fields.
    pub fn extent(&self) -> GridExtent {
        self.break_stat.extent()
    }
}
