//! Staggered-grid placement tags.
//!
//! On the C grid every quantity lives at one of four points of cell (i, j):
//!
//! ```text
//!        V(i,j) ---- X(i,j)
//!          |            |
//!        T(i,j) ---- U(i,j)
//! ```
//!
//! Elevation and depth sit at the centre (T), x-transport on the east face (U),
//! y-transport on the north face (V), and corner quantities at X.

use std::fmt;

/// Position of a field's values within a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum GridLocation {
    /// Cell centre (T-point): elevation, depth, fluxes per area.
    Center,
    /// East face (U-point): x-directed transports and their terms.
    EastFace,
    /// North face (V-point): y-directed transports and their terms.
    NorthFace,
    /// North-east corner (X-point).
    Corner,
}

impl GridLocation {
    /// All locations in tag order.
    pub const ALL: [GridLocation; 4] = [
        GridLocation::Center,
        GridLocation::EastFace,
        GridLocation::NorthFace,
        GridLocation::Corner,
    ];

    /// Compact numeric tag used by the restart layout.
    #[inline]
    pub const fn tag(self) -> u8 {
        match self {
            GridLocation::Center => 0,
            GridLocation::EastFace => 1,
            GridLocation::NorthFace => 2,
            GridLocation::Corner => 3,
        }
    }

    /// Inverse of [`GridLocation::tag`].
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|loc| loc.tag() == tag)
    }

    /// Conventional single-letter point name (T, U, V, X).
    pub const fn short_name(self) -> &'static str {
        match self {
            GridLocation::Center => "T",
            GridLocation::EastFace => "U",
            GridLocation::NorthFace => "V",
            GridLocation::Corner => "X",
        }
    }

    /// Offset of the point from the cell's south-west corner, in units of (dx, dy).
    pub const fn offset(self) -> (f64, f64) {
        match self {
            GridLocation::Center => (0.5, 0.5),
            GridLocation::EastFace => (1.0, 0.5),
            GridLocation::NorthFace => (0.5, 1.0),
            GridLocation::Corner => (1.0, 1.0),
        }
    }
}

impl fmt::Display for GridLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GridLocation::Center => "cell centre",
            GridLocation::EastFace => "east face",
            GridLocation::NorthFace => "north face",
            GridLocation::Corner => "corner",
        };
        write!(f, "{} ({})", name, self.short_name())
    }
}
