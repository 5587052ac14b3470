//! Small strongly-typed building blocks shared across the crate.
//!
//! - [`GridLocation`] tags where on the staggered (Arakawa C) cell a field lives
//! - [`Side`] and [`SideBoundaries`] name the four edges of the rectangular domain
//!
//! # Example
//!
//! ```
//! use baro_rs::types::{GridLocation, Side, SideBoundaries};
//!
//! let open = SideBoundaries::new(false, true, false, true);
//! assert!(open[Side::East]);
//! assert!(!open[Side::North]);
//! assert_eq!(GridLocation::EastFace.short_name(), "U");
//! ```

mod location;
mod sides;

pub use location::GridLocation;
pub use sides::{Side, SideBoundaries};
