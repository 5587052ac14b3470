//! Named sides of the rectangular model domain.
//!
//! Open-boundary data arrives per side (`EWbdy`, `ENbdy`, `EEbdy`, `ESbdy`), so
//! the per-side container is indexed by [`Side`] instead of array position.

use std::fmt;
use std::ops::{Index, IndexMut};

/// One edge of the logically rectangular domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// i = 0 column (x = x_min)
    West,
    /// j = ny - 1 row (y = y_max)
    North,
    /// i = nx - 1 column (x = x_max)
    East,
    /// j = 0 row (y = y_min)
    South,
}

impl Side {
    /// Sides in restart/storage order: west, north, east, south.
    pub const ALL: [Side; 4] = [Side::West, Side::North, Side::East, Side::South];

    /// Name of the boundary elevation array on this side.
    pub const fn bdy_name(self) -> &'static str {
        match self {
            Side::West => "EWbdy",
            Side::North => "ENbdy",
            Side::East => "EEbdy",
            Side::South => "ESbdy",
        }
    }

    /// True for sides running along the y-axis (west, east).
    #[inline]
    pub const fn is_meridional(self) -> bool {
        matches!(self, Side::West | Side::East)
    }

    /// Unit step `(di, dj)` pointing out of the domain across this side.
    #[inline]
    pub const fn outward(self) -> (isize, isize) {
        match self {
            Side::West => (-1, 0),
            Side::North => (0, 1),
            Side::East => (1, 0),
            Side::South => (0, -1),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::West => "west",
            Side::North => "north",
            Side::East => "east",
            Side::South => "south",
        };
        f.write_str(name)
    }
}

/// Per-side values with named fields.
///
/// # Example
///
/// ```
/// use baro_rs::types::{Side, SideBoundaries};
///
/// let lengths = SideBoundaries::new(40, 20, 40, 20); // south, east, north, west
/// assert_eq!(lengths[Side::West], 20);
/// assert_eq!(lengths.south, 40);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SideBoundaries<T> {
    /// South boundary (y = y_min)
    pub south: T,
    /// East boundary (x = x_max)
    pub east: T,
    /// North boundary (y = y_max)
    pub north: T,
    /// West boundary (x = x_min)
    pub west: T,
}

impl<T> SideBoundaries<T> {
    /// Create new side values.
    ///
    /// Order: south, east, north, west (counterclockwise from bottom)
    pub fn new(south: T, east: T, north: T, west: T) -> Self {
        Self {
            south,
            east,
            north,
            west,
        }
    }

    /// Same value on all sides.
    pub fn uniform(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            south: value.clone(),
            east: value.clone(),
            north: value.clone(),
            west: value,
        }
    }

    /// Build from a function of the side.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Side) -> T,
    {
        Self {
            south: f(Side::South),
            east: f(Side::East),
            north: f(Side::North),
            west: f(Side::West),
        }
    }

    /// Map a function over all sides.
    pub fn map<U, F>(self, mut f: F) -> SideBoundaries<U>
    where
        F: FnMut(T) -> U,
    {
        SideBoundaries {
            south: f(self.south),
            east: f(self.east),
            north: f(self.north),
            west: f(self.west),
        }
    }

    /// Iterate over `(side, value)` in [`Side::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::ALL.into_iter().map(move |side| (side, &self[side]))
    }
}

impl<T: Default> Default for SideBoundaries<T> {
    fn default() -> Self {
        Self {
            south: T::default(),
            east: T::default(),
            north: T::default(),
            west: T::default(),
        }
    }
}

impl<T> Index<Side> for SideBoundaries<T> {
    type Output = T;

    #[inline]
    fn index(&self, side: Side) -> &T {
        match side {
            Side::West => &self.west,
            Side::North => &self.north,
            Side::East => &self.east,
            Side::South => &self.south,
        }
    }
}

impl<T> IndexMut<Side> for SideBoundaries<T> {
    #[inline]
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::West => &mut self.west,
            Side::North => &mut self.north,
            Side::East => &mut self.east,
            Side::South => &mut self.south,
        }
    }
}

impl<T: fmt::Display> fmt::Display for SideBoundaries<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S:{} E:{} N:{} W:{}",
            self.south, self.east, self.north, self.west
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let sides = SideBoundaries::new(1, 2, 3, 4);
        assert_eq!(sides.south, 1);
        assert_eq!(sides.east, 2);
        assert_eq!(sides.north, 3);
        assert_eq!(sides.west, 4);
    }

    #[test]
    fn test_index_by_side() {
        let mut sides = SideBoundaries::new(1, 2, 3, 4);
        assert_eq!(sides[Side::South], 1);
        assert_eq!(sides[Side::West], 4);
        sides[Side::North] = 30;
        assert_eq!(sides.north, 30);
    }

    #[test]
    fn test_from_fn_and_map() {
        let sides = SideBoundaries::from_fn(|s| s.is_meridional());
        assert!(sides.west && sides.east);
        assert!(!sides.north && !sides.south);

        let counts = sides.map(|open| if open { 1 } else { 0 });
        assert_eq!(counts.iter().map(|(_, c)| *c).sum::<i32>(), 2);
    }

    #[test]
    fn test_iter_order() {
        let sides = SideBoundaries::new('s', 'e', 'n', 'w');
        let collected: Vec<_> = sides.iter().map(|(_, c)| *c).collect();
        assert_eq!(collected, vec!['w', 'n', 'e', 's']);
    }

    #[test]
    fn test_bdy_names() {
        let names: Vec<_> = Side::ALL.iter().map(|s| s.bdy_name()).collect();
        assert_eq!(names, vec!["EWbdy", "ENbdy", "EEbdy", "ESbdy"]);
    }
}
