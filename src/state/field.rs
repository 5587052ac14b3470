//! Located 2D field storage.

use std::ops::{Index, IndexMut};

use crate::error::{BarotropicError, Result};
use crate::grid::GridExtent;
use crate::types::GridLocation;

/// A 2D field over the tile (interior + halo), tagged with its grid point.
///
/// All fields of a state share one extent; the location tag records which
/// staggered point the values belong to, so U-point and V-point stencils
/// cannot be mixed up silently.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2D<T = f64> {
    extent: GridExtent,
    location: GridLocation,
    data: Vec<T>,
}

impl<T: Copy + Default> Field2D<T> {
    /// New field filled with `T::default()`.
    pub fn zeros(extent: GridExtent, location: GridLocation) -> Self {
        Self::filled(extent, location, T::default())
    }

    /// New field filled with a constant.
    pub fn filled(extent: GridExtent, location: GridLocation, value: T) -> Self {
        Self {
            extent,
            location,
            data: vec![value; extent.len()],
        }
    }

    /// Wrap existing storage, checking its length against the extent.
    pub fn from_vec(
        name: &str,
        extent: GridExtent,
        location: GridLocation,
        data: Vec<T>,
    ) -> Result<Self> {
        if data.len() != extent.len() {
            return Err(BarotropicError::length_mismatch(name, extent.len(), data.len()));
        }
        Ok(Self {
            extent,
            location,
            data,
        })
    }

    /// Tile extent.
    #[inline]
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Grid point of the values.
    #[inline]
    pub fn location(&self) -> GridLocation {
        self.location
    }

    /// Number of stored values (halo included).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if nothing is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at (i, j).
    #[inline(always)]
    pub fn get(&self, i: isize, j: isize) -> T {
        self.data[self.extent.index(i, j)]
    }

    /// Value at (i, j), or `fallback` outside the stored range.
    #[inline(always)]
    pub fn get_or(&self, i: isize, j: isize, fallback: T) -> T {
        if self.extent.contains(i, j) {
            self.data[self.extent.index(i, j)]
        } else {
            fallback
        }
    }

    /// Set the value at (i, j).
    #[inline(always)]
    pub fn set(&mut self, i: isize, j: isize, value: T) {
        let idx = self.extent.index(i, j);
        self.data[idx] = value;
    }

    /// Overwrite every value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy all values from a field of identical extent.
    ///
    /// # Panics
    ///
    /// Panics if the extents differ.
    pub fn copy_from(&mut self, other: &Field2D<T>) {
        assert_eq!(
            self.extent, other.extent,
            "copy between fields of different extent"
        );
        self.data.copy_from_slice(&other.data);
    }

    /// Stored values in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable stored values in row-major order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// One stored row (halo columns included).
    pub fn row(&self, j: isize) -> &[T] {
        let start = self.extent.row_of(j) * self.extent.row_len();
        &self.data[start..start + self.extent.row_len()]
    }

    /// Whether another field has the same extent (any element type).
    pub fn same_shape<U>(&self, other: &Field2D<U>) -> bool {
        self.extent == other.extent && self.data.len() == other.data.len()
    }

    /// Check extent and location against expectations.
    pub fn ensure(&self, name: &str, extent: GridExtent, location: GridLocation) -> Result<()> {
        if self.extent != extent || self.data.len() != extent.len() {
            return Err(BarotropicError::extent_mismatch(name, extent, self.extent));
        }
        if self.location != location {
            return Err(BarotropicError::LocationMismatch {
                name: name.to_string(),
                expected: location,
                actual: self.location,
            });
        }
        Ok(())
    }

    /// Values of interior points only, row by row.
    pub fn interior_values(&self) -> impl Iterator<Item = T> + '_ {
        self.extent.interior().map(move |(i, j)| self.get(i, j))
    }
}

impl Field2D<f64> {
    /// Largest absolute interior value.
    pub fn max_abs(&self) -> f64 {
        self.interior_values().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Whether every stored value is finite.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl<T: Copy + Default> Index<(isize, isize)> for Field2D<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, (i, j): (isize, isize)) -> &T {
        &self.data[self.extent.index(i, j)]
    }
}

impl<T: Copy + Default> IndexMut<(isize, isize)> for Field2D<T> {
    #[inline(always)]
    fn index_mut(&mut self, (i, j): (isize, isize)) -> &mut T {
        let idx = self.extent.index(i, j);
        &mut self.data[idx]
    }
}
