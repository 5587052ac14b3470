//! Index space of a tile: interior extents plus a halo ring.

use std::fmt;

/// Extents of a logically rectangular tile.
///
/// Interior cells are `0..nx` × `0..ny`; the halo adds `halo` cells on every
/// side, so valid signed indices are `-halo..nx+halo` and `-halo..ny+halo`.
/// Storage is row-major with `i` fastest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridExtent {
    /// Interior cells along x
    pub nx: usize,
    /// Interior cells along y
    pub ny: usize,
    /// Halo width on each side
    pub halo: usize,
}

impl GridExtent {
    /// Create a new extent.
    pub const fn new(nx: usize, ny: usize, halo: usize) -> Self {
        Self { nx, ny, halo }
    }

    /// Number of stored values per row (interior + both halos).
    #[inline(always)]
    pub const fn row_len(&self) -> usize {
        self.nx + 2 * self.halo
    }

    /// Number of stored rows.
    #[inline(always)]
    pub const fn n_rows(&self) -> usize {
        self.ny + 2 * self.halo
    }

    /// Total number of stored values.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.row_len() * self.n_rows()
    }

    /// True if the extent stores nothing.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether (i, j) lies in the stored range.
    #[inline(always)]
    pub fn contains(&self, i: isize, j: isize) -> bool {
        let h = self.halo as isize;
        i >= -h && j >= -h && i < self.nx as isize + h && j < self.ny as isize + h
    }

    /// Whether (i, j) is an interior cell.
    #[inline(always)]
    pub fn is_interior(&self, i: isize, j: isize) -> bool {
        i >= 0 && j >= 0 && i < self.nx as isize && j < self.ny as isize
    }

    /// Flat storage index of (i, j).
    ///
    /// Panics in debug builds if (i, j) is outside the stored range.
    #[inline(always)]
    pub fn index(&self, i: isize, j: isize) -> usize {
        debug_assert!(self.contains(i, j), "index ({}, {}) outside {}", i, j, self);
        let h = self.halo as isize;
        ((j + h) as usize) * self.row_len() + (i + h) as usize
    }

    /// Row number in storage for grid row `j`.
    #[inline(always)]
    pub fn row_of(&self, j: isize) -> usize {
        (j + self.halo as isize) as usize
    }

    /// Grid row `j` for storage row number `row`.
    #[inline(always)]
    pub fn j_of_row(&self, row: usize) -> isize {
        row as isize - self.halo as isize
    }

    /// Position of grid column `i` within a stored row.
    #[inline(always)]
    pub fn col_of(&self, i: isize) -> usize {
        (i + self.halo as isize) as usize
    }

    /// Grid column `i` for position `col` within a stored row.
    #[inline(always)]
    pub fn i_of_col(&self, col: usize) -> isize {
        col as isize - self.halo as isize
    }

    /// Signed range of interior i indices.
    #[inline]
    pub fn interior_i(&self) -> std::ops::Range<isize> {
        0..self.nx as isize
    }

    /// Signed range of interior j indices.
    #[inline]
    pub fn interior_j(&self) -> std::ops::Range<isize> {
        0..self.ny as isize
    }

    /// Iterate over all interior (i, j) pairs, row by row.
    pub fn interior(&self) -> impl Iterator<Item = (isize, isize)> + '_ {
        self.interior_j()
            .flat_map(move |j| self.interior_i().map(move |i| (i, j)))
    }

    /// Iterate over every stored cell, halo included, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (isize, isize)> + '_ {
        let h = self.halo as isize;
        let (nx, ny) = (self.nx as isize, self.ny as isize);
        (-h..ny + h).flat_map(move |j| (-h..nx + h).map(move |i| (i, j)))
    }
}

impl fmt::Display for GridExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} (+{} halo)", self.nx, self.ny, self.halo)
    }
}
