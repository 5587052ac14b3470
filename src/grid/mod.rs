//! Horizontal grid consumed by the barotropic core.
//!
//! Grid generation, coordinate transformation and metric factors belong to the
//! enclosing model. The core only needs the tile extents, a uniform spacing,
//! the still-water depth `H` at cell centres and the land/water/boundary mask.
//!
//! # Example
//!
//! ```
//! use baro_rs::grid::Grid2D;
//! use baro_rs::types::Side;
//!
//! // 20 km x 10 km estuary, 10 m deep, open to the sea on the east side
//! let grid = Grid2D::flat(40, 20, 1, 500.0, 500.0, 10.0)
//!     .unwrap()
//!     .with_open_side(Side::East);
//!
//! assert!(grid.open_sides().east);
//! assert_eq!(grid.boundary_len(Side::East), 20);
//! ```

mod extent;
mod mask;

pub use extent::GridExtent;
pub use mask::{CellKind, CellMask};

use crate::error::{BarotropicError, Result};
use crate::types::{GridLocation, Side, SideBoundaries};

/// Uniform logically rectangular grid with bathymetry and cell mask.
#[derive(Clone, Debug)]
pub struct Grid2D {
    extent: GridExtent,
    dx: f64,
    dy: f64,
    /// Global index of the first interior cell
    offset: (isize, isize),
    /// Still-water depth H at T-points (positive down), halo included
    bathymetry: Vec<f64>,
    mask: CellMask,
}

impl Grid2D {
    /// Create a grid with depth given as a function of cell-centre coordinates.
    ///
    /// All interior cells are water; the halo is land and carries a copy of the
    /// nearest interior depth so stencils never read undefined bathymetry.
    pub fn new<F>(nx: usize, ny: usize, halo: usize, dx: f64, dy: f64, depth: F) -> Result<Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        Self::build(GridExtent::new(nx, ny, halo), dx, dy, (0, 0), true, depth)
    }

    /// Create one tile of a decomposed domain.
    ///
    /// `offset` is the global index of the tile's first interior cell. Depth
    /// and coordinates are evaluated at global positions over the whole tile,
    /// halo included, so halo cells facing a neighbouring tile (see
    /// [`with_neighbour`](Self::with_neighbour)) carry the neighbour's
    /// bathymetry. `depth` must therefore be finite one halo width beyond the
    /// tile.
    ///
    /// ```
    /// use baro_rs::grid::Grid2D;
    /// use baro_rs::types::Side;
    ///
    /// // Eastern half of a 40-cell wide basin
    /// let east = Grid2D::tile(20, 10, 2, 100.0, 100.0, (20, 0), |x, _| 5.0 + x / 1000.0)
    ///     .unwrap()
    ///     .with_neighbour(Side::West);
    /// assert!(east.mask().u_active(-1, 3));
    /// assert!((east.h(-1, 3) - 6.95).abs() < 1e-12);
    /// ```
    pub fn tile<F>(
        nx: usize,
        ny: usize,
        halo: usize,
        dx: f64,
        dy: f64,
        offset: (isize, isize),
        depth: F,
    ) -> Result<Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        Self::build(GridExtent::new(nx, ny, halo), dx, dy, offset, false, depth)
    }

    fn build<F>(
        extent: GridExtent,
        dx: f64,
        dy: f64,
        offset: (isize, isize),
        clamp_halo: bool,
        depth: F,
    ) -> Result<Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        let (nx, ny) = (extent.nx as isize, extent.ny as isize);
        if nx == 0 || ny == 0 {
            return Err(BarotropicError::InvalidConfig(format!(
                "grid must have at least one interior cell, got {}x{}",
                nx, ny
            )));
        }
        if extent.halo == 0 {
            return Err(BarotropicError::InvalidConfig(
                "halo width must be at least 1".into(),
            ));
        }
        if !(dx.is_finite() && dx > 0.0 && dy.is_finite() && dy > 0.0) {
            return Err(BarotropicError::InvalidConfig(format!(
                "grid spacing must be positive, got dx={}, dy={}",
                dx, dy
            )));
        }

        let mut bathymetry = vec![0.0; extent.len()];
        for (i, j) in extent.cells() {
            let (ic, jc) = if clamp_halo {
                (i.clamp(0, nx - 1), j.clamp(0, ny - 1))
            } else {
                (i, j)
            };
            let x = ((ic + offset.0) as f64 + 0.5) * dx;
            let y = ((jc + offset.1) as f64 + 0.5) * dy;
            let value = depth(x, y);
            if !value.is_finite() {
                return Err(BarotropicError::InvalidConfig(format!(
                    "non-finite bathymetry at cell ({}, {})",
                    ic, jc
                )));
            }
            bathymetry[extent.index(i, j)] = value;
        }

        Ok(Self {
            extent,
            dx,
            dy,
            offset,
            bathymetry,
            mask: CellMask::closed(extent),
        })
    }

    /// Flat bottom, all interior cells water.
    pub fn flat(nx: usize, ny: usize, halo: usize, dx: f64, dy: f64, depth: f64) -> Result<Self> {
        Self::new(nx, ny, halo, dx, dy, |_, _| depth)
    }

    /// Flat-bottomed basin enclosed by land on all four sides.
    ///
    /// The outermost interior ring is land, so no face of the water body
    /// touches the halo.
    pub fn closed_basin(
        nx: usize,
        ny: usize,
        halo: usize,
        dx: f64,
        dy: f64,
        depth: f64,
    ) -> Result<Self> {
        if nx < 3 || ny < 3 {
            return Err(BarotropicError::InvalidConfig(format!(
                "closed basin needs at least 3x3 cells, got {}x{}",
                nx, ny
            )));
        }
        let (last_i, last_j) = (nx as isize - 1, ny as isize - 1);
        Ok(Self::flat(nx, ny, halo, dx, dy, depth)?
            .with_land_where(|i, j| i == 0 || j == 0 || i == last_i || j == last_j))
    }

    /// Flat-bottomed channel along x, open at the west and east ends.
    pub fn channel(nx: usize, ny: usize, halo: usize, dx: f64, dy: f64, depth: f64) -> Result<Self> {
        Ok(Self::flat(nx, ny, halo, dx, dy, depth)?
            .with_open_side(Side::West)
            .with_open_side(Side::East))
    }

    /// Mark a single cell as land.
    ///
    /// Halo cells are accepted, so land in a neighbouring tile can be
    /// mirrored after [`with_neighbour`](Self::with_neighbour).
    pub fn with_land(mut self, i: isize, j: isize) -> Self {
        self.mask.set(i, j, CellKind::Land);
        self
    }

    /// Mark every interior cell matching the predicate as land.
    pub fn with_land_where<F>(mut self, is_land: F) -> Self
    where
        F: Fn(isize, isize) -> bool,
    {
        for (i, j) in self.extent.interior() {
            if is_land(i, j) {
                self.mask.set(i, j, CellKind::Land);
            }
        }
        self
    }

    /// Open one side: its outermost interior row/column of water cells
    /// becomes elevation-forced boundary cells.
    pub fn with_open_side(mut self, side: Side) -> Self {
        for k in 0..self.boundary_len(side) {
            let (i, j) = self.boundary_cell(side, k);
            if self.mask.is_wet_capable(i, j) {
                self.mask.set(i, j, CellKind::OpenBoundary);
            }
        }
        self
    }

    /// Declare a neighbouring tile across `side`.
    ///
    /// The halo band on that side becomes water, so the faces on the tile
    /// edge carry transport and the halo exchange supplies the neighbour's
    /// state. Corner halo cells are left as they are.
    pub fn with_neighbour(mut self, side: Side) -> Self {
        let (di, dj) = side.outward();
        for layer in 1..=self.extent.halo as isize {
            for k in 0..self.boundary_len(side) {
                let (i, j) = self.boundary_cell(side, k);
                self.mask.set(i + layer * di, j + layer * dj, CellKind::Water);
            }
        }
        self
    }

    /// Sides across which the halo holds water from a neighbouring tile.
    pub fn neighbours(&self) -> SideBoundaries<bool> {
        SideBoundaries::from_fn(|side| {
            let (di, dj) = side.outward();
            (0..self.boundary_len(side)).any(|k| {
                let (i, j) = self.boundary_cell(side, k);
                self.mask.is_wet_capable(i + di, j + dj)
            })
        })
    }

    /// Global index of the first interior cell.
    #[inline]
    pub fn offset(&self) -> (isize, isize) {
        self.offset
    }

    /// Tile extents.
    #[inline]
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Interior cells along x.
    #[inline]
    pub fn nx(&self) -> usize {
        self.extent.nx
    }

    /// Interior cells along y.
    #[inline]
    pub fn ny(&self) -> usize {
        self.extent.ny
    }

    /// Halo width.
    #[inline]
    pub fn halo(&self) -> usize {
        self.extent.halo
    }

    /// Grid spacing along x (m).
    #[inline]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Grid spacing along y (m).
    #[inline]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Horizontal area of one cell (m²).
    #[inline]
    pub fn cell_area(&self) -> f64 {
        self.dx * self.dy
    }

    /// Cell classification.
    #[inline]
    pub fn mask(&self) -> &CellMask {
        &self.mask
    }

    /// Still-water depth H at cell (i, j).
    #[inline(always)]
    pub fn h(&self, i: isize, j: isize) -> f64 {
        self.bathymetry[self.extent.index(i, j)]
    }

    /// Still-water depth over the whole tile in storage order.
    pub fn bathymetry(&self) -> &[f64] {
        &self.bathymetry
    }

    /// Physical x-coordinate of point `loc` of column `i`.
    #[inline]
    pub fn x_of(&self, i: isize, loc: GridLocation) -> f64 {
        ((i + self.offset.0) as f64 + loc.offset().0) * self.dx
    }

    /// Physical y-coordinate of point `loc` of row `j`.
    #[inline]
    pub fn y_of(&self, j: isize, loc: GridLocation) -> f64 {
        ((j + self.offset.1) as f64 + loc.offset().1) * self.dy
    }

    /// Number of boundary cells along a side.
    pub fn boundary_len(&self, side: Side) -> usize {
        if side.is_meridional() {
            self.extent.ny
        } else {
            self.extent.nx
        }
    }

    /// Cell index of the k-th boundary cell along a side.
    ///
    /// West/east run south to north, north/south run west to east.
    #[inline]
    pub fn boundary_cell(&self, side: Side, k: usize) -> (isize, isize) {
        let k = k as isize;
        let last_i = self.extent.nx as isize - 1;
        let last_j = self.extent.ny as isize - 1;
        match side {
            Side::West => (0, k),
            Side::East => (last_i, k),
            Side::South => (k, 0),
            Side::North => (k, last_j),
        }
    }

    /// Which sides carry at least one open-boundary cell.
    pub fn open_sides(&self) -> SideBoundaries<bool> {
        SideBoundaries::from_fn(|side| {
            (0..self.boundary_len(side)).any(|k| {
                let (i, j) = self.boundary_cell(side, k);
                self.mask.is_open_boundary(i, j)
            })
        })
    }

    /// Deepest still-water depth over water-carrying interior cells.
    pub fn max_depth(&self) -> f64 {
        self.extent
            .interior()
            .filter(|&(i, j)| self.mask.is_wet_capable(i, j))
            .map(|(i, j)| self.h(i, j))
            .fold(0.0, f64::max)
    }

    /// Gravity-wave Courant number `dt·√(g·H_max)·√(1/dx² + 1/dy²)`.
    ///
    /// The explicit short step is stable for values at or below one.
    pub fn gravity_wave_courant(&self, g: f64, dt: f64) -> f64 {
        let c = (g * self.max_depth()).sqrt();
        dt * c * (1.0 / (self.dx * self.dx) + 1.0 / (self.dy * self.dy)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_grid() {
        let grid = Grid2D::flat(4, 3, 1, 100.0, 50.0, 8.0).unwrap();
        assert_eq!(grid.nx(), 4);
        assert_eq!(grid.ny(), 3);
        assert!((grid.cell_area() - 5000.0).abs() < 1e-12);
        assert!((grid.h(0, 0) - 8.0).abs() < 1e-12);
        assert!((grid.h(-1, -1) - 8.0).abs() < 1e-12);
        assert!((grid.max_depth() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_sloping_bathymetry_copied_into_halo() {
        let grid = Grid2D::new(4, 2, 2, 10.0, 10.0, |x, _| x / 10.0).unwrap();
        assert!((grid.h(0, 0) - 0.5).abs() < 1e-12);
        assert!((grid.h(3, 0) - 3.5).abs() < 1e-12);
        assert!((grid.h(-2, 0) - grid.h(0, 0)).abs() < 1e-12);
        assert!((grid.h(5, 1) - grid.h(3, 1)).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_grids_rejected() {
        assert!(Grid2D::flat(0, 3, 1, 1.0, 1.0, 1.0).is_err());
        assert!(Grid2D::flat(3, 3, 0, 1.0, 1.0, 1.0).is_err());
        assert!(Grid2D::flat(3, 3, 1, -1.0, 1.0, 1.0).is_err());
        assert!(Grid2D::new(3, 3, 1, 1.0, 1.0, |_, _| f64::NAN).is_err());
    }

    #[test]
    fn test_open_side_marks_boundary_cells() {
        let grid = Grid2D::flat(5, 4, 1, 1.0, 1.0, 2.0)
            .unwrap()
            .with_land(0, 3)
            .with_open_side(Side::West);

        let open = grid.open_sides();
        assert!(open.west);
        assert!(!open.east && !open.north && !open.south);

        assert!(grid.mask().is_open_boundary(0, 0));
        assert!(grid.mask().is_open_boundary(0, 2));
        // Land stays land
        assert_eq!(grid.mask().kind(0, 3), CellKind::Land);
        assert_eq!(grid.mask().count(CellKind::OpenBoundary), 3);
    }

    #[test]
    fn test_closed_basin_and_channel() {
        let basin = Grid2D::closed_basin(6, 5, 1, 1.0, 1.0, 3.0).unwrap();
        assert_eq!(basin.mask().count(CellKind::Water), 4 * 3);
        assert_eq!(basin.mask().kind(0, 2), CellKind::Land);
        assert!(!basin.mask().u_active(0, 2));
        assert!(Grid2D::closed_basin(2, 5, 1, 1.0, 1.0, 3.0).is_err());

        let channel = Grid2D::channel(6, 3, 1, 1.0, 1.0, 3.0).unwrap();
        let open = channel.open_sides();
        assert!(open.west && open.east);
        assert!(!open.north && !open.south);
        assert_eq!(channel.mask().count(CellKind::OpenBoundary), 6);
    }

    #[test]
    fn test_boundary_cells() {
        let grid = Grid2D::flat(5, 4, 1, 1.0, 1.0, 2.0).unwrap();
        assert_eq!(grid.boundary_cell(Side::West, 2), (0, 2));
        assert_eq!(grid.boundary_cell(Side::East, 1), (4, 1));
        assert_eq!(grid.boundary_cell(Side::South, 3), (3, 0));
        assert_eq!(grid.boundary_cell(Side::North, 0), (0, 3));
        assert_eq!(grid.boundary_len(Side::North), 5);
    }

    #[test]
    fn test_neighbour_opens_tile_edge() {
        let grid = Grid2D::flat(4, 3, 2, 1.0, 1.0, 2.0)
            .unwrap()
            .with_neighbour(Side::East);

        // Both halo columns on the east side hold water
        assert!(grid.mask().is_water(4, 1));
        assert!(grid.mask().is_water(5, 1));
        assert_eq!(grid.mask().kind(4, -1), CellKind::Land);
        assert!(grid.mask().u_active(3, 1));
        assert!(grid.mask().u_active(4, 1));
        // The west edge is still a wall
        assert!(!grid.mask().u_active(-1, 1));
        // Interior counts are unaffected
        assert_eq!(grid.mask().count(CellKind::Water), 12);

        let sides = grid.neighbours();
        assert!(sides.east);
        assert!(!sides.west && !sides.north && !sides.south);
    }

    #[test]
    fn test_tile_uses_global_coordinates() {
        let depth = |x: f64, y: f64| 1.0 + x / 100.0 + y / 1000.0;
        let whole = Grid2D::new(8, 4, 1, 10.0, 10.0, depth).unwrap();
        let east = Grid2D::tile(4, 4, 1, 10.0, 10.0, (4, 0), depth).unwrap();

        assert_eq!(east.offset(), (4, 0));
        for j in 0..4 {
            for i in 0..4 {
                assert_eq!(east.h(i, j), whole.h(i + 4, j));
            }
            // Halo facing the western half holds its bathymetry
            assert_eq!(east.h(-1, j), whole.h(3, j));
        }
        assert_eq!(
            east.x_of(0, GridLocation::EastFace),
            whole.x_of(4, GridLocation::EastFace)
        );
    }

    #[test]
    fn test_courant_number() {
        let grid = Grid2D::flat(10, 10, 1, 100.0, 100.0, 10.0).unwrap();
        let c = grid.gravity_wave_courant(10.0, 1.0);
        // sqrt(100) * sqrt(2e-4) = 10 * 0.014142
        assert!((c - 0.1414213562).abs() < 1e-8);
    }
}
