//! Land/water/open-boundary classification of grid cells.
//!
//! Cells are classified once by the grid setup:
//! - `Land` cells never carry water and bound closed walls
//! - `Water` cells are advanced by the continuity equation
//! - `OpenBoundary` cells carry prescribed elevation from boundary data
//!
//! Halo cells default to `Land`, which closes the tile edge. Halo cells
//! facing a neighbouring tile are marked `Water` by the grid setup, and the
//! halo exchange then supplies their state.

use super::GridExtent;

/// Classification of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum CellKind {
    /// Never wet
    #[default]
    Land,
    /// Prognostic water cell
    Water,
    /// Water cell whose elevation is forced from boundary data
    OpenBoundary,
}

impl CellKind {
    /// Water or open boundary.
    #[inline(always)]
    pub fn is_wet_capable(self) -> bool {
        !matches!(self, CellKind::Land)
    }
}

/// Cell classification over the full tile (interior + halo).
#[derive(Clone, Debug, PartialEq)]
pub struct CellMask {
    extent: GridExtent,
    kinds: Vec<CellKind>,
}

impl CellMask {
    /// All interior cells water, halo land.
    pub fn closed(extent: GridExtent) -> Self {
        let mut kinds = vec![CellKind::Land; extent.len()];
        for (i, j) in extent.interior() {
            kinds[extent.index(i, j)] = CellKind::Water;
        }
        Self { extent, kinds }
    }

    /// Extent covered by the mask.
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Kind of cell (i, j); out-of-range indices are land.
    #[inline(always)]
    pub fn kind(&self, i: isize, j: isize) -> CellKind {
        if self.extent.contains(i, j) {
            self.kinds[self.extent.index(i, j)]
        } else {
            CellKind::Land
        }
    }

    /// Set the kind of cell (i, j). Ignored outside the stored range.
    pub fn set(&mut self, i: isize, j: isize, kind: CellKind) {
        if self.extent.contains(i, j) {
            let idx = self.extent.index(i, j);
            self.kinds[idx] = kind;
        }
    }

    /// Prognostic water cell (advanced by continuity).
    #[inline(always)]
    pub fn is_water(&self, i: isize, j: isize) -> bool {
        self.kind(i, j) == CellKind::Water
    }

    /// Water or open-boundary cell.
    #[inline(always)]
    pub fn is_wet_capable(&self, i: isize, j: isize) -> bool {
        self.kind(i, j).is_wet_capable()
    }

    /// Open-boundary cell.
    #[inline(always)]
    pub fn is_open_boundary(&self, i: isize, j: isize) -> bool {
        self.kind(i, j) == CellKind::OpenBoundary
    }

    /// Whether the U face east of (i, j) carries transport.
    ///
    /// Both neighbours must hold water and at least one must be prognostic;
    /// faces between two boundary cells run along the boundary and stay idle.
    #[inline(always)]
    pub fn u_active(&self, i: isize, j: isize) -> bool {
        face_active(self.kind(i, j), self.kind(i + 1, j))
    }

    /// Whether the V face north of (i, j) carries transport.
    #[inline(always)]
    pub fn v_active(&self, i: isize, j: isize) -> bool {
        face_active(self.kind(i, j), self.kind(i, j + 1))
    }

    /// Number of interior cells of the given kind.
    pub fn count(&self, kind: CellKind) -> usize {
        self.extent
            .interior()
            .filter(|&(i, j)| self.kind(i, j) == kind)
            .count()
    }
}

#[inline(always)]
fn face_active(a: CellKind, b: CellKind) -> bool {
    match (a, b) {
        (CellKind::Land, _) | (_, CellKind::Land) => false,
        (CellKind::OpenBoundary, CellKind::OpenBoundary) => false,
        _ => true,
    }
}
