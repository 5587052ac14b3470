//! The barotropic state aggregate.
//!
//! Fields are grouped by the component that writes them, so each stepper
//! borrows its own group mutably and everything else immutably:
//!
//! | Group | Writer |
//! |-------|--------|
//! | [`DepthFields`] (`D`, derived `DU`/`DV`) | continuity (`D`), momentum (`DU`/`DV`) |
//! | [`ElevationFields`] (`z`, `zo`) | boundary adapter (boundary cells), continuity |
//! | [`TransportFields`] (`U`, `V`, `UEx`, `VEx`) | momentum |
//! | [`MomentumTerms`] (`fU`, `fV`, `ru`, `rv`, `ruu`, `rvv`, `zub`, `zvb`) | momentum |
//! | [`AveragedTransports`] (`Uint` … `res_dv`) | time filter |
//! | [`SlowTerms`] (`SlUx`, `SlVx`, `Slru`, `Slrv`) | external 3D solver only |
//! | [`ForcingFields`] (`zub0`, `zvb0`, `An`, `AnX`, `fwf`, `fwf_int`) | external, `fwf_int` by continuity |

use tracing::debug;

use crate::error::{BarotropicError, Result};
use crate::grid::{Grid2D, GridExtent};
use crate::state::{BreakingFields, Field2D, FieldId, N2D_FIELDS};
use crate::types::{GridLocation, Side, SideBoundaries};

/// Water depths at T-, U- and V-points.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthFields {
    /// Total depth H + z
    pub d: Field2D,
    /// Face depth at U-points (derived, not persisted)
    pub du: Field2D,
    /// Face depth at V-points (derived, not persisted)
    pub dv: Field2D,
}

/// Surface elevation and its previous value.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationFields {
    pub z: Field2D,
    pub zo: Field2D,
}

/// Depth-integrated transports (m²/s).
#[derive(Clone, Debug, PartialEq)]
pub struct TransportFields {
    pub u: Field2D,
    pub v: Field2D,
    pub u_ex: Field2D,
    pub v_ex: Field2D,
}

/// Coriolis and bottom-friction terms recomputed each short step.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentumTerms {
    pub f_u: Field2D,
    pub f_v: Field2D,
    pub ru: Field2D,
    pub rv: Field2D,
    pub ruu: Field2D,
    pub rvv: Field2D,
    pub zub: Field2D,
    pub zvb: Field2D,
}

/// Long-step averaged transports and residuals handed to the 3D solver.
#[derive(Clone, Debug, PartialEq)]
pub struct AveragedTransports {
    pub u_int: Field2D,
    pub v_int: Field2D,
    pub u_into: Field2D,
    pub v_into: Field2D,
    pub res_u: Field2D,
    pub res_v: Field2D,
    pub res_du: Field2D,
    pub res_dv: Field2D,
}

/// Slow forcing and friction supplied by the 3D solver.
///
/// Read-only inside the barotropic core.
#[derive(Clone, Debug, PartialEq)]
pub struct SlowTerms {
    pub sl_ux: Field2D,
    pub sl_vx: Field2D,
    pub sl_ru: Field2D,
    pub sl_rv: Field2D,
}

impl SlowTerms {
    /// Zero slow terms for a tile.
    pub fn zeros(extent: GridExtent) -> Self {
        Self {
            sl_ux: located(extent, FieldId::SlUx),
            sl_vx: located(extent, FieldId::SlVx),
            sl_ru: located(extent, FieldId::Slru),
            sl_rv: located(extent, FieldId::Slrv),
        }
    }

    /// Check every term against the tile extent and its grid point.
    pub fn ensure(&self, extent: GridExtent) -> Result<()> {
        self.sl_ux.ensure("SlUx", extent, GridLocation::EastFace)?;
        self.sl_vx.ensure("SlVx", extent, GridLocation::NorthFace)?;
        self.sl_ru.ensure("Slru", extent, GridLocation::EastFace)?;
        self.sl_rv.ensure("Slrv", extent, GridLocation::NorthFace)
    }
}

/// Externally supplied roughness, dissipation and freshwater fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ForcingFields {
    pub zub0: Field2D,
    pub zvb0: Field2D,
    pub an: Field2D,
    pub an_x: Field2D,
    pub fwf: Field2D,
    pub fwf_int: Field2D,
}

/// Prescribed elevation along each open boundary (`EWbdy`, `ENbdy`, `EEbdy`, `ESbdy`).
pub type BoundaryArrays = SideBoundaries<Vec<f64>>;

/// Complete persistent state of the barotropic mode for one tile.
#[derive(Clone, Debug, PartialEq)]
pub struct BarotropicState {
    extent: GridExtent,
    pub(crate) depth: DepthFields,
    pub(crate) elevation: ElevationFields,
    pub(crate) transport: TransportFields,
    pub(crate) momentum: MomentumTerms,
    pub(crate) averages: AveragedTransports,
    pub(crate) slow: SlowTerms,
    pub(crate) forcing: ForcingFields,
    pub(crate) boundary: BoundaryArrays,
    pub(crate) breaking: Option<BreakingFields>,
}

fn located(extent: GridExtent, id: FieldId) -> Field2D {
    Field2D::zeros(extent, id.location())
}

impl BarotropicState {
    /// Allocate and zero-initialise all fields for the grid.
    ///
    /// `D` starts at the still-water depth of every water cell (z = 0).
    /// Wave-breaking fields are allocated only when `with_breaking` is set.
    pub fn new(grid: &Grid2D, with_breaking: bool) -> Self {
        let extent = grid.extent();
        let mut state = Self {
            extent,
            depth: DepthFields {
                d: located(extent, FieldId::D),
                du: Field2D::zeros(extent, GridLocation::EastFace),
                dv: Field2D::zeros(extent, GridLocation::NorthFace),
            },
            elevation: ElevationFields {
                z: located(extent, FieldId::Z),
                zo: located(extent, FieldId::Zo),
            },
            transport: TransportFields {
                u: located(extent, FieldId::U),
                v: located(extent, FieldId::V),
                u_ex: located(extent, FieldId::UEx),
                v_ex: located(extent, FieldId::VEx),
            },
            momentum: MomentumTerms {
                f_u: located(extent, FieldId::FU),
                f_v: located(extent, FieldId::FV),
                ru: located(extent, FieldId::Ru),
                rv: located(extent, FieldId::Rv),
                ruu: located(extent, FieldId::Ruu),
                rvv: located(extent, FieldId::Rvv),
                zub: located(extent, FieldId::Zub),
                zvb: located(extent, FieldId::Zvb),
            },
            averages: AveragedTransports {
                u_int: located(extent, FieldId::Uint),
                v_int: located(extent, FieldId::Vint),
                u_into: located(extent, FieldId::Uinto),
                v_into: located(extent, FieldId::Vinto),
                res_u: located(extent, FieldId::ResU),
                res_v: located(extent, FieldId::ResV),
                res_du: located(extent, FieldId::ResDu),
                res_dv: located(extent, FieldId::ResDv),
            },
            slow: SlowTerms::zeros(extent),
            forcing: ForcingFields {
                zub0: located(extent, FieldId::Zub0),
                zvb0: located(extent, FieldId::Zvb0),
                an: located(extent, FieldId::An),
                an_x: located(extent, FieldId::AnX),
                fwf: located(extent, FieldId::Fwf),
                fwf_int: located(extent, FieldId::FwfInt),
            },
            boundary: SideBoundaries::from_fn(|side| vec![0.0; grid.boundary_len(side)]),
            breaking: with_breaking.then(|| BreakingFields::new(extent)),
        };

        for (i, j) in extent.cells() {
            if grid.mask().is_wet_capable(i, j) {
                state.depth.d.set(i, j, grid.h(i, j).max(0.0));
            }
        }
        state
    }

    /// Drop all storage and reallocate zeroed fields for a new grid.
    ///
    /// Wave-breaking availability is preserved.
    pub(crate) fn reallocate(&mut self, grid: &Grid2D) {
        let with_breaking = self.breaking.is_some();
        debug!(
            old = %self.extent,
            new = %grid.extent(),
            "reallocating barotropic state"
        );
        *self = Self::new(grid, with_breaking);
    }

    /// Tile extent shared by all fields.
    #[inline]
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Total and face depths.
    pub fn depth(&self) -> &DepthFields {
        &self.depth
    }

    /// Surface elevation.
    pub fn elevation(&self) -> &ElevationFields {
        &self.elevation
    }

    /// Surface elevation for setting initial conditions.
    ///
    /// Call [`BarotropicState::update_depth`] afterwards to keep `D` consistent.
    pub fn elevation_mut(&mut self) -> &mut ElevationFields {
        &mut self.elevation
    }

    /// Transports.
    pub fn transport(&self) -> &TransportFields {
        &self.transport
    }

    /// Transports for setting initial conditions.
    pub fn transport_mut(&mut self) -> &mut TransportFields {
        &mut self.transport
    }

    /// Coriolis and friction terms of the last step.
    pub fn momentum_terms(&self) -> &MomentumTerms {
        &self.momentum
    }

    /// Averaged transports and residuals.
    pub fn averages(&self) -> &AveragedTransports {
        &self.averages
    }

    /// Slow terms as seen by the barotropic core.
    pub fn slow_terms(&self) -> &SlowTerms {
        &self.slow
    }

    /// Roughness, dissipation and freshwater inputs.
    pub fn forcing(&self) -> &ForcingFields {
        &self.forcing
    }

    /// Boundary elevation arrays.
    pub fn boundary_arrays(&self) -> &BoundaryArrays {
        &self.boundary
    }

    /// Boundary elevation array of one side.
    pub fn boundary_array(&self, side: Side) -> &[f64] {
        &self.boundary[side]
    }

    /// Whether wave-breaking fields are allocated.
    #[inline]
    pub fn has_breaking(&self) -> bool {
        self.breaking.is_some()
    }

    /// Wave-breaking fields, if enabled.
    pub fn breaking(&self) -> Option<&BreakingFields> {
        self.breaking.as_ref()
    }

    /// Wave-breaking fields, failing when the feature is disabled.
    pub fn breaking_required(&self) -> Result<&BreakingFields> {
        self.breaking.as_ref().ok_or(BarotropicError::FeatureDisabled)
    }

    /// Persisted field by id.
    pub fn field(&self, id: FieldId) -> &Field2D {
        match id {
            FieldId::D => &self.depth.d,
            FieldId::Z => &self.elevation.z,
            FieldId::Zo => &self.elevation.zo,
            FieldId::U => &self.transport.u,
            FieldId::V => &self.transport.v,
            FieldId::UEx => &self.transport.u_ex,
            FieldId::VEx => &self.transport.v_ex,
            FieldId::FU => &self.momentum.f_u,
            FieldId::FV => &self.momentum.f_v,
            FieldId::Ru => &self.momentum.ru,
            FieldId::Rv => &self.momentum.rv,
            FieldId::Ruu => &self.momentum.ruu,
            FieldId::Rvv => &self.momentum.rvv,
            FieldId::Uint => &self.averages.u_int,
            FieldId::Vint => &self.averages.v_int,
            FieldId::Uinto => &self.averages.u_into,
            FieldId::Vinto => &self.averages.v_into,
            FieldId::ResU => &self.averages.res_u,
            FieldId::ResV => &self.averages.res_v,
            FieldId::ResDu => &self.averages.res_du,
            FieldId::ResDv => &self.averages.res_dv,
            FieldId::SlUx => &self.slow.sl_ux,
            FieldId::SlVx => &self.slow.sl_vx,
            FieldId::Slru => &self.slow.sl_ru,
            FieldId::Slrv => &self.slow.sl_rv,
            FieldId::Zub => &self.momentum.zub,
            FieldId::Zvb => &self.momentum.zvb,
            FieldId::Zub0 => &self.forcing.zub0,
            FieldId::Zvb0 => &self.forcing.zvb0,
            FieldId::An => &self.forcing.an,
            FieldId::AnX => &self.forcing.an_x,
            FieldId::Fwf => &self.forcing.fwf,
            FieldId::FwfInt => &self.forcing.fwf_int,
        }
    }

    /// Mutable persisted field by id, used by the restart loader.
    pub(crate) fn field_mut(&mut self, id: FieldId) -> &mut Field2D {
        match id {
            FieldId::D => &mut self.depth.d,
            FieldId::Z => &mut self.elevation.z,
            FieldId::Zo => &mut self.elevation.zo,
            FieldId::U => &mut self.transport.u,
            FieldId::V => &mut self.transport.v,
            FieldId::UEx => &mut self.transport.u_ex,
            FieldId::VEx => &mut self.transport.v_ex,
            FieldId::FU => &mut self.momentum.f_u,
            FieldId::FV => &mut self.momentum.f_v,
            FieldId::Ru => &mut self.momentum.ru,
            FieldId::Rv => &mut self.momentum.rv,
            FieldId::Ruu => &mut self.momentum.ruu,
            FieldId::Rvv => &mut self.momentum.rvv,
            FieldId::Uint => &mut self.averages.u_int,
            FieldId::Vint => &mut self.averages.v_int,
            FieldId::Uinto => &mut self.averages.u_into,
            FieldId::Vinto => &mut self.averages.v_into,
            FieldId::ResU => &mut self.averages.res_u,
            FieldId::ResV => &mut self.averages.res_v,
            FieldId::ResDu => &mut self.averages.res_du,
            FieldId::ResDv => &mut self.averages.res_dv,
            FieldId::SlUx => &mut self.slow.sl_ux,
            FieldId::SlVx => &mut self.slow.sl_vx,
            FieldId::Slru => &mut self.slow.sl_ru,
            FieldId::Slrv => &mut self.slow.sl_rv,
            FieldId::Zub => &mut self.momentum.zub,
            FieldId::Zvb => &mut self.momentum.zvb,
            FieldId::Zub0 => &mut self.forcing.zub0,
            FieldId::Zvb0 => &mut self.forcing.zvb0,
            FieldId::An => &mut self.forcing.an,
            FieldId::AnX => &mut self.forcing.an_x,
            FieldId::Fwf => &mut self.forcing.fwf,
            FieldId::FwfInt => &mut self.forcing.fwf_int,
        }
    }

    /// Mutable boundary array, used by the restart loader.
    pub(crate) fn boundary_array_mut(&mut self, side: Side) -> &mut Vec<f64> {
        &mut self.boundary[side]
    }

    /// Persisted fields in restart order.
    pub fn persisted_fields(&self) -> impl Iterator<Item = (FieldId, &Field2D)> + '_ {
        FieldId::ALL.into_iter().map(move |id| (id, self.field(id)))
    }

    /// Number of persisted 2D fields.
    pub const fn n2d_fields(&self) -> usize {
        N2D_FIELDS
    }

    /// Verify extents and grid locations of every field and array.
    pub fn check_consistency(&self) -> Result<()> {
        for (id, field) in self.persisted_fields() {
            field.ensure(id.name(), self.extent, id.location())?;
        }
        self.depth
            .du
            .ensure("DU", self.extent, GridLocation::EastFace)?;
        self.depth
            .dv
            .ensure("DV", self.extent, GridLocation::NorthFace)?;

        for side in Side::ALL {
            let expected = if side.is_meridional() {
                self.extent.ny
            } else {
                self.extent.nx
            };
            let actual = self.boundary[side].len();
            if actual != expected {
                return Err(BarotropicError::length_mismatch(side.bdy_name(), expected, actual));
            }
        }

        if let Some(breaking) = &self.breaking {
            breaking
                .break_mask
                .ensure("break_mask", self.extent, GridLocation::Center)?;
            breaking
                .break_stat
                .ensure("break_stat", self.extent, GridLocation::Center)?;
        }
        Ok(())
    }

    /// Recompute `D = H + z` on water cells, halo included, lifting `z` where
    /// the depth would fall below `d_min`. Returns the number of lifted cells.
    pub fn update_depth(&mut self, grid: &Grid2D, d_min: f64) -> usize {
        let mut clamped = 0;
        for (i, j) in self.extent.cells() {
            if !grid.mask().is_wet_capable(i, j) {
                self.depth.d.set(i, j, 0.0);
                continue;
            }
            let h = grid.h(i, j);
            let mut z = self.elevation.z.get(i, j);
            if h + z < d_min {
                z = d_min - h;
                self.elevation.z.set(i, j, z);
                clamped += 1;
            }
            self.depth.d.set(i, j, h + z);
        }
        clamped
    }
}
