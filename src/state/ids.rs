//! Identities of the persisted 2D fields.
//!
//! The restart layout is an ordered set of exactly [`N2D_FIELDS`] named arrays.
//! Adding or removing a field means touching [`FieldId`], its `ALL` table and
//! `N2D_FIELDS` together; the array type of `ALL` keeps them in step.

use crate::types::GridLocation;

/// Number of persisted 2D fields.
pub const N2D_FIELDS: usize = 33;

/// Persisted 2D fields of the barotropic state, in restart order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    /// Total water depth
    D,
    /// Surface elevation
    Z,
    /// Surface elevation before the last continuity update
    Zo,
    /// x-transport
    U,
    /// y-transport
    V,
    /// Provisional x-transport before friction correction
    UEx,
    /// Provisional y-transport before friction correction
    VEx,
    /// Coriolis tendency of U
    FU,
    /// Coriolis tendency of V
    FV,
    /// Linearised bottom friction at U-points
    Ru,
    /// Linearised bottom friction at V-points
    Rv,
    /// Drag coefficient at U-points
    Ruu,
    /// Drag coefficient at V-points
    Rvv,
    /// Window-averaged x-transport
    Uint,
    /// Window-averaged y-transport
    Vint,
    /// Previous window-averaged x-transport
    Uinto,
    /// Previous window-averaged y-transport
    Vinto,
    /// Instantaneous minus averaged x-transport
    ResU,
    /// Instantaneous minus averaged y-transport
    ResV,
    /// Change of averaged x-transport per long step
    ResDu,
    /// Change of averaged y-transport per long step
    ResDv,
    /// Slow x-forcing from the 3D solver
    SlUx,
    /// Slow y-forcing from the 3D solver
    SlVx,
    /// Slow x-friction from the 3D solver
    Slru,
    /// Slow y-friction from the 3D solver
    Slrv,
    /// Effective roughness length at U-points
    Zub,
    /// Effective roughness length at V-points
    Zvb,
    /// Bed roughness length at U-points
    Zub0,
    /// Bed roughness length at V-points
    Zvb0,
    /// Horizontal dissipation coefficient at T-points
    An,
    /// Horizontal dissipation coefficient at X-points
    AnX,
    /// Freshwater flux (m/s)
    Fwf,
    /// Freshwater flux integrated over the current window (m)
    FwfInt,
}

impl FieldId {
    /// All persisted fields in restart order.
    pub const ALL: [FieldId; N2D_FIELDS] = [
        FieldId::D,
        FieldId::Z,
        FieldId::Zo,
        FieldId::U,
        FieldId::V,
        FieldId::UEx,
        FieldId::VEx,
        FieldId::FU,
        FieldId::FV,
        FieldId::Ru,
        FieldId::Rv,
        FieldId::Ruu,
        FieldId::Rvv,
        FieldId::Uint,
        FieldId::Vint,
        FieldId::Uinto,
        FieldId::Vinto,
        FieldId::ResU,
        FieldId::ResV,
        FieldId::ResDu,
        FieldId::ResDv,
        FieldId::SlUx,
        FieldId::SlVx,
        FieldId::Slru,
        FieldId::Slrv,
        FieldId::Zub,
        FieldId::Zvb,
        FieldId::Zub0,
        FieldId::Zvb0,
        FieldId::An,
        FieldId::AnX,
        FieldId::Fwf,
        FieldId::FwfInt,
    ];

    /// Conventional array name.
    pub const fn name(self) -> &'static str {
        match self {
            FieldId::D => "D",
            FieldId::Z => "z",
            FieldId::Zo => "zo",
            FieldId::U => "U",
            FieldId::V => "V",
            FieldId::UEx => "UEx",
            FieldId::VEx => "VEx",
            FieldId::FU => "fU",
            FieldId::FV => "fV",
            FieldId::Ru => "ru",
            FieldId::Rv => "rv",
            FieldId::Ruu => "ruu",
            FieldId::Rvv => "rvv",
            FieldId::Uint => "Uint",
            FieldId::Vint => "Vint",
            FieldId::Uinto => "Uinto",
            FieldId::Vinto => "Vinto",
            FieldId::ResU => "res_u",
            FieldId::ResV => "res_v",
            FieldId::ResDu => "res_du",
            FieldId::ResDv => "res_dv",
            FieldId::SlUx => "SlUx",
            FieldId::SlVx => "SlVx",
            FieldId::Slru => "Slru",
            FieldId::Slrv => "Slrv",
            FieldId::Zub => "zub",
            FieldId::Zvb => "zvb",
            FieldId::Zub0 => "zub0",
            FieldId::Zvb0 => "zvb0",
            FieldId::An => "An",
            FieldId::AnX => "AnX",
            FieldId::Fwf => "fwf",
            FieldId::FwfInt => "fwf_int",
        }
    }

    /// Grid point the field lives at.
    pub const fn location(self) -> GridLocation {
        match self {
            FieldId::D
            | FieldId::Z
            | FieldId::Zo
            | FieldId::An
            | FieldId::Fwf
            | FieldId::FwfInt => GridLocation::Center,
            FieldId::U
            | FieldId::UEx
            | FieldId::FU
            | FieldId::Ru
            | FieldId::Ruu
            | FieldId::Uint
            | FieldId::Uinto
            | FieldId::ResU
            | FieldId::ResDu
            | FieldId::SlUx
            | FieldId::Slru
            | FieldId::Zub
            | FieldId::Zub0 => GridLocation::EastFace,
            FieldId::V
            | FieldId::VEx
            | FieldId::FV
            | FieldId::Rv
            | FieldId::Rvv
            | FieldId::Vint
            | FieldId::Vinto
            | FieldId::ResV
            | FieldId::ResDv
            | FieldId::SlVx
            | FieldId::Slrv
            | FieldId::Zvb
            | FieldId::Zvb0 => GridLocation::NorthFace,
            FieldId::AnX => GridLocation::Corner,
        }
    }

    /// Position in restart order.
    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Look up a field by its array name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    /// Fields written exclusively by the 3D solver.
    pub const fn is_slow_term(self) -> bool {
        matches!(
            self,
            FieldId::SlUx | FieldId::SlVx | FieldId::Slru | FieldId::Slrv
        )
    }
}
