//! Storage for the barotropic state.
//!
//! [`BarotropicState`] owns the [`N2D_FIELDS`] persisted 2D fields, the
//! derived face depths, the four open-boundary elevation arrays and, when wave
//! breaking is enabled, the breaking mask and status.

mod breaking;
mod field;
mod ids;
mod store;

pub use breaking::{BreakStatus, BreakingFields};
pub use field::Field2D;
pub use ids::{FieldId, N2D_FIELDS};
pub use store::{
    AveragedTransports, BarotropicState, BoundaryArrays, DepthFields, ElevationFields,
    ForcingFields, MomentumTerms, SlowTerms, TransportFields,
};
