//! Restart I/O.
//!
//! The barotropic state is checkpointed as a little-endian binary file holding
//! the 33 persisted 2D fields in a fixed order and the four open-boundary
//! arrays. See [`restart`] for the layout.
//!
//! # Example
//!
//! ```
//! use baro_rs::grid::Grid2D;
//! use baro_rs::io::{read_restart, write_restart, RestartMeta};
//! use baro_rs::state::BarotropicState;
//!
//! let grid = Grid2D::flat(6, 4, 1, 50.0, 50.0, 3.0).unwrap();
//! let state = BarotropicState::new(&grid, false);
//!
//! let mut bytes = Vec::new();
//! write_restart(&mut bytes, &state, RestartMeta { time: 60.0, step: 6 }).unwrap();
//!
//! let mut restored = BarotropicState::new(&grid, false);
//! let meta = read_restart(bytes.as_slice(), &mut restored).unwrap();
//! assert_eq!(meta.step, 6);
//! assert_eq!(restored, state);
//! ```

pub mod restart;

pub use restart::{
    load_restart, read_restart, save_restart, write_restart, RestartError, RestartMeta,
    RESTART_MAGIC, RESTART_VERSION,
};
