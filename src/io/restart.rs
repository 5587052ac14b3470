//! Binary restart files.
//!
//! Encoded with `bincode` (fixed-width little-endian integers, `u64` length
//! prefixes) as a sequence of records:
//!
//! ```text
//! Signature   magic "B2DR" (4 bytes), version u32
//! Header      n2d u32 (must be 33), nx u32, ny u32, halo u32,
//!             time f64, step u64
//! n2d × FieldRecord      name, location tag u8, values
//! 4 × BoundaryRecord     name, values          (W, N, E, S)
//! ```
//!
//! Every check on load is hard: a restart written for another grid or another
//! field set is rejected, never partially applied.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::grid::GridExtent;
use crate::state::{BarotropicState, FieldId, N2D_FIELDS};
use crate::types::{GridLocation, Side};

/// File signature.
pub const RESTART_MAGIC: [u8; 4] = *b"B2DR";

/// Current layout version.
pub const RESTART_VERSION: u32 = 1;

/// Error type for restart reading and writing.
#[derive(Debug, Error)]
pub enum RestartError {
    /// File I/O error.
    #[error("Restart I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding failure, including truncated files.
    #[error("Restart encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Not a restart file.
    #[error("Bad restart signature {found:?}")]
    BadMagic { found: [u8; 4] },

    /// Written by an incompatible layout version.
    #[error("Unsupported restart version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    /// Wrong number of 2D records.
    #[error("Restart holds {found} 2D fields, expected {expected}")]
    FieldCount { expected: usize, found: usize },

    /// Grid dimensions differ from the state being restored.
    #[error("Restart grid {found} does not match state grid {expected}")]
    GridMismatch { expected: String, found: String },

    /// Record out of order or unknown.
    #[error("Record {position}: expected {expected}, found {found}")]
    UnexpectedRecord {
        position: usize,
        expected: String,
        found: String,
    },

    /// Record stored at the wrong grid point.
    #[error("Field {name}: expected location tag {expected}, found {found}")]
    LocationMismatch { name: String, expected: u8, found: u8 },

    /// Record length differs from the grid.
    #[error("Field {name}: expected {expected} values, found {found}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Model clock stored alongside the fields.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RestartMeta {
    /// Model time (s)
    pub time: f64,
    /// Short steps taken
    pub step: u64,
}

#[derive(Serialize, Deserialize)]
struct Signature {
    magic: [u8; 4],
    version: u32,
}

#[derive(Serialize, Deserialize)]
struct Header {
    n2d: u32,
    nx: u32,
    ny: u32,
    halo: u32,
    time: f64,
    step: u64,
}

#[derive(Serialize)]
struct FieldRecordRef<'a> {
    name: &'a str,
    location: u8,
    values: &'a [f64],
}

#[derive(Deserialize)]
struct FieldRecord {
    name: String,
    location: u8,
    values: Vec<f64>,
}

#[derive(Serialize)]
struct BoundaryRecordRef<'a> {
    name: &'a str,
    values: &'a [f64],
}

#[derive(Deserialize)]
struct BoundaryRecord {
    name: String,
    values: Vec<f64>,
}

/// Write the persisted state to `writer`.
pub fn write_restart<W: Write>(
    writer: W,
    state: &BarotropicState,
    meta: RestartMeta,
) -> Result<(), RestartError> {
    let mut w = BufWriter::new(writer);
    let ext = state.extent();

    let signature = Signature {
        magic: RESTART_MAGIC,
        version: RESTART_VERSION,
    };
    bincode::serialize_into(&mut w, &signature)?;
    let header = Header {
        n2d: N2D_FIELDS as u32,
        nx: ext.nx as u32,
        ny: ext.ny as u32,
        halo: ext.halo as u32,
        time: meta.time,
        step: meta.step,
    };
    bincode::serialize_into(&mut w, &header)?;

    for (id, field) in state.persisted_fields() {
        let record = FieldRecordRef {
            name: id.name(),
            location: field.location().tag(),
            values: field.as_slice(),
        };
        bincode::serialize_into(&mut w, &record)?;
    }
    for side in Side::ALL {
        let record = BoundaryRecordRef {
            name: side.bdy_name(),
            values: state.boundary_array(side),
        };
        bincode::serialize_into(&mut w, &record)?;
    }
    w.flush()?;
    Ok(())
}

/// Read a restart from `reader` into `state`.
///
/// `state` is left untouched when any check fails.
pub fn read_restart<R: Read>(
    reader: R,
    state: &mut BarotropicState,
) -> Result<RestartMeta, RestartError> {
    let mut r = BufReader::new(reader);

    let signature: Signature = bincode::deserialize_from(&mut r)?;
    if signature.magic != RESTART_MAGIC {
        return Err(RestartError::BadMagic {
            found: signature.magic,
        });
    }
    if signature.version != RESTART_VERSION {
        return Err(RestartError::UnsupportedVersion {
            expected: RESTART_VERSION,
            found: signature.version,
        });
    }

    let header: Header = bincode::deserialize_from(&mut r)?;
    if header.n2d as usize != N2D_FIELDS {
        return Err(RestartError::FieldCount {
            expected: N2D_FIELDS,
            found: header.n2d as usize,
        });
    }
    let found = GridExtent::new(header.nx as usize, header.ny as usize, header.halo as usize);
    if found != state.extent() {
        return Err(RestartError::GridMismatch {
            expected: state.extent().to_string(),
            found: found.to_string(),
        });
    }
    let meta = RestartMeta {
        time: header.time,
        step: header.step,
    };

    let mut loaded = state.clone();
    for (position, id) in FieldId::ALL.into_iter().enumerate() {
        let record: FieldRecord = bincode::deserialize_from(&mut r)?;
        if record.name != id.name() {
            return Err(RestartError::UnexpectedRecord {
                position,
                expected: id.name().to_string(),
                found: record.name,
            });
        }
        if GridLocation::from_tag(record.location) != Some(id.location()) {
            return Err(RestartError::LocationMismatch {
                name: record.name,
                expected: id.location().tag(),
                found: record.location,
            });
        }
        copy_values(&record.name, &record.values, loaded.field_mut(id).as_mut_slice())?;
    }

    for (k, side) in Side::ALL.into_iter().enumerate() {
        let record: BoundaryRecord = bincode::deserialize_from(&mut r)?;
        if record.name != side.bdy_name() {
            return Err(RestartError::UnexpectedRecord {
                position: N2D_FIELDS + k,
                expected: side.bdy_name().to_string(),
                found: record.name,
            });
        }
        copy_values(&record.name, &record.values, loaded.boundary_array_mut(side))?;
    }

    *state = loaded;
    debug!(time = meta.time, step = meta.step, "restart decoded");
    Ok(meta)
}

/// Write a restart file at `path`.
pub fn save_restart(
    path: impl AsRef<Path>,
    state: &BarotropicState,
    meta: RestartMeta,
) -> Result<(), RestartError> {
    let path = path.as_ref();
    write_restart(File::create(path)?, state, meta)?;
    info!(path = %path.display(), time = meta.time, "restart written");
    Ok(())
}

/// Read a restart file at `path` into `state`.
pub fn load_restart(
    path: impl AsRef<Path>,
    state: &mut BarotropicState,
) -> Result<RestartMeta, RestartError> {
    let path = path.as_ref();
    let meta = read_restart(File::open(path)?, state)?;
    info!(path = %path.display(), time = meta.time, "restart loaded");
    Ok(meta)
}

fn copy_values(name: &str, values: &[f64], out: &mut [f64]) -> Result<(), RestartError> {
    if values.len() != out.len() {
        return Err(RestartError::LengthMismatch {
            name: name.to_string(),
            expected: out.len(),
            found: values.len(),
        });
    }
    out.copy_from_slice(values);
    Ok(())
}
