//! Elevation time series along one open boundary.
//!
//! Each record holds the prescribed surface elevation at every boundary cell
//! of a side at one instant. Between records the elevation is interpolated
//! linearly in time.

use thiserror::Error;

use crate::error::{BarotropicError, Result};
use crate::types::Side;

/// Behaviour for times outside the covered range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum ExtrapolationPolicy {
    /// Times outside the series are an error
    #[default]
    None,
    /// Hold the first/last record
    HoldEnds,
}

/// Requested time lies outside the series.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("time {time} s outside [{start}, {end}] s")]
pub struct OutOfRange {
    pub time: f64,
    pub start: f64,
    pub end: f64,
}

impl OutOfRange {
    /// Attach the side the series belongs to.
    pub fn on(self, side: Side) -> BarotropicError {
        BarotropicError::OutOfDomain {
            side,
            time: self.time,
            start: self.start,
            end: self.end,
        }
    }
}

/// Elevation profile along a boundary at one time.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationRecord {
    /// Time in seconds
    pub time: f64,
    /// Elevation (m) per boundary cell
    pub values: Vec<f64>,
}

impl ElevationRecord {
    pub fn new(time: f64, values: Vec<f64>) -> Self {
        Self { time, values }
    }
}

/// Validated elevation time series along one side.
///
/// # Example
///
/// ```
/// use baro_rs::boundary::{ElevationSeries, ExtrapolationPolicy};
///
/// let series = ElevationSeries::uniform(&[0.0, 10.0], &[1.0, 2.0], 3).unwrap();
/// let mut profile = vec![0.0; 3];
/// series
///     .interpolate_into(5.0, ExtrapolationPolicy::None, &mut profile)
///     .unwrap();
/// assert_eq!(profile, vec![1.5; 3]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationSeries {
    records: Vec<ElevationRecord>,
    n_points: usize,
}

impl ElevationSeries {
    /// Build a series with validation.
    ///
    /// # Errors
    /// - `InvalidConfig` if no records are given, times are not strictly
    ///   increasing, or any value is non-finite
    /// - `ShapeMismatch` if profiles differ in length
    pub fn from_records(records: Vec<ElevationRecord>) -> Result<Self> {
        let Some(first) = records.first() else {
            return Err(BarotropicError::InvalidConfig(
                "elevation series needs at least one record".into(),
            ));
        };
        let n_points = first.values.len();

        for (k, record) in records.iter().enumerate() {
            if !record.time.is_finite() {
                return Err(BarotropicError::InvalidConfig(format!(
                    "non-finite time in elevation record {}",
                    k
                )));
            }
            if k > 0 && record.time <= records[k - 1].time {
                return Err(BarotropicError::InvalidConfig(format!(
                    "elevation record times must increase strictly (record {} at {} s)",
                    k, record.time
                )));
            }
            if record.values.len() != n_points {
                return Err(BarotropicError::length_mismatch(
                    format!("elevation record {}", k),
                    n_points,
                    record.values.len(),
                ));
            }
            if record.values.iter().any(|v| !v.is_finite()) {
                return Err(BarotropicError::InvalidConfig(format!(
                    "non-finite elevation in record {}",
                    k
                )));
            }
        }

        Ok(Self { records, n_points })
    }

    /// Series with the same elevation at every boundary cell.
    pub fn uniform(times: &[f64], values: &[f64], n_points: usize) -> Result<Self> {
        if times.len() != values.len() {
            return Err(BarotropicError::length_mismatch(
                "elevation values",
                times.len(),
                values.len(),
            ));
        }
        let records = times
            .iter()
            .zip(values)
            .map(|(&t, &v)| ElevationRecord::new(t, vec![v; n_points]))
            .collect();
        Self::from_records(records)
    }

    /// Series sampled from a function of time and boundary index.
    pub fn from_fn<F>(times: &[f64], n_points: usize, elevation: F) -> Result<Self>
    where
        F: Fn(f64, usize) -> f64,
    {
        let records = times
            .iter()
            .map(|&t| ElevationRecord::new(t, (0..n_points).map(|k| elevation(t, k)).collect()))
            .collect();
        Self::from_records(records)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Boundary cells per record.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Time range covered by the series.
    pub fn time_range(&self) -> (f64, f64) {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => (0.0, 0.0),
        }
    }

    /// Check if time t is within the covered range.
    pub fn contains_time(&self, t: f64) -> bool {
        let (t0, t1) = self.time_range();
        t >= t0 && t <= t1
    }

    pub fn records(&self) -> &[ElevationRecord] {
        &self.records
    }

    /// Interpolate the profile at time `t` into `out`.
    ///
    /// `out` must hold [`ElevationSeries::n_points`] values.
    pub fn interpolate_into(
        &self,
        t: f64,
        policy: ExtrapolationPolicy,
        out: &mut [f64],
    ) -> std::result::Result<(), OutOfRange> {
        debug_assert_eq!(out.len(), self.n_points);
        let (start, end) = self.time_range();
        let out_of_range = OutOfRange {
            time: t,
            start,
            end,
        };

        if !t.is_finite() {
            return Err(out_of_range);
        }
        if t < start || t > end {
            if policy == ExtrapolationPolicy::None {
                return Err(out_of_range);
            }
            let held = if t < start {
                self.records.first()
            } else {
                self.records.last()
            };
            if let Some(record) = held {
                out.copy_from_slice(&record.values);
            }
            return Ok(());
        }

        // First record with time > t; t >= start so upper >= 1
        let upper = self.records.partition_point(|r| r.time <= t);
        if upper >= self.records.len() {
            out.copy_from_slice(&self.records[self.records.len() - 1].values);
            return Ok(());
        }
        let r0 = &self.records[upper - 1];
        let r1 = &self.records[upper];
        let alpha = (t - r0.time) / (r1.time - r0.time);
        for ((o, a), b) in out.iter_mut().zip(&r0.values).zip(&r1.values) {
            *o = a + alpha * (b - a);
        }
        Ok(())
    }
}
