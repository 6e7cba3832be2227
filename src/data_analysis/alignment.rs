// src/data_analysis/alignment.rs

// Puts independently clocked voltage logs on one shared timeline.
//
// Offsets are seconds from the anchor, the first avionics timestamp. Sources with
// real calendar time (avionics, ECU) are placed by subtracting the anchor. The VDL48
// segments carry no trustworthy date, so a segment is assumed to start at the anchor.

use std::ops::Range;

use chrono::NaiveDateTime;
use ndarray::{Array1, ArrayView1};
use tracing::info;

use crate::config::AlignmentConfig;
use crate::data_input::log_data::{AbsoluteLog, ElapsedLog};
use crate::error::{AnalysisError, Result};
use crate::source_names::VoltageSource;

const GRID_EPSILON_S: f64 = 1e-9;

/// One source's samples expressed as offsets from the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSeries {
    pub source: VoltageSource,
    pub offsets_s: Vec<f64>,
    pub volts: Vec<f64>,
}

impl TimedSeries {
    /// Absolute path: offset = timestamp - anchor.
    pub fn from_absolute(source: VoltageSource, log: &AbsoluteLog, anchor: NaiveDateTime) -> Self {
        Self {
            source,
            offsets_s: offsets_from_anchor(&log.times(), anchor),
            volts: log.volts().to_vec(),
        }
    }

    /// Assumed-coincidence path: the segment's first sample lands on the anchor.
    pub fn from_segment(source: VoltageSource, log: &ElapsedLog, range: Range<usize>) -> Self {
        let end = range.end.min(log.len());
        let start = range.start.min(end);
        let segment = &log.samples[start..end];
        let elapsed: Vec<f64> = segment.iter().map(|s| s.time).collect();
        Self {
            source,
            offsets_s: align_segment_to_anchor(&elapsed),
            volts: segment.iter().map(|s| s.volts).collect(),
        }
    }

    fn span(&self) -> Option<(f64, f64)> {
        Some((*self.offsets_s.first()?, *self.offsets_s.last()?))
    }
}

/// Seconds from `anchor` for every timestamp.
pub fn offsets_from_anchor(times: &[NaiveDateTime], anchor: NaiveDateTime) -> Vec<f64> {
    times
        .iter()
        .map(|t| (*t - anchor).num_milliseconds() as f64 / 1000.0)
        .collect()
}

/// Rebases elapsed times so the first one is zero.
pub fn align_segment_to_anchor(elapsed_s: &[f64]) -> Vec<f64> {
    match elapsed_s.first() {
        Some(&first) => elapsed_s.iter().map(|t| t - first).collect(),
        None => Vec::new(),
    }
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be non-decreasing. Outside its range the end values are held.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    let upper = xp[..n].partition_point(|&t| t <= x);
    let lower = upper - 1;
    if xp[lower] == x {
        return fp[lower];
    }
    let frac = (x - xp[lower]) / (xp[upper] - xp[lower]);
    fp[lower] + frac * (fp[upper] - fp[lower])
}

/// One interpolated column of an [`AlignedGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedColumn {
    pub source: VoltageSource,
    pub volts: Array1<f64>,
}

/// Shared fixed-step timeline covering only the overlap of every source.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedGrid {
    pub step_s: f64,
    pub offsets_s: Array1<f64>,
    pub columns: Vec<AlignedColumn>,
}

impl AlignedGrid {
    pub fn len(&self) -> usize {
        self.offsets_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets_s.is_empty()
    }

    pub fn duration_min(&self) -> f64 {
        self.len() as f64 * self.step_s / 60.0
    }

    /// Appends grids with the same sources in the same order, e.g. both flights.
    ///
    /// Offsets are kept as they are, so the result is only meant for statistics.
    pub fn concatenate(grids: &[AlignedGrid]) -> Result<AlignedGrid> {
        let Some(first) = grids.first() else {
            return Err(AnalysisError::InsufficientData("no grids to combine".to_string()));
        };
        let sources: Vec<VoltageSource> = first.columns.iter().map(|c| c.source).collect();
        for grid in grids {
            let other: Vec<VoltageSource> = grid.columns.iter().map(|c| c.source).collect();
            if other != sources {
                return Err(AnalysisError::InsufficientData(
                    "grids carry different sources".to_string(),
                ));
            }
        }
        let offsets_s = grids.iter().flat_map(|g| g.offsets_s.iter().copied()).collect();
        let columns = sources
            .iter()
            .enumerate()
            .map(|(i, &source)| AlignedColumn {
                source,
                volts: grids
                    .iter()
                    .flat_map(|g| g.columns[i].volts.iter().copied())
                    .collect(),
            })
            .collect();
        Ok(AlignedGrid {
            step_s: first.step_s,
            offsets_s,
            columns,
        })
    }

    pub fn column(&self, source: VoltageSource) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .iter()
            .find(|c| c.source == source)
            .map(|c| c.volts.view())
    }
}

/// Resamples every source onto `t_start + k * step` for all points up to `t_end`.
///
/// `t_start` is the latest first offset and `t_end` the earliest last offset, so no
/// source is ever extrapolated.
pub fn resample(sources: &[TimedSeries], config: &AlignmentConfig) -> Result<AlignedGrid> {
    let required = config.min_grid_points.max(2);
    let degenerate = |points| AnalysisError::DegenerateOverlap { points, required };

    if sources.is_empty() || config.grid_step_s.is_nan() || config.grid_step_s <= 0.0 {
        return Err(degenerate(0));
    }

    let mut t_start = f64::NEG_INFINITY;
    let mut t_end = f64::INFINITY;
    for series in sources {
        let (first, last) = series.span().ok_or_else(|| degenerate(0))?;
        t_start = t_start.max(first);
        t_end = t_end.min(last);
    }
    if t_end < t_start {
        return Err(degenerate(0));
    }

    let points = ((t_end - t_start) / config.grid_step_s + GRID_EPSILON_S).floor() as usize + 1;
    if points < required {
        return Err(degenerate(points));
    }

    let offsets_s: Array1<f64> = (0..points)
        .map(|k| t_start + k as f64 * config.grid_step_s)
        .collect();
    let columns = sources
        .iter()
        .map(|series| AlignedColumn {
            source: series.source,
            volts: offsets_s
                .iter()
                .map(|&t| interp(t, &series.offsets_s, &series.volts))
                .collect(),
        })
        .collect();

    info!(
        "Aligned {} sources on {} points ({:.1} s to {:.1} s, step {:.1} s)",
        sources.len(),
        points,
        t_start,
        t_end,
        config.grid_step_s
    );

    Ok(AlignedGrid {
        step_s: config.grid_step_s,
        offsets_s,
        columns,
    })
}
