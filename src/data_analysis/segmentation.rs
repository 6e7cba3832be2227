// src/data_analysis/segmentation.rs

use std::ops::Range;

use ndarray::{s, ArrayView1};
use tracing::info;

use crate::config::SegmenterConfig;
use crate::error::{AnalysisError, Result};
use crate::source_names::FlightPhase;

/// Half-open index range `[start, end)` into the reference log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightSegment {
    pub phase: FlightPhase,
    pub start: usize,
    pub end: usize,
}

impl FlightSegment {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Flight 1, engine-off idle and Flight 2, contiguous and in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightSegmentation {
    pub flight1: FlightSegment,
    pub idle: FlightSegment,
    pub flight2: FlightSegment,
}

impl FlightSegmentation {
    pub fn segments(&self) -> [FlightSegment; 3] {
        [self.flight1, self.idle, self.flight2]
    }

    /// Duration and mean voltage per segment.
    pub fn describe(&self, volts: ArrayView1<f64>, interval_s: f64) -> Vec<SegmentDescription> {
        self.segments()
            .iter()
            .map(|seg| {
                let end = seg.end.min(volts.len());
                let slice = volts.slice(s![seg.start.min(end)..end]);
                SegmentDescription {
                    segment: *seg,
                    duration_min: seg.len() as f64 * interval_s / 60.0,
                    mean_volts: slice.mean(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDescription {
    pub segment: FlightSegment,
    pub duration_min: f64,
    pub mean_volts: Option<f64>,
}

/// Splits a two-flight reference log at its engine-off gap.
///
/// A boundary is only accepted where a full window of `config.window` samples
/// sits on one side of the flight threshold, so brief sags during cruise and
/// brief spikes during idle are ignored.
pub fn segment_reference_log(volts: ArrayView1<f64>, config: &SegmenterConfig) -> Result<FlightSegmentation> {
    let n = volts.len();
    let w = config.window.max(1);
    let threshold = config.flight_threshold_v;

    let mut last = n.saturating_sub(1);
    while last > 0 && volts[last] < config.zero_threshold_v {
        last -= 1;
    }

    let window_all = |i: usize, pred: &dyn Fn(f64) -> bool| -> bool {
        i + w <= n && volts.slice(s![i..i + w]).iter().all(|&v| pred(v))
    };

    let end_f1 = (w..last)
        .find(|&i| window_all(i, &|v| v < threshold))
        .ok_or_else(|| {
            AnalysisError::Segmentation(format!(
                "no {w}-sample window below {threshold:.1} V after the first flight"
            ))
        })?;

    let start_f2 = (end_f1 + w..last)
        .find(|&i| window_all(i, &|v| v > threshold))
        .ok_or_else(|| {
            AnalysisError::Segmentation(format!(
                "no {w}-sample window above {threshold:.1} V after the idle gap at sample {end_f1}"
            ))
        })?;

    let end_f2 = last + 1;
    info!(
        "Segmented reference log: flight 1 [0, {end_f1}), idle [{end_f1}, {start_f2}), flight 2 [{start_f2}, {end_f2})"
    );

    Ok(FlightSegmentation {
        flight1: FlightSegment {
            phase: FlightPhase::Flight1,
            start: 0,
            end: end_f1,
        },
        idle: FlightSegment {
            phase: FlightPhase::Idle,
            start: end_f1,
            end: start_f2,
        },
        flight2: FlightSegment {
            phase: FlightPhase::Flight2,
            start: start_f2,
            end: end_f2,
        },
    })
}
