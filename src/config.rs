// src/config.rs

// Tunable parameters grouped per pipeline stage. Defaults come from constants.rs;
// the binaries override individual fields from command-line flags.

use crate::constants::{
    CRUISE_THRESHOLD_V, DEGRADED_THRESHOLD_V, ECU_SESSION_MIN_CRUISE_SAMPLES,
    ECU_SESSION_MIN_SAMPLES, FLIGHT_THRESHOLD_V, G1000_DATE_COLUMN, G1000_FIRST_DATA_LINE,
    G1000_HEADER_LINE, G1000_TIME_COLUMN, G1000_VOLTAGE_COLUMN, GRID_STEP_S,
    HISTORY_MIN_CRUISE_SAMPLES, HISTORY_MIN_SAMPLES, LOW_VOLTS_THRESHOLD_V, MIN_GRID_POINTS,
    SEGMENT_WINDOW_SAMPLES, ZERO_THRESHOLD_V,
};

/// Where the G1000 CSV keeps its column names and which channel is read.
#[derive(Debug, Clone, PartialEq)]
pub struct G1000Layout {
    pub header_line: usize,
    pub first_data_line: usize,
    pub date_column: String,
    pub time_column: String,
    pub voltage_column: String,
}

impl Default for G1000Layout {
    fn default() -> Self {
        Self {
            header_line: G1000_HEADER_LINE,
            first_data_line: G1000_FIRST_DATA_LINE,
            date_column: G1000_DATE_COLUMN.to_string(),
            time_column: G1000_TIME_COLUMN.to_string(),
            voltage_column: G1000_VOLTAGE_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmenterConfig {
    pub flight_threshold_v: f64,
    pub zero_threshold_v: f64,
    /// Number of consecutive samples that must sit on one side of the threshold.
    pub window: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            flight_threshold_v: FLIGHT_THRESHOLD_V,
            zero_threshold_v: ZERO_THRESHOLD_V,
            window: SEGMENT_WINDOW_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentConfig {
    pub grid_step_s: f64,
    pub min_grid_points: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            grid_step_s: GRID_STEP_S,
            min_grid_points: MIN_GRID_POINTS,
        }
    }
}

/// Acceptance rules for one historical avionics log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CruiseFilter {
    pub cruise_threshold_v: f64,
    pub low_volts_threshold_v: f64,
    pub degraded_threshold_v: f64,
    pub min_samples: usize,
    pub min_cruise_samples: usize,
}

impl Default for CruiseFilter {
    fn default() -> Self {
        Self {
            cruise_threshold_v: CRUISE_THRESHOLD_V,
            low_volts_threshold_v: LOW_VOLTS_THRESHOLD_V,
            degraded_threshold_v: DEGRADED_THRESHOLD_V,
            min_samples: HISTORY_MIN_SAMPLES,
            min_cruise_samples: HISTORY_MIN_CRUISE_SAMPLES,
        }
    }
}

/// Acceptance rules for one ECU engine-run session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcuSessionFilter {
    pub cruise_threshold_v: f64,
    pub min_samples: usize,
    pub min_cruise_samples: usize,
}

impl Default for EcuSessionFilter {
    fn default() -> Self {
        Self {
            cruise_threshold_v: CRUISE_THRESHOLD_V,
            min_samples: ECU_SESSION_MIN_SAMPLES,
            min_cruise_samples: ECU_SESSION_MIN_CRUISE_SAMPLES,
        }
    }
}
