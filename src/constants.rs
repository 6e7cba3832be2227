// src/constants.rs

use plotters::style::colors::full_palette::{
    AMBER, BLUE, BROWN, DEEPORANGE, GREEN, GREY, LIGHTBLUE, ORANGE, PURPLE, RED,
};
use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1920;
pub const PLOT_HEIGHT: u32 = 1080;

// --- G1000 NXi CSV layout ---
// Line indices are 0-based, counted on raw lines of the file.
pub const G1000_HEADER_LINE: usize = 2; // airframe info, units, then column names
pub const G1000_FIRST_DATA_LINE: usize = 7; // four initialization rows follow the header
pub const G1000_DATE_COLUMN: &str = "Lcl Date";
pub const G1000_TIME_COLUMN: &str = "Lcl Time";
pub const G1000_VOLTAGE_COLUMN: &str = "volt1";
pub const G1000_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const G1000_SAMPLE_INTERVAL_S: f64 = 1.0;

// --- VDL48 reference logger layout ---
pub const VDL_FIRST_DATA_LINE: usize = 12; // 10 header lines, a blank line, column names
pub const VDL_TIME_FIELD: usize = 1;
pub const VDL_VOLTAGE_FIELD: usize = 2;
pub const VDL_MIN_FIELDS: usize = 3;
pub const VDL_TIME_FORMAT: &str = "%H:%M:%S";
pub const VDL_SAMPLE_INTERVAL_S: f64 = 2.0;

// --- AE300 ECU (AustroView export) layout ---
pub const ECU_TIMESTAMP_COLUMN: &str = "Timestamp";
pub const ECU_VOLTAGE_COLUMN: &str = "Battery Voltage [V]";
pub const ECU_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const ECU_SAMPLE_INTERVAL_S: f64 = 1.0;

// --- Maintenance event list (date,label[,kind]) ---
pub const EVENT_DATE_COLUMN: &str = "date";
pub const EVENT_LABEL_COLUMN: &str = "label";
pub const EVENT_KIND_COLUMN: &str = "kind";
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";

// --- Flight segmentation of the reference logger ---
pub const FLIGHT_THRESHOLD_V: f64 = 27.0; // below this the alternator is not charging
pub const ZERO_THRESHOLD_V: f64 = 1.0; // below this the logger is disconnected
pub const SEGMENT_WINDOW_SAMPLES: usize = 30; // ~60 s at 2 s sampling

// --- Resampling ---
pub const GRID_STEP_S: f64 = 2.0;
pub const MIN_GRID_POINTS: usize = 2;

// --- Significance bands for the paired t-test ---
pub const P_HIGHLY_SIGNIFICANT: f64 = 0.001;
pub const P_VERY_SIGNIFICANT: f64 = 0.01;
pub const P_SIGNIFICANT: f64 = 0.05;
pub const DIFF_BAND_LOW_PERCENTILE: f64 = 2.5;
pub const DIFF_BAND_HIGH_PERCENTILE: f64 = 97.5;

// --- Flight history ---
pub const CRUISE_THRESHOLD_V: f64 = 25.0; // alternator online
pub const LOW_VOLTS_THRESHOLD_V: f64 = 25.5; // LOW VOLTS annunciation region
pub const DEGRADED_THRESHOLD_V: f64 = 26.0;
pub const NOMINAL_BUS_V: f64 = 28.0;
pub const HISTORY_MIN_SAMPLES: usize = 30;
pub const HISTORY_MIN_CRUISE_SAMPLES: usize = 10;
pub const ECU_SESSION_MIN_SAMPLES: usize = 60;
pub const ECU_SESSION_MIN_CRUISE_SAMPLES: usize = 30;
pub const MIN_HISTORY_FLIGHTS: usize = 2; // change-point test and history plots

// --- Histograms ---
pub const DIFF_HISTOGRAM_BINS: usize = 60;

// --- Plot Color Assignments ---
pub const COLOR_G1000: &RGBColor = &BLUE;
pub const COLOR_VDL: &RGBColor = &GREEN;
pub const COLOR_ECU: &RGBColor = &ORANGE;
pub const COLOR_DIFFERENCE: &RGBColor = &RED;
pub const COLOR_DIFF_G1000_ECU: &RGBColor = &PURPLE;
pub const COLOR_DIFF_ECU_VDL: &RGBColor = &BROWN;
pub const COLOR_FLIGHT1: &RGBColor = &BLUE;
pub const COLOR_FLIGHT2: &RGBColor = &ORANGE;
pub const COLOR_FIT_LINE: &RGBColor = &RED;
pub const COLOR_IDENTITY_LINE: &RGBColor = &GREY;
pub const COLOR_PHASE_FLIGHT1: &RGBColor = &LIGHTBLUE;
pub const COLOR_PHASE_IDLE: &RGBColor = &AMBER;
pub const COLOR_PHASE_FLIGHT2: &RGBColor = &GREEN;
pub const COLOR_BEFORE: &RGBColor = &GREEN;
pub const COLOR_AFTER: &RGBColor = &RED;
pub const COLOR_THRESHOLD: &RGBColor = &DEEPORANGE;
pub const COLOR_NOMINAL: &RGBColor = &GREY;
pub const COLOR_HISTORY_MEAN: &RGBColor = &BLUE;
pub const COLOR_HISTORY_BAND: &RGBColor = &LIGHTBLUE;
pub const COLOR_CUSUM: &RGBColor = &PURPLE;
pub const COLOR_EVENT_ENGINE: &RGBColor = &RED;
pub const COLOR_EVENT_ELECTRICAL: &RGBColor = &ORANGE;
pub const COLOR_EVENT_AVIONICS: &RGBColor = &BLUE;

// Days of padding either side of date-axis panels.
pub const HISTORY_DATE_PAD_DAYS: f64 = 5.0;

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 1;
pub const LINE_WIDTH_LEGEND: u32 = 2;
pub const LINE_WIDTH_MARKER: u32 = 2;
pub const SCATTER_POINT_SIZE: u32 = 2;
pub const PHASE_SHADING_OPACITY: f64 = 0.15;

// Font sizes
pub const FONT_SIZE_MAIN_TITLE: i32 = 24;
pub const FONT_SIZE_CHART_TITLE: i32 = 20;
pub const FONT_SIZE_AXIS_LABEL: i32 = 15;
pub const FONT_SIZE_LEGEND: i32 = 14;
pub const FONT_SIZE_MESSAGE: i32 = 20;
pub const FONT_SIZE_ANNOTATION: i32 = 13;

// src/constants.rs
