// src/cli.rs

// Flags shared by the binaries, plus logging setup.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::config::{AlignmentConfig, G1000Layout, SegmenterConfig};
use crate::constants::{FLIGHT_THRESHOLD_V, G1000_VOLTAGE_COLUMN, GRID_STEP_S, SEGMENT_WINDOW_SAMPLES};
use crate::error::{AnalysisError, Result};

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory for reports and plots
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// Skip PNG generation
    #[arg(long)]
    pub no_plots: bool,

    /// Resampling grid step in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = GRID_STEP_S)]
    pub grid_step: f64,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn alignment_config(&self) -> AlignmentConfig {
        AlignmentConfig {
            grid_step_s: self.grid_step,
            ..AlignmentConfig::default()
        }
    }

    /// Creates the output directory if needed.
    pub fn prepare_output_dir(&self) -> Result<&Path> {
        fs::create_dir_all(&self.output).map_err(|e| AnalysisError::io(&self.output, e))?;
        Ok(self.output.as_path())
    }
}

/// Reference-logger segmentation and avionics column flags.
#[derive(Args, Debug, Clone)]
pub struct SegmentArgs {
    /// Voltage separating alternator-on flight from engine-off idle
    #[arg(long, value_name = "VOLTS", default_value_t = FLIGHT_THRESHOLD_V)]
    pub flight_threshold: f64,

    /// Consecutive reference samples required on one side of the threshold
    #[arg(long, value_name = "SAMPLES", default_value_t = SEGMENT_WINDOW_SAMPLES)]
    pub window: usize,

    /// G1000 column holding the bus voltage
    #[arg(long, value_name = "NAME", default_value = G1000_VOLTAGE_COLUMN)]
    pub voltage_column: String,
}

impl SegmentArgs {
    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            flight_threshold_v: self.flight_threshold,
            window: self.window,
            ..SegmenterConfig::default()
        }
    }

    pub fn g1000_layout(&self) -> G1000Layout {
        G1000Layout {
            voltage_column: self.voltage_column.clone(),
            ..G1000Layout::default()
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins when set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
