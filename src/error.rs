// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Structural failures that end an analysis run.
///
/// Row-level problems never surface here: they are skipped and counted in
/// [`crate::data_input::log_data::ParseReport`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' ends before its header line {line}")]
    TruncatedHeader { path: PathBuf, line: usize },

    #[error("required column '{column}' not found in '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("no valid data rows in '{path}'")]
    NoData { path: PathBuf },

    #[error("could not segment reference log into flight phases: {0}")]
    Segmentation(String),

    #[error("sources do not overlap enough to compare ({points} grid points, need at least {required})")]
    DegenerateOverlap { points: usize, required: usize },

    #[error("series lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("not enough data: {0}")]
    InsufficientData(String),

    #[error("no ECU log for session {session} in '{dir}'")]
    NoEcuSession { dir: PathBuf, session: u32 },

    #[error("directory not found: '{0}'")]
    MissingDirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        AnalysisError::Csv {
            path: path.into(),
            source,
        }
    }
}
