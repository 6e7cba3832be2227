// src/data_analysis/flight_summary.rs

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDateTime;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use tracing::{debug, info, warn};

use crate::config::{CruiseFilter, EcuSessionFilter, G1000Layout};
use crate::data_analysis::pair_statistics::percentile;
use crate::data_input::ecu_parser::scan_ecu_voltages;
use crate::data_input::g1000_parser::scan_g1000_voltages;
use crate::data_input::log_discovery::{date_from_filename, list_csv_files, list_ecu_session_files};
use crate::error::Result;

/// Cruise statistics for one historical avionics log.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSummary {
    pub date: NaiveDateTime,
    pub file: String,
    pub n_samples: usize,
    pub n_cruise: usize,
    /// Mean, median, std and max are over cruise samples only.
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub max: f64,
    /// Lowest sample of the whole flight.
    pub min: f64,
    pub pct_below_degraded: f64,
    pub n_below_low_volts: usize,
}

/// Cruise statistics for one ECU engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct EcuSessionSummary {
    pub date: NaiveDateTime,
    pub file: String,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub n_cruise: usize,
}

fn cruise_values(volts: &[f64], threshold: f64) -> Array1<f64> {
    volts.iter().copied().filter(|&v| v > threshold).collect()
}

/// Summarises one flight's positive voltage readings.
///
/// Returns `None` when the flight has too few samples, too little cruise or no date.
/// `date` is the first timestamp found in the data; the file name is the fallback.
pub fn summarize_flight(
    file: &str,
    date: Option<NaiveDateTime>,
    volts: &[f64],
    filter: &CruiseFilter,
) -> Option<FlightSummary> {
    if volts.len() < filter.min_samples {
        return None;
    }
    let date = date.or_else(|| date_from_filename(file))?;
    let cruise = cruise_values(volts, filter.cruise_threshold_v);
    if cruise.len() < filter.min_cruise_samples || cruise.is_empty() {
        return None;
    }
    let all = Array1::from(volts.to_vec());
    let below_degraded = cruise.iter().filter(|&&v| v < filter.degraded_threshold_v).count();

    Some(FlightSummary {
        date,
        file: file.to_string(),
        n_samples: volts.len(),
        n_cruise: cruise.len(),
        mean: cruise.mean()?,
        median: percentile(cruise.as_slice()?, 50.0),
        std: cruise.std(0.0),
        max: *cruise.max().ok()?,
        min: *all.min().ok()?,
        pct_below_degraded: below_degraded as f64 / cruise.len() as f64 * 100.0,
        n_below_low_volts: volts.iter().filter(|&&v| v < filter.low_volts_threshold_v).count(),
    })
}

/// Summarises one ECU session's positive battery-voltage readings.
pub fn summarize_ecu_session(
    file: &str,
    date: NaiveDateTime,
    volts: &[f64],
    filter: &EcuSessionFilter,
) -> Option<EcuSessionSummary> {
    if volts.len() < filter.min_samples {
        return None;
    }
    let cruise = cruise_values(volts, filter.cruise_threshold_v);
    if cruise.len() < filter.min_cruise_samples || cruise.is_empty() {
        return None;
    }
    let all = Array1::from(volts.to_vec());
    Some(EcuSessionSummary {
        date,
        file: file.to_string(),
        mean: cruise.mean()?,
        std: cruise.std(0.0),
        min: *all.min().ok()?,
        n_cruise: cruise.len(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Summaries for every usable avionics log in `dir`, sorted by date.
///
/// Files that cannot be read or lack the required columns are skipped with a warning.
pub fn collect_flight_history(
    dir: &Path,
    layout: &G1000Layout,
    filter: &CruiseFilter,
) -> Result<Vec<FlightSummary>> {
    let files = list_csv_files(dir)?;
    info!("Found {} CSV files in {}", files.len(), dir.display());

    let mut flights = Vec::new();
    for path in &files {
        let name = file_name(path);
        let scan = match scan_g1000_voltages(path, layout) {
            Ok(scan) => scan,
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                continue;
            }
        };
        match summarize_flight(&name, scan.first_timestamp, &scan.volts, filter) {
            Some(summary) => flights.push(summary),
            None => debug!("{}: not enough cruise data or no date", name),
        }
    }

    flights.sort_by(|a, b| a.date.cmp(&b.date));
    info!("{} of {} files gave a usable flight summary", flights.len(), files.len());
    Ok(flights)
}

/// Summaries for every usable ECU session in `dir`, sorted by date.
///
/// The same session can be exported more than once; only the first file per start
/// time is used.
pub fn collect_ecu_history(dir: &Path, filter: &EcuSessionFilter) -> Result<Vec<EcuSessionSummary>> {
    let mut seen = HashSet::new();
    let mut sessions = Vec::new();
    for session in list_ecu_session_files(dir)? {
        if !seen.insert(session.started) {
            debug!("{}: duplicate export of session {}", session.path.display(), session.session);
            continue;
        }
        let name = file_name(&session.path);
        let scan = match scan_ecu_voltages(&session.path) {
            Ok(scan) => scan,
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                continue;
            }
        };
        if let Some(summary) = summarize_ecu_session(&name, session.started, &scan.volts, filter) {
            sessions.push(summary);
        }
    }
    sessions.sort_by(|a, b| a.date.cmp(&b.date));
    info!("{} usable ECU sessions in {}", sessions.len(), dir.display());
    Ok(sessions)
}

pub fn flight_means(flights: &[FlightSummary]) -> Vec<f64> {
    flights.iter().map(|f| f.mean).collect()
}

pub fn flight_stds(flights: &[FlightSummary]) -> Vec<f64> {
    flights.iter().map(|f| f.std).collect()
}
