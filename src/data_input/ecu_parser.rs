// src/data_input/ecu_parser.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::constants::{
    ECU_SAMPLE_INTERVAL_S, ECU_TIMESTAMP_COLUMN, ECU_TIMESTAMP_FORMAT, ECU_VOLTAGE_COLUMN,
};
use crate::data_input::log_data::{ParseReport, ParsedLog, RowOutcome, Sample, SkipReason, SourceLog};
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy)]
struct EcuColumns {
    timestamp: usize,
    voltage: usize,
}

/// Parses an AustroView session export (AE300 ECU) into battery-voltage samples.
///
/// Columns are located by name from the header row.
pub fn parse_ecu_file(path: &Path) -> Result<ParsedLog<NaiveDateTime>> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_ecu_reader(BufReader::new(file), path)
}

pub fn parse_ecu_reader<R: Read>(reader: R, path: &Path) -> Result<ParsedLog<NaiveDateTime>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = rdr.headers().map_err(|e| AnalysisError::csv(path, e))?.clone();
    let columns = EcuColumns {
        timestamp: find_column(&header, ECU_TIMESTAMP_COLUMN, path)?,
        voltage: find_column(&header, ECU_VOLTAGE_COLUMN, path)?,
    };

    let mut report = ParseReport::default();
    let mut samples = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let outcome = match result {
            Ok(record) => decode_ecu_row(&record, &columns),
            Err(e) => {
                debug!("{}: unreadable row {}: {}", path.display(), row_index + 1, e);
                RowOutcome::Skipped(SkipReason::TooFewFields)
            }
        };
        if let RowOutcome::Skipped(reason) = &outcome {
            debug!("{}: skipping row {}: {}", path.display(), row_index + 1, reason);
        }
        if let Some(sample) = report.record(outcome) {
            samples.push(sample);
        }
    }

    if samples.is_empty() {
        return Err(AnalysisError::NoData {
            path: path.to_path_buf(),
        });
    }
    info!("{}: {} ECU samples", path.display(), samples.len());

    let name = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    Ok(ParsedLog {
        log: SourceLog::new(name, ECU_SAMPLE_INTERVAL_S, samples),
        report,
    })
}

/// Battery-voltage-only scan of an ECU export, used for the flight history.
#[derive(Debug, Clone, PartialEq)]
pub struct EcuVoltageScan {
    pub volts: Vec<f64>,
    pub report: ParseReport,
}

/// Reads only the battery-voltage column, keeping positive values.
///
/// Timestamps are not needed here; the session start comes from the file name.
pub fn scan_ecu_voltages(path: &Path) -> Result<EcuVoltageScan> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    scan_ecu_voltages_reader(BufReader::new(file), path)
}

pub fn scan_ecu_voltages_reader<R: Read>(reader: R, path: &Path) -> Result<EcuVoltageScan> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let header = rdr.headers().map_err(|e| AnalysisError::csv(path, e))?.clone();
    let voltage = find_column(&header, ECU_VOLTAGE_COLUMN, path)?;

    let mut scan = EcuVoltageScan {
        volts: Vec::new(),
        report: ParseReport::default(),
    };
    for (row_index, result) in rdr.records().enumerate() {
        let outcome = match result {
            Ok(record) => decode_battery_only(&record, voltage),
            Err(e) => {
                debug!("{}: unreadable row {}: {}", path.display(), row_index + 1, e);
                RowOutcome::Skipped(SkipReason::TooFewFields)
            }
        };
        if let Some(volts) = scan.report.record(outcome) {
            scan.volts.push(volts);
        }
    }
    debug!(
        "{}: {} battery readings, {} rows skipped",
        path.display(),
        scan.report.rows_valid,
        scan.report.skipped_total()
    );
    Ok(scan)
}

fn decode_battery_only(record: &StringRecord, voltage: usize) -> RowOutcome<f64> {
    let Some(text) = record.get(voltage) else {
        return RowOutcome::Skipped(SkipReason::TooFewFields);
    };
    if text.is_empty() {
        return RowOutcome::Skipped(SkipReason::BlankField);
    }
    match text.parse::<f64>() {
        Ok(v) if v > 0.0 => RowOutcome::Valid(v),
        Ok(_) => RowOutcome::Skipped(SkipReason::NonPositive),
        Err(_) => RowOutcome::Skipped(SkipReason::BadNumber),
    }
}

fn decode_ecu_row(record: &StringRecord, columns: &EcuColumns) -> RowOutcome<Sample<NaiveDateTime>> {
    let (Some(ts), Some(volts)) = (record.get(columns.timestamp), record.get(columns.voltage)) else {
        return RowOutcome::Skipped(SkipReason::TooFewFields);
    };
    if ts.is_empty() || volts.is_empty() {
        return RowOutcome::Skipped(SkipReason::BlankField);
    }
    let Ok(time) = NaiveDateTime::parse_from_str(ts, ECU_TIMESTAMP_FORMAT) else {
        return RowOutcome::Skipped(SkipReason::BadTimestamp);
    };
    match volts.parse::<f64>() {
        Ok(volts) => RowOutcome::Valid(Sample { time, volts }),
        Err(_) => RowOutcome::Skipped(SkipReason::BadNumber),
    }
}

fn find_column(header: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AnalysisError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_found_by_name() {
        let text = "Engine Speed [rpm],Timestamp,Battery Voltage [V]\n\
                    2300,2026-02-08 15:51:00,28.4\n\
                    2310,2026-02-08 15:51:01,\n\
                    2320,bad,28.3\n\
                    2330,2026-02-08 15:51:03,28.5\n";
        let parsed = parse_ecu_reader(text.as_bytes(), Path::new("session80.csv")).unwrap();
        assert_eq!(parsed.log.volts().to_vec(), vec![28.4, 28.5]);
        assert_eq!(parsed.report.skipped_for(SkipReason::BlankField), 1);
        assert_eq!(parsed.report.skipped_for(SkipReason::BadTimestamp), 1);
    }

    #[test]
    fn test_missing_battery_column_is_fatal() {
        let text = "Timestamp,Coolant [C]\n2026-02-08 15:51:00,80\n";
        match parse_ecu_reader(text.as_bytes(), Path::new("session80.csv")) {
            Err(AnalysisError::MissingColumn { column, .. }) => {
                assert_eq!(column, ECU_VOLTAGE_COLUMN)
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_voltage_scan_counts_skipped_rows() {
        let text = "Timestamp,Battery Voltage [V]\n\
                    2026-02-08 15:51:00,28.4\n\
                    2026-02-08 15:51:01,\n\
                    2026-02-08 15:51:02,0.0\n\
                    2026-02-08 15:51:03,n/a\n\
                    2026-02-08 15:51:04\n\
                    2026-02-08 15:51:05,28.5\n";
        let scan = scan_ecu_voltages_reader(text.as_bytes(), Path::new("session80.csv")).unwrap();
        assert_eq!(scan.volts, vec![28.4, 28.5]);
        assert_eq!(scan.report.rows_read, 6);
        assert_eq!(scan.report.skipped_for(SkipReason::BlankField), 1);
        assert_eq!(scan.report.skipped_for(SkipReason::NonPositive), 1);
        assert_eq!(scan.report.skipped_for(SkipReason::BadNumber), 1);
        assert_eq!(scan.report.skipped_for(SkipReason::TooFewFields), 1);
    }
}
