// src/data_input/vdl_parser.rs

use std::fs;
use std::path::Path;

use chrono::NaiveTime;
use tracing::{debug, info};

use crate::constants::{
    VDL_FIRST_DATA_LINE, VDL_MIN_FIELDS, VDL_SAMPLE_INTERVAL_S, VDL_TIME_FIELD, VDL_TIME_FORMAT,
    VDL_VOLTAGE_FIELD,
};
use crate::data_input::log_data::{ParseReport, ParsedLog, RowOutcome, Sample, SkipReason, SourceLog};
use crate::error::{AnalysisError, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One decoded VDL48 data line.
///
/// The logger writes `index,time,voltage[,...]`; the positions are fixed and
/// declared only here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VdlRecord {
    pub time_of_day: NaiveTime,
    pub volts: f64,
}

impl VdlRecord {
    pub const TIME_FIELD: usize = VDL_TIME_FIELD;
    pub const VOLTAGE_FIELD: usize = VDL_VOLTAGE_FIELD;
    pub const MIN_FIELDS: usize = VDL_MIN_FIELDS;

    /// Decodes a trimmed, non-blank line.
    pub fn decode(line: &str) -> RowOutcome<VdlRecord> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < Self::MIN_FIELDS {
            return RowOutcome::Skipped(SkipReason::TooFewFields);
        }
        let time_text = fields[Self::TIME_FIELD];
        let volt_text = fields[Self::VOLTAGE_FIELD];
        if time_text.is_empty() || volt_text.is_empty() {
            return RowOutcome::Skipped(SkipReason::BlankField);
        }
        let Ok(volts) = volt_text.parse::<f64>() else {
            return RowOutcome::Skipped(SkipReason::BadNumber);
        };
        match NaiveTime::parse_from_str(time_text, VDL_TIME_FORMAT) {
            Ok(time_of_day) => RowOutcome::Valid(VdlRecord { time_of_day, volts }),
            Err(_) => RowOutcome::Skipped(SkipReason::BadTimestamp),
        }
    }
}

/// Parses a VDL48 log into elapsed-seconds samples.
///
/// The dates the logger stamps are unreliable, so only the time of day is used and
/// elapsed time is measured from the first valid row. A time of day that goes
/// backwards is taken as a midnight crossing.
pub fn parse_vdl_file(path: &Path) -> Result<ParsedLog<f64>> {
    let text = fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_vdl_text(&String::from_utf8_lossy(&text), path)
}

pub fn parse_vdl_text(text: &str, path: &Path) -> Result<ParsedLog<f64>> {
    let mut report = ParseReport::default();
    let mut records = Vec::new();

    for (line_index, line) in text.lines().enumerate().skip(VDL_FIRST_DATA_LINE) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let outcome = VdlRecord::decode(line);
        if let RowOutcome::Skipped(reason) = &outcome {
            debug!("{}: skipping line {}: {}", path.display(), line_index + 1, reason);
        }
        if let Some(record) = report.record(outcome) {
            records.push(record);
        }
    }

    if records.is_empty() {
        return Err(AnalysisError::NoData {
            path: path.to_path_buf(),
        });
    }

    let samples = elapsed_samples(&records);
    if let Some(last) = samples.last() {
        info!(
            "{}: {} samples over {:.1} min, {} rows skipped",
            path.display(),
            samples.len(),
            last.time / 60.0,
            report.skipped_total()
        );
    }

    let name = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    Ok(ParsedLog {
        log: SourceLog::new(name, VDL_SAMPLE_INTERVAL_S, samples),
        report,
    })
}

fn elapsed_samples(records: &[VdlRecord]) -> Vec<Sample<f64>> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let mut day_offset = 0.0;
    let mut previous = first.time_of_day;
    records
        .iter()
        .map(|record| {
            if record.time_of_day < previous {
                day_offset += SECONDS_PER_DAY;
            }
            previous = record.time_of_day;
            let seconds = (record.time_of_day - first.time_of_day).num_milliseconds() as f64 / 1000.0;
            Sample {
                time: seconds + day_offset,
                volts: record.volts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(data: &str) -> String {
        let mut text = String::new();
        for i in 0..10 {
            text.push_str(&format!("Header line {i}\n"));
        }
        text.push('\n');
        text.push_str("No.,Time,Voltage\n");
        text.push_str(data);
        text
    }

    #[test]
    fn test_decode_fixed_positions() {
        match VdlRecord::decode("17, 15:51:02, 28.14") {
            RowOutcome::Valid(record) => {
                assert_eq!(record.volts, 28.14);
                assert_eq!(record.time_of_day, NaiveTime::from_hms_opt(15, 51, 2).unwrap());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            VdlRecord::decode("17, 15:51:02"),
            RowOutcome::Skipped(SkipReason::TooFewFields)
        );
        assert_eq!(
            VdlRecord::decode("17, 15:51:02, n/a"),
            RowOutcome::Skipped(SkipReason::BadNumber)
        );
        assert_eq!(
            VdlRecord::decode("17, 25:61:02, 28.0"),
            RowOutcome::Skipped(SkipReason::BadTimestamp)
        );
    }

    #[test]
    fn test_elapsed_from_first_row() {
        let text = with_header("1,10:00:00,28.1\n\n2,10:00:02,28.2\n3,10:00:04,28.3\n");
        let parsed = parse_vdl_text(&text, Path::new("LOG_VD.CSV")).unwrap();
        assert_eq!(parsed.log.times(), vec![0.0, 2.0, 4.0]);
        assert_eq!(parsed.log.volts().to_vec(), vec![28.1, 28.2, 28.3]);
        assert_eq!(parsed.report.rows_read, 3);
    }

    #[test]
    fn test_header_lines_are_never_data() {
        // Line 12 onward is data; the column-name line 11 must not be decoded.
        let text = with_header("1,10:00:00,28.1\n");
        let parsed = parse_vdl_text(&text, Path::new("LOG_VD.CSV")).unwrap();
        assert_eq!(parsed.report.rows_read, 1);
    }

    #[test]
    fn test_midnight_crossing_stays_monotonic() {
        let text = with_header("1,23:59:58,28.0\n2,00:00:00,28.0\n3,00:00:02,28.0\n");
        let parsed = parse_vdl_text(&text, Path::new("LOG_VD.CSV")).unwrap();
        assert_eq!(parsed.log.times(), vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_no_rows_is_no_data() {
        let text = with_header("garbage\n");
        assert!(matches!(
            parse_vdl_text(&text, Path::new("LOG_VD.CSV")),
            Err(AnalysisError::NoData { .. })
        ));
    }
}
