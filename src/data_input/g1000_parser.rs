// src/data_input/g1000_parser.rs

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info};

use crate::config::G1000Layout;
use crate::constants::{G1000_SAMPLE_INTERVAL_S, G1000_TIMESTAMP_FORMAT};
use crate::data_input::log_data::{ParseReport, ParsedLog, RowOutcome, Sample, SkipReason, SourceLog};
use crate::error::{AnalysisError, Result};

/// Column positions resolved from the G1000 header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G1000Columns {
    pub date: usize,
    pub time: usize,
    pub voltage: usize,
}

impl G1000Columns {
    fn locate(header: &ByteRecord, layout: &G1000Layout, path: &Path) -> Result<Self> {
        let names: Vec<String> = header.iter().map(|f| field_text(f).trim().to_string()).collect();
        let find = |column: &str| {
            names
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| AnalysisError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                })
        };
        Ok(Self {
            date: find(&layout.date_column)?,
            time: find(&layout.time_column)?,
            voltage: find(&layout.voltage_column)?,
        })
    }

    fn min_fields(&self) -> usize {
        self.date.max(self.time).max(self.voltage) + 1
    }
}

/// Voltage-only scan of a G1000 log, used for the flight history.
#[derive(Debug, Clone, PartialEq)]
pub struct G1000VoltageScan {
    /// Timestamp of the first row whose date and time both parse.
    pub first_timestamp: Option<NaiveDateTime>,
    pub volts: Vec<f64>,
    pub report: ParseReport,
}

/// Parses a G1000 NXi data log into timestamped `volt1` samples.
///
/// The column-name row sits at `layout.header_line`; data starts at
/// `layout.first_data_line`, after the avionics initialization rows. Rows with a blank
/// date, time or voltage (power-up transients) are skipped.
pub fn parse_g1000_file(path: &Path, layout: &G1000Layout) -> Result<ParsedLog<NaiveDateTime>> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_g1000_reader(BufReader::new(file), path, layout)
}

pub fn parse_g1000_reader<R: Read>(
    reader: R,
    path: &Path,
    layout: &G1000Layout,
) -> Result<ParsedLog<NaiveDateTime>> {
    let mut report = ParseReport::default();
    let mut samples = Vec::new();

    for_each_data_row(reader, path, layout, |line, record, columns| {
        let outcome = decode_g1000_row(record, columns);
        if let RowOutcome::Skipped(reason) = &outcome {
            debug!("{}: skipping line {}: {}", path.display(), line + 1, reason);
        }
        if let Some(sample) = report.record(outcome) {
            samples.push(sample);
        }
    })?;

    if samples.is_empty() {
        return Err(AnalysisError::NoData {
            path: path.to_path_buf(),
        });
    }

    info!(
        "{}: {} samples, {} rows skipped",
        path.display(),
        samples.len(),
        report.skipped_total()
    );

    Ok(ParsedLog {
        log: SourceLog::new(source_name(path), G1000_SAMPLE_INTERVAL_S, samples),
        report,
    })
}

/// Reads only the voltage channel. Non-positive readings are dropped.
///
/// Unlike [`parse_g1000_file`] an empty result is not an error: the history run
/// decides per file whether there is enough data.
pub fn scan_g1000_voltages(path: &Path, layout: &G1000Layout) -> Result<G1000VoltageScan> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    scan_g1000_voltages_reader(BufReader::new(file), path, layout)
}

pub fn scan_g1000_voltages_reader<R: Read>(
    reader: R,
    path: &Path,
    layout: &G1000Layout,
) -> Result<G1000VoltageScan> {
    let mut scan = G1000VoltageScan {
        first_timestamp: None,
        volts: Vec::new(),
        report: ParseReport::default(),
    };

    for_each_data_row(reader, path, layout, |_, record, columns| {
        let outcome = decode_voltage_only(record, columns);
        if let Some(volts) = scan.report.record(outcome) {
            scan.volts.push(volts);
            if scan.first_timestamp.is_none() {
                if let Some(field_date) = record.get(columns.date) {
                    let date = field_text(field_date);
                    let time = record.get(columns.time).map(field_text).unwrap_or_default();
                    scan.first_timestamp = parse_timestamp(date.trim(), time.trim());
                }
            }
        }
    })?;

    Ok(scan)
}

/// Decodes one data row into a sample.
pub fn decode_g1000_row(
    record: &ByteRecord,
    columns: &G1000Columns,
) -> RowOutcome<Sample<NaiveDateTime>> {
    if record.len() < columns.min_fields() {
        return RowOutcome::Skipped(SkipReason::TooFewFields);
    }
    let date = field_text(&record[columns.date]);
    let time = field_text(&record[columns.time]);
    let volts = field_text(&record[columns.voltage]);
    let (date, time, volts) = (date.trim(), time.trim(), volts.trim());

    if date.is_empty() || time.is_empty() || volts.is_empty() {
        return RowOutcome::Skipped(SkipReason::BlankField);
    }
    let Ok(volts) = volts.parse::<f64>() else {
        return RowOutcome::Skipped(SkipReason::BadNumber);
    };
    match parse_timestamp(date, time) {
        Some(time) => RowOutcome::Valid(Sample { time, volts }),
        None => RowOutcome::Skipped(SkipReason::BadTimestamp),
    }
}

fn decode_voltage_only(record: &ByteRecord, columns: &G1000Columns) -> RowOutcome<f64> {
    let Some(raw) = record.get(columns.voltage) else {
        return RowOutcome::Skipped(SkipReason::TooFewFields);
    };
    let text = field_text(raw);
    let text = text.trim();
    if text.is_empty() {
        return RowOutcome::Skipped(SkipReason::BlankField);
    }
    match text.parse::<f64>() {
        Ok(v) if v > 0.0 => RowOutcome::Valid(v),
        Ok(_) => RowOutcome::Skipped(SkipReason::NonPositive),
        Err(_) => RowOutcome::Skipped(SkipReason::BadNumber),
    }
}

fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), G1000_TIMESTAMP_FORMAT).ok()
}

/// Walks the raw lines of a G1000 log, resolving the header and handing each data
/// line (0-based index, record, columns) to `visit`. Lines before the first data
/// line are never passed on.
fn for_each_data_row<R, F>(reader: R, path: &Path, layout: &G1000Layout, mut visit: F) -> Result<()>
where
    R: Read,
    F: FnMut(usize, &ByteRecord, &G1000Columns),
{
    // Plain comma splitting: G1000 exports are unquoted and rows vary in width.
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut columns: Option<G1000Columns> = None;
    let mut record = ByteRecord::new();
    loop {
        let more = rdr
            .read_byte_record(&mut record)
            .map_err(|e| AnalysisError::csv(path, e))?;
        if !more {
            break;
        }
        let line = record
            .position()
            .map(|p| p.line().saturating_sub(1) as usize)
            .unwrap_or(0);

        if line == layout.header_line {
            columns = Some(G1000Columns::locate(&record, layout, path)?);
            continue;
        }
        if line < layout.first_data_line {
            continue;
        }
        match &columns {
            Some(cols) => visit(line, &record, cols),
            None => break,
        }
    }

    if columns.is_none() {
        return Err(AnalysisError::TruncatedHeader {
            path: path.to_path_buf(),
            line: layout.header_line + 1,
        });
    }
    Ok(())
}

fn field_text(raw: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(raw)
}

fn source_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "#airframe_info, log_version=\"1.00\"\n\
        #yyy-mm-dd, hh:mm:ss, volts, volts\n\
        Lcl Date, Lcl Time, volt1, volt2\n";

    fn parse(text: &str) -> Result<ParsedLog<NaiveDateTime>> {
        parse_g1000_reader(text.as_bytes(), Path::new("flight.csv"), &G1000Layout::default())
    }

    #[test]
    fn test_init_rows_are_never_consulted() {
        // Lines 3..7 look like valid data but precede the first data line.
        let text = format!(
            "{HEADER}2026-02-08, 15:50:00, 11.0, 0\n\
             2026-02-08, 15:50:01, 12.0, 0\n\
             2026-02-08, 15:50:02, 13.0, 0\n\
             2026-02-08, 15:50:03, 14.0, 0\n\
             2026-02-08, 15:51:00, 27.9, 0\n"
        );
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.log.len(), 1);
        let sample = parsed.log.samples[0];
        assert_eq!(sample.volts, 27.9);
        assert_eq!(
            sample.time,
            NaiveDateTime::parse_from_str("2026-02-08 15:51:00", "%Y-%m-%d %H:%M:%S").unwrap()
        );
        assert_eq!(parsed.report.rows_read, 1);
    }

    #[test]
    fn test_blank_and_bad_rows_are_counted() {
        let text = format!(
            "{HEADER}a\nb\nc\nd\n\
             2026-02-08, 15:51:00, , 0\n\
             2026-02-08, 15:51:01, abc, 0\n\
             2026-02-08, 15:51:02\n\
             2026-02-08, 99:99:99, 28.0, 0\n\
             2026-02-08, 15:51:04, 28.1, 0\n"
        );
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.log.len(), 1);
        assert_eq!(parsed.report.skipped_for(SkipReason::BlankField), 1);
        assert_eq!(parsed.report.skipped_for(SkipReason::BadNumber), 1);
        assert_eq!(parsed.report.skipped_for(SkipReason::TooFewFields), 1);
        assert_eq!(parsed.report.skipped_for(SkipReason::BadTimestamp), 1);
    }

    #[test]
    fn test_missing_voltage_column_is_fatal() {
        let text = "x\ny\nLcl Date, Lcl Time, volt2\na\nb\nc\nd\n2026-02-08, 15:51:00, 28.0\n";
        match parse(text) {
            Err(AnalysisError::MissingColumn { column, .. }) => assert_eq!(column, "volt1"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_no_valid_rows_is_no_data() {
        let text = format!("{HEADER}a\nb\nc\nd\n2026-02-08, 15:51:00, , 0\n");
        assert!(matches!(parse(&text), Err(AnalysisError::NoData { .. })));
    }

    #[test]
    fn test_short_file_is_truncated_header() {
        assert!(matches!(
            parse("only one line\n"),
            Err(AnalysisError::TruncatedHeader { .. })
        ));
    }

    #[test]
    fn test_voltage_scan_drops_non_positive_and_keeps_first_date() {
        let text = format!(
            "{HEADER}a\nb\nc\nd\n\
             , , 0.0, 0\n\
             , , 26.5, 0\n\
             2026-02-08, 15:51:02, 27.5, 0\n\
             2026-02-08, 15:51:03, 27.7, 0\n"
        );
        let scan = scan_g1000_voltages_reader(
            text.as_bytes(),
            Path::new("flight.csv"),
            &G1000Layout::default(),
        )
        .unwrap();
        assert_eq!(scan.volts, vec![26.5, 27.5, 27.7]);
        assert_eq!(scan.report.skipped_for(SkipReason::NonPositive), 1);
        assert_eq!(
            scan.first_timestamp,
            NaiveDateTime::parse_from_str("2026-02-08 15:51:02", "%Y-%m-%d %H:%M:%S").ok()
        );
    }
}
