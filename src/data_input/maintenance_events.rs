// src/data_input/maintenance_events.rs

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::constants::{EVENT_DATE_COLUMN, EVENT_DATE_FORMAT, EVENT_KIND_COLUMN, EVENT_LABEL_COLUMN};
use crate::data_input::log_data::{ParseReport, RowOutcome, SkipReason};
use crate::error::{AnalysisError, Result};

/// What was worked on; selects the marker colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventKind {
    Engine,
    #[default]
    Electrical,
    Avionics,
}

impl EventKind {
    /// Case-insensitive; anything unrecognised is `None`.
    pub fn from_text(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "engine" => Some(EventKind::Engine),
            "electrical" => Some(EventKind::Electrical),
            "avionics" => Some(EventKind::Avionics),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EventKind::Engine => "engine",
            EventKind::Electrical => "electrical",
            EventKind::Avionics => "avionics",
        };
        f.write_str(text)
    }
}

/// A dated maintenance log entry drawn against the voltage history.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceEvent {
    pub date: NaiveDate,
    pub label: String,
    pub kind: EventKind,
}

/// Events sorted by date, with row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    pub events: Vec<MaintenanceEvent>,
    pub report: ParseReport,
}

#[derive(Debug, Clone, Copy)]
struct EventColumns {
    date: usize,
    label: usize,
    kind: Option<usize>,
}

/// Reads a `date,label[,kind]` CSV of maintenance events.
///
/// Dates are `YYYY-MM-DD`. A missing or unknown kind counts as electrical work.
pub fn parse_event_file(path: &Path) -> Result<EventLog> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_event_reader(BufReader::new(file), path)
}

pub fn parse_event_reader<R: Read>(reader: R, path: &Path) -> Result<EventLog> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header = rdr.headers().map_err(|e| AnalysisError::csv(path, e))?.clone();
    let columns = EventColumns {
        date: find_column(&header, EVENT_DATE_COLUMN)
            .ok_or_else(|| missing_column(path, EVENT_DATE_COLUMN))?,
        label: find_column(&header, EVENT_LABEL_COLUMN)
            .ok_or_else(|| missing_column(path, EVENT_LABEL_COLUMN))?,
        kind: find_column(&header, EVENT_KIND_COLUMN),
    };

    let mut report = ParseReport::default();
    let mut events = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let outcome = match result {
            Ok(record) => decode_event_row(&record, &columns),
            Err(e) => {
                debug!("{}: unreadable row {}: {}", path.display(), row_index + 1, e);
                RowOutcome::Skipped(SkipReason::TooFewFields)
            }
        };
        if let RowOutcome::Skipped(reason) = &outcome {
            debug!("{}: skipping event row {}: {}", path.display(), row_index + 1, reason);
        }
        if let Some(event) = report.record(outcome) {
            events.push(event);
        }
    }

    if events.is_empty() {
        return Err(AnalysisError::NoData {
            path: path.to_path_buf(),
        });
    }
    events.sort_by_key(|e| e.date);
    info!("{}: {} maintenance events", path.display(), events.len());
    Ok(EventLog { events, report })
}

fn decode_event_row(record: &StringRecord, columns: &EventColumns) -> RowOutcome<MaintenanceEvent> {
    let (Some(date), Some(label)) = (record.get(columns.date), record.get(columns.label)) else {
        return RowOutcome::Skipped(SkipReason::TooFewFields);
    };
    if date.is_empty() || label.is_empty() {
        return RowOutcome::Skipped(SkipReason::BlankField);
    }
    let Ok(date) = NaiveDate::parse_from_str(date, EVENT_DATE_FORMAT) else {
        return RowOutcome::Skipped(SkipReason::BadTimestamp);
    };
    let kind = columns
        .kind
        .and_then(|i| record.get(i))
        .and_then(EventKind::from_text)
        .unwrap_or_default();
    RowOutcome::Valid(MaintenanceEvent {
        date,
        label: label.to_string(),
        kind,
    })
}

fn find_column(header: &StringRecord, name: &str) -> Option<usize> {
    header.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn missing_column(path: &Path, name: &str) -> AnalysisError {
    AnalysisError::MissingColumn {
        path: path.to_path_buf(),
        column: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_events_sorted_with_kinds() {
        let text = "Date,Label,Kind\n\
                    2024-03-27,Alt #2 replaced,electrical\n\
                    2024-02-28,Engine R&R (oil leak),Engine\n\
                    2024-07-26,G1000 P2413 repinned,avionics\n\
                    2025-02-21,Main alt + VR replaced,\n";
        let log = parse_event_reader(text.as_bytes(), Path::new("events.csv")).unwrap();

        let dates: Vec<NaiveDate> = log.events.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![day(2024, 2, 28), day(2024, 3, 27), day(2024, 7, 26), day(2025, 2, 21)]
        );
        assert_eq!(log.events[0].label, "Engine R&R (oil leak)");
        assert_eq!(log.events[0].kind, EventKind::Engine);
        assert_eq!(log.events[2].kind, EventKind::Avionics);
        assert_eq!(log.events[3].kind, EventKind::Electrical);
        assert_eq!(log.report.rows_valid, 4);
    }

    #[test]
    fn test_kind_column_is_optional() {
        let text = "date,label\n2024-06-30,VR replaced + wire repair\n";
        let log = parse_event_reader(text.as_bytes(), Path::new("events.csv")).unwrap();
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].kind, EventKind::Electrical);
    }

    #[test]
    fn test_bad_rows_are_counted() {
        let text = "date,label\n\
                    2024-04-15,Voltage reg replaced\n\
                    04/15/2024,US date\n\
                    2024-05-01,\n\
                    2024-05-02\n";
        let log = parse_event_reader(text.as_bytes(), Path::new("events.csv")).unwrap();
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.report.skipped_for(SkipReason::BadTimestamp), 1);
        assert_eq!(log.report.skipped_for(SkipReason::BlankField), 1);
        assert_eq!(log.report.skipped_for(SkipReason::TooFewFields), 1);
    }

    #[test]
    fn test_missing_label_column_is_fatal() {
        let text = "date,notes\n2024-04-15,x\n";
        match parse_event_reader(text.as_bytes(), Path::new("events.csv")) {
            Err(AnalysisError::MissingColumn { column, .. }) => assert_eq!(column, "label"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_no_valid_events_is_an_error() {
        let text = "date,label\nsoon,Annual\n";
        assert!(matches!(
            parse_event_reader(text.as_bytes(), Path::new("events.csv")),
            Err(AnalysisError::NoData { .. })
        ));
    }
}

// src/data_input/maintenance_events.rs
