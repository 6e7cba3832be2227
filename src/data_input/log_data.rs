// src/data_input/log_data.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use ndarray::Array1;

/// One voltage reading. `T` is an absolute timestamp or elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    pub time: T,
    pub volts: f64,
}

/// Ordered samples from one instrument.
///
/// Gaps are allowed: invalid rows are dropped at parse time, never filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLog<T> {
    pub name: String,
    pub nominal_interval_s: f64,
    pub samples: Vec<Sample<T>>,
}

/// Logs stamped with calendar date and time (G1000, ECU).
pub type AbsoluteLog = SourceLog<NaiveDateTime>;
/// Logs carrying elapsed seconds from their first row (VDL48).
pub type ElapsedLog = SourceLog<f64>;

impl<T: Copy> SourceLog<T> {
    pub fn new(name: impl Into<String>, nominal_interval_s: f64, samples: Vec<Sample<T>>) -> Self {
        Self {
            name: name.into(),
            nominal_interval_s,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> Vec<T> {
        self.samples.iter().map(|s| s.time).collect()
    }

    pub fn volts(&self) -> Array1<f64> {
        self.samples.iter().map(|s| s.volts).collect()
    }

    pub fn first_time(&self) -> Option<T> {
        self.samples.first().map(|s| s.time)
    }

    pub fn last_time(&self) -> Option<T> {
        self.samples.last().map(|s| s.time)
    }
}

/// Why a data row was not turned into a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    TooFewFields,
    BlankField,
    BadNumber,
    BadTimestamp,
    NonPositive,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::TooFewFields => "too few fields",
            SkipReason::BlankField => "blank required field",
            SkipReason::BadNumber => "unparseable voltage",
            SkipReason::BadTimestamp => "unparseable timestamp",
            SkipReason::NonPositive => "non-positive voltage",
        };
        f.write_str(text)
    }
}

/// Decoding result for a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    Valid(T),
    Skipped(SkipReason),
}

/// Row accounting for one parsed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub rows_read: usize,
    pub rows_valid: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl ParseReport {
    /// Counts an outcome and hands back the valid payload, if any.
    pub fn record<T>(&mut self, outcome: RowOutcome<T>) -> Option<T> {
        self.rows_read += 1;
        match outcome {
            RowOutcome::Valid(value) => {
                self.rows_valid += 1;
                Some(value)
            }
            RowOutcome::Skipped(reason) => {
                *self.skipped.entry(reason).or_insert(0) += 1;
                None
            }
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

/// A parsed log together with its row accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog<T> {
    pub log: SourceLog<T>,
    pub report: ParseReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_by_reason() {
        let mut report = ParseReport::default();
        assert_eq!(report.record(RowOutcome::Valid(1.0)), Some(1.0));
        assert_eq!(report.record::<f64>(RowOutcome::Skipped(SkipReason::BlankField)), None);
        assert_eq!(report.record::<f64>(RowOutcome::Skipped(SkipReason::BlankField)), None);
        assert_eq!(report.record::<f64>(RowOutcome::Skipped(SkipReason::BadNumber)), None);

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_valid, 1);
        assert_eq!(report.skipped_total(), 3);
        assert_eq!(report.skipped_for(SkipReason::BlankField), 2);
        assert_eq!(report.skipped_for(SkipReason::TooFewFields), 0);
    }

    #[test]
    fn test_source_log_accessors() {
        let log = SourceLog::new(
            "test",
            2.0,
            vec![
                Sample { time: 0.0, volts: 28.0 },
                Sample { time: 2.0, volts: 27.5 },
            ],
        );
        assert_eq!(log.len(), 2);
        assert_eq!(log.first_time(), Some(0.0));
        assert_eq!(log.last_time(), Some(2.0));
        assert_eq!(log.volts().to_vec(), vec![28.0, 27.5]);
    }
}
