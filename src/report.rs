// src/report.rs

// Plain-text reports. Everything is written to a caller-supplied sink so the
// binaries can send the same text to the console and to a report file.

use std::io::{self, Write};

use chrono::NaiveDate;

use crate::data_analysis::change_point::{ChangePoint, Cusum, RegimeSplit};
use crate::data_analysis::flight_summary::{EcuSessionSummary, FlightSummary};
use crate::data_analysis::pair_statistics::{
    GridComparison, PairStatistics, Significance, SourceSummary,
};
use crate::data_analysis::segmentation::SegmentDescription;
use crate::data_input::log_data::ParseReport;
use crate::data_input::maintenance_events::MaintenanceEvent;

const WIDE_RULE: usize = 70;
const RULE: usize = 65;

fn opt_volts(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(v) => format!("{v:.precision$} V"),
        None => "n/a".to_string(),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some((values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt())
}

/// Title lines at the top of every report.
pub fn write_report_header<W: Write>(out: &mut W, title: &str, subtitle: Option<&str>) -> io::Result<()> {
    writeln!(out, "{title}")?;
    if let Some(subtitle) = subtitle {
        writeln!(out, "{subtitle}")?;
    }
    Ok(())
}

/// Blank line and a `title:` line.
pub fn write_section_title<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}:")
}

/// Row accounting for one input file.
pub fn write_parse_summary<W: Write>(out: &mut W, label: &str, report: &ParseReport) -> io::Result<()> {
    write!(out, "  {label}: {} valid rows", report.rows_valid)?;
    if report.skipped_total() > 0 {
        let reasons: Vec<String> = report
            .skipped
            .iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect();
        write!(out, ", {} skipped ({})", report.skipped_total(), reasons.join(", "))?;
    }
    writeln!(out)
}

/// One line per flight phase with index range, duration and mean voltage.
pub fn write_segmentation<W: Write>(out: &mut W, segments: &[SegmentDescription]) -> io::Result<()> {
    for d in segments {
        writeln!(
            out,
            "  {}: indices {}-{} ({:.1} min, mean {})",
            d.segment.phase,
            d.segment.start,
            d.segment.end,
            d.duration_min,
            opt_volts(d.mean_volts, 2)
        )?;
    }
    Ok(())
}

fn write_source_line<W: Write>(out: &mut W, s: &SourceSummary, width: usize) -> io::Result<()> {
    writeln!(
        out,
        "  {:<width$} - mean: {:6.2} V   std: {:.3} V   range: [{:.2}, {:.2}]",
        s.label, s.mean, s.std, s.min, s.max
    )
}

fn write_correlation_and_t<W: Write>(out: &mut W, pair: &PairStatistics, indent: &str, stars: bool) -> io::Result<()> {
    match pair.correlation {
        Some(c) => writeln!(out, "{indent}Pearson r:         {:.4}  (p = {:.2e})", c.r, c.p_value)?,
        None => writeln!(out, "{indent}Pearson r:         undefined (constant input)")?,
    }
    match pair.t_test {
        Some(t) => {
            let marks = if stars { Significance::stars(t.p_value) } else { "" };
            writeln!(
                out,
                "{indent}Paired t-test:     t = {:.2},  p = {:.2e}  {marks}",
                t.t, t.p_value
            )?;
        }
        None => writeln!(out, "{indent}Paired t-test:     undefined (identical differences)")?,
    }
    Ok(())
}

fn section_header<W: Write>(out: &mut W, title: &str, width: usize) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(width))?;
    writeln!(out, "  {title}")?;
    writeln!(out, "{}", "=".repeat(width))?;
    Ok(())
}

/// Detailed block for a two-source comparison (first pair of `comparison`).
pub fn write_pair_block<W: Write>(out: &mut W, title: &str, comparison: &GridComparison) -> io::Result<()> {
    section_header(out, title, RULE)?;
    writeln!(out, "  Samples (paired, {:.0}-sec grid):  {}", comparison.step_s, comparison.samples)?;
    writeln!(out, "  Duration:                      {:.1} min", comparison.duration_min())?;
    writeln!(out)?;
    for s in &comparison.sources {
        write_source_line(out, s, 19)?;
    }

    let Some(pair) = comparison.pairs.first() else {
        return Ok(());
    };
    let d = &pair.diff;
    writeln!(out)?;
    writeln!(out, "  Difference ({}):", pair.label())?;
    writeln!(out, "    Mean:    {:+.3} V", d.mean)?;
    writeln!(out, "    Median:  {:+.3} V", d.median)?;
    writeln!(out, "    Std Dev: {:.3} V", d.std)?;
    writeln!(out, "    Min:     {:+.3} V", d.min)?;
    writeln!(out, "    Max:     {:+.3} V", d.max)?;
    writeln!(out, "    95% CI:  [{:+.3}, {:+.3}] V", d.band.0, d.band.1)?;
    writeln!(out)?;
    write_correlation_and_t(out, pair, "  ", false)?;
    if let Some(t) = pair.t_test {
        writeln!(out, "  -> {}", Significance::from_p(t.p_value).description())?;
    }
    Ok(())
}

/// Compact block with every pair of a three-source comparison.
pub fn write_three_way_block<W: Write>(out: &mut W, title: &str, comparison: &GridComparison) -> io::Result<()> {
    section_header(out, title, WIDE_RULE)?;
    writeln!(out, "  Samples (paired, {:.0}-sec grid):  {}", comparison.step_s, comparison.samples)?;
    writeln!(out, "  Duration:                      {:.1} min", comparison.duration_min())?;
    writeln!(out)?;
    for s in &comparison.sources {
        write_source_line(out, s, 17)?;
    }
    for pair in &comparison.pairs {
        let d = &pair.diff;
        writeln!(out)?;
        writeln!(out, "  {}:", pair.label())?;
        writeln!(out, "    Mean diff:   {:+.3} V", d.mean)?;
        writeln!(out, "    Std Dev:     {:.3} V", d.std)?;
        writeln!(out, "    95% range:   [{:+.3}, {:+.3}] V", d.band.0, d.band.1)?;
        writeln!(out, "    Min/Max:     [{:+.3}, {:+.3}] V", d.min, d.max)?;
        write_correlation_and_t(out, pair, "    ", true)?;
    }
    Ok(())
}

/// Per-flight history table.
pub fn write_history_table<W: Write>(out: &mut W, flights: &[FlightSummary]) -> io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>7} {:>7} {:>6} {:>6} {:>8}  File",
        "Date", "Mean V", "Min V", "Std", "%<26V", "Samples"
    )?;
    writeln!(out, "{}", "-".repeat(100))?;
    for f in flights {
        writeln!(
            out,
            "{:<20} {:>7.2} {:>7.2} {:>6.3} {:>5.1}% {:>8}  {}",
            f.date.format("%Y-%m-%d %H:%M").to_string(),
            f.mean,
            f.min,
            f.std,
            f.pct_below_degraded,
            f.n_cruise,
            f.file
        )?;
    }
    Ok(())
}

/// Overall summary, change point and regime comparison, then any maintenance
/// events with their distance from the change point.
pub fn write_change_point_summary<W: Write>(
    out: &mut W,
    flights: &[FlightSummary],
    change_point: &ChangePoint,
    split: &RegimeSplit,
    cusum: &Cusum,
    events: &[MaintenanceEvent],
) -> io::Result<()> {
    let (Some(first), Some(last)) = (flights.first(), flights.last()) else {
        return writeln!(out, "No flights to summarise.");
    };
    let means: Vec<f64> = flights.iter().map(|f| f.mean).collect();
    let stds: Vec<f64> = flights.iter().map(|f| f.std).collect();

    section_header(out, "SUMMARY", 60)?;
    writeln!(out, "Total flights analyzed: {}", flights.len())?;
    writeln!(
        out,
        "Date range: {} to {}",
        first.date.format("%Y-%m-%d"),
        last.date.format("%Y-%m-%d")
    )?;
    writeln!(out, "Overall mean voltage: {}", opt_volts(mean(&means), 2))?;
    writeln!(out, "Overall mean std dev: {}", opt_volts(mean(&stds), 3))?;

    let Some(at) = flights.get(change_point.index) else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(
        out,
        "Change-point detected: {} (flight #{})",
        at.date.format("%Y-%m-%d"),
        change_point.index + 1
    )?;
    writeln!(
        out,
        "  Pettitt K-statistic: {},  p-value: {:.2e}",
        change_point.k_statistic, change_point.p_value
    )?;
    writeln!(
        out,
        "  Before ({} flights): mean={}, noise={}",
        split.before.count,
        opt_volts(split.before.mean_volts, 2),
        opt_volts(split.before.mean_noise, 3)
    )?;
    writeln!(
        out,
        "  After  ({} flights): mean={}, noise={}",
        split.after.count,
        opt_volts(split.after.mean_volts, 2),
        opt_volts(split.after.mean_noise, 3)
    )?;
    writeln!(out, "  Voltage drop: {}", opt_volts(split.voltage_drop(), 2))?;
    if let Some(pct) = split.noise_change_pct() {
        writeln!(out, "  Noise change: {pct:+.0}%")?;
    }
    writeln!(out, "  File at change point: {}", at.file)?;
    if let Some(peak) = flights.get(cusum.peak_index) {
        writeln!(
            out,
            "  CUSUM peak: {} (flight #{})",
            peak.date.format("%Y-%m-%d"),
            cusum.peak_index + 1
        )?;
    }
    write_maintenance_events(out, events, at.date.date())
}

fn write_maintenance_events<W: Write>(
    out: &mut W,
    events: &[MaintenanceEvent],
    change_date: NaiveDate,
) -> io::Result<()> {
    if events.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Maintenance Events:")?;
    for event in events {
        let days = (event.date - change_date).num_days();
        writeln!(
            out,
            "  {}: {} [{}, {:+} days from change point]",
            event.date.format("%Y-%m-%d"),
            event.label,
            event.kind,
            days
        )?;
    }
    Ok(())
}

/// Independent ECU reference compared with the avionics history.
pub fn write_ecu_reference<W: Write>(
    out: &mut W,
    sessions: &[EcuSessionSummary],
    flights: &[FlightSummary],
) -> io::Result<()> {
    let (Some(first), Some(last)) = (sessions.first(), sessions.last()) else {
        return writeln!(out, "\nNo ECU session data found - skipping ECU reference.");
    };
    let ecu_means: Vec<f64> = sessions.iter().map(|s| s.mean).collect();
    let ecu_stds: Vec<f64> = sessions.iter().map(|s| s.std).collect();
    let flight_means: Vec<f64> = flights.iter().map(|f| f.mean).collect();

    writeln!(out)?;
    writeln!(out, "ECU Reference (independent measurement):")?;
    writeln!(out, "  Sessions: {}", sessions.len())?;
    writeln!(
        out,
        "  Date range: {} to {}",
        first.date.format("%Y-%m-%d"),
        last.date.format("%Y-%m-%d")
    )?;
    writeln!(
        out,
        "  Mean cruise voltage: {} (std of means: {})",
        opt_volts(mean(&ecu_means), 2),
        opt_volts(population_std(&ecu_means), 3)
    )?;
    writeln!(out, "  Mean noise (std dev): {}", opt_volts(mean(&ecu_stds), 3))?;
    if let (Some(e), Some(g)) = (mean(&ecu_means), mean(&flight_means)) {
        writeln!(out, "  ECU minus G1000 mean: {:+.2} V", e - g)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::alignment::{AlignedColumn, AlignedGrid};
    use crate::data_analysis::change_point::{cusum, pettitt, regime_split};
    use crate::data_analysis::pair_statistics::compare_grid;
    use crate::source_names::VoltageSource;
    use chrono::NaiveDate;
    use ndarray::array;

    fn grid() -> AlignedGrid {
        AlignedGrid {
            step_s: 2.0,
            offsets_s: array![0.0, 2.0, 4.0, 6.0],
            columns: vec![
                AlignedColumn { source: VoltageSource::G1000, volts: array![27.6, 27.9, 27.7, 28.0] },
                AlignedColumn { source: VoltageSource::Vdl48, volts: array![28.0, 28.2, 28.1, 28.4] },
            ],
        }
    }

    #[test]
    fn test_pair_block_layout() {
        let comparison = compare_grid(&grid()).unwrap();
        let mut out = Vec::new();
        write_pair_block(&mut out, "Flight 1", &comparison).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("  Flight 1\n"));
        assert!(text.contains("Samples (paired, 2-sec grid):  4"));
        assert!(text.contains("Difference (G1000 - VDL48):"));
        assert!(text.contains("Mean:    -0.375 V"));
        assert!(text.contains("G1000 volt1"));
        assert!(text.contains("Pearson r:"));
        assert!(text.contains("-> "));
    }

    #[test]
    fn test_three_way_block_lists_every_pair() {
        let mut g = grid();
        g.columns.insert(
            1,
            AlignedColumn { source: VoltageSource::Ecu, volts: array![28.1, 28.1, 28.3, 28.2] },
        );
        let comparison = compare_grid(&g).unwrap();
        let mut out = Vec::new();
        write_three_way_block(&mut out, "Combined", &comparison).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("  G1000 - ECU:"));
        assert!(text.contains("  G1000 - VDL48:"));
        assert!(text.contains("  ECU - VDL48:"));
        assert!(text.contains("ECU ch808"));
    }

    #[test]
    fn test_constant_input_reported_as_undefined() {
        let g = AlignedGrid {
            step_s: 2.0,
            offsets_s: array![0.0, 2.0, 4.0],
            columns: vec![
                AlignedColumn { source: VoltageSource::G1000, volts: array![28.0, 28.0, 28.0] },
                AlignedColumn { source: VoltageSource::Vdl48, volts: array![27.0, 27.0, 27.0] },
            ],
        };
        let comparison = compare_grid(&g).unwrap();
        let mut out = Vec::new();
        write_pair_block(&mut out, "Flat", &comparison).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Pearson r:         undefined"));
        assert!(text.contains("Paired t-test:     undefined"));
    }

    fn flight(day: u32, mean: f64) -> FlightSummary {
        FlightSummary {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            file: format!("log_{day}.csv"),
            n_samples: 100,
            n_cruise: 90,
            mean,
            median: mean,
            std: 0.1,
            max: mean + 0.3,
            min: 24.0,
            pct_below_degraded: 0.0,
            n_below_low_volts: 2,
        }
    }

    #[test]
    fn test_history_and_change_point_text() {
        let flights: Vec<FlightSummary> = (1..=10)
            .map(|d| flight(d, if d <= 5 { 28.0 } else { 26.0 }))
            .collect();
        let means: Vec<f64> = flights.iter().map(|f| f.mean).collect();
        let stds: Vec<f64> = flights.iter().map(|f| f.std).collect();
        let cp = pettitt(&means).unwrap();
        let split = regime_split(&means, &stds, cp.index);
        let trace = cusum(&means).unwrap();

        let mut out = Vec::new();
        write_history_table(&mut out, &flights).unwrap();
        write_change_point_summary(&mut out, &flights, &cp, &split, &trace, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("2024-03-01 09:00"));
        assert!(text.contains("Change-point detected: 2024-03-05 (flight #5)"));
        assert!(text.contains("Pettitt K-statistic: 25"));
        assert!(text.contains("Voltage drop: 2.00 V"));
        assert!(text.contains("File at change point: log_5.csv"));
        assert!(!text.contains("Maintenance Events"));
    }

    #[test]
    fn test_change_point_summary_lists_events() {
        use crate::data_input::maintenance_events::EventKind;
        let flights: Vec<FlightSummary> = (1..=10)
            .map(|d| flight(d, if d <= 5 { 28.0 } else { 26.0 }))
            .collect();
        let means: Vec<f64> = flights.iter().map(|f| f.mean).collect();
        let stds: Vec<f64> = flights.iter().map(|f| f.std).collect();
        let cp = pettitt(&means).unwrap();
        let split = regime_split(&means, &stds, cp.index);
        let trace = cusum(&means).unwrap();
        let events = [
            MaintenanceEvent {
                date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                label: "Engine R&R".to_string(),
                kind: EventKind::Engine,
            },
            MaintenanceEvent {
                date: NaiveDate::from_ymd_opt(2024, 3, 27).unwrap(),
                label: "Alt #2 replaced".to_string(),
                kind: EventKind::Electrical,
            },
        ];

        let mut out = Vec::new();
        write_change_point_summary(&mut out, &flights, &cp, &split, &trace, &events).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("\nMaintenance Events:\n"));
        assert!(text.contains("  2024-03-04: Engine R&R [engine, -1 days from change point]"));
        assert!(text.contains("  2024-03-27: Alt #2 replaced [electrical, +22 days from change point]"));
    }

    #[test]
    fn test_parse_summary_lists_skip_reasons() {
        use crate::data_input::log_data::{RowOutcome, SkipReason};
        let mut report = ParseReport::default();
        report.record(RowOutcome::Valid(()));
        report.record::<()>(RowOutcome::Skipped(SkipReason::BadNumber));
        report.record::<()>(RowOutcome::Skipped(SkipReason::BadNumber));
        let mut out = Vec::new();
        write_parse_summary(&mut out, "flight1.csv", &report).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  flight1.csv: 1 valid rows, 2 skipped (unparseable voltage: 2)\n"
        );
    }

    #[test]
    fn test_ecu_reference_without_sessions() {
        let mut out = Vec::new();
        write_ecu_reference(&mut out, &[], &[]).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No ECU session data"));
    }
}
