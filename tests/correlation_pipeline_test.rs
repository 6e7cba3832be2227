// tests/correlation_pipeline_test.rs

use std::fs;
use std::path::{Path, PathBuf};

use bus_voltage_correlate::config::{AlignmentConfig, CruiseFilter, G1000Layout, SegmenterConfig};
use bus_voltage_correlate::data_analysis::alignment::{resample, AlignedGrid, TimedSeries};
use bus_voltage_correlate::data_analysis::change_point::pettitt;
use bus_voltage_correlate::data_analysis::flight_summary::{collect_flight_history, flight_means};
use bus_voltage_correlate::data_analysis::pair_statistics::compare_grid;
use bus_voltage_correlate::data_analysis::segmentation::segment_reference_log;
use bus_voltage_correlate::data_input::ecu_parser::parse_ecu_file;
use bus_voltage_correlate::data_input::g1000_parser::parse_g1000_file;
use bus_voltage_correlate::data_input::log_data::SkipReason;
use bus_voltage_correlate::data_input::maintenance_events::{parse_event_file, EventKind};
use bus_voltage_correlate::data_input::vdl_parser::parse_vdl_file;
use bus_voltage_correlate::report::write_pair_block;
use bus_voltage_correlate::source_names::VoltageSource;
use bus_voltage_correlate::AnalysisError;

/// G1000 export: airframe line, units line, column names, four init rows, data.
fn write_g1000(dir: &Path, name: &str, start_min: u32, volts: &[f64]) -> PathBuf {
    let mut text = String::from("#airframe_info, log_version=\"1.00\"\n#yyy-mm-dd, hh:mm:ss, hh:mm, volts\n");
    text.push_str("Lcl Date,Lcl Time,UTCOfst,volt1\n");
    for _ in 0..4 {
        text.push_str("2024-06-01,bogus,,not-a-number\n");
    }
    for (i, v) in volts.iter().enumerate() {
        let secs = start_min as usize * 60 + i;
        text.push_str(&format!(
            "2024-06-01,10:{:02}:{:02},-05:00,{v}\n",
            secs / 60,
            secs % 60
        ));
    }
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// VDL48 export: ten header lines, a blank line, column names, then 2 s rows.
fn write_vdl(dir: &Path, volts: &[f64]) -> PathBuf {
    let mut text = String::new();
    for i in 0..10 {
        text.push_str(&format!("Header line {i}\n"));
    }
    text.push_str("\nIndex,Time,Voltage\n");
    for (i, v) in volts.iter().enumerate() {
        let secs = i * 2;
        text.push_str(&format!(
            "{i},09:{:02}:{:02},{v}\n",
            secs / 60,
            secs % 60
        ));
    }
    let path = dir.join("vdl.csv");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_g1000_single_row_round_trip_ignores_preamble() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_g1000(dir.path(), "one.csv", 0, &[27.9]);
    let parsed = parse_g1000_file(&path, &G1000Layout::default()).unwrap();

    assert_eq!(parsed.log.len(), 1);
    assert_eq!(parsed.log.samples[0].volts, 27.9);
    assert_eq!(
        parsed.log.samples[0].time,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    );
    // The four malformed init rows sit before the first data line.
    assert_eq!(parsed.report.rows_read, 1);
    assert_eq!(parsed.report.skipped_total(), 0);
}

#[test]
fn test_g1000_bad_rows_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_g1000(dir.path(), "gaps.csv", 0, &[27.9, 28.0]);
    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("2024-06-01,10:00:02,-05:00,\n");
    text.push_str("2024-06-01,10:00:03,-05:00,abc\n");
    fs::write(&path, text).unwrap();

    let parsed = parse_g1000_file(&path, &G1000Layout::default()).unwrap();
    assert_eq!(parsed.log.len(), 2);
    assert_eq!(parsed.report.skipped_for(SkipReason::BlankField), 1);
    assert_eq!(parsed.report.skipped_for(SkipReason::BadNumber), 1);
}

#[test]
fn test_missing_voltage_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_g1000(dir.path(), "one.csv", 0, &[27.9]);
    let layout = G1000Layout {
        voltage_column: "volt2".to_string(),
        ..G1000Layout::default()
    };
    assert!(matches!(
        parse_g1000_file(&path, &layout),
        Err(AnalysisError::MissingColumn { .. })
    ));
}

#[test]
fn test_oscillating_avionics_against_flat_reference() {
    let dir = tempfile::tempdir().unwrap();
    let avionics: Vec<f64> = (0..60)
        .map(|k| if (k / 2) % 2 == 0 { 28.5 } else { 27.5 })
        .collect();
    let g1000_path = write_g1000(dir.path(), "osc.csv", 0, &avionics);
    let vdl_path = write_vdl(dir.path(), &[28.3; 30]);

    let g1000 = parse_g1000_file(&g1000_path, &G1000Layout::default()).unwrap();
    let vdl = parse_vdl_file(&vdl_path).unwrap();
    assert_eq!(vdl.log.len(), 30);

    let anchor = g1000.log.first_time().unwrap();
    let grid = resample(
        &[
            TimedSeries::from_absolute(VoltageSource::G1000, &g1000.log, anchor),
            TimedSeries::from_segment(VoltageSource::Vdl48, &vdl.log, 0..vdl.log.len()),
        ],
        &AlignmentConfig::default(),
    )
    .unwrap();
    assert_eq!(grid.len(), 30);

    let comparison = compare_grid(&grid).unwrap();
    let pair = &comparison.pairs[0];
    assert_eq!(pair.label(), "G1000 - VDL48");
    assert!((pair.diff.mean + 0.3).abs() < 0.05);
}

#[test]
fn test_two_flight_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut reference = vec![28.2; 40];
    reference.extend(vec![12.0; 40]);
    reference.extend(vec![28.2; 40]);
    reference.extend(vec![0.0; 5]);
    let vdl = parse_vdl_file(&write_vdl(dir.path(), &reference)).unwrap();

    let config = SegmenterConfig {
        window: 10,
        ..SegmenterConfig::default()
    };
    let segmentation = segment_reference_log(vdl.log.volts().view(), &config).unwrap();
    assert_eq!(segmentation.flight1.range(), 0..40);
    assert_eq!(segmentation.idle.range(), 40..80);
    assert_eq!(segmentation.flight2.range(), 80..120);

    let layout = G1000Layout::default();
    let flights = [
        parse_g1000_file(&write_g1000(dir.path(), "f1.csv", 0, &[28.0; 80]), &layout).unwrap(),
        parse_g1000_file(&write_g1000(dir.path(), "f2.csv", 30, &[28.0; 80]), &layout).unwrap(),
    ];
    let grids: Vec<AlignedGrid> = flights
        .iter()
        .zip([segmentation.flight1, segmentation.flight2])
        .map(|(g1000, segment)| {
            let anchor = g1000.log.first_time().unwrap();
            resample(
                &[
                    TimedSeries::from_absolute(VoltageSource::G1000, &g1000.log, anchor),
                    TimedSeries::from_segment(VoltageSource::Vdl48, &vdl.log, segment.range()),
                ],
                &AlignmentConfig::default(),
            )
            .unwrap()
        })
        .collect();
    assert_eq!(grids[0].len(), 40);
    assert_eq!(grids[1].len(), 40);

    let combined = AlignedGrid::concatenate(&grids).unwrap();
    assert_eq!(combined.len(), 80);
    let comparison = compare_grid(&combined).unwrap();
    assert!((comparison.pairs[0].diff.mean + 0.2).abs() < 1e-9);

    let mut out = Vec::new();
    write_pair_block(&mut out, "COMBINED (both flights)", &comparison).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Samples (paired, 2-sec grid):  80"));
}

#[test]
fn test_single_flight_reference_cannot_be_segmented() {
    let dir = tempfile::tempdir().unwrap();
    let vdl = parse_vdl_file(&write_vdl(dir.path(), &[28.2; 120])).unwrap();
    let result = segment_reference_log(vdl.log.volts().view(), &SegmenterConfig::default());
    assert!(matches!(result, Err(AnalysisError::Segmentation(_))));
}

#[test]
fn test_ecu_absolute_alignment_with_avionics() {
    let dir = tempfile::tempdir().unwrap();
    let g1000_path = write_g1000(dir.path(), "f1.csv", 0, &[28.0; 60]);
    let mut ecu_text = String::from("Timestamp,Engine Speed [rpm],Battery Voltage [V]\n");
    // ECU starts 10 s after the avionics and runs past its end.
    for i in 0..80 {
        let secs = 10 + i;
        ecu_text.push_str(&format!(
            "2024-06-01 10:{:02}:{:02},2100,28.4\n",
            secs / 60,
            secs % 60
        ));
    }
    let ecu_path = dir.path().join("DataLog_x_session7_20240601_100010.csv");
    fs::write(&ecu_path, ecu_text).unwrap();

    let g1000 = parse_g1000_file(&g1000_path, &G1000Layout::default()).unwrap();
    let ecu = parse_ecu_file(&ecu_path).unwrap();
    let anchor = g1000.log.first_time().unwrap();
    let grid = resample(
        &[
            TimedSeries::from_absolute(VoltageSource::G1000, &g1000.log, anchor),
            TimedSeries::from_absolute(VoltageSource::Ecu, &ecu.log, anchor),
        ],
        &AlignmentConfig::default(),
    )
    .unwrap();

    // Overlap runs from 10 s to 59 s.
    assert_eq!(grid.offsets_s[0], 10.0);
    assert_eq!(grid.len(), 25);
    let ecu_column = grid.column(VoltageSource::Ecu).unwrap();
    assert!(ecu_column.iter().all(|&v| (v - 28.4).abs() < 1e-12));
}

#[test]
fn test_single_flight_history_has_no_change_point() {
    let dir = tempfile::tempdir().unwrap();
    write_g1000(dir.path(), "only_flight.csv", 0, &[27.9; 40]);

    let flights =
        collect_flight_history(dir.path(), &G1000Layout::default(), &CruiseFilter::default())
            .unwrap();
    assert_eq!(flights.len(), 1);
    assert!(matches!(
        pettitt(&flight_means(&flights)),
        Err(AnalysisError::InsufficientData(_))
    ));

    write_g1000(dir.path(), "second_flight.csv", 30, &[27.1; 40]);
    let flights =
        collect_flight_history(dir.path(), &G1000Layout::default(), &CruiseFilter::default())
            .unwrap();
    assert_eq!(flights.len(), 2);
    assert!(pettitt(&flight_means(&flights)).is_ok());
}

#[test]
fn test_maintenance_event_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.csv");
    fs::write(
        &path,
        "date,label,kind\n\
         2025-07-01,Engine R&R (piston) + battery,engine\n\
         2024-07-26,G1000 P2413 repinned,avionics\n\
         not-a-date,ignored,\n",
    )
    .unwrap();

    let log = parse_event_file(&path).unwrap();
    assert_eq!(log.events.len(), 2);
    assert_eq!(log.events[0].label, "G1000 P2413 repinned");
    assert_eq!(log.events[0].kind, EventKind::Avionics);
    assert_eq!(log.events[1].kind, EventKind::Engine);
    assert_eq!(log.report.skipped_for(SkipReason::BadTimestamp), 1);

    assert!(matches!(
        parse_event_file(&dir.path().join("missing.csv")),
        Err(AnalysisError::Io { .. })
    ));
}
