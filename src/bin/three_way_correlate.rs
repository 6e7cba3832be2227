// src/bin/three_way_correlate.rs

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bus_voltage_correlate::cli::{init_tracing, CommonArgs, SegmentArgs};
use bus_voltage_correlate::constants::VDL_SAMPLE_INTERVAL_S;
use bus_voltage_correlate::data_analysis::alignment::{resample, AlignedGrid, TimedSeries};
use bus_voltage_correlate::data_analysis::pair_statistics::{compare_grid, GridComparison};
use bus_voltage_correlate::data_analysis::segmentation::segment_reference_log;
use bus_voltage_correlate::data_input::ecu_parser::parse_ecu_file;
use bus_voltage_correlate::data_input::g1000_parser::parse_g1000_file;
use bus_voltage_correlate::data_input::log_discovery::find_ecu_session_file;
use bus_voltage_correlate::data_input::vdl_parser::parse_vdl_file;
use bus_voltage_correlate::plot_functions::check_plot;
use bus_voltage_correlate::plot_functions::plot_difference_histograms::plot_difference_histograms;
use bus_voltage_correlate::plot_functions::plot_flight_comparison::plot_flight_comparison;
use bus_voltage_correlate::plot_functions::plot_scatter::plot_voltage_scatter;
use bus_voltage_correlate::plot_functions::plot_segment_overview::plot_segment_overview;
use bus_voltage_correlate::report::{
    write_parse_summary, write_report_header, write_section_title, write_segmentation,
    write_three_way_block,
};
use bus_voltage_correlate::source_names::{FlightPhase, VoltageSource};

/// Three-way comparison: G1000 volt1, AE300 ECU battery voltage and the VDL48 reference.
#[derive(Parser, Debug)]
#[command(name = "three_way_correlate", version = bus_voltage_correlate::crate_version())]
struct Cli {
    /// G1000 CSV for the first flight
    #[arg(long, value_name = "CSV")]
    flight1: PathBuf,

    /// G1000 CSV for the second flight
    #[arg(long, value_name = "CSV")]
    flight2: PathBuf,

    /// VDL48 log covering both flights
    #[arg(long, value_name = "CSV")]
    vdl: PathBuf,

    /// Directory of AustroView session exports
    #[arg(long, value_name = "DIR")]
    ecu_dir: Option<PathBuf>,

    /// ECU session number of the first flight
    #[arg(long, value_name = "N")]
    ecu_session1: Option<u32>,

    /// ECU session number of the second flight
    #[arg(long, value_name = "N")]
    ecu_session2: Option<u32>,

    /// ECU export for the first flight (instead of --ecu-dir)
    #[arg(long, value_name = "CSV", conflicts_with = "ecu_dir", requires = "ecu2")]
    ecu1: Option<PathBuf>,

    /// ECU export for the second flight (instead of --ecu-dir)
    #[arg(long, value_name = "CSV", conflicts_with = "ecu_dir", requires = "ecu1")]
    ecu2: Option<PathBuf>,

    #[command(flatten)]
    segment: SegmentArgs,

    #[command(flatten)]
    common: CommonArgs,
}

impl Cli {
    fn ecu_files(&self) -> Result<[PathBuf; 2]> {
        if let (Some(ecu1), Some(ecu2)) = (&self.ecu1, &self.ecu2) {
            return Ok([ecu1.clone(), ecu2.clone()]);
        }
        let (Some(dir), Some(s1), Some(s2)) = (&self.ecu_dir, self.ecu_session1, self.ecu_session2) else {
            bail!("give either --ecu1/--ecu2 or --ecu-dir with --ecu-session1/--ecu-session2");
        };
        Ok([find_ecu_session_file(dir, s1)?, find_ecu_session_file(dir, s2)?])
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.verbose);
    let output_dir = cli.common.prepare_output_dir()?;
    let layout = cli.segment.g1000_layout();
    let alignment = cli.common.alignment_config();
    let mut report: Vec<u8> = Vec::new();

    write_report_header(
        &mut report,
        "Three-Way Bus Voltage Correlation",
        Some("G1000 volt1 vs AE300 ECU vs Triplett VDL48"),
    )?;

    println!("--- Reading logs ---");
    let [ecu1_path, ecu2_path] = cli.ecu_files()?;
    let vdl = parse_vdl_file(&cli.vdl).with_context(|| format!("reading {}", cli.vdl.display()))?;
    let g1000 = [
        parse_g1000_file(&cli.flight1, &layout)
            .with_context(|| format!("reading {}", cli.flight1.display()))?,
        parse_g1000_file(&cli.flight2, &layout)
            .with_context(|| format!("reading {}", cli.flight2.display()))?,
    ];
    let ecu = [
        parse_ecu_file(&ecu1_path).with_context(|| format!("reading {}", ecu1_path.display()))?,
        parse_ecu_file(&ecu2_path).with_context(|| format!("reading {}", ecu2_path.display()))?,
    ];
    write_section_title(&mut report, "Input files")?;
    write_parse_summary(&mut report, &vdl.log.name, &vdl.report)?;
    for parsed in &g1000 {
        write_parse_summary(&mut report, &parsed.log.name, &parsed.report)?;
    }
    for parsed in &ecu {
        write_parse_summary(&mut report, &parsed.log.name, &parsed.report)?;
    }

    println!("--- Segmenting reference log ---");
    let vdl_volts = vdl.log.volts();
    let segmentation = segment_reference_log(vdl_volts.view(), &cli.segment.segmenter_config())
        .context("segmenting the VDL48 log")?;
    write_section_title(&mut report, "VDL48 flight segmentation")?;
    write_segmentation(&mut report, &segmentation.describe(vdl_volts.view(), VDL_SAMPLE_INTERVAL_S))?;

    println!("--- Aligning flights ---");
    let phases = [
        (FlightPhase::Flight1, segmentation.flight1),
        (FlightPhase::Flight2, segmentation.flight2),
    ];
    let mut grids: Vec<(String, AlignedGrid)> = Vec::new();
    for (((phase, segment), avionics), engine) in phases.iter().zip(&g1000).zip(&ecu) {
        let anchor = avionics
            .log
            .first_time()
            .with_context(|| format!("{} has no samples", avionics.log.name))?;
        // G1000 and ECU carry wall-clock time; the VDL48 segment is assumed to start with the G1000 log.
        let sources = [
            TimedSeries::from_absolute(VoltageSource::G1000, &avionics.log, anchor),
            TimedSeries::from_absolute(VoltageSource::Ecu, &engine.log, anchor),
            TimedSeries::from_segment(VoltageSource::Vdl48, &vdl.log, segment.range()),
        ];
        let grid = resample(&sources, &alignment).with_context(|| format!("aligning {phase}"))?;
        println!("  {phase}: {} grid points ({:.1} min)", grid.len(), grid.duration_min());
        grids.push((phase.to_string(), grid));
    }
    let only_grids: Vec<AlignedGrid> = grids.iter().map(|(_, g)| g.clone()).collect();
    let combined = AlignedGrid::concatenate(&only_grids).context("combining flights")?;

    println!("--- Computing statistics ---");
    let mut comparisons: Vec<GridComparison> = Vec::new();
    for (name, grid) in &grids {
        let comparison = compare_grid(grid).with_context(|| format!("comparing {name}"))?;
        write_three_way_block(&mut report, name, &comparison)?;
        comparisons.push(comparison);
    }
    let combined_comparison = compare_grid(&combined).context("comparing combined flights")?;
    write_three_way_block(&mut report, "COMBINED (both flights)", &combined_comparison)?;

    let text = String::from_utf8_lossy(&report);
    print!("{text}");
    let report_path = output_dir.join("three_way_voltage_report.txt");
    fs::write(&report_path, text.as_bytes())
        .with_context(|| format!("writing {}", report_path.display()))?;
    println!("\nReport saved as '{}'.", report_path.display());

    if cli.common.no_plots {
        return Ok(());
    }

    println!("\n--- Generating plots ---");
    check_plot(
        "segmentation",
        plot_segment_overview(&vdl.log, &segmentation, cli.segment.flight_threshold, output_dir),
    );
    for ((name, grid), comparison) in grids.iter().zip(&comparisons) {
        check_plot(
            "three-way comparison",
            plot_flight_comparison(grid, comparison, &format!("{name} three-way"), output_dir),
        );
    }
    let named: Vec<(&str, &GridComparison)> = grids
        .iter()
        .zip(&comparisons)
        .map(|((n, _), c)| (n.as_str(), c))
        .collect();
    check_plot(
        "three-way histogram",
        plot_difference_histograms(&named, "three_way_histograms.png", output_dir),
    );
    let named_grids: Vec<(&str, &AlignedGrid)> =
        grids.iter().map(|(n, g)| (n.as_str(), g)).collect();
    for (x_source, y_source, file_name) in [
        (VoltageSource::Vdl48, VoltageSource::Ecu, "scatter_ecu_vs_vdl48.png"),
        (VoltageSource::Vdl48, VoltageSource::G1000, "scatter_g1000_vs_vdl48_three_way.png"),
        (VoltageSource::Ecu, VoltageSource::G1000, "scatter_g1000_vs_ecu.png"),
    ] {
        check_plot(
            "scatter",
            plot_voltage_scatter(&named_grids, x_source, y_source, file_name, output_dir),
        );
    }

    Ok(())
}

// src/bin/three_way_correlate.rs
