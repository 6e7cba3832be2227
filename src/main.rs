// src/main.rs

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bus_voltage_correlate::cli::{init_tracing, CommonArgs, SegmentArgs};
use bus_voltage_correlate::constants::VDL_SAMPLE_INTERVAL_S;
use bus_voltage_correlate::data_analysis::alignment::{resample, AlignedGrid, TimedSeries};
use bus_voltage_correlate::data_analysis::pair_statistics::{compare_grid, GridComparison};
use bus_voltage_correlate::data_analysis::segmentation::segment_reference_log;
use bus_voltage_correlate::data_input::g1000_parser::parse_g1000_file;
use bus_voltage_correlate::data_input::vdl_parser::parse_vdl_file;
use bus_voltage_correlate::plot_functions::check_plot;
use bus_voltage_correlate::plot_functions::plot_difference_histograms::plot_difference_histograms;
use bus_voltage_correlate::plot_functions::plot_flight_comparison::plot_flight_comparison;
use bus_voltage_correlate::plot_functions::plot_scatter::plot_voltage_scatter;
use bus_voltage_correlate::plot_functions::plot_segment_overview::plot_segment_overview;
use bus_voltage_correlate::report::{
    write_pair_block, write_parse_summary, write_report_header, write_section_title,
    write_segmentation,
};
use bus_voltage_correlate::source_names::{FlightPhase, VoltageSource};

/// Compares G1000 bus voltage against a VDL48 reference log covering two flights.
#[derive(Parser, Debug)]
#[command(name = "voltage_correlate", version = bus_voltage_correlate::crate_version())]
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

    #[command(flatten)]
    segment: SegmentArgs,

    #[command(flatten)]
    common: CommonArgs,
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
        "G1000 NXi Bus Voltage Correlation",
        Some("G1000 volt1 vs Triplett VDL48 reference logger"),
    )?;

    println!("--- Reading logs ---");
    let vdl = parse_vdl_file(&cli.vdl).with_context(|| format!("reading {}", cli.vdl.display()))?;
    let flight1 = parse_g1000_file(&cli.flight1, &layout)
        .with_context(|| format!("reading {}", cli.flight1.display()))?;
    let flight2 = parse_g1000_file(&cli.flight2, &layout)
        .with_context(|| format!("reading {}", cli.flight2.display()))?;
    write_section_title(&mut report, "Input files")?;
    write_parse_summary(&mut report, &vdl.log.name, &vdl.report)?;
    write_parse_summary(&mut report, &flight1.log.name, &flight1.report)?;
    write_parse_summary(&mut report, &flight2.log.name, &flight2.report)?;

    println!("--- Segmenting reference log ---");
    let vdl_volts = vdl.log.volts();
    let segmentation = segment_reference_log(vdl_volts.view(), &cli.segment.segmenter_config())
        .context("segmenting the VDL48 log")?;
    write_section_title(&mut report, "VDL48 flight segmentation")?;
    write_segmentation(&mut report, &segmentation.describe(vdl_volts.view(), VDL_SAMPLE_INTERVAL_S))?;

    println!("--- Aligning flights ---");
    let mut grids: Vec<(FlightPhase, AlignedGrid)> = Vec::new();
    for (phase, g1000, segment) in [
        (FlightPhase::Flight1, &flight1, segmentation.flight1),
        (FlightPhase::Flight2, &flight2, segmentation.flight2),
    ] {
        let anchor = g1000
            .log
            .first_time()
            .with_context(|| format!("{} has no samples", g1000.log.name))?;
        let sources = [
            TimedSeries::from_absolute(VoltageSource::G1000, &g1000.log, anchor),
            TimedSeries::from_segment(VoltageSource::Vdl48, &vdl.log, segment.range()),
        ];
        let grid = resample(&sources, &alignment).with_context(|| format!("aligning {phase}"))?;
        println!("  {phase}: {} grid points ({:.1} min)", grid.len(), grid.duration_min());
        grids.push((phase, grid));
    }
    let only_grids: Vec<AlignedGrid> = grids.iter().map(|(_, g)| g.clone()).collect();
    let combined = AlignedGrid::concatenate(&only_grids).context("combining flights")?;

    println!("--- Computing statistics ---");
    let mut comparisons: Vec<(String, GridComparison)> = Vec::new();
    for (phase, grid) in &grids {
        let comparison = compare_grid(grid).with_context(|| format!("comparing {phase}"))?;
        write_pair_block(&mut report, &format!("{phase}: G1000 vs VDL48"), &comparison)?;
        comparisons.push((phase.to_string(), comparison));
    }
    let combined_comparison = compare_grid(&combined).context("comparing combined flights")?;
    write_pair_block(&mut report, "COMBINED (both flights)", &combined_comparison)?;

    let text = String::from_utf8_lossy(&report);
    print!("{text}");
    let report_path = output_dir.join("voltage_report.txt");
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
    for ((name, comparison), (_, grid)) in comparisons.iter().zip(&grids) {
        check_plot(
            "flight comparison",
            plot_flight_comparison(grid, comparison, name, output_dir),
        );
    }
    let named: Vec<(&str, &GridComparison)> =
        comparisons.iter().map(|(n, c)| (n.as_str(), c)).collect();
    check_plot(
        "difference histogram",
        plot_difference_histograms(&named, "difference_histograms.png", output_dir),
    );
    let named_grids: Vec<(&str, &AlignedGrid)> = comparisons
        .iter()
        .zip(&grids)
        .map(|((n, _), (_, g))| (n.as_str(), g))
        .collect();
    check_plot(
        "scatter",
        plot_voltage_scatter(
            &named_grids,
            VoltageSource::Vdl48,
            VoltageSource::G1000,
            "scatter_g1000_vs_vdl48.png",
            output_dir,
        ),
    );

    Ok(())
}

// src/main.rs
