// src/bin/voltage_history.rs

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use bus_voltage_correlate::cli::{init_tracing, CommonArgs};
use bus_voltage_correlate::config::{CruiseFilter, EcuSessionFilter, G1000Layout};
use bus_voltage_correlate::constants::{G1000_VOLTAGE_COLUMN, MIN_HISTORY_FLIGHTS};
use bus_voltage_correlate::data_analysis::change_point::{cusum, pettitt, regime_split};
use bus_voltage_correlate::data_analysis::flight_summary::{
    collect_ecu_history, collect_flight_history, flight_means, flight_stds,
};
use bus_voltage_correlate::data_input::maintenance_events::{parse_event_file, MaintenanceEvent};
use bus_voltage_correlate::plot_functions::check_plot;
use bus_voltage_correlate::plot_functions::plot_change_point::{
    plot_change_point, plot_regime_histograms,
};
use bus_voltage_correlate::plot_functions::plot_maintenance_correlation::plot_maintenance_correlation;
use bus_voltage_correlate::plot_functions::plot_voltage_history::{
    plot_noise_history, plot_voltage_history,
};
use bus_voltage_correlate::report::{
    write_change_point_summary, write_ecu_reference, write_history_table, write_parse_summary,
    write_report_header, write_section_title,
};

/// Per-flight bus voltage history with change-point detection.
#[derive(Parser, Debug)]
#[command(name = "voltage_history", version = bus_voltage_correlate::crate_version())]
struct Cli {
    /// Directory of G1000 CSV exports
    #[arg(long, value_name = "DIR")]
    source_dir: PathBuf,

    /// Directory of AustroView ECU session exports
    #[arg(long, value_name = "DIR")]
    ecu_dir: Option<PathBuf>,

    /// Maintenance events CSV (`date,label[,kind]`) to mark on the history plots
    #[arg(long, value_name = "CSV")]
    events: Option<PathBuf>,

    /// G1000 column holding the bus voltage
    #[arg(long, value_name = "NAME", default_value = G1000_VOLTAGE_COLUMN)]
    voltage_column: String,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.verbose);
    let output_dir = cli.common.prepare_output_dir()?;
    let layout = G1000Layout {
        voltage_column: cli.voltage_column.clone(),
        ..G1000Layout::default()
    };
    let mut report: Vec<u8> = Vec::new();
    let report_path = output_dir.join("voltage_history_report.txt");

    println!("--- Scanning flight logs in {} ---", cli.source_dir.display());
    let flights = collect_flight_history(&cli.source_dir, &layout, &CruiseFilter::default())
        .with_context(|| format!("scanning {}", cli.source_dir.display()))?;
    if flights.is_empty() {
        bail!("no usable flights in {}", cli.source_dir.display());
    }
    println!("  {} flights with enough cruise data.", flights.len());

    write_report_header(
        &mut report,
        "G1000 NXi Bus Voltage History",
        Some("Cruise statistics per flight"),
    )?;
    write_history_table(&mut report, &flights)?;
    if flights.len() < MIN_HISTORY_FLIGHTS {
        writeln!(report, "\nNot enough flights to generate history plots.")?;
        return save_report(&report, &report_path);
    }

    let events: Vec<MaintenanceEvent> = match &cli.events {
        Some(path) => {
            println!("--- Reading maintenance events ---");
            let log = parse_event_file(path).with_context(|| format!("reading {}", path.display()))?;
            let label = path.display().to_string();
            write_section_title(&mut report, "Maintenance event list")?;
            write_parse_summary(&mut report, &label, &log.report)?;
            log.events
        }
        None => Vec::new(),
    };

    let ecu_sessions = match &cli.ecu_dir {
        Some(dir) if dir.is_dir() => {
            println!("--- Scanning ECU sessions in {} ---", dir.display());
            collect_ecu_history(dir, &EcuSessionFilter::default())
                .with_context(|| format!("scanning {}", dir.display()))?
        }
        Some(dir) => {
            println!("  ECU directory {} not found, skipping ECU reference.", dir.display());
            Vec::new()
        }
        None => Vec::new(),
    };

    println!("--- Detecting change point ---");
    let means = flight_means(&flights);
    let stds = flight_stds(&flights);
    let change_point = pettitt(&means).context("change-point test")?;
    let split = regime_split(&means, &stds, change_point.index);
    let trace = cusum(&means).context("CUSUM")?;

    write_change_point_summary(&mut report, &flights, &change_point, &split, &trace, &events)?;
    write_ecu_reference(&mut report, &ecu_sessions, &flights)?;
    save_report(&report, &report_path)?;

    if cli.common.no_plots {
        return Ok(());
    }

    println!("\n--- Generating plots ---");
    check_plot(
        "voltage history",
        plot_voltage_history(&flights, &ecu_sessions, &events, output_dir),
    );
    check_plot(
        "noise history",
        plot_noise_history(&flights, &ecu_sessions, &events, output_dir),
    );
    check_plot(
        "change point",
        plot_change_point(&flights, &change_point, &split, &trace, &events, output_dir),
    );
    check_plot(
        "change point histogram",
        plot_regime_histograms(&flights, &change_point, output_dir),
    );
    if !events.is_empty() {
        check_plot(
            "maintenance correlation",
            plot_maintenance_correlation(&flights, &ecu_sessions, &events, output_dir),
        );
    }

    Ok(())
}

fn save_report(report: &[u8], path: &Path) -> Result<()> {
    let text = String::from_utf8_lossy(report);
    print!("{text}");
    fs::write(path, text.as_bytes()).with_context(|| format!("writing {}", path.display()))?;
    println!("\nReport saved as '{}'.", path.display());
    Ok(())
}

// src/bin/voltage_history.rs
