// src/plot_functions/plot_maintenance_correlation.rs

use std::path::Path;

use crate::constants::LINE_WIDTH_MARKER;
use crate::data_analysis::flight_summary::{EcuSessionSummary, FlightSummary};
use crate::data_input::maintenance_events::MaintenanceEvent;
use crate::plot_framework::{draw_stacked_plot, padded_y_range, PlotConfig};
use crate::plot_functions::plot_voltage_history::{history_x_range, mean_band_series};
use crate::plot_functions::{event_labels, event_markers, output_path};
use crate::types::PlotResult;

// Extra room above the data for the staggered event labels.
const LABEL_HEADROOM: f64 = 0.15;

/// Mean cruise voltage timeline with every maintenance event drawn and labelled.
pub fn plot_maintenance_correlation(
    flights: &[FlightSummary],
    ecu: &[EcuSessionSummary],
    events: &[MaintenanceEvent],
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, "voltage_maintenance_correlation.png");
    let Some(x_range) = history_x_range(flights, ecu) else {
        println!("  No flights to plot, skipping '{output_file}'.");
        return Ok(());
    };

    draw_stacked_plot(
        &output_file,
        &format!("Bus Voltage vs Maintenance Events ({} events)", events.len()),
        "Maintenance",
        1,
        |_| {
            let mut series = mean_band_series(flights, ecu, &x_range);
            let data_range = padded_y_range(&series)?;
            let y_range = data_range.start
                ..data_range.end + (data_range.end - data_range.start) * LABEL_HEADROOM;
            series.extend(event_markers(events, &x_range, &y_range, LINE_WIDTH_MARKER));
            Some(
                PlotConfig::new(
                    "Mean cruise voltage per flight",
                    x_range.clone(),
                    y_range.clone(),
                    series,
                    "Date",
                    "Voltage (V)",
                )
                .with_annotations(event_labels(events, &x_range, &y_range))
                .with_date_axis(),
            )
        },
    )
}

// src/plot_functions/plot_maintenance_correlation.rs
