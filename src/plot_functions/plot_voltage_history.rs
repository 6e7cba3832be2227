// src/plot_functions/plot_voltage_history.rs

use std::ops::Range;
use std::path::Path;

use crate::constants::{
    COLOR_ECU, COLOR_HISTORY_BAND, COLOR_HISTORY_MEAN, COLOR_NOMINAL, COLOR_THRESHOLD,
    DEGRADED_THRESHOLD_V, HISTORY_DATE_PAD_DAYS, LINE_WIDTH_MARKER, LINE_WIDTH_PLOT,
    LOW_VOLTS_THRESHOLD_V, NOMINAL_BUS_V, SCATTER_POINT_SIZE,
};
use crate::data_analysis::flight_summary::{EcuSessionSummary, FlightSummary};
use crate::data_input::maintenance_events::MaintenanceEvent;
use crate::plot_framework::{
    date_to_x, draw_stacked_plot, finite_min_max, padded_y_range, PlotConfig, PlotSeries,
};
use crate::plot_functions::{event_markers, output_path};
use crate::types::PlotResult;

/// x range covering every flight and ECU session date.
pub(crate) fn history_x_range(flights: &[FlightSummary], ecu: &[EcuSessionSummary]) -> Option<Range<f64>> {
    let dates = flights
        .iter()
        .map(|f| date_to_x(f.date.date()))
        .chain(ecu.iter().map(|s| date_to_x(s.date.date())));
    let (lo, hi) = finite_min_max(dates)?;
    Some(lo - HISTORY_DATE_PAD_DAYS..hi + HISTORY_DATE_PAD_DAYS)
}

/// G1000 cruise mean with a ±1 std band, ECU means and the nominal and LOW VOLTS lines.
pub(crate) fn mean_band_series(
    flights: &[FlightSummary],
    ecu: &[EcuSessionSummary],
    x_range: &Range<f64>,
) -> Vec<PlotSeries> {
    let xs: Vec<f64> = flights.iter().map(|f| date_to_x(f.date.date())).collect();
    let mut series = vec![
        PlotSeries::line(
            xs.iter().zip(flights).map(|(&x, f)| (x, f.mean + f.std)).collect(),
            "Mean + 1 std",
            COLOR_HISTORY_BAND,
            LINE_WIDTH_PLOT,
        ),
        PlotSeries::line(
            xs.iter().zip(flights).map(|(&x, f)| (x, f.mean - f.std)).collect(),
            "Mean - 1 std",
            COLOR_HISTORY_BAND,
            LINE_WIDTH_PLOT,
        ),
        PlotSeries::line(
            xs.iter().zip(flights).map(|(&x, f)| (x, f.mean)).collect(),
            "G1000 cruise mean",
            COLOR_HISTORY_MEAN,
            LINE_WIDTH_MARKER,
        ),
    ];
    if !ecu.is_empty() {
        series.push(PlotSeries::points(
            ecu.iter().map(|s| (date_to_x(s.date.date()), s.mean)).collect(),
            "ECU cruise mean",
            COLOR_ECU,
            SCATTER_POINT_SIZE + 2,
        ));
    }
    series.push(PlotSeries::horizontal(
        NOMINAL_BUS_V,
        x_range,
        format!("Nominal {NOMINAL_BUS_V:.0} V"),
        COLOR_NOMINAL,
        LINE_WIDTH_PLOT,
    ));
    series.push(PlotSeries::horizontal(
        LOW_VOLTS_THRESHOLD_V,
        x_range,
        format!("LOW VOLTS {LOW_VOLTS_THRESHOLD_V:.1} V"),
        COLOR_THRESHOLD,
        LINE_WIDTH_PLOT,
    ));
    series
}

/// Mean cruise voltage, minimum voltage and time below the degraded threshold, per flight.
///
/// Maintenance events are drawn as vertical markers on every panel.
pub fn plot_voltage_history(
    flights: &[FlightSummary],
    ecu: &[EcuSessionSummary],
    events: &[MaintenanceEvent],
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, "voltage_history.png");
    let Some(x_range) = history_x_range(flights, ecu) else {
        println!("  No flights to plot, skipping '{output_file}'.");
        return Ok(());
    };
    let xs: Vec<f64> = flights.iter().map(|f| date_to_x(f.date.date())).collect();

    draw_stacked_plot(
        &output_file,
        &format!("Bus Voltage History ({} flights)", flights.len()),
        "History",
        3,
        |panel_index| match panel_index {
            0 => {
                let mut series = mean_band_series(flights, ecu, &x_range);
                let y_range = padded_y_range(&series)?;
                series.extend(event_markers(events, &x_range, &y_range, LINE_WIDTH_PLOT));
                Some(
                    PlotConfig::new(
                        "Mean cruise voltage per flight",
                        x_range.clone(),
                        y_range,
                        series,
                        "Date",
                        "Voltage (V)",
                    )
                    .with_date_axis(),
                )
            }
            1 => {
                let mut series = vec![
                    PlotSeries::points(
                        xs.iter().zip(flights).map(|(&x, f)| (x, f.min)).collect(),
                        "Minimum voltage",
                        COLOR_THRESHOLD,
                        SCATTER_POINT_SIZE + 1,
                    ),
                    PlotSeries::horizontal(
                        LOW_VOLTS_THRESHOLD_V,
                        &x_range,
                        format!("LOW VOLTS {LOW_VOLTS_THRESHOLD_V:.1} V"),
                        COLOR_NOMINAL,
                        LINE_WIDTH_PLOT,
                    ),
                ];
                let y_range = padded_y_range(&series)?;
                series.extend(event_markers(events, &x_range, &y_range, LINE_WIDTH_PLOT));
                Some(
                    PlotConfig::new(
                        "Minimum voltage per flight",
                        x_range.clone(),
                        y_range,
                        series,
                        "Date",
                        "Voltage (V)",
                    )
                    .with_date_axis(),
                )
            }
            _ => {
                let mut series = vec![PlotSeries::bars(
                    xs.iter().zip(flights).map(|(&x, f)| (x, f.pct_below_degraded)).collect(),
                    format!("Cruise time below {DEGRADED_THRESHOLD_V:.0} V"),
                    COLOR_THRESHOLD,
                    2.0,
                )];
                let y_range = 0.0..padded_y_range(&series)?.end.max(1.0);
                series.extend(event_markers(events, &x_range, &y_range, LINE_WIDTH_PLOT));
                Some(
                    PlotConfig::new(
                        format!("Cruise time below {DEGRADED_THRESHOLD_V:.0} V"),
                        x_range.clone(),
                        y_range,
                        series,
                        "Date",
                        "% of cruise",
                    )
                    .with_date_axis(),
                )
            }
        },
    )
}

/// Per-flight voltage standard deviation, with ECU sessions overlaid.
pub fn plot_noise_history(
    flights: &[FlightSummary],
    ecu: &[EcuSessionSummary],
    events: &[MaintenanceEvent],
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, "noise_history.png");
    let Some(x_range) = history_x_range(flights, ecu) else {
        println!("  No flights to plot, skipping '{output_file}'.");
        return Ok(());
    };

    draw_stacked_plot(&output_file, "Bus Voltage Noise History", "Noise", 1, |_| {
        let mut series = vec![PlotSeries::line(
            flights.iter().map(|f| (date_to_x(f.date.date()), f.std)).collect(),
            "G1000 cruise std dev",
            COLOR_HISTORY_MEAN,
            LINE_WIDTH_MARKER,
        )];
        if !ecu.is_empty() {
            series.push(PlotSeries::points(
                ecu.iter().map(|s| (date_to_x(s.date.date()), s.std)).collect(),
                "ECU cruise std dev",
                COLOR_ECU,
                SCATTER_POINT_SIZE + 2,
            ));
        }
        let (_, hi) = finite_min_max(series.iter().flat_map(|s| s.data.iter().map(|p| p.1)))?;
        let y_range = 0.0..(hi * 1.15).max(0.01);
        series.extend(event_markers(events, &x_range, &y_range, LINE_WIDTH_PLOT));
        Some(
            PlotConfig::new(
                "Voltage noise per flight",
                x_range.clone(),
                y_range,
                series,
                "Date",
                "Std Dev (V)",
            )
            .with_date_axis(),
        )
    })
}


// src/plot_functions/plot_voltage_history.rs
