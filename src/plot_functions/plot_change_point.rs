// src/plot_functions/plot_change_point.rs

use std::path::Path;

use crate::constants::{
    COLOR_AFTER, COLOR_BEFORE, COLOR_CUSUM, COLOR_HISTORY_MEAN, COLOR_NOMINAL, LINE_WIDTH_MARKER,
    LINE_WIDTH_PLOT, PHASE_SHADING_OPACITY, SCATTER_POINT_SIZE,
};
use crate::data_analysis::change_point::{ChangePoint, Cusum, RegimeSplit};
use crate::data_analysis::flight_summary::{flight_means, flight_stds, FlightSummary};
use crate::data_input::maintenance_events::MaintenanceEvent;
use crate::plot_framework::{
    date_to_x, draw_panel_grid, draw_stacked_plot, finite_min_max, histogram, padded_y_range, PlotConfig,
    PlotSeries, ShadedSpan,
};
use crate::plot_functions::{event_markers, output_path};
use crate::plot_functions::plot_voltage_history::history_x_range;
use crate::types::PlotResult;

const REGIME_HISTOGRAM_BINS: usize = 15;

/// Per-flight mean voltage with the before/after regimes shaded, the CUSUM trace
/// and per-flight noise. Maintenance events are marked on every panel.
pub fn plot_change_point(
    flights: &[FlightSummary],
    change_point: &ChangePoint,
    split: &RegimeSplit,
    cusum: &Cusum,
    events: &[MaintenanceEvent],
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, "change_point.png");
    let (Some(x_range), Some(at)) = (history_x_range(flights, &[]), flights.get(change_point.index)) else {
        println!("  No change point to plot, skipping '{output_file}'.");
        return Ok(());
    };
    let xs: Vec<f64> = flights.iter().map(|f| date_to_x(f.date.date())).collect();
    let change_x = date_to_x(at.date.date());
    let spans = vec![
        ShadedSpan {
            x_start: x_range.start,
            x_end: change_x,
            color: *COLOR_BEFORE,
            opacity: PHASE_SHADING_OPACITY,
            label: format!("Before ({} flights)", split.before.count),
        },
        ShadedSpan {
            x_start: change_x,
            x_end: x_range.end,
            color: *COLOR_AFTER,
            opacity: PHASE_SHADING_OPACITY,
            label: format!("After ({} flights)", split.after.count),
        },
    ];

    let root_name = format!(
        "Change Point {} (K = {}, p = {:.2e})",
        at.date.format("%Y-%m-%d"),
        change_point.k_statistic,
        change_point.p_value
    );

    draw_stacked_plot(&output_file, &root_name, "Change Point", 3, |panel_index| {
        let (title, y_label, mut series) = match panel_index {
            0 => {
                let mut series = vec![PlotSeries::line(
                    xs.iter().zip(flights).map(|(&x, f)| (x, f.mean)).collect(),
                    "Mean cruise voltage",
                    COLOR_HISTORY_MEAN,
                    LINE_WIDTH_MARKER,
                )];
                if let Some(before) = split.before.mean_volts {
                    series.push(PlotSeries::line(
                        vec![(x_range.start, before), (change_x, before)],
                        format!("Before mean {before:.2} V"),
                        COLOR_BEFORE,
                        LINE_WIDTH_MARKER,
                    ));
                }
                if let Some(after) = split.after.mean_volts {
                    series.push(PlotSeries::line(
                        vec![(change_x, after), (x_range.end, after)],
                        format!("After mean {after:.2} V"),
                        COLOR_AFTER,
                        LINE_WIDTH_MARKER,
                    ));
                }
                ("Mean cruise voltage per flight", "Voltage (V)", series)
            }
            1 => (
                "CUSUM of flight means",
                "CUSUM (V)",
                vec![PlotSeries::line(
                    xs.iter().copied().zip(cusum.values.iter().copied()).collect(),
                    "CUSUM",
                    COLOR_CUSUM,
                    LINE_WIDTH_MARKER,
                )],
            ),
            _ => (
                "Voltage noise per flight",
                "Std Dev (V)",
                vec![PlotSeries::points(
                    xs.iter().zip(flights).map(|(&x, f)| (x, f.std)).collect(),
                    "Cruise std dev",
                    COLOR_HISTORY_MEAN,
                    SCATTER_POINT_SIZE + 1,
                )],
            ),
        };
        let y_range = padded_y_range(&series)?;
        series.extend(event_markers(events, &x_range, &y_range, LINE_WIDTH_PLOT));
        series.push(PlotSeries::vertical(change_x, &y_range, "", COLOR_NOMINAL, LINE_WIDTH_PLOT));
        Some(
            PlotConfig::new(title, x_range.clone(), y_range, series, "Date", y_label)
                .with_spans(spans.clone())
                .with_date_axis(),
        )
    })
}

/// Distributions of flight mean voltage and noise before and after the change point.
pub fn plot_regime_histograms(
    flights: &[FlightSummary],
    change_point: &ChangePoint,
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, "change_point_histograms.png");
    let split = (change_point.index + 1).min(flights.len());
    let (before, after) = flights.split_at(split);

    draw_panel_grid(
        &output_file,
        "Before / After Change Point",
        "Histogram",
        (1, 2),
        |panel_index| {
            let (title, x_label, before_values, after_values) = if panel_index == 0 {
                ("Mean cruise voltage", "Voltage (V)", flight_means(before), flight_means(after))
            } else {
                ("Voltage noise", "Std Dev (V)", flight_stds(before), flight_stds(after))
            };
            let (before_bars, before_width) = histogram(&before_values, REGIME_HISTOGRAM_BINS);
            let (after_bars, after_width) = histogram(&after_values, REGIME_HISTOGRAM_BINS);

            let series = vec![
                PlotSeries::bars(
                    before_bars,
                    format!("Before ({})", before_values.len()),
                    COLOR_BEFORE,
                    before_width,
                ),
                PlotSeries::bars(
                    after_bars,
                    format!("After ({})", after_values.len()),
                    COLOR_AFTER,
                    after_width,
                ),
            ];
            let (x_lo, x_hi) = finite_min_max(
                before_values.iter().chain(&after_values).copied(),
            )?;
            let pad = (before_width.max(after_width)).max(0.01);
            let peak = padded_y_range(&series)?.end;
            Some(PlotConfig::new(
                title,
                x_lo - pad..x_hi + pad,
                0.0..peak,
                series,
                x_label,
                "Count",
            ))
        },
    )
}

// src/plot_functions/plot_change_point.rs
