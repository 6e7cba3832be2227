// src/plot_functions/plot_difference_histograms.rs

use std::path::Path;

use crate::constants::{COLOR_NOMINAL, DIFF_HISTOGRAM_BINS, LINE_WIDTH_MARKER};
use crate::plot_framework::{
    calculate_range, draw_panel_grid, histogram, padded_y_range, PlotConfig, PlotSeries,
};
use crate::plot_functions::{output_path, pair_color};
use crate::types::{NamedComparison, PlotResult};

/// Histogram of every pairwise difference, one row per flight and one column per pair.
pub fn plot_difference_histograms(
    flights: &[NamedComparison],
    file_name: &str,
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, file_name);
    let cols = flights.iter().map(|(_, c)| c.pairs.len()).max().unwrap_or(0);
    let rows = flights.len();
    if rows == 0 || cols == 0 {
        println!("  No differences to plot, skipping '{output_file}'.");
        return Ok(());
    }

    draw_panel_grid(
        &output_file,
        "Voltage Difference Distributions",
        "Histogram",
        (rows, cols),
        |panel_index| {
            let (flight_name, comparison) = flights.get(panel_index / cols)?;
            let pair_index = panel_index % cols;
            let pair = comparison.pairs.get(pair_index)?;
            let values = pair.difference.to_vec();
            let (bars, width) = histogram(&values, DIFF_HISTOGRAM_BINS);
            if bars.is_empty() {
                return None;
            }

            let (x_min, x_max) = calculate_range(pair.diff.min.min(0.0), pair.diff.max.max(0.0));
            let mut series = vec![PlotSeries::bars(bars, pair.label(), pair_color(pair_index), width)];
            let peak = padded_y_range(&series)?.end;
            let y_range = 0.0..peak;
            series.push(PlotSeries::vertical(
                pair.diff.mean,
                &y_range,
                format!("Mean {:+.3} V", pair.diff.mean),
                pair_color(pair_index),
                LINE_WIDTH_MARKER,
            ));
            series.push(PlotSeries::vertical(0.0, &y_range, "", COLOR_NOMINAL, LINE_WIDTH_MARKER));

            Some(PlotConfig::new(
                format!(
                    "{flight_name}: {} (std {:.3} V, n = {})",
                    pair.label(),
                    pair.diff.std,
                    pair.samples
                ),
                x_min..x_max,
                y_range,
                series,
                "Difference (V)",
                "Count",
            ))
        },
    )
}

// src/plot_functions/plot_difference_histograms.rs
