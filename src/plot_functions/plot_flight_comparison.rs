// src/plot_functions/plot_flight_comparison.rs

use std::path::Path;

use crate::constants::{COLOR_NOMINAL, LINE_WIDTH_PLOT};
use crate::data_analysis::alignment::AlignedGrid;
use crate::data_analysis::pair_statistics::GridComparison;
use crate::plot_framework::{draw_stacked_plot, padded_y_range, PlotConfig, PlotSeries};
use crate::plot_functions::{file_stem, output_path, pair_color, source_color};
use crate::types::PlotResult;

/// Aligned voltages of one flight (top) and every pairwise difference (bottom).
pub fn plot_flight_comparison(
    grid: &AlignedGrid,
    comparison: &GridComparison,
    flight_name: &str,
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(
        output_dir,
        &format!("{}_voltage_comparison.png", file_stem(flight_name)),
    );
    let root_name = format!("{flight_name} - Bus Voltage Comparison");
    let minutes: Vec<f64> = grid.offsets_s.iter().map(|s| s / 60.0).collect();
    let x_range = match (minutes.first(), minutes.last()) {
        (Some(&start), Some(&end)) => start..end,
        _ => 0.0..0.0,
    };

    draw_stacked_plot(&output_file, &root_name, "Voltage", 2, |panel_index| {
        if panel_index == 0 {
            let series: Vec<PlotSeries> = grid
                .columns
                .iter()
                .map(|column| {
                    PlotSeries::line(
                        minutes.iter().copied().zip(column.volts.iter().copied()).collect(),
                        column.source.legend(),
                        source_color(column.source),
                        LINE_WIDTH_PLOT,
                    )
                })
                .collect();
            let y_range = padded_y_range(&series)?;
            Some(PlotConfig::new(
                format!("{flight_name} - aligned voltages ({} points)", grid.len()),
                x_range.clone(),
                y_range,
                series,
                "Time (min)",
                "Voltage (V)",
            ))
        } else {
            let mut series: Vec<PlotSeries> = comparison
                .pairs
                .iter()
                .enumerate()
                .map(|(i, pair)| {
                    PlotSeries::line(
                        minutes.iter().copied().zip(pair.difference.iter().copied()).collect(),
                        format!("{} (mean {:+.3} V)", pair.label(), pair.diff.mean),
                        pair_color(i),
                        LINE_WIDTH_PLOT,
                    )
                })
                .collect();
            series.push(PlotSeries::horizontal(0.0, &x_range, "", COLOR_NOMINAL, LINE_WIDTH_PLOT));
            let y_range = padded_y_range(&series)?;
            Some(PlotConfig::new(
                format!("{flight_name} - differences"),
                x_range.clone(),
                y_range,
                series,
                "Time (min)",
                "Difference (V)",
            ))
        }
    })
}

// src/plot_functions/plot_flight_comparison.rs
