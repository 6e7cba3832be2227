// src/plot_functions/plot_scatter.rs

use std::path::Path;

use crate::constants::{
    COLOR_FIT_LINE, COLOR_IDENTITY_LINE, LINE_WIDTH_MARKER, SCATTER_POINT_SIZE,
};
use crate::data_analysis::pair_statistics::linear_fit;
use crate::plot_framework::{calculate_range, draw_stacked_plot, finite_min_max, PlotConfig, PlotSeries};
use crate::plot_functions::{flight_color, output_path};
use crate::source_names::VoltageSource;
use crate::types::{NamedGrid, PlotResult, XYData};

/// One source against another, a point per grid sample, coloured by flight.
///
/// The 1:1 line and a least-squares fit over all flights are overlaid.
pub fn plot_voltage_scatter(
    flights: &[NamedGrid],
    x_source: VoltageSource,
    y_source: VoltageSource,
    file_name: &str,
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, file_name);
    let root_name = format!("{} vs {}", y_source.label(), x_source.label());

    let mut per_flight: Vec<(&str, XYData)> = Vec::new();
    for (name, grid) in flights {
        if let (Some(x), Some(y)) = (grid.column(x_source), grid.column(y_source)) {
            let points = x.iter().copied().zip(y.iter().copied()).collect();
            per_flight.push((*name, points));
        }
    }

    draw_stacked_plot(&output_file, &root_name, "Scatter", 1, |_| {
        let all: XYData = per_flight.iter().flat_map(|(_, p)| p.iter().copied()).collect();
        let (lo, hi) = finite_min_max(all.iter().flat_map(|&(x, y)| [x, y]))?;
        let (lo, hi) = calculate_range(lo, hi);
        let range = lo..hi;

        let mut series: Vec<PlotSeries> = per_flight
            .iter()
            .enumerate()
            .map(|(i, (name, points))| {
                PlotSeries::points(points.clone(), *name, flight_color(i), SCATTER_POINT_SIZE)
            })
            .collect();
        series.push(PlotSeries::line(
            vec![(lo, lo), (hi, hi)],
            "1:1",
            COLOR_IDENTITY_LINE,
            LINE_WIDTH_MARKER,
        ));

        let xs: ndarray::Array1<f64> = all.iter().map(|p| p.0).collect();
        let ys: ndarray::Array1<f64> = all.iter().map(|p| p.1).collect();
        if let Some(fit) = linear_fit(xs.view(), ys.view()) {
            series.push(PlotSeries::line(
                vec![(lo, fit.slope * lo + fit.intercept), (hi, fit.slope * hi + fit.intercept)],
                format!(
                    "Fit: y = {:.3}x {:+.3} (r = {:.3})",
                    fit.slope, fit.intercept, fit.r
                ),
                COLOR_FIT_LINE,
                LINE_WIDTH_MARKER,
            ));
        }

        Some(PlotConfig::new(
            format!("{} vs {} ({} points)", y_source.legend(), x_source.legend(), all.len()),
            range.clone(),
            range,
            series,
            format!("{} (V)", x_source.legend()),
            format!("{} (V)", y_source.legend()),
        ))
    })
}

// src/plot_functions/plot_scatter.rs
