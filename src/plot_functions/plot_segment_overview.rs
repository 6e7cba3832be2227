// src/plot_functions/plot_segment_overview.rs

use std::path::Path;

use crate::constants::{
    COLOR_PHASE_FLIGHT1, COLOR_PHASE_FLIGHT2, COLOR_PHASE_IDLE, COLOR_THRESHOLD,
    LINE_WIDTH_MARKER, LINE_WIDTH_PLOT, PHASE_SHADING_OPACITY,
};
use crate::data_analysis::segmentation::FlightSegmentation;
use crate::data_input::log_data::ElapsedLog;
use crate::plot_framework::{
    draw_stacked_plot, finite_min_max, padded_y_range, PlotConfig, PlotSeries, ShadedSpan,
};
use crate::plot_functions::{output_path, source_color};
use crate::source_names::{FlightPhase, VoltageSource};
use crate::types::{PlotResult, XYData};

/// Reference-logger trace with each detected flight phase shaded.
pub fn plot_segment_overview(
    vdl: &ElapsedLog,
    segmentation: &FlightSegmentation,
    flight_threshold_v: f64,
    output_dir: &Path,
) -> PlotResult {
    let output_file = output_path(output_dir, "vdl_segmentation.png");
    let minutes: Vec<f64> = vdl.samples.iter().map(|s| s.time / 60.0).collect();
    let data: XYData = vdl
        .samples
        .iter()
        .zip(&minutes)
        .map(|(s, &m)| (m, s.volts))
        .collect();

    draw_stacked_plot(
        &output_file,
        "VDL48 Flight Segmentation",
        "Segmentation",
        1,
        move |_| {
            let (x_min, x_max) = finite_min_max(minutes.iter().copied())?;
            let x_range = x_min..x_max;
            let mut series = vec![PlotSeries::line(
                data.clone(),
                VoltageSource::Vdl48.legend(),
                source_color(VoltageSource::Vdl48),
                LINE_WIDTH_PLOT,
            )];
            series.push(PlotSeries::horizontal(
                flight_threshold_v,
                &x_range,
                format!("Flight threshold ({flight_threshold_v:.1} V)"),
                COLOR_THRESHOLD,
                LINE_WIDTH_MARKER,
            ));
            let y_range = padded_y_range(&series)?;

            let spans = segmentation
                .segments()
                .iter()
                .filter(|seg| !seg.is_empty())
                .filter_map(|seg| {
                    let start = *minutes.get(seg.start)?;
                    let end = *minutes.get(seg.end.saturating_sub(1))?;
                    let color = match seg.phase {
                        FlightPhase::Flight1 => *COLOR_PHASE_FLIGHT1,
                        FlightPhase::Idle => *COLOR_PHASE_IDLE,
                        FlightPhase::Flight2 => *COLOR_PHASE_FLIGHT2,
                    };
                    Some(ShadedSpan {
                        x_start: start,
                        x_end: end,
                        color,
                        opacity: PHASE_SHADING_OPACITY,
                        label: seg.phase.name().to_string(),
                    })
                })
                .collect();

            Some(
                PlotConfig::new(
                    "Reference logger voltage by flight phase",
                    x_range,
                    y_range,
                    series,
                    "Time (min)",
                    "Voltage (V)",
                )
                .with_spans(spans),
            )
        },
    )
}

// src/plot_functions/plot_segment_overview.rs
