// src/plot_functions/mod.rs

pub mod plot_change_point;
pub mod plot_difference_histograms;
pub mod plot_flight_comparison;
pub mod plot_maintenance_correlation;
pub mod plot_scatter;
pub mod plot_segment_overview;
pub mod plot_voltage_history;

use std::ops::Range;
use std::path::Path;

use plotters::style::RGBColor;
use tracing::error;

use crate::constants::{
    COLOR_DIFFERENCE, COLOR_DIFF_ECU_VDL, COLOR_DIFF_G1000_ECU, COLOR_ECU, COLOR_EVENT_AVIONICS,
    COLOR_EVENT_ELECTRICAL, COLOR_EVENT_ENGINE, COLOR_FLIGHT1, COLOR_FLIGHT2, COLOR_G1000,
    COLOR_VDL,
};
use crate::data_input::maintenance_events::{EventKind, MaintenanceEvent};
use crate::plot_framework::{date_to_x, PlotAnnotation, PlotSeries};
use crate::source_names::VoltageSource;
use crate::types::PlotResult;

pub(crate) fn source_color(source: VoltageSource) -> &'static RGBColor {
    match source {
        VoltageSource::G1000 => COLOR_G1000,
        VoltageSource::Vdl48 => COLOR_VDL,
        VoltageSource::Ecu => COLOR_ECU,
    }
}

/// Colour of the `index`-th difference series, in `all_pairs` order.
pub(crate) fn pair_color(index: usize) -> &'static RGBColor {
    const PALETTE: [&RGBColor; 3] = [COLOR_DIFFERENCE, COLOR_DIFF_G1000_ECU, COLOR_DIFF_ECU_VDL];
    PALETTE[index % PALETTE.len()]
}

pub(crate) fn flight_color(index: usize) -> &'static RGBColor {
    if index % 2 == 0 {
        COLOR_FLIGHT1
    } else {
        COLOR_FLIGHT2
    }
}

pub(crate) fn event_color(kind: EventKind) -> &'static RGBColor {
    match kind {
        EventKind::Engine => COLOR_EVENT_ENGINE,
        EventKind::Electrical => COLOR_EVENT_ELECTRICAL,
        EventKind::Avionics => COLOR_EVENT_AVIONICS,
    }
}

fn events_in_range<'a>(
    events: &'a [MaintenanceEvent],
    x_range: &'a Range<f64>,
) -> impl Iterator<Item = (f64, &'a MaintenanceEvent)> + 'a {
    events
        .iter()
        .map(|e| (date_to_x(e.date), e))
        .filter(move |(x, _)| x_range.contains(x))
}

/// Vertical lines at each event date inside `x_range`. Only the first one gets a legend entry.
pub(crate) fn event_markers(
    events: &[MaintenanceEvent],
    x_range: &Range<f64>,
    y_range: &Range<f64>,
    stroke_width: u32,
) -> Vec<PlotSeries> {
    events_in_range(events, x_range)
        .enumerate()
        .map(|(i, (x, event))| {
            let label = if i == 0 { "Maintenance events" } else { "" };
            PlotSeries::vertical(x, y_range, label, event_color(event.kind), stroke_width)
        })
        .collect()
}

/// Event labels along the top of a panel, staggered over two rows.
pub(crate) fn event_labels(
    events: &[MaintenanceEvent],
    x_range: &Range<f64>,
    y_range: &Range<f64>,
) -> Vec<PlotAnnotation> {
    let height = y_range.end - y_range.start;
    events_in_range(events, x_range)
        .enumerate()
        .map(|(i, (x, event))| PlotAnnotation {
            x,
            y: y_range.end - height * if i % 2 == 0 { 0.02 } else { 0.08 },
            text: event.label.clone(),
            color: *event_color(event.kind),
        })
        .collect()
}

pub(crate) fn output_path(output_dir: &Path, file_name: &str) -> String {
    output_dir.join(file_name).to_string_lossy().into_owned()
}

/// "Flight 1" -> "flight_1", for file names.
pub(crate) fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Logs a failed plot; a missing PNG never aborts the run.
pub fn check_plot(plot_name: &str, result: PlotResult) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("Error creating {} plot: {}", plot_name, e);
            false
        }
    }
}


// src/plot_functions/mod.rs
