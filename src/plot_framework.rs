// src/plot_framework.rs

use plotters::backend::{BitMapBackend, DrawingBackend};
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, PathElement, Rectangle, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use chrono::{Datelike, NaiveDate};
use std::ops::Range;

use crate::constants::{
    FONT_SIZE_ANNOTATION, FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_LEGEND, FONT_SIZE_MAIN_TITLE,
    FONT_SIZE_MESSAGE, LINE_WIDTH_LEGEND, PLOT_HEIGHT, PLOT_WIDTH,
};
use crate::types::{PlotResult, XYData};

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Smallest and largest finite value, if any.
pub fn finite_min_max<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Padded range covering the y values of every series.
pub fn padded_y_range(series: &[PlotSeries]) -> Option<Range<f64>> {
    let (lo, hi) = finite_min_max(series.iter().flat_map(|s| s.data.iter().map(|p| p.1)))?;
    let (lo, hi) = calculate_range(lo, hi);
    Some(lo..hi)
}

/// Tick label for the y axis.
///
/// Large counts use k/M notation, histogram counts and percentages stay integral and
/// voltages keep one decimal (two below 1 V, for differences).
pub fn format_y_tick(y: f64, y_label: &str) -> String {
    if y.abs() >= 1_000_000.0 {
        format!("{:.1}M", y / 1_000_000.0)
    } else if y.abs() >= 1000.0 {
        format!("{:.0}k", y / 1000.0)
    } else if y_label.contains("Count") || y_label.contains('%') {
        format!("{:.0}", y)
    } else if y.abs() < 1.0 && y.fract() != 0.0 {
        format!("{:.2}", y)
    } else if y.fract() != 0.0 || y_label.contains("(V)") {
        format!("{:.1}", y)
    } else {
        format!("{:.0}", y)
    }
}

/// Days since 0001-01-01, the x coordinate of date-axis panels.
pub fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn format_x_tick(x: f64, axis: XAxisKind) -> String {
    match axis {
        XAxisKind::Numeric => {
            if x.fract() == 0.0 {
                format!("{:.0}", x)
            } else {
                format!("{:.2}", x)
            }
        }
        XAxisKind::Date => NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default(),
    }
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    panel_name: &str,
    plot_type: &str,
    reason: &str,
) -> PlotResult {
    const CHAR_WIDTH_RATIO: f32 = 0.6;
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (
        (x_range.end - x_range.start) as u32,
        (y_range.end - y_range.start) as u32,
    );
    let message = format!("{panel_name} {plot_type} Data Unavailable:\n{reason}");

    let estimated_char_width = (FONT_SIZE_MESSAGE as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = FONT_SIZE_MESSAGE + LINE_HEIGHT_SPACING;

    let lines: Vec<&str> = message.split('\n').collect();
    let max_line_length = lines.iter().map(|line| line.len()).max().unwrap_or(0);
    let estimated_text_width = max_line_length.saturating_mul(estimated_char_width as usize) as i32;
    let estimated_text_height = lines.len().saturating_mul(estimated_line_height as usize) as i32;

    let center_x = width as i32 / 2 - estimated_text_width / 2;
    let center_y = height as i32 / 2 - estimated_text_height / 2;

    let text_style = ("sans-serif", FONT_SIZE_MESSAGE).into_font().color(&RED);
    area.draw(&Text::new(message, (center_x, center_y), text_style))?;
    Ok(())
}

/// How a series is rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeriesStyle {
    Line,
    /// Filled circles of the given radius.
    Points(u32),
    /// Bars centred on each x, `(bin_center, height)` pairs.
    Bars { width: f64 },
}

#[derive(Clone)]
pub struct PlotSeries {
    pub data: XYData,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
    pub style: SeriesStyle,
}

impl PlotSeries {
    pub fn line(data: XYData, label: impl Into<String>, color: &RGBColor, stroke_width: u32) -> Self {
        Self {
            data,
            label: label.into(),
            color: *color,
            stroke_width,
            style: SeriesStyle::Line,
        }
    }

    pub fn points(data: XYData, label: impl Into<String>, color: &RGBColor, size: u32) -> Self {
        Self {
            data,
            label: label.into(),
            color: *color,
            stroke_width: 1,
            style: SeriesStyle::Points(size),
        }
    }

    pub fn bars(data: XYData, label: impl Into<String>, color: &RGBColor, width: f64) -> Self {
        Self {
            data,
            label: label.into(),
            color: *color,
            stroke_width: 1,
            style: SeriesStyle::Bars { width },
        }
    }

    /// Horizontal reference line across `x_range`.
    pub fn horizontal(y: f64, x_range: &Range<f64>, label: impl Into<String>, color: &RGBColor, stroke_width: u32) -> Self {
        Self::line(vec![(x_range.start, y), (x_range.end, y)], label, color, stroke_width)
    }

    /// Vertical reference line across `y_range`.
    pub fn vertical(x: f64, y_range: &Range<f64>, label: impl Into<String>, color: &RGBColor, stroke_width: u32) -> Self {
        Self::line(vec![(x, y_range.start), (x, y_range.end)], label, color, stroke_width)
    }
}

/// An x interval shaded behind the data (flight phases, before/after regimes).
#[derive(Clone)]
pub struct ShadedSpan {
    pub x_start: f64,
    pub x_end: f64,
    pub color: RGBColor,
    pub opacity: f64,
    pub label: String,
}

/// Text placed at data coordinates, its top-left corner at `(x, y)`.
#[derive(Clone)]
pub struct PlotAnnotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub color: RGBColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XAxisKind {
    Numeric,
    /// x values are [`date_to_x`] day numbers.
    Date,
}

#[derive(Clone)]
pub struct PlotConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub series: Vec<PlotSeries>,
    pub x_label: String,
    pub y_label: String,
    pub spans: Vec<ShadedSpan>,
    pub annotations: Vec<PlotAnnotation>,
    pub x_axis: XAxisKind,
}

impl PlotConfig {
    pub fn new(
        title: impl Into<String>,
        x_range: Range<f64>,
        y_range: Range<f64>,
        series: Vec<PlotSeries>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_range,
            y_range,
            series,
            x_label: x_label.into(),
            y_label: y_label.into(),
            spans: Vec::new(),
            annotations: Vec::new(),
            x_axis: XAxisKind::Numeric,
        }
    }

    pub fn with_spans(mut self, spans: Vec<ShadedSpan>) -> Self {
        self.spans = spans;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<PlotAnnotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_date_axis(mut self) -> Self {
        self.x_axis = XAxisKind::Date;
        self
    }
}

/// Draws one panel: shading, then series and annotations, then the legend.
fn draw_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    plot_config: &PlotConfig,
) -> PlotResult {
    let mut chart = ChartBuilder::on(area)
        .caption(&plot_config.title, ("sans-serif", FONT_SIZE_CHART_TITLE))
        .margin(5)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(plot_config.x_range.clone(), plot_config.y_range.clone())?;

    let x_axis = plot_config.x_axis;
    chart
        .configure_mesh()
        .x_desc(&plot_config.x_label)
        .y_desc(&plot_config.y_label)
        .x_labels(if x_axis == XAxisKind::Date { 12 } else { 20 })
        .y_labels(10)
        .x_label_formatter(&|x| format_x_tick(*x, x_axis))
        .y_label_formatter(&|y| format_y_tick(*y, &plot_config.y_label))
        .light_line_style(WHITE.mix(0.7))
        .label_style(("sans-serif", FONT_SIZE_AXIS_LABEL))
        .draw()?;

    // Shading first so the data stays on top.
    for span in &plot_config.spans {
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (span.x_start, plot_config.y_range.start),
                (span.x_end, plot_config.y_range.end),
            ],
            span.color.mix(span.opacity).filled(),
        )))?;
    }

    let mut legend_series_count = 0;

    for s in &plot_config.series {
        if s.data.is_empty() {
            continue;
        }
        let color = s.color;
        let annotation = match s.style {
            SeriesStyle::Line => chart.draw_series(LineSeries::new(
                s.data.iter().cloned(),
                color.stroke_width(s.stroke_width),
            ))?,
            SeriesStyle::Points(size) => chart.draw_series(
                s.data
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), size, color.mix(0.6).filled())),
            )?,
            SeriesStyle::Bars { width } => {
                let base = plot_config.y_range.start.max(0.0);
                chart.draw_series(s.data.iter().map(|&(x, y)| {
                    Rectangle::new(
                        [(x - width / 2.0, base), (x + width / 2.0, y)],
                        color.mix(0.7).filled(),
                    )
                }))?
            }
        };

        if !s.label.is_empty() {
            annotation.label(&s.label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
            });
            legend_series_count += 1;
        }
    }

    for span in &plot_config.spans {
        if span.label.is_empty() {
            continue;
        }
        let rect_color = span.color.mix(0.4);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(plot_config.x_range.start, plot_config.y_range.start)],
                rect_color.stroke_width(0),
            )))?
            .label(&span.label)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 20, y + 5)], rect_color.filled())
            });
        legend_series_count += 1;
    }

    for note in &plot_config.annotations {
        let style = ("sans-serif", FONT_SIZE_ANNOTATION).into_font().color(&note.color);
        chart.draw_series(std::iter::once(Text::new(note.text.clone(), (note.x, note.y), style)))?;
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", FONT_SIZE_LEGEND))
            .draw()?;
    }

    Ok(())
}

/// Creates an image with `rows x cols` panels filled in row-major order.
///
/// `get_panel_data(i)` returns the config for panel `i`, or `None` when the data
/// could not be produced; such panels show an "unavailable" message.
pub fn draw_panel_grid<'a, F>(
    output_filename: &'a str,
    root_name: &str,
    plot_type_name: &str,
    (rows, cols): (usize, usize),
    mut get_panel_data: F,
) -> PlotResult
where
    F: FnMut(usize) -> Option<PlotConfig>,
    <BitMapBackend<'a> as DrawingBackend>::ErrorType: 'static,
{
    let root_area =
        BitMapBackend::new(output_filename, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;
    root_area.draw(&Text::new(
        root_name,
        (10, 10),
        ("sans-serif", FONT_SIZE_MAIN_TITLE)
            .into_font()
            .color(&BLACK),
    ))?;
    let margined_root_area = root_area.margin(50, 5, 5, 5);
    let sub_plot_areas = margined_root_area.split_evenly((rows.max(1), cols.max(1)));
    let mut any_panel_plotted = false;

    for (panel_index, area) in sub_plot_areas.iter().enumerate() {
        let panel_name = format!("Panel {}", panel_index + 1);
        match get_panel_data(panel_index) {
            Some(plot_config) => {
                let has_data = plot_config.series.iter().any(|s| !s.data.is_empty());
                let valid_ranges = plot_config.x_range.end > plot_config.x_range.start
                    && plot_config.y_range.end > plot_config.y_range.start;
                if has_data && valid_ranges {
                    draw_panel(area, &plot_config)?;
                    any_panel_plotted = true;
                } else {
                    let reason = if !has_data {
                        "No data points"
                    } else {
                        "Invalid ranges"
                    };
                    draw_unavailable_message(area, &plot_config.title, plot_type_name, reason)?;
                }
            }
            None => {
                let reason = "Calculation/Data Extraction Failed";
                draw_unavailable_message(area, &panel_name, plot_type_name, reason)?;
            }
        }
    }

    root_area.present()?;
    if any_panel_plotted {
        println!("  Plot saved as '{output_filename}'.");
    } else {
        println!("  '{output_filename}' has no data for any panel, only placeholder messages shown.");
    }
    Ok(())
}

/// Creates an image with `panel_count` panels stacked vertically.
pub fn draw_stacked_plot<'a, F>(
    output_filename: &'a str,
    root_name: &str,
    plot_type_name: &str,
    panel_count: usize,
    get_panel_data: F,
) -> PlotResult
where
    F: FnMut(usize) -> Option<PlotConfig>,
    <BitMapBackend<'a> as DrawingBackend>::ErrorType: 'static,
{
    draw_panel_grid(
        output_filename,
        root_name,
        plot_type_name,
        (panel_count, 1),
        get_panel_data,
    )
}

/// Histogram of `values` as `(bin_center, count)` pairs over `bins` equal bins.
pub fn histogram(values: &[f64], bins: usize) -> (XYData, f64) {
    let Some((lo, hi)) = finite_min_max(values.iter().copied()) else {
        return (Vec::new(), 0.0);
    };
    let bins = bins.max(1);
    let span = if hi > lo { hi - lo } else { 1.0 };
    let width = span / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let centers = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| (lo + (i as f64 + 0.5) * width, c as f64))
        .collect();
    (centers, width)
}
