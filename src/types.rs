// src/types.rs
// Type aliases shared by the plotting code

use std::error::Error;

use crate::data_analysis::alignment::AlignedGrid;
use crate::data_analysis::pair_statistics::GridComparison;

/// Plot functions surface plotters' backend errors as boxed errors.
pub type PlotResult = Result<(), Box<dyn Error>>;

/// `(x, y)` points of one plotted series.
pub type XYData = Vec<(f64, f64)>;

/// A flight's display name with its aligned grid.
pub type NamedGrid<'a> = (&'a str, &'a AlignedGrid);

/// A flight's display name with its pairwise comparison.
pub type NamedComparison<'a> = (&'a str, &'a GridComparison);
