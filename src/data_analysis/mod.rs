// src/data_analysis/mod.rs

pub mod alignment;
pub mod change_point;
pub mod distributions;
pub mod flight_summary;
pub mod pair_statistics;
pub mod segmentation;

// src/data_analysis/mod.rs
