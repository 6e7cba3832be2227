// src/data_input/mod.rs

pub mod ecu_parser;
pub mod g1000_parser;
pub mod log_data;
pub mod log_discovery;
pub mod maintenance_events;
pub mod vdl_parser;

// src/data_input/mod.rs
