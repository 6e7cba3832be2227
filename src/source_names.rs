// src/source_names.rs

/// Centralized source and phase naming
///
/// Provides consistent labels for the three voltage sources and the flight phases
/// across parsers, reports and plots.
use std::fmt;

/// One of the independent voltage measurements being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoltageSource {
    /// G1000 NXi `volt1` channel (avionics, 1 s sampling).
    G1000,
    /// Triplett VDL48 standalone logger (reference, 2 s sampling).
    Vdl48,
    /// AE300 ECU battery voltage, channel 808 (1 s sampling).
    Ecu,
}

impl VoltageSource {
    /// Short label used in report headings and difference names.
    pub fn label(self) -> &'static str {
        match self {
            VoltageSource::G1000 => "G1000",
            VoltageSource::Vdl48 => "VDL48",
            VoltageSource::Ecu => "ECU",
        }
    }

    /// Longer label used in legends.
    pub fn legend(self) -> &'static str {
        match self {
            VoltageSource::G1000 => "G1000 volt1",
            VoltageSource::Vdl48 => "VDL48 (reference)",
            VoltageSource::Ecu => "ECU ch808",
        }
    }
}

impl fmt::Display for VoltageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phase of the reference-logger recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightPhase {
    Flight1,
    Idle,
    Flight2,
}

impl FlightPhase {
    pub fn name(self) -> &'static str {
        match self {
            FlightPhase::Flight1 => "Flight 1",
            FlightPhase::Idle => "Idle (engine off)",
            FlightPhase::Flight2 => "Flight 2",
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phases in recording order.
pub const FLIGHT_PHASES: [FlightPhase; 3] =
    [FlightPhase::Flight1, FlightPhase::Idle, FlightPhase::Flight2];

/// Label for a difference series, e.g. "G1000 - VDL48".
pub fn difference_label(a: &str, b: &str) -> String {
    format!("{a} - {b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels() {
        assert_eq!(VoltageSource::G1000.label(), "G1000");
        assert_eq!(VoltageSource::Vdl48.label(), "VDL48");
        assert_eq!(VoltageSource::Ecu.to_string(), "ECU");
    }

    #[test]
    fn test_phase_order() {
        assert_eq!(FLIGHT_PHASES[0], FlightPhase::Flight1);
        assert_eq!(FLIGHT_PHASES[1].name(), "Idle (engine off)");
        assert_eq!(FLIGHT_PHASES[2], FlightPhase::Flight2);
    }

    #[test]
    fn test_difference_label() {
        assert_eq!(difference_label("G1000", "ECU"), "G1000 - ECU");
    }
}
