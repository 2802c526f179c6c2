use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A seismic phase predicted to arrive inside a window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseArrival {
    pub phase_name: String,
    /// Arrival time relative to the event origin, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

impl PhaseArrival {
    pub fn new(phase_name: &str) -> Self {
        PhaseArrival {
            phase_name: phase_name.to_string(),
            time: None,
        }
    }
}

/// One measurement window on one channel.
///
/// Windows come from an external window picker and are only read here. The
/// absolute bounds drive waveform slicing, the relative bounds (seconds after
/// the event origin) are what the adjoint engine receives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub absolute_starttime: DateTime<Utc>,
    pub absolute_endtime: DateTime<Utc>,
    #[serde(default)]
    pub relative_starttime: f64,
    #[serde(default)]
    pub relative_endtime: f64,
    #[serde(default)]
    pub phase_arrivals: Vec<PhaseArrival>,
}

impl Window {
    pub fn new(
        absolute_starttime: DateTime<Utc>,
        absolute_endtime: DateTime<Utc>,
        relative_starttime: f64,
        relative_endtime: f64,
        phase_arrivals: Vec<PhaseArrival>,
    ) -> Self {
        Window {
            absolute_starttime,
            absolute_endtime,
            relative_starttime,
            relative_endtime,
            phase_arrivals,
        }
    }

    /// Phase names in arrival-list order.
    pub fn phase_names(&self) -> Vec<&str> {
        self.phase_arrivals.iter().map(|p| p.phase_name.as_str()).collect()
    }

    pub fn has_phase(&self, phase: &str) -> bool {
        self.phase_arrivals.iter().any(|p| p.phase_name == phase)
    }

    /// Window list in the shape the adjoint engine consumes: one
    /// `(relative_start, relative_end)` interval.
    pub fn adjoint_window(&self) -> Vec<(f64, f64)> {
        vec![(self.relative_starttime, self.relative_endtime)]
    }
}
