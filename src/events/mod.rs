//! Threshold event detection over the combined residual signal.
//!
//! An IDLE/OPEN state machine opens an event on a strict threshold crossing,
//! tracks the peak residual and the last above-threshold epoch while open,
//! and closes only after a hold-down run of consecutive at-or-below
//! threshold samples, so noisy single-sample dips never split one slip into
//! many. Closed events shorter than a configurable duration are culled.

mod detector;
mod options;

pub use detector::{detect_events, DetectorOutcome};
pub use options::{DetectorOptions, ThresholdPolicy};

use chrono::NaiveDateTime;
use serde::Serialize;

/// A closed slip event.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub start: NaiveDateTime,
    /// Last epoch at which the combined residual was still above threshold.
    pub end: NaiveDateTime,
    pub peak_residual: f64,
    /// Stations contributing a defined residual within `[start, end]`,
    /// sorted by identifier.
    pub stations: Vec<String>,
}

impl Event {
    pub fn duration_s(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}
