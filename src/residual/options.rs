use serde::Deserialize;

/// Knobs for the sliding-window residual estimator.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EstimatorOptions {
    /// Window span in seconds over which each local line fit is computed.
    /// The window is a time span, not a sample count, so irregular sampling
    /// is handled naturally.
    pub window_span_s: f64,
    /// Minimum samples a window must hold before a fit is attempted.
    /// Windows below this are degenerate.
    pub min_window_samples: usize,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            window_span_s: 1800.0,
            min_window_samples: 2,
        }
    }
}
