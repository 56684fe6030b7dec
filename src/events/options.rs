use serde::Deserialize;

/// How the detection threshold is chosen.
///
/// A fixed value suits networks with a known noise floor; the data-driven
/// rule adapts to each run's combined residual distribution.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ThresholdPolicy {
    /// Use the configured value as-is.
    Fixed { value: f64 },
    /// Mean plus `sigma` standard deviations of the defined combined
    /// residuals.
    Auto { sigma: f64 },
}

impl ThresholdPolicy {
    /// Resolve to a concrete threshold against the combined signal.
    pub fn resolve(&self, combined: &[Option<f64>]) -> f64 {
        match *self {
            ThresholdPolicy::Fixed { value } => value,
            ThresholdPolicy::Auto { sigma } => {
                let defined: Vec<f64> = combined.iter().flatten().copied().collect();
                if defined.is_empty() {
                    return f64::INFINITY;
                }
                let n = defined.len() as f64;
                let mean = defined.iter().sum::<f64>() / n;
                let var = defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                mean + sigma * var.sqrt()
            }
        }
    }
}

/// Knobs for the threshold event detector.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub threshold: ThresholdPolicy,
    /// Consecutive at-or-below-threshold samples required before an open
    /// event closes.
    pub hold_down: usize,
    /// Minimum stations with a defined residual for the combined sample at
    /// an epoch to be defined at all.
    pub min_active_stations: usize,
    /// Closed events shorter than this are culled before emission.
    pub min_duration_s: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            threshold: ThresholdPolicy::Fixed { value: 2.0 },
            hold_down: 3,
            min_active_stations: 1,
            min_duration_s: 0.0,
        }
    }
}
