//! Reduction policies building the combined residual signal.
//!
//! The exact combination formula is a pluggable policy, not a constant:
//! residuals are first reduced across a station's axes, then across
//! stations. One policy is active per run, which is what keeps correlated
//! axes from producing duplicate events (the combined signal takes
//! precedence over any single-axis view). Both reductions are
//! order-independent, so the per-station rayon fan-out can never change
//! the output.

use serde::Deserialize;

/// Reduction from a station's per-axis residuals to one station residual.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AxisReduction {
    /// Euclidean norm of the axis residuals (magnitude of the planar
    /// misfit; always non-negative).
    Norm,
    Sum,
    /// Largest absolute axis residual.
    Max,
}

/// Reduction from station residuals to the combined signal.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StationReduction {
    Sum,
    Mean,
    Max,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CombineOptions {
    pub across_axes: AxisReduction,
    pub across_stations: StationReduction,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            across_axes: AxisReduction::Norm,
            across_stations: StationReduction::Sum,
        }
    }
}

/// Reduce the defined per-axis values at one epoch. `None` when no axis
/// has a defined value.
pub fn reduce_axes(values: &[Option<f64>], reduction: AxisReduction) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        return None;
    }
    Some(match reduction {
        AxisReduction::Norm => defined.iter().map(|v| v * v).sum::<f64>().sqrt(),
        AxisReduction::Sum => defined.iter().sum(),
        AxisReduction::Max => defined.iter().fold(0.0f64, |acc, v| acc.max(v.abs())),
    })
}

/// Reduce the defined station residuals at one epoch.
pub fn reduce_stations(values: &[f64], reduction: StationReduction) -> f64 {
    match reduction {
        StationReduction::Sum => values.iter().sum(),
        StationReduction::Mean => values.iter().sum::<f64>() / values.len() as f64,
        StationReduction::Max => values.iter().fold(f64::NEG_INFINITY, |acc, &v| acc.max(v)),
    }
}
