use super::timing::TimingBreakdown;
use crate::series::Gap;
use serde::Serialize;

/// Load and estimation bookkeeping for one station that entered the run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReport {
    pub id: String,
    pub samples: usize,
    pub skipped_rows: usize,
    pub flipped: bool,
    pub degenerate_windows: usize,
    pub gaps: Vec<Gap>,
}

/// A station kept out of the combined signal, with the reason.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionReport {
    pub id: String,
    pub samples: usize,
    pub duration_s: f64,
    pub reason: String,
}

/// Summary of one full pipeline run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub schema_version: u32,
    pub stations: Vec<StationReport>,
    pub excluded: Vec<ExclusionReport>,
    /// Rows in the merged cross-station timebase.
    pub merged_rows: usize,
    /// Merged rows with a defined combined residual.
    pub defined_combined_rows: usize,
    pub threshold: f64,
    pub events_detected: usize,
    pub events_culled: usize,
    pub timing: TimingBreakdown,
}

impl RunReport {
    pub fn total_skipped_rows(&self) -> usize {
        self.stations.iter().map(|s| s.skipped_rows).sum()
    }

    pub fn total_degenerate_windows(&self) -> usize {
        self.stations.iter().map(|s| s.degenerate_windows).sum()
    }

    /// One-paragraph text summary for terminal output.
    pub fn summary(&self) -> String {
        format!(
            "{} stations ({} excluded), {} merged rows ({} defined), \
             threshold {:.3}, {} events ({} culled), {} skipped rows, \
             {} degenerate windows",
            self.stations.len(),
            self.excluded.len(),
            self.merged_rows,
            self.defined_combined_rows,
            self.threshold,
            self.events_detected,
            self.events_culled,
            self.total_skipped_rows(),
            self.total_degenerate_windows(),
        )
    }
}
