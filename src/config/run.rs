use crate::pipeline::PipelineParams;
use crate::series::LoadOptions;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One station input file.
#[derive(Clone, Debug, Deserialize)]
pub struct StationInput {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Catalog table destination.
    pub catalog: PathBuf,
    /// Event list destination; skipped when unset.
    #[serde(default)]
    pub events: Option<PathBuf>,
    /// JSON run report destination; skipped when unset.
    #[serde(default)]
    pub report_json: Option<PathBuf>,
}

/// Full configuration of one `catalog_run` invocation.
#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    pub stations: Vec<StationInput>,
    #[serde(default)]
    pub loader: LoadOptions,
    #[serde(default)]
    pub params: PipelineParams,
    pub output: OutputConfig,
}

impl RunConfig {
    /// Configuration problems are fatal and reported before any data is
    /// read.
    pub fn validate(&self) -> Result<(), String> {
        if self.stations.is_empty() {
            return Err("config lists no station inputs".to_string());
        }
        let mut seen = HashSet::new();
        for sta in &self.stations {
            if sta.id.trim().is_empty() {
                return Err(format!("empty station id for {}", sta.path.display()));
            }
            if !seen.insert(sta.id.as_str()) {
                return Err(format!("duplicate station id '{}'", sta.id));
            }
        }
        self.params.validate()
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_json() -> &'static str {
        r#"{
            "stations": [
                {"id": "la01", "path": "data/la01.txt"},
                {"id": "la05", "path": "data/la05.txt"}
            ],
            "loader": {"derive_distance": true},
            "params": {
                "estimator": {"window_span_s": 9000.0},
                "detector": {
                    "threshold": {"mode": "fixed", "value": 2.0},
                    "hold_down": 3,
                    "min_active_stations": 2,
                    "min_duration_s": 30.0
                },
                "max_gap_s": 120.0
            },
            "output": {"catalog": "out/catalog.txt"}
        }"#
    }

    #[test]
    fn parses_full_config() {
        let config: RunConfig = serde_json::from_str(config_json()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.stations.len(), 2);
        assert!(config.loader.derive_distance);
        assert_eq!(config.params.estimator.window_span_s, 9000.0);
        assert_eq!(config.params.detector.min_active_stations, 2);
        assert_eq!(config.params.max_gap_s, Some(120.0));
        assert!(config.output.events.is_none());
    }

    #[test]
    fn duplicate_station_ids_are_fatal() {
        let mut config: RunConfig = serde_json::from_str(config_json()).unwrap();
        config.stations[1].id = "la01".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate"), "unexpected error: {err}");
    }

    #[test]
    fn invalid_window_span_is_fatal() {
        let mut config: RunConfig = serde_json::from_str(config_json()).unwrap();
        config.params.estimator.window_span_s = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn auto_threshold_parses() {
        let json = r#"{"mode": "auto", "sigma": 3.0}"#;
        let policy: crate::events::ThresholdPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy, crate::events::ThresholdPolicy::Auto { sigma: 3.0 });
    }
}
