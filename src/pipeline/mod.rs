//! Pipeline orchestrating end-to-end catalog production.
//!
//! [`CatalogPipeline`] exposes a simple API: feed loaded stations and get
//! the catalog table, the closed event list and a run report. Internally it
//! coordinates the stages: insufficient-data screening and gap scan,
//! per-station residual estimation (parallel across stations through
//! rayon), the merged cross-station timebase, the combined-residual
//! reduction, threshold detection with hold-down, and culling. The combined
//! reduction is order-independent, so parallelism never changes output.

mod combine;

pub use combine::{reduce_axes, reduce_stations, AxisReduction, CombineOptions, StationReduction};

use crate::catalog::{CatalogSchema, CatalogTable, SCHEMA_VERSION};
use crate::diagnostics::{ExclusionReport, RunReport, StationReport, TimingBreakdown};
use crate::events::{detect_events, DetectorOptions, Event, ThresholdPolicy};
use crate::residual::{estimate_station, EstimatorOptions, StationSeries};
use crate::series::{find_gaps, Gap, LoadedStation};
use chrono::NaiveDateTime;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Deserialize;
use std::time::Instant;

/// Pipeline-wide parameters grouping the per-stage options.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct PipelineParams {
    pub estimator: EstimatorOptions,
    pub detector: DetectorOptions,
    pub combine: CombineOptions,
    /// When set, consecutive-epoch gaps longer than this many seconds are
    /// reported per station.
    pub max_gap_s: Option<f64>,
}

impl PipelineParams {
    /// Reject invalid parameters before any data is touched.
    pub fn validate(&self) -> Result<(), String> {
        let span = self.estimator.window_span_s;
        if !span.is_finite() || span <= 0.0 {
            return Err(format!("window_span_s must be positive, got {span}"));
        }
        if self.estimator.min_window_samples < 2 {
            return Err("min_window_samples must be at least 2".to_string());
        }
        if self.detector.hold_down == 0 {
            return Err("hold_down must be at least 1 sample".to_string());
        }
        if self.detector.min_active_stations == 0 {
            return Err("min_active_stations must be at least 1".to_string());
        }
        if self.detector.min_duration_s < 0.0 {
            return Err("min_duration_s must not be negative".to_string());
        }
        match self.detector.threshold {
            ThresholdPolicy::Fixed { value } if !value.is_finite() => {
                Err(format!("threshold must be finite, got {value}"))
            }
            ThresholdPolicy::Auto { sigma } if !(sigma > 0.0) => {
                Err(format!("threshold sigma must be positive, got {sigma}"))
            }
            _ => Ok(()),
        }
    }
}

/// Everything one run produces.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub table: CatalogTable,
    pub events: Vec<Event>,
    pub report: RunReport,
}

/// Catalog pipeline: load screening, residual estimation, combination,
/// detection and table assembly.
pub struct CatalogPipeline {
    params: PipelineParams,
}

impl CatalogPipeline {
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Run the full pipeline over the loaded stations.
    ///
    /// Per-station problems (too little data, degenerate windows) are
    /// recovered locally and reported; only invalid parameters abort.
    pub fn run(&self, loaded: &[LoadedStation]) -> Result<PipelineOutput, String> {
        self.params.validate()?;
        let total_start = Instant::now();
        let mut timing = TimingBreakdown::default();

        // Screen stations and scan gaps. Stations are sorted by id so the
        // catalog columns and the combined reduction inputs are stable.
        let stage_start = Instant::now();
        let mut included: Vec<&LoadedStation> = Vec::new();
        let mut excluded: Vec<ExclusionReport> = Vec::new();
        let mut sorted: Vec<&LoadedStation> = loaded.iter().collect();
        sorted.sort_by(|a, b| a.station.id().cmp(b.station.id()));
        for ls in sorted {
            let sta = &ls.station;
            if sta.duration_s() < self.params.estimator.window_span_s {
                warn!(
                    "station {} excluded: {:.0}s of data < window span {:.0}s",
                    sta.id(),
                    sta.duration_s(),
                    self.params.estimator.window_span_s
                );
                excluded.push(ExclusionReport {
                    id: sta.id().to_string(),
                    samples: sta.len(),
                    duration_s: sta.duration_s(),
                    reason: format!(
                        "insufficient data: {:.0}s < window span {:.0}s",
                        sta.duration_s(),
                        self.params.estimator.window_span_s
                    ),
                });
            } else {
                included.push(ls);
            }
        }
        let gaps: Vec<Vec<Gap>> = included
            .iter()
            .map(|ls| match self.params.max_gap_s {
                Some(max_gap_s) => find_gaps(&ls.station, max_gap_s),
                None => Vec::new(),
            })
            .collect();
        timing.push("screen", elapsed_ms(stage_start));

        // Residual estimation, embarrassingly parallel across stations.
        let stage_start = Instant::now();
        let estimated: Vec<StationSeries> = included
            .par_iter()
            .map(|ls| estimate_station(&ls.station, &self.params.estimator))
            .collect();
        timing.push("residual", elapsed_ms(stage_start));

        // Merge onto the union timebase and reduce axes per station.
        let stage_start = Instant::now();
        let epochs = merged_epochs(&included);
        let n_rows = epochs.len();
        let n_stations = included.len();
        let mut station_resid = vec![vec![None; n_rows]; n_stations];
        let mut station_curv = vec![vec![None; n_rows]; n_stations];
        for (s, (ls, series)) in included.iter().zip(estimated.iter()).enumerate() {
            let mut row = 0usize;
            for (i, sample) in ls.station.samples().iter().enumerate() {
                while epochs[row] < sample.epoch {
                    row += 1;
                }
                let axis_resid: Vec<Option<f64>> =
                    series.axes.iter().map(|a| a.residuals[i]).collect();
                let axis_curv: Vec<Option<f64>> =
                    series.axes.iter().map(|a| a.curvature[i]).collect();
                station_resid[s][row] = reduce_axes(&axis_resid, self.params.combine.across_axes);
                station_curv[s][row] = reduce_axes(&axis_curv, self.params.combine.across_axes);
            }
        }
        timing.push("merge", elapsed_ms(stage_start));

        // Combined signal: defined only where enough stations contribute.
        let stage_start = Instant::now();
        let mut combined: Vec<Option<f64>> = Vec::with_capacity(n_rows);
        let mut contributors: Vec<Vec<usize>> = Vec::with_capacity(n_rows);
        for row in 0..n_rows {
            let mut active = Vec::new();
            let mut values = Vec::new();
            for s in 0..n_stations {
                if let Some(v) = station_resid[s][row] {
                    active.push(s);
                    values.push(v);
                }
            }
            if values.len() >= self.params.detector.min_active_stations {
                combined.push(Some(reduce_stations(
                    &values,
                    self.params.combine.across_stations,
                )));
            } else {
                combined.push(None);
            }
            contributors.push(active);
        }
        let defined_combined_rows = combined.iter().flatten().count();
        timing.push("combine", elapsed_ms(stage_start));

        // Detection.
        let stage_start = Instant::now();
        let threshold = self.params.detector.threshold.resolve(&combined);
        let station_ids: Vec<String> = included
            .iter()
            .map(|ls| ls.station.id().to_string())
            .collect();
        let outcome = detect_events(
            &epochs,
            &combined,
            &contributors,
            &station_ids,
            threshold,
            &self.params.detector,
        );
        debug!(
            "detection: {} events, {} culled, threshold {threshold:.3}",
            outcome.events.len(),
            outcome.culled
        );
        timing.push("detect", elapsed_ms(stage_start));

        let stations = included
            .iter()
            .zip(estimated.iter())
            .zip(gaps)
            .map(|((ls, series), gaps)| StationReport {
                id: ls.station.id().to_string(),
                samples: ls.station.len(),
                skipped_rows: ls.skipped_rows,
                flipped: ls.flipped,
                degenerate_windows: series.degenerate_windows(),
                gaps,
            })
            .collect();

        timing.total_ms = elapsed_ms(total_start);
        let report = RunReport {
            schema_version: SCHEMA_VERSION,
            stations,
            excluded,
            merged_rows: n_rows,
            defined_combined_rows,
            threshold,
            events_detected: outcome.events.len(),
            events_culled: outcome.culled,
            timing,
        };

        let table = CatalogTable {
            schema: CatalogSchema::new(station_ids),
            epochs,
            station_resid,
            station_curv,
            combined,
            indicator: outcome.indicator,
            threshold,
        };

        Ok(PipelineOutput {
            table,
            events: outcome.events,
            report,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Sorted union of every included station's epochs.
fn merged_epochs(included: &[&LoadedStation]) -> Vec<NaiveDateTime> {
    let mut epochs: Vec<NaiveDateTime> = included
        .iter()
        .flat_map(|ls| ls.station.samples().iter().map(|s| s.epoch))
        .collect();
    epochs.sort();
    epochs.dedup();
    epochs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Sample, Station};
    use chrono::NaiveDate;

    fn station(id: &str, start_min: u32, values: &[f64]) -> LoadedStation {
        let day = NaiveDate::from_ymd_opt(2010, 12, 30).unwrap();
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let s = start_min * 60 + i as u32 * 60;
                Sample::new(day.and_hms_opt(s / 3600, s / 60 % 60, s % 60).unwrap(), vec![v])
            })
            .collect();
        LoadedStation::clean(
            Station::from_samples(id, vec!["dist".to_string()], samples).unwrap(),
        )
    }

    fn params(window_s: f64) -> PipelineParams {
        PipelineParams {
            estimator: EstimatorOptions {
                window_span_s: window_s,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn invalid_parameters_abort_before_processing() {
        let mut p = params(0.0);
        assert!(CatalogPipeline::new(p.clone()).run(&[]).is_err());
        p.estimator.window_span_s = 600.0;
        p.detector.hold_down = 0;
        assert!(CatalogPipeline::new(p.clone()).run(&[]).is_err());
        p.detector.hold_down = 3;
        p.detector.threshold = ThresholdPolicy::Fixed { value: f64::NAN };
        assert!(CatalogPipeline::new(p).run(&[]).is_err());
    }

    #[test]
    fn short_station_is_excluded_and_run_continues() {
        let long: Vec<f64> = (0..30).map(|i| 0.01 * i as f64).collect();
        let short = vec![0.0, 0.01, 0.02];
        let loaded = vec![station("la01", 0, &long), station("la02", 0, &short)];
        let out = CatalogPipeline::new(params(600.0)).run(&loaded).unwrap();
        assert_eq!(out.report.excluded.len(), 1);
        assert_eq!(out.report.excluded[0].id, "la02");
        assert_eq!(out.report.stations.len(), 1);
        assert_eq!(out.table.schema.stations(), ["la01".to_string()]);
    }

    #[test]
    fn merged_timebase_is_the_union_of_epochs() {
        let a: Vec<f64> = (0..20).map(|i| 0.01 * i as f64).collect();
        let b: Vec<f64> = (0..15).map(|i| 0.02 * i as f64).collect();
        // Station B starts 5 minutes later but ends with station A, so the
        // union still spans 20 distinct epochs.
        let loaded = vec![station("la01", 0, &a), station("la02", 5, &b)];
        let out = CatalogPipeline::new(params(300.0)).run(&loaded).unwrap();
        assert_eq!(out.report.merged_rows, 20);
        assert_eq!(out.table.epochs.len(), 20);
    }

    #[test]
    fn station_order_in_schema_is_sorted() {
        let v: Vec<f64> = (0..20).map(|i| 0.01 * i as f64).collect();
        let loaded = vec![station("lb9", 0, &v), station("la1", 0, &v)];
        let out = CatalogPipeline::new(params(300.0)).run(&loaded).unwrap();
        assert_eq!(
            out.table.schema.stations(),
            ["la1".to_string(), "lb9".to_string()]
        );
    }

    #[test]
    fn min_active_stations_gates_the_combined_signal() {
        let a: Vec<f64> = (0..20).map(|i| 0.01 * i as f64).collect();
        let b: Vec<f64> = (0..10).map(|i| 0.01 * i as f64).collect();
        let loaded = vec![station("la01", 0, &a), station("la02", 0, &b)];
        let mut p = params(300.0);
        p.detector.min_active_stations = 2;
        let out = CatalogPipeline::new(p).run(&loaded).unwrap();
        // Station B has data (and a complete warm-up) only through minute 9,
        // so rows where it contributes nothing have no combined value.
        let defined = out.table.combined.iter().flatten().count();
        assert_eq!(defined, 5);
        assert_eq!(out.report.defined_combined_rows, 5);
    }

    #[test]
    fn gap_scan_lands_in_the_report() {
        let day = NaiveDate::from_ymd_opt(2010, 12, 30).unwrap();
        let mut samples = Vec::new();
        for i in 0..10u32 {
            samples.push(Sample::new(day.and_hms_opt(0, i, 0).unwrap(), vec![0.01 * f64::from(i)]));
        }
        for i in 0..10u32 {
            samples.push(Sample::new(day.and_hms_opt(1, i, 0).unwrap(), vec![0.1 + 0.01 * f64::from(i)]));
        }
        let loaded = vec![LoadedStation::clean(
            Station::from_samples("la01", vec!["dist".to_string()], samples).unwrap(),
        )];
        let mut p = params(300.0);
        p.max_gap_s = Some(120.0);
        let out = CatalogPipeline::new(p).run(&loaded).unwrap();
        assert_eq!(out.report.stations[0].gaps.len(), 1);
        assert_eq!(out.report.stations[0].gaps[0].seconds, 3060.0);
    }
}
