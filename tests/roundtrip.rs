mod common;

use common::synthetic_series::{background_series, step_series};
use slip_catalog::catalog::{events_from_catalog, parse_catalog, render_catalog};
use slip_catalog::residual::EstimatorOptions;
use slip_catalog::{CatalogPipeline, PipelineParams};

fn params() -> PipelineParams {
    let mut params = PipelineParams::default();
    params.estimator = EstimatorOptions {
        window_span_s: 1800.0,
        ..Default::default()
    };
    params
}

#[test]
fn catalog_round_trip_recovers_event_boundaries() {
    let stations = vec![
        step_series("la01", 121, 60, 70, 5.0),
        background_series("la05", 121, 60),
    ];
    let output = CatalogPipeline::new(params()).run(&stations).expect("pipeline run");
    assert!(!output.events.is_empty(), "scenario must produce an event");

    let text = render_catalog(&output.table);
    let parsed = parse_catalog(&text).expect("catalog parses back");
    let recovered = events_from_catalog(&parsed);

    assert_eq!(recovered.len(), output.events.len());
    for (orig, rec) in output.events.iter().zip(recovered.iter()) {
        assert_eq!(rec.start, orig.start);
        assert_eq!(rec.end, orig.end);
        // Values pass through a fixed six-decimal text form.
        assert!(
            (rec.peak_residual - orig.peak_residual).abs() < 1e-6,
            "peak drifted: {} vs {}",
            rec.peak_residual,
            orig.peak_residual
        );
        assert_eq!(rec.stations, orig.stations);
    }
}

#[test]
fn identical_runs_yield_byte_identical_catalogs() {
    let stations = vec![
        step_series("la01", 121, 60, 70, 5.0),
        background_series("la05", 121, 60),
    ];
    let pipeline = CatalogPipeline::new(params());
    let a = pipeline.run(&stations).expect("first run");
    let b = pipeline.run(&stations).expect("second run");
    assert_eq!(render_catalog(&a.table), render_catalog(&b.table));
}

#[test]
fn parsed_catalog_preserves_schema_and_threshold() {
    let stations = vec![
        step_series("la01", 121, 60, 70, 5.0),
        background_series("la05", 121, 60),
    ];
    let output = CatalogPipeline::new(params()).run(&stations).expect("pipeline run");
    let parsed = parse_catalog(&render_catalog(&output.table)).expect("catalog parses back");
    assert_eq!(parsed.schema, output.table.schema);
    assert_eq!(parsed.epochs.len(), output.table.epochs.len());
    assert!(parsed
        .threshold
        .iter()
        .all(|&t| (t - output.table.threshold).abs() < 1e-9));
}
