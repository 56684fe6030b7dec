use slip_catalog::catalog::{write_catalog, write_events, write_json_file};
use slip_catalog::config::{self, RunConfig};
use slip_catalog::diagnostics::ExclusionReport;
use slip_catalog::series::{load_station, LoadedStation};
use slip_catalog::CatalogPipeline;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args().next().unwrap_or_else(|| "catalog_run".to_string());
    let config_path = env::args()
        .nth(1)
        .ok_or_else(|| format!("usage: {program} <config.json>"))?;
    let config = config::load_config(Path::new(&config_path))?;
    config.validate()?;

    let (loaded, load_failures) = load_inputs(&config);
    if loaded.is_empty() {
        return Err("no station could be loaded".to_string());
    }

    let pipeline = CatalogPipeline::new(config.params.clone());
    let mut output = pipeline.run(&loaded)?;
    output.report.excluded.extend(load_failures);

    write_catalog(&config.output.catalog, &output.table)?;
    println!("Catalog written to {}", config.output.catalog.display());

    if let Some(path) = &config.output.events {
        write_events(path, &output.events)?;
        println!("Event list written to {}", path.display());
    }
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &output.report)?;
        println!("Run report written to {}", path.display());
    }

    println!("{}", output.report.summary());
    for (i, ev) in output.events.iter().enumerate() {
        println!(
            "event {i}: {} -> {} peak={:.3} stations={}",
            ev.start,
            ev.end,
            ev.peak_residual,
            ev.stations.join(",")
        );
    }
    Ok(())
}

/// Load every configured station, turning per-file failures into
/// exclusions rather than aborting the run.
fn load_inputs(config: &RunConfig) -> (Vec<LoadedStation>, Vec<ExclusionReport>) {
    let mut loaded = Vec::new();
    let mut failures = Vec::new();
    for input in &config.stations {
        match load_station(&input.path, &input.id, &config.loader) {
            Ok(ls) => loaded.push(ls),
            Err(err) => {
                eprintln!("Warning: skipping station {}: {err}", input.id);
                failures.push(ExclusionReport {
                    id: input.id.clone(),
                    samples: 0,
                    duration_s: 0.0,
                    reason: err.to_string(),
                });
            }
        }
    }
    (loaded, failures)
}
