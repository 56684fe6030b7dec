use slip_catalog::residual::{estimate_station, EstimatorOptions};
use slip_catalog::series::{load_station, LoadOptions};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// Dump the residual and curvature series of a single station table, one
/// row per sample, for quick inspection of window-span choices.
fn run() -> Result<(), String> {
    let program = env::args().next().unwrap_or_else(|| "residual_demo".to_string());
    let args: Vec<String> = env::args().skip(1).collect();
    let (path, window_span_s) = match args.as_slice() {
        [path] => (path.clone(), EstimatorOptions::default().window_span_s),
        [path, span] => {
            let span: f64 = span
                .parse()
                .map_err(|e| format!("bad window span '{span}': {e}"))?;
            (path.clone(), span)
        }
        _ => return Err(format!("usage: {program} <station.txt> [window_span_s]")),
    };

    let loaded = load_station(Path::new(&path), "station", &LoadOptions::default())
        .map_err(|e| e.to_string())?;
    let options = EstimatorOptions {
        window_span_s,
        ..Default::default()
    };
    let series = estimate_station(&loaded.station, &options);

    println!("date time axis residual curvature");
    for (axis, name) in loaded.station.axes().iter().enumerate() {
        let out = &series.axes[axis];
        for (i, sample) in loaded.station.samples().iter().enumerate() {
            println!(
                "{} {name} {} {}",
                sample.epoch.format("%Y-%m-%d %H:%M:%S"),
                fmt(out.residuals[i]),
                fmt(out.curvature[i]),
            );
        }
    }
    eprintln!(
        "{} samples, {} skipped rows, {} degenerate windows",
        loaded.station.len(),
        loaded.skipped_rows,
        series.degenerate_windows()
    );
    Ok(())
}

fn fmt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}
