use chrono::NaiveDate;
use slip_catalog::series::{LoadedStation, Sample, Station};
use slip_catalog::{CatalogPipeline, PipelineParams};

fn main() {
    // Demo stub: builds a synthetic one-station series with a step and runs
    // the pipeline on it.
    let day = NaiveDate::from_ymd_opt(2010, 12, 30).expect("valid date");
    let samples: Vec<Sample> = (0..120u32)
        .map(|i| {
            let s = i * 60;
            let value = if i >= 70 { 5.0 } else { 0.001 * f64::from(i) };
            Sample::new(
                day.and_hms_opt(s / 3600, s / 60 % 60, 0).expect("valid time"),
                vec![value],
            )
        })
        .collect();
    let station = Station::from_samples("la01", vec!["dist".to_string()], samples)
        .expect("synthetic series is well formed");

    let pipeline = CatalogPipeline::new(PipelineParams::default());
    match pipeline.run(&[LoadedStation::clean(station)]) {
        Ok(output) => {
            println!("{}", output.report.summary());
            for ev in &output.events {
                println!(
                    "event {} -> {} peak={:.3}",
                    ev.start, ev.end, ev.peak_residual
                );
            }
        }
        Err(err) => eprintln!("Error: {err}"),
    }
}
