use chrono::{NaiveDate, NaiveDateTime};
use slip_catalog::series::{LoadedStation, Sample, Station};

/// Epoch of the i-th sample on a fixed cadence starting 2010-12-30 00:00.
pub fn epoch_at(i: usize, cadence_s: u32) -> NaiveDateTime {
    let s = i as u32 * cadence_s;
    NaiveDate::from_ymd_opt(2010, 12, 30)
        .expect("valid date")
        .and_hms_opt(s / 3600, s / 60 % 60, s % 60)
        .expect("valid time")
}

/// A station sampling `values` on a regular cadence.
pub fn station_from_values(id: &str, cadence_s: u32, values: &[f64]) -> LoadedStation {
    assert!(!values.is_empty(), "series must not be empty");
    let samples = values
        .iter()
        .enumerate()
        .map(|(i, &v)| Sample::new(epoch_at(i, cadence_s), vec![v]))
        .collect();
    LoadedStation::clean(
        Station::from_samples(id, vec!["dist".to_string()], samples)
            .expect("synthetic series is well formed"),
    )
}

/// A gently trending background series (small slope keeps every window
/// fit non-degenerate while residuals stay near zero).
pub fn background_series(id: &str, n: usize, cadence_s: u32) -> LoadedStation {
    let values: Vec<f64> = (0..n).map(|i| 0.001 * i as f64).collect();
    station_from_values(id, cadence_s, &values)
}

/// A background series with an abrupt, permanent displacement step.
pub fn step_series(
    id: &str,
    n: usize,
    cadence_s: u32,
    step_at: usize,
    step_amp: f64,
) -> LoadedStation {
    assert!(step_at < n, "step must fall inside the series");
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let base = 0.001 * i as f64;
            if i >= step_at {
                base + step_amp
            } else {
                base
            }
        })
        .collect();
    station_from_values(id, cadence_s, &values)
}
