use super::station::{epoch_seconds, Station};
use chrono::NaiveDateTime;
use serde::Serialize;

/// A sampling gap between two consecutive epochs of one station.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub seconds: f64,
}

/// Report consecutive-epoch gaps longer than `max_gap_s` seconds.
pub fn find_gaps(station: &Station, max_gap_s: f64) -> Vec<Gap> {
    let samples = station.samples();
    let mut gaps = Vec::new();
    for pair in samples.windows(2) {
        let seconds = epoch_seconds(pair[1].epoch) - epoch_seconds(pair[0].epoch);
        if seconds > max_gap_s {
            gaps.push(Gap {
                start: pair[0].epoch,
                end: pair[1].epoch,
                seconds,
            });
        }
    }
    gaps
}
