use super::{DetectorOptions, Event};
use chrono::NaiveDateTime;
use log::debug;

/// Detector output: kept events plus the per-epoch indicator used by the
/// catalog table.
#[derive(Clone, Debug)]
pub struct DetectorOutcome {
    pub events: Vec<Event>,
    /// True for every epoch inside a kept event's `[start, end]` span.
    pub indicator: Vec<bool>,
    /// Resolved detection threshold.
    pub threshold: f64,
    /// Closed events dropped for being shorter than `min_duration_s`.
    pub culled: usize,
}

#[derive(Clone, Copy)]
enum State {
    Idle,
    Open {
        start_idx: usize,
        end_idx: usize,
        peak: f64,
        below_run: usize,
    },
}

/// Scan the combined residual for threshold crossings.
///
/// `combined` is aligned with `epochs`; absent samples (warm-up, degenerate
/// windows, too few active stations) never open an event and count as
/// below-threshold while one is open. `contributors[i]` lists indices into
/// `station_ids` for the stations whose residual is defined at epoch `i`.
pub fn detect_events(
    epochs: &[NaiveDateTime],
    combined: &[Option<f64>],
    contributors: &[Vec<usize>],
    station_ids: &[String],
    threshold: f64,
    options: &DetectorOptions,
) -> DetectorOutcome {
    debug_assert_eq!(epochs.len(), combined.len());
    debug_assert_eq!(epochs.len(), contributors.len());

    let mut events = Vec::new();
    let mut indicator = vec![false; epochs.len()];
    let mut culled = 0usize;
    let mut state = State::Idle;

    let close = |start_idx: usize,
                     end_idx: usize,
                     peak: f64,
                     events: &mut Vec<Event>,
                     indicator: &mut Vec<bool>,
                     culled: &mut usize| {
        let event = build_event(epochs, contributors, station_ids, start_idx, end_idx, peak);
        if event.duration_s() < options.min_duration_s {
            debug!(
                "culled event {} -> {} ({}s < {}s)",
                event.start,
                event.end,
                event.duration_s(),
                options.min_duration_s
            );
            *culled += 1;
            return;
        }
        for flag in &mut indicator[start_idx..=end_idx] {
            *flag = true;
        }
        events.push(event);
    };

    for (i, value) in combined.iter().enumerate() {
        let above = matches!(value, Some(v) if *v > threshold);
        state = match state {
            State::Idle => {
                if above {
                    State::Open {
                        start_idx: i,
                        end_idx: i,
                        peak: value.unwrap_or(f64::NEG_INFINITY),
                        below_run: 0,
                    }
                } else {
                    State::Idle
                }
            }
            State::Open {
                start_idx,
                end_idx,
                peak,
                below_run,
            } => {
                if above {
                    State::Open {
                        start_idx,
                        end_idx: i,
                        peak: peak.max(value.unwrap_or(f64::NEG_INFINITY)),
                        below_run: 0,
                    }
                } else if below_run + 1 >= options.hold_down {
                    close(start_idx, end_idx, peak, &mut events, &mut indicator, &mut culled);
                    State::Idle
                } else {
                    State::Open {
                        start_idx,
                        end_idx,
                        peak,
                        below_run: below_run + 1,
                    }
                }
            }
        };
    }

    // An event still open at series end is closed by the run ending.
    if let State::Open {
        start_idx,
        end_idx,
        peak,
        ..
    } = state
    {
        close(start_idx, end_idx, peak, &mut events, &mut indicator, &mut culled);
    }

    DetectorOutcome {
        events,
        indicator,
        threshold,
        culled,
    }
}

fn build_event(
    epochs: &[NaiveDateTime],
    contributors: &[Vec<usize>],
    station_ids: &[String],
    start_idx: usize,
    end_idx: usize,
    peak: f64,
) -> Event {
    let mut seen = vec![false; station_ids.len()];
    for row in &contributors[start_idx..=end_idx] {
        for &idx in row {
            seen[idx] = true;
        }
    }
    let stations = station_ids
        .iter()
        .zip(seen.iter())
        .filter(|(_, &s)| s)
        .map(|(id, _)| id.clone())
        .collect();
    Event {
        start: epochs[start_idx],
        end: epochs[end_idx],
        peak_residual: peak,
        stations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn epochs(n: usize) -> Vec<NaiveDateTime> {
        let day = NaiveDate::from_ymd_opt(2010, 12, 30).unwrap();
        (0..n)
            .map(|i| {
                let s = i as u32 * 60;
                day.and_hms_opt(s / 3600, s / 60 % 60, 0).unwrap()
            })
            .collect()
    }

    fn run(combined: &[Option<f64>], options: &DetectorOptions) -> DetectorOutcome {
        let station_ids = vec!["la01".to_string()];
        let contributors: Vec<Vec<usize>> = combined
            .iter()
            .map(|v| if v.is_some() { vec![0] } else { vec![] })
            .collect();
        detect_events(
            &epochs(combined.len()),
            combined,
            &contributors,
            &station_ids,
            2.0,
            options,
        )
    }

    #[test]
    fn single_crossing_becomes_one_event() {
        let combined: Vec<Option<f64>> =
            [0.1, 0.2, 3.0, 4.5, 2.5, 0.3, 0.1, 0.2, 0.1].map(Some).to_vec();
        let out = run(&combined, &DetectorOptions::default());
        assert_eq!(out.events.len(), 1);
        let ev = &out.events[0];
        assert_eq!(ev.start, epochs(9)[2]);
        assert_eq!(ev.end, epochs(9)[4]);
        assert_eq!(ev.peak_residual, 4.5);
        assert_eq!(ev.stations, ["la01".to_string()]);
        assert_eq!(
            out.indicator,
            [false, false, true, true, true, false, false, false, false]
        );
    }

    #[test]
    fn flapping_below_hold_down_merges_into_one_event() {
        // Dips of one and two samples with hold_down = 3 must not split.
        let combined: Vec<Option<f64>> =
            [0.1, 3.0, 1.0, 3.5, 1.0, 1.2, 4.0, 0.1, 0.1, 0.1].map(Some).to_vec();
        let out = run(&combined, &DetectorOptions::default());
        assert_eq!(out.events.len(), 1, "flapping split the event");
        let ev = &out.events[0];
        assert_eq!(ev.start, epochs(10)[1]);
        assert_eq!(ev.end, epochs(10)[6]);
        assert_eq!(ev.peak_residual, 4.0);
    }

    #[test]
    fn hold_down_reached_splits_events() {
        let combined: Vec<Option<f64>> =
            [3.0, 0.1, 0.1, 0.1, 3.5, 0.1, 0.1, 0.1].map(Some).to_vec();
        let out = run(&combined, &DetectorOptions::default());
        assert_eq!(out.events.len(), 2);
        assert_eq!(out.events[0].peak_residual, 3.0);
        assert_eq!(out.events[1].peak_residual, 3.5);
    }

    #[test]
    fn absent_samples_never_open_events() {
        let combined = vec![None, None, Some(1.0), None, Some(0.5)];
        let out = run(&combined, &DetectorOptions::default());
        assert!(out.events.is_empty());
    }

    #[test]
    fn event_open_at_series_end_is_closed() {
        let combined: Vec<Option<f64>> = [0.1, 0.2, 5.0, 6.0].map(Some).to_vec();
        let out = run(&combined, &DetectorOptions::default());
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].end, epochs(4)[3]);
    }

    #[test]
    fn short_events_are_culled() {
        let combined: Vec<Option<f64>> =
            [0.1, 3.0, 0.1, 0.1, 0.1, 3.0, 3.1, 3.2, 3.0, 0.1, 0.1, 0.1]
                .map(Some)
                .to_vec();
        let options = DetectorOptions {
            min_duration_s: 90.0,
            ..Default::default()
        };
        let out = run(&combined, &options);
        // The one-sample event has zero duration and is culled; the
        // four-sample event spans 180 s and survives.
        assert_eq!(out.culled, 1);
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].start, epochs(12)[5]);
        assert!(!out.indicator[1], "culled event must not mark the indicator");
    }

    #[test]
    fn exact_threshold_value_does_not_open() {
        let combined: Vec<Option<f64>> = [2.0, 2.0, 2.0].map(Some).to_vec();
        let out = run(&combined, &DetectorOptions::default());
        assert!(out.events.is_empty(), "crossing must be strict");
    }
}
