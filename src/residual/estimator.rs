use super::fit::fit_line;
use super::options::EstimatorOptions;
use crate::series::Station;
use log::debug;

/// Estimator output for one station axis, aligned with the station samples.
///
/// `residuals[i]`/`curvature[i]` are `None` inside the warm-up region and
/// wherever the window fit was degenerate; they are never zero-filled.
#[derive(Clone, Debug)]
pub struct AxisSeries {
    pub residuals: Vec<Option<f64>>,
    pub curvature: Vec<Option<f64>>,
    pub degenerate_windows: usize,
    /// Samples before the first full window.
    pub warmup_len: usize,
}

/// Estimator output for all axes of one station.
#[derive(Clone, Debug)]
pub struct StationSeries {
    pub axes: Vec<AxisSeries>,
}

impl StationSeries {
    pub fn degenerate_windows(&self) -> usize {
        self.axes.iter().map(|a| a.degenerate_windows).sum()
    }
}

/// Run the sliding-window estimator over every axis of a station.
pub fn estimate_station(station: &Station, options: &EstimatorOptions) -> StationSeries {
    let axes = (0..station.axes().len())
        .map(|axis| estimate_axis(station, axis, options))
        .collect();
    StationSeries { axes }
}

/// Slide a window of span `window_span_s` over one axis, one sample at a
/// time, fitting a line per position.
///
/// The reference sample is the window's trailing sample: the window at
/// position `i` holds every sample with `t` in `[t_i - span, t_i]`. A sample
/// produces a point exactly when a full window span has elapsed since the
/// series start, so a series of exactly one span's duration produces one
/// point and a shorter one produces none.
pub fn estimate_axis(station: &Station, axis: usize, options: &EstimatorOptions) -> AxisSeries {
    let times = station.times_s();
    let values = station.axis_values(axis);
    let n = times.len();
    let span = options.window_span_s;

    let mut residuals = vec![None; n];
    let mut curvature = vec![None; n];
    let mut degenerate = 0usize;
    let mut warmup_len = 0usize;
    // Slope of the previous successful fit, for the finite difference.
    let mut prev_slope: Option<(f64, f64)> = None;

    let t0 = match times.first() {
        Some(&t0) => t0,
        None => {
            return AxisSeries {
                residuals,
                curvature,
                degenerate_windows: 0,
                warmup_len: 0,
            }
        }
    };

    let mut window_start = 0usize;
    for i in 0..n {
        let t_i = times[i];
        if t_i - t0 < span {
            warmup_len += 1;
            continue;
        }
        while times[window_start] < t_i - span {
            window_start += 1;
        }
        let window_t = &times[window_start..=i];
        let window_v = &values[window_start..=i];
        match fit_line(window_t, window_v, options.min_window_samples) {
            Ok(fit) => {
                residuals[i] = Some(values[i] - fit.value_at(t_i));
                if let Some((t_prev, s_prev)) = prev_slope {
                    let dt = t_i - t_prev;
                    if dt > 0.0 {
                        curvature[i] = Some((fit.slope() - s_prev) / dt);
                    }
                }
                prev_slope = Some((t_i, fit.slope()));
            }
            Err(_) => degenerate += 1,
        }
    }

    if degenerate > 0 {
        debug!(
            "station {} axis {axis}: {degenerate} degenerate windows",
            station.id()
        );
    }

    AxisSeries {
        residuals,
        curvature,
        degenerate_windows: degenerate,
        warmup_len,
    }
}
