//! Closed-form ordinary least squares line fit for one window.

use nalgebra::{Matrix2, Vector2};
use std::fmt;

/// A window that cannot support a line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitError {
    /// Fewer samples than the configured minimum, fewer than two distinct
    /// timestamps, or all-identical values.
    DegenerateWindow { samples: usize },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::DegenerateWindow { samples } => {
                write!(f, "degenerate window ({samples} samples)")
            }
        }
    }
}

impl std::error::Error for FitError {}

/// Fitted line `v(t) = intercept + slope * (t - t_mean)`.
///
/// Times are centered on the window mean before solving, which keeps the
/// normal equations well conditioned for absolute-seconds timestamps.
#[derive(Clone, Copy, Debug)]
pub struct LineFit {
    t_mean: f64,
    intercept: f64,
    slope: f64,
}

impl LineFit {
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Fitted value at an absolute time in seconds.
    pub fn value_at(&self, t_s: f64) -> f64 {
        self.intercept + self.slope * (t_s - self.t_mean)
    }
}

/// Fit a line to `(times_s, values)` by solving the 2x2 normal equations.
///
/// `times_s` must be ordered; both slices must have equal length. All
/// arithmetic is f64 with times in seconds.
pub fn fit_line(times_s: &[f64], values: &[f64], min_samples: usize) -> Result<LineFit, FitError> {
    debug_assert_eq!(times_s.len(), values.len());
    let n = times_s.len();
    let degenerate = FitError::DegenerateWindow { samples: n };
    if n < min_samples.max(2) {
        return Err(degenerate);
    }
    if times_s.windows(2).all(|w| w[0] == w[1]) {
        return Err(degenerate);
    }
    if values.windows(2).all(|w| w[0] == w[1]) {
        return Err(degenerate);
    }

    let t_mean = times_s.iter().sum::<f64>() / n as f64;
    let mut stt = 0.0;
    let mut st = 0.0;
    let mut sv = 0.0;
    let mut stv = 0.0;
    for (&t, &v) in times_s.iter().zip(values.iter()) {
        let tc = t - t_mean;
        st += tc;
        stt += tc * tc;
        sv += v;
        stv += tc * v;
    }

    let normal = Matrix2::new(n as f64, st, st, stt);
    let rhs = Vector2::new(sv, stv);
    let solution = normal.try_inverse().map(|inv| inv * rhs).ok_or(degenerate)?;

    Ok(LineFit {
        t_mean,
        intercept: solution[0],
        slope: solution[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line() {
        let times: Vec<f64> = (0..10).map(|i| 1000.0 + 60.0 * i as f64).collect();
        let values: Vec<f64> = times.iter().map(|t| 3.5 - 0.02 * t).collect();
        let fit = fit_line(&times, &values, 2).unwrap();
        assert!((fit.slope() - (-0.02)).abs() < 1e-9, "slope={}", fit.slope());
        let t = times[7];
        assert!((fit.value_at(t) - values[7]).abs() < 1e-9);
    }

    #[test]
    fn residual_of_outlier_is_positive() {
        let times: Vec<f64> = (0..20).map(|i| 60.0 * i as f64).collect();
        let mut values = vec![0.0; 20];
        values[19] = 5.0;
        let fit = fit_line(&times, &values, 2).unwrap();
        let residual = values[19] - fit.value_at(times[19]);
        assert!(residual > 3.0, "residual={residual}");
    }

    #[test]
    fn single_sample_is_degenerate() {
        let err = fit_line(&[0.0], &[1.0], 2).unwrap_err();
        assert_eq!(err, FitError::DegenerateWindow { samples: 1 });
    }

    #[test]
    fn identical_timestamps_are_degenerate() {
        assert!(fit_line(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0], 2).is_err());
    }

    #[test]
    fn identical_values_are_degenerate() {
        assert!(fit_line(&[0.0, 60.0, 120.0], &[2.0, 2.0, 2.0], 2).is_err());
    }

    #[test]
    fn honours_min_window_samples() {
        let times = [0.0, 60.0, 120.0];
        let values = [0.0, 1.0, 2.0];
        assert!(fit_line(&times, &values, 4).is_err());
        assert!(fit_line(&times, &values, 3).is_ok());
    }
}
