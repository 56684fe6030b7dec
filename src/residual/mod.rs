//! Sliding-window least-squares residual estimation.
//!
//! For each station axis a window of fixed time span slides one sample at a
//! time; a closed-form OLS line fit over the window yields the residual
//! (observed minus fitted at the trailing sample) and a curvature signal
//! (finite difference of consecutive window slopes). Points inside the
//! warm-up region, and points whose window cannot be fit, are explicitly
//! absent rather than zero so that the detector never fires on them.

mod estimator;
mod fit;
mod options;

pub use estimator::{estimate_axis, estimate_station, AxisSeries, StationSeries};
pub use fit::{fit_line, FitError, LineFit};
pub use options::EstimatorOptions;
