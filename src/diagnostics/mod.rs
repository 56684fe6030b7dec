//! Run diagnostics emitted next to every catalog.
//!
//! A run never silently drops data: skipped rows, degenerate windows,
//! excluded stations and culled events are all counted in [`RunReport`],
//! which serializes to JSON for inspection alongside the catalog table.

pub mod report;
pub mod timing;

pub use report::{ExclusionReport, RunReport, StationReport};
pub use timing::{StageTiming, TimingBreakdown};
