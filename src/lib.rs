#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod events;
pub mod pipeline;
pub mod residual;
pub mod series;

// --- High-level re-exports -------------------------------------------------

// Main entry points: pipeline + results.
pub use crate::pipeline::{CatalogPipeline, PipelineOutput, PipelineParams};

// Run summary emitted next to every catalog.
pub use crate::diagnostics::RunReport;

// The closed-event type consumers iterate over.
pub use crate::events::Event;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use slip_catalog::prelude::*;
///
/// # fn main() -> Result<(), String> {
/// let stations: Vec<LoadedStation> = Vec::new();
/// let pipeline = CatalogPipeline::new(PipelineParams::default());
/// let output = pipeline.run(&stations)?;
/// println!("{} events, {}", output.events.len(), output.report.summary());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::series::{LoadedStation, Sample, Station};
    pub use crate::{CatalogPipeline, Event, PipelineOutput, PipelineParams, RunReport};
}
