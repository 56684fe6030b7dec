//! Runtime configuration for the command-line tools.

mod run;

pub use run::{load_config, OutputConfig, RunConfig, StationInput};
