//! Per-station displacement time series: data model, loader and gap scan.
//!
//! A [`Station`] owns an ordered sample sequence with strictly increasing
//! epochs. [`load_station`] parses whitespace-delimited tables into that
//! model, skipping malformed rows without dropping them silently, and
//! [`find_gaps`] reports sampling gaps longer than a caller-chosen span.

mod gaps;
mod loader;
mod station;

pub use gaps::{find_gaps, Gap};
pub use loader::{load_station, LoadError, LoadOptions, LoadedStation};
pub use station::{Sample, Station};
