//! The tabular catalog: stable schema, writer and round-trip reader.
//!
//! The catalog is a whitespace-delimited table, one row per epoch of the
//! merged timebase, with a named header row. Consumers should validate
//! column names; for the legacy plotting toolchain the three trailing
//! columns are guaranteed to be `combined event threshold`, in that order.
//! Absent values serialize as `NaN`. Writing is idempotent: identical
//! inputs produce byte-identical files.

mod reader;
mod schema;
mod writer;

pub use reader::{events_from_catalog, parse_catalog, read_catalog, CatalogError, ParsedCatalog};
pub use schema::{CatalogSchema, SCHEMA_VERSION};
pub use writer::{
    ensure_parent_dir, render_catalog, render_events, write_catalog, write_events,
    write_json_file, CatalogTable,
};
