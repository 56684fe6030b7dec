use super::schema::CatalogSchema;
use crate::events::Event;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// In-memory catalog table, one row per epoch of the merged timebase.
///
/// Per-station vectors are indexed `[station][row]` in the schema's
/// sorted-station order and are aligned with `epochs`.
#[derive(Clone, Debug)]
pub struct CatalogTable {
    pub schema: CatalogSchema,
    pub epochs: Vec<NaiveDateTime>,
    pub station_resid: Vec<Vec<Option<f64>>>,
    pub station_curv: Vec<Vec<Option<f64>>>,
    pub combined: Vec<Option<f64>>,
    pub indicator: Vec<bool>,
    pub threshold: f64,
}

/// Render the catalog table to its stable text form.
pub fn render_catalog(table: &CatalogTable) -> String {
    let mut out = String::new();
    out.push_str(&table.schema.header_line());
    out.push('\n');
    for (row, epoch) in table.epochs.iter().enumerate() {
        out.push_str(&epoch.format("%Y-%m-%d %H:%M:%S").to_string());
        for sta in 0..table.schema.stations().len() {
            push_value(&mut out, table.station_resid[sta][row]);
            push_value(&mut out, table.station_curv[sta][row]);
        }
        push_value(&mut out, table.combined[row]);
        out.push_str(if table.indicator[row] { " 1" } else { " 0" });
        push_value(&mut out, Some(table.threshold));
        out.push('\n');
    }
    out
}

fn push_value(out: &mut String, value: Option<f64>) {
    match value {
        Some(v) if v.is_finite() => {
            out.push(' ');
            out.push_str(&format!("{v:.6}"));
        }
        _ => out.push_str(" NaN"),
    }
}

/// Write the catalog table to disk.
pub fn write_catalog(path: &Path, table: &CatalogTable) -> Result<(), String> {
    ensure_parent_dir(path)?;
    fs::write(path, render_catalog(table))
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Render the event list: one row per closed event.
pub fn render_events(events: &[Event]) -> String {
    let mut out = String::from("index start_date start_time end_date end_time duration_s peak stations\n");
    for (i, ev) in events.iter().enumerate() {
        out.push_str(&format!(
            "{i} {} {} {:.1} {:.6} {}\n",
            ev.start.format("%Y-%m-%d %H:%M:%S"),
            ev.end.format("%Y-%m-%d %H:%M:%S"),
            ev.duration_s(),
            ev.peak_residual,
            if ev.stations.is_empty() {
                "-".to_string()
            } else {
                ev.stations.join(",")
            }
        ));
    }
    out
}

/// Write the event list to disk.
pub fn write_events(path: &Path, events: &[Event]) -> Result<(), String> {
    ensure_parent_dir(path)?;
    fs::write(path, render_events(events))
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Pretty-print a serializable value to a JSON file.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

/// Create the parent directory of `path` when it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
