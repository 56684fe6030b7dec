//! Round-trip reader for the catalog table.
//!
//! Validates column names from the header (falling back to the positional
//! trailing-column contract is the consumer's business, not ours) and
//! recovers event boundaries from the indicator and combined columns.

use super::schema::CatalogSchema;
use crate::events::Event;
use chrono::NaiveDateTime;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Read { path: PathBuf, message: String },
    Header { message: String },
    Row { line: usize, message: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Read { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            CatalogError::Header { message } => write!(f, "bad catalog header: {message}"),
            CatalogError::Row { line, message } => {
                write!(f, "bad catalog row at line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// A catalog table parsed back from its text form.
#[derive(Clone, Debug)]
pub struct ParsedCatalog {
    pub schema: CatalogSchema,
    pub epochs: Vec<NaiveDateTime>,
    pub station_resid: Vec<Vec<Option<f64>>>,
    pub station_curv: Vec<Vec<Option<f64>>>,
    pub combined: Vec<Option<f64>>,
    pub indicator: Vec<bool>,
    pub threshold: Vec<f64>,
}

pub fn read_catalog(path: &Path) -> Result<ParsedCatalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|e| CatalogError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_catalog(&text)
}

pub fn parse_catalog(text: &str) -> Result<ParsedCatalog, CatalogError> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let (_, header) = lines.next().ok_or(CatalogError::Header {
        message: "empty file".to_string(),
    })?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    let schema =
        CatalogSchema::from_header(&tokens).map_err(|message| CatalogError::Header { message })?;
    let n_stations = schema.stations().len();
    let n_cols = schema.columns().len();

    let mut parsed = ParsedCatalog {
        schema,
        epochs: Vec::new(),
        station_resid: vec![Vec::new(); n_stations],
        station_curv: vec![Vec::new(); n_stations],
        combined: Vec::new(),
        indicator: Vec::new(),
        threshold: Vec::new(),
    };

    for (line_no, line) in lines {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() != n_cols {
            return Err(CatalogError::Row {
                line: line_no + 1,
                message: format!("{} columns, expected {n_cols}", cols.len()),
            });
        }
        let row_err = |message: String| CatalogError::Row {
            line: line_no + 1,
            message,
        };
        let epoch =
            NaiveDateTime::parse_from_str(&format!("{} {}", cols[0], cols[1]), "%Y-%m-%d %H:%M:%S")
                .map_err(|e| row_err(format!("bad epoch: {e}")))?;
        parsed.epochs.push(epoch);
        for sta in 0..n_stations {
            parsed.station_resid[sta].push(parse_value(cols[2 + 2 * sta]));
            parsed.station_curv[sta].push(parse_value(cols[3 + 2 * sta]));
        }
        parsed.combined.push(parse_value(cols[n_cols - 3]));
        parsed.indicator.push(match cols[n_cols - 2] {
            "1" => true,
            "0" => false,
            other => return Err(row_err(format!("bad event indicator '{other}'"))),
        });
        parsed.threshold.push(
            cols[n_cols - 1]
                .parse()
                .map_err(|e| row_err(format!("bad threshold: {e}")))?,
        );
    }

    Ok(parsed)
}

fn parse_value(token: &str) -> Option<f64> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Recover event boundaries from a parsed catalog.
///
/// Each contiguous indicator run is one event: start/end are the run's
/// epochs, the peak is the maximum combined residual over the run (equal to
/// the tracked peak, since hold-down samples below threshold can never
/// exceed it) and the station set is every station with a defined residual
/// inside the run.
pub fn events_from_catalog(catalog: &ParsedCatalog) -> Vec<Event> {
    let mut events = Vec::new();
    let n = catalog.epochs.len();
    let mut i = 0usize;
    while i < n {
        if !catalog.indicator[i] {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && catalog.indicator[i] {
            i += 1;
        }
        let end = i - 1;
        let peak = (start..=end)
            .filter_map(|row| catalog.combined[row])
            .fold(f64::NEG_INFINITY, f64::max);
        let stations = catalog
            .schema
            .stations()
            .iter()
            .enumerate()
            .filter(|(sta, _)| {
                (start..=end).any(|row| catalog.station_resid[*sta][row].is_some())
            })
            .map(|(_, id)| id.clone())
            .collect();
        events.push(Event {
            start: catalog.epochs[start],
            end: catalog.epochs[end],
            peak_residual: peak,
            stations,
        });
    }
    events
}
