//! Loader for whitespace-delimited per-station displacement tables.
//!
//! Expected layout: a header row naming the columns, column 1 = date,
//! column 2 = time, remaining columns = displacement axes. Rows that fail to
//! parse are skipped and counted, never dropped silently. Files written in
//! reverse chronological order (one of the processing-center conventions)
//! are detected and flipped before the monotonicity check.

use super::station::{Sample, Station};
use chrono::NaiveDateTime;
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Hard failures while loading one station file.
///
/// Row-level problems are not errors: they are skipped and surface through
/// [`LoadedStation::skipped_rows`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Read { path: PathBuf, message: String },
    MissingHeader { path: PathBuf },
    NoAxes { path: PathBuf },
    NoValidRows { path: PathBuf, skipped: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Read { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            LoadError::MissingHeader { path } => {
                write!(f, "{}: missing header row", path.display())
            }
            LoadError::NoAxes { path } => {
                write!(f, "{}: header has no displacement columns", path.display())
            }
            LoadError::NoValidRows { path, skipped } => {
                write!(f, "{}: no valid rows ({skipped} skipped)", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Loader knobs, independent of the detection configuration.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Derive a planar `dist` axis (distance from the first position) when
    /// the header carries `x` and `y` columns.
    pub derive_distance: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            derive_distance: false,
        }
    }
}

/// A parsed station together with its load bookkeeping.
#[derive(Clone, Debug)]
pub struct LoadedStation {
    pub station: Station,
    /// Rows skipped for malformed dates, values or broken ordering.
    pub skipped_rows: usize,
    /// True when the source file was in reverse chronological order.
    pub flipped: bool,
}

impl LoadedStation {
    /// Wrap an in-memory station with clean bookkeeping (test construction).
    pub fn clean(station: Station) -> Self {
        Self {
            station,
            skipped_rows: 0,
            flipped: false,
        }
    }
}

/// Load one station table from disk.
pub fn load_station(
    path: &Path,
    id: &str,
    options: &LoadOptions,
) -> Result<LoadedStation, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_station(&text, id, options).map_err(|kind| match kind {
        ParseFailure::MissingHeader => LoadError::MissingHeader {
            path: path.to_path_buf(),
        },
        ParseFailure::NoAxes => LoadError::NoAxes {
            path: path.to_path_buf(),
        },
        ParseFailure::NoValidRows { skipped } => LoadError::NoValidRows {
            path: path.to_path_buf(),
            skipped,
        },
    })
}

#[derive(Debug)]
enum ParseFailure {
    MissingHeader,
    NoAxes,
    NoValidRows { skipped: usize },
}

fn parse_station(
    text: &str,
    id: &str,
    options: &LoadOptions,
) -> Result<LoadedStation, ParseFailure> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header: Vec<&str> = lines
        .next()
        .ok_or(ParseFailure::MissingHeader)?
        .split_whitespace()
        .collect();
    if header.len() < 3 {
        return Err(ParseFailure::NoAxes);
    }
    let axes: Vec<String> = header[2..].iter().map(|s| s.to_string()).collect();

    let mut rows: Vec<Sample> = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        match parse_row(line, axes.len()) {
            Some(sample) => rows.push(sample),
            None => skipped += 1,
        }
    }

    // Reverse-ordered files (2024 CSRS-PPP convention) are flipped whole
    // before enforcing monotonicity, so they are not shredded row by row.
    let flipped = rows.len() > 1 && rows.first().map(|s| s.epoch) > rows.last().map(|s| s.epoch);
    if flipped {
        rows.reverse();
    }

    let mut samples: Vec<Sample> = Vec::with_capacity(rows.len());
    for row in rows {
        match samples.last() {
            Some(prev) if row.epoch <= prev.epoch => skipped += 1,
            _ => samples.push(row),
        }
    }

    if samples.is_empty() {
        return Err(ParseFailure::NoValidRows { skipped });
    }

    let (axes, samples) = if options.derive_distance {
        derive_distance(axes, samples)
    } else {
        (axes, samples)
    };

    debug!(
        "loaded station {id}: {} samples, {skipped} skipped, flipped={flipped}",
        samples.len()
    );

    let station = Station::from_samples(id, axes, samples)
        .expect("monotonicity and axis arity enforced during parsing");
    Ok(LoadedStation {
        station,
        skipped_rows: skipped,
        flipped,
    })
}

fn parse_row(line: &str, n_axes: usize) -> Option<Sample> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != n_axes + 2 {
        return None;
    }
    let epoch = parse_epoch(tokens[0], tokens[1])?;
    let mut values = Vec::with_capacity(n_axes);
    for tok in &tokens[2..] {
        let v: f64 = tok.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        values.push(v);
    }
    Some(Sample::new(epoch, values))
}

fn parse_epoch(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Append a `dist` axis: Euclidean distance from the first sample's planar
/// position. Requires `x` and `y` columns; a no-op when either is missing.
fn derive_distance(axes: Vec<String>, mut samples: Vec<Sample>) -> (Vec<String>, Vec<Sample>) {
    let ix = axes.iter().position(|a| a.eq_ignore_ascii_case("x"));
    let iy = axes.iter().position(|a| a.eq_ignore_ascii_case("y"));
    let (ix, iy) = match (ix, iy) {
        (Some(ix), Some(iy)) => (ix, iy),
        _ => return (axes, samples),
    };
    let x0 = samples[0].values[ix];
    let y0 = samples[0].values[iy];
    for s in &mut samples {
        let dx = s.values[ix] - x0;
        let dy = s.values[iy] - y0;
        s.values.push((dx * dx + dy * dy).sqrt());
    }
    let mut axes = axes;
    axes.push("dist".to_string());
    (axes, samples)
}
