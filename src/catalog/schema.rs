/// Version of the catalog column layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Named column layout of the catalog table.
///
/// Layout: `date time` then `<id>_resid <id>_curv` per station in sorted-id
/// order, then the trailing contract `combined event threshold`. Station
/// order is fixed by sorting so that repeated runs over the same inputs
/// produce the same columns.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogSchema {
    stations: Vec<String>,
    columns: Vec<String>,
}

impl CatalogSchema {
    pub fn new(mut stations: Vec<String>) -> Self {
        stations.sort();
        let mut columns = vec!["date".to_string(), "time".to_string()];
        for id in &stations {
            columns.push(format!("{id}_resid"));
            columns.push(format!("{id}_curv"));
        }
        columns.push("combined".to_string());
        columns.push("event".to_string());
        columns.push("threshold".to_string());
        Self { stations, columns }
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn header_line(&self) -> String {
        self.columns.join(" ")
    }

    /// Recover the schema from a parsed header, validating names rather
    /// than positions.
    pub fn from_header(tokens: &[&str]) -> Result<Self, String> {
        if tokens.len() < 5 {
            return Err(format!("header has {} columns, expected at least 5", tokens.len()));
        }
        if tokens[0] != "date" || tokens[1] != "time" {
            return Err(format!(
                "header must start with 'date time', found '{} {}'",
                tokens[0], tokens[1]
            ));
        }
        let tail = &tokens[tokens.len() - 3..];
        if tail != ["combined", "event", "threshold"] {
            return Err(format!(
                "trailing columns must be 'combined event threshold', found '{}'",
                tail.join(" ")
            ));
        }
        let middle = &tokens[2..tokens.len() - 3];
        if middle.len() % 2 != 0 {
            return Err("per-station columns must come in resid/curv pairs".to_string());
        }
        let mut stations = Vec::with_capacity(middle.len() / 2);
        for pair in middle.chunks(2) {
            let id = pair[0]
                .strip_suffix("_resid")
                .ok_or_else(|| format!("expected a *_resid column, found '{}'", pair[0]))?;
            let expected = format!("{id}_curv");
            if pair[1] != expected {
                return Err(format!("expected '{expected}' after '{}', found '{}'", pair[0], pair[1]));
            }
            stations.push(id.to_string());
        }
        Ok(Self::new(stations))
    }
}
