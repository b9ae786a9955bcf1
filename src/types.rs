use crate::encoding::{EncodingKind, GaugeScale};
use crate::error::SchemaError;
use crate::util::parse_numeric;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// Field values read as missing data, matched exactly.
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One field of an uploaded table.
///
/// Cells start out as `Null` or `Text`; the risk and condition columns are
/// rewritten to `Number`/`Null` by encoding and coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Build a cell from a raw CSV field. Empty fields and the
    /// [`MISSING_TOKENS`] are missing data.
    pub fn from_raw(s: &str) -> Self {
        if MISSING_TOKENS.contains(&s) {
            Cell::Null
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// The cell parsed as a number, whether it already is one or is
    /// numeric-as-text.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => parse_numeric(s),
            Cell::Null => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// An uploaded asset inventory: column labels plus rows in file order.
///
/// Every row has exactly `headers.len()` cells. Columns other than asset
/// type, condition and risk are carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl AssetTable {
    /// Build a table, padding short rows with `Null` and truncating long ones
    /// to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Null);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` among the headers. Matching is exact, so labels must
    /// be normalized first.
    pub fn column_index(&self, name: &str) -> Result<usize, SchemaError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SchemaError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Iterate over one column's cells in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell> + '_, SchemaError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Trim surrounding whitespace from every column label.
    pub fn normalize_columns(mut self) -> Self {
        for h in &mut self.headers {
            let trimmed = h.trim();
            if trimmed.len() != h.len() {
                *h = trimmed.to_string();
            }
        }
        self
    }

    /// A new table with the same headers and only the rows `keep` accepts,
    /// in original order.
    pub(crate) fn retain_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| keep(row.as_slice()))
            .cloned()
            .collect();
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// A new table with column `name` rewritten cell by cell.
    pub(crate) fn map_column<F>(&self, name: &str, mut f: F) -> Result<Self, SchemaError>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let idx = self.column_index(name)?;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row[idx] = f(&row[idx]);
                row
            })
            .collect();
        Ok(Self {
            headers: self.headers.clone(),
            rows,
        })
    }
}

/// Which rows of the asset-type column a derivation works on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    pub const ALL_LABEL: &'static str = "All";

    /// Map a user-facing label to a selection; `"All"` is the sentinel.
    pub fn from_label(label: &str) -> Self {
        if label == Self::ALL_LABEL {
            Selection::All
        } else {
            Selection::Only(label.to_string())
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(Self::ALL_LABEL),
            Selection::Only(s) => f.write_str(s),
        }
    }
}

/// The four headline figures for one filtered table.
///
/// Averages are rounded to two decimals and are `None` when the column had
/// no usable values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiRecord {
    pub average_condition: Option<f64>,
    pub average_risk: Option<f64>,
    pub total_asset_count: usize,
    pub below_threshold_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiBarRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct KpiSummary {
    pub generated_at: DateTime<Utc>,
    pub selection: Selection,
    pub encoding: EncodingKind,
    pub gauge_scale: GaugeScale,
    pub kpis: KpiRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens_become_null() {
        for raw in ["", "NA", "N/A", "null", "nan", "NaN", "None", "#N/A"] {
            assert_eq!(Cell::from_raw(raw), Cell::Null, "{raw:?}");
        }
    }

    #[test]
    fn near_miss_tokens_stay_text() {
        for raw in [" N/A", "na", "Not rated", "0"] {
            assert_eq!(Cell::from_raw(raw), Cell::Text(raw.to_string()));
        }
    }
}
