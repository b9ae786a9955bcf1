use crate::error::LoadError;
use crate::types::{AssetTable, Cell};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub columns: usize,
    /// Rows whose field count differed from the header.
    pub ragged_rows: usize,
}

pub fn load_table(path: &Path) -> Result<(AssetTable, LoadReport), LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_table_from_reader(file)
}

/// Read a headered CSV and normalize its column labels.
///
/// This is the single place labels are normalized; everything downstream
/// looks columns up by their trimmed names.
pub fn load_table_from_reader<R: Read>(reader: R) -> Result<(AssetTable, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::EmptyHeader);
    }

    let mut rows = Vec::new();
    let mut ragged_rows = 0usize;
    for result in rdr.records() {
        let record = result?;
        if record.len() != headers.len() {
            ragged_rows += 1;
        }
        rows.push(record.iter().map(Cell::from_raw).collect::<Vec<_>>());
    }

    let report = LoadReport {
        total_rows: rows.len(),
        columns: headers.len(),
        ragged_rows,
    };
    debug!(
        rows = report.total_rows,
        columns = report.columns,
        ragged = report.ragged_rows,
        "loaded table"
    );
    let table = AssetTable::new(headers, rows).normalize_columns();
    Ok((table, report))
}
