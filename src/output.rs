use crate::chart::{bar_rows, charts};
use crate::deriver::Derivation;
use crate::types::{AssetTable, KpiSummary};
use chrono::Utc;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

pub const SUMMARY_CSV: &str = "kpi_summary.csv";
pub const SUMMARY_JSON: &str = "kpi_summary.json";
pub const CHARTS_JSON: &str = "kpi_charts.json";
pub const FILTERED_CSV: &str = "filtered_assets.csv";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a table with its own headers; passthrough columns are kept as-is.
pub fn write_table_csv(path: &Path, table: &AssetTable) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(table.headers())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn summary(derivation: &Derivation) -> KpiSummary {
    KpiSummary {
        generated_at: Utc::now(),
        selection: derivation.selection.clone(),
        encoding: derivation.encoding.kind(),
        gauge_scale: derivation.encoding.gauge_scale(),
        kpis: derivation.kpis,
    }
}

/// Write every report file for a derivation into `dir`, returning the paths
/// written in order.
pub fn write_reports(dir: &Path, derivation: &Derivation) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let paths: Vec<PathBuf> = [SUMMARY_CSV, SUMMARY_JSON, CHARTS_JSON, FILTERED_CSV]
        .iter()
        .map(|f| dir.join(f))
        .collect();

    write_csv(&paths[0], &bar_rows(&derivation.kpis))?;
    write_json(&paths[1], &summary(derivation))?;
    write_json(&paths[2], &charts(derivation))?;
    write_table_csv(&paths[3], &derivation.table)?;
    debug!(dir = %dir.display(), files = paths.len(), "wrote reports");
    Ok(paths)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
