//! KPI derivation over an uploaded asset table.
//!
//! A derivation is a pure function of (table, selection, encoding):
//! filter by asset type, encode risk, coerce condition, validate, then
//! aggregate. Nothing is cached between runs; the caller re-derives whenever
//! the selection or encoding changes.

use crate::config::KpiConfig;
use crate::encoding::RiskEncoding;
use crate::error::{DeriveError, SchemaError, ValidationError};
use crate::types::{AssetTable, Cell, KpiRecord, Selection};
use crate::util::{mean, parse_numeric, round2};
use tracing::{debug, info, warn};

/// Condition scores strictly below this count as "below threshold".
pub const DEFAULT_CONDITION_THRESHOLD: f64 = 3.0;

/// Trim surrounding whitespace from every column label.
pub fn normalize_columns(table: AssetTable) -> AssetTable {
    table.normalize_columns()
}

/// Distinct non-null values of `column` in first-seen order, preceded by
/// [`Selection::All`].
pub fn list_categories(table: &AssetTable, column: &str) -> Result<Vec<Selection>, SchemaError> {
    let mut out = vec![Selection::All];
    for cell in table.column(column)? {
        if cell.is_null() {
            continue;
        }
        let sel = Selection::Only(cell.to_string());
        if !out.contains(&sel) {
            out.push(sel);
        }
    }
    Ok(out)
}

/// Rows whose `column` value equals the selection, in original order.
/// `Selection::All` returns every row.
pub fn filter_by_category(
    table: &AssetTable,
    column: &str,
    selection: &Selection,
) -> Result<AssetTable, SchemaError> {
    let idx = table.column_index(column)?;
    match selection {
        Selection::All => Ok(table.clone()),
        Selection::Only(wanted) => Ok(table.retain_rows(|row| match &row[idx] {
            Cell::Null => false,
            cell => cell.to_string() == *wanted,
        })),
    }
}

/// Replace every risk cell with its numeric encoding, or `Null` when it has
/// none. Idempotent.
pub fn encode_risk(
    table: &AssetTable,
    column: &str,
    encoding: &RiskEncoding,
) -> Result<AssetTable, SchemaError> {
    table.map_column(column, |cell| encoding.encode(cell))
}

/// Parse every condition cell to a number, or `Null`. Idempotent.
pub fn coerce_condition(table: &AssetTable, column: &str) -> Result<AssetTable, SchemaError> {
    table.map_column(column, |cell| match cell {
        Cell::Number(v) => Cell::Number(*v),
        Cell::Text(s) => parse_numeric(s).map(Cell::Number).unwrap_or(Cell::Null),
        Cell::Null => Cell::Null,
    })
}

/// Fails when no row has a usable risk value. An empty table has none.
pub fn validate(table: &AssetTable, risk_column: &str) -> Result<(), DeriveError> {
    if table.column(risk_column)?.all(|c| c.as_number().is_none()) {
        return Err(ValidationError::NoValidRisk.into());
    }
    Ok(())
}

/// Aggregate an encoded, coerced table into its four KPIs.
pub fn compute_kpis(
    table: &AssetTable,
    condition_column: &str,
    risk_column: &str,
    threshold: f64,
) -> Result<KpiRecord, SchemaError> {
    let average_condition =
        mean(table.column(condition_column)?.filter_map(Cell::as_number)).map(round2);
    let average_risk = mean(table.column(risk_column)?.filter_map(Cell::as_number)).map(round2);
    let below_threshold_count = table
        .column(condition_column)?
        .filter_map(Cell::as_number)
        .filter(|v| *v < threshold)
        .count();
    Ok(KpiRecord {
        average_condition,
        average_risk,
        total_asset_count: table.len(),
        below_threshold_count,
    })
}

/// Output of one successful derivation.
#[derive(Debug, Clone)]
pub struct Derivation {
    pub selection: Selection,
    pub encoding: RiskEncoding,
    /// Filtered table with risk encoded and condition coerced.
    pub table: AssetTable,
    pub kpis: KpiRecord,
}

/// Column names and thresholds a derivation runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDeriver {
    pub asset_type_column: String,
    pub condition_column: String,
    pub risk_column: String,
    pub condition_threshold: f64,
    /// Also halt when no condition value is usable. Off by default: the
    /// observed behavior only gates on risk.
    pub require_condition_data: bool,
}

impl Default for MetricDeriver {
    fn default() -> Self {
        Self {
            asset_type_column: "Asset Type".to_string(),
            condition_column: "Condition".to_string(),
            risk_column: "Risk".to_string(),
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
            require_condition_data: false,
        }
    }
}

impl MetricDeriver {
    pub fn from_config(config: &KpiConfig) -> Self {
        Self {
            asset_type_column: config.effective_asset_type_column().to_string(),
            condition_column: config.effective_condition_column().to_string(),
            risk_column: config.effective_risk_column().to_string(),
            condition_threshold: config.effective_condition_threshold(),
            require_condition_data: config.effective_require_condition_data(),
        }
    }

    /// Fail with the first required column the table lacks.
    pub fn check_schema(&self, table: &AssetTable) -> Result<(), SchemaError> {
        for column in [
            &self.asset_type_column,
            &self.condition_column,
            &self.risk_column,
        ] {
            table.column_index(column)?;
        }
        Ok(())
    }

    pub fn categories(&self, table: &AssetTable) -> Result<Vec<Selection>, SchemaError> {
        list_categories(table, &self.asset_type_column)
    }

    /// Run the full pipeline. `table` must already have normalized labels.
    pub fn derive(
        &self,
        table: &AssetTable,
        selection: &Selection,
        encoding: &RiskEncoding,
    ) -> Result<Derivation, DeriveError> {
        self.check_schema(table)?;

        let filtered = filter_by_category(table, &self.asset_type_column, selection)?;
        debug!(selection = %selection, rows = filtered.len(), "filtered by asset type");

        let encoded = encode_risk(&filtered, &self.risk_column, encoding)?;
        let coerced = coerce_condition(&encoded, &self.condition_column)?;
        debug!(
            encoding = %encoding.kind(),
            risk_values = coerced.column(&self.risk_column)?.filter(|c| !c.is_null()).count(),
            condition_values = coerced
                .column(&self.condition_column)?
                .filter(|c| !c.is_null())
                .count(),
            "encoded risk and coerced condition"
        );

        if let Err(e) = validate(&coerced, &self.risk_column) {
            warn!(selection = %selection, error = %e, "derivation halted");
            return Err(e);
        }
        if self.require_condition_data
            && coerced
                .column(&self.condition_column)?
                .all(|c| c.as_number().is_none())
        {
            warn!(selection = %selection, "derivation halted: no condition data");
            return Err(ValidationError::NoValidCondition.into());
        }

        let kpis = compute_kpis(
            &coerced,
            &self.condition_column,
            &self.risk_column,
            self.condition_threshold,
        )?;
        info!(
            selection = %selection,
            total = kpis.total_asset_count,
            below_threshold = kpis.below_threshold_count,
            avg_condition = ?kpis.average_condition,
            avg_risk = ?kpis.average_risk,
            "derived KPIs"
        );

        Ok(Derivation {
            selection: selection.clone(),
            encoding: encoding.clone(),
            table: coerced,
            kpis,
        })
    }
}
