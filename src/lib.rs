//! Asset inventory KPI derivation.
//!
//! Load a CSV inventory, pick an asset type and a risk encoding, and derive
//! average condition, average risk, total asset count and the number of
//! assets below the condition threshold.

pub mod chart;
pub mod config;
pub mod deriver;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod types;
pub mod util;

pub use config::KpiConfig;
pub use deriver::{
    coerce_condition, compute_kpis, encode_risk, filter_by_category, list_categories,
    normalize_columns, validate, Derivation, MetricDeriver,
};
pub use encoding::{EncodingKind, GaugeScale, OrdinalLabels, RiskEncoding};
pub use error::{ConfigError, DeriveError, LoadError, SchemaError, ValidationError};
pub use types::{AssetTable, Cell, KpiRecord, Selection};
