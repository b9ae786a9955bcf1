//! KPI configuration, read from an optional TOML file.

use crate::deriver::DEFAULT_CONDITION_THRESHOLD;
use crate::encoding::{EncodingKind, OrdinalLabels, RiskEncoding};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration. Every field is optional; the `effective_*`
/// accessors supply defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KpiConfig {
    /// Asset-type column used for filtering. Default: "Asset Type".
    pub asset_type_column: Option<String>,
    /// Default: "Condition".
    pub condition_column: Option<String>,
    /// Default: "Risk".
    pub risk_column: Option<String>,
    /// Default: 3.0.
    pub condition_threshold: Option<f64>,
    /// Halt when no condition value is usable. Default: false.
    pub require_condition_data: Option<bool>,
    /// Where report files are written. Default: current directory.
    pub output_dir: Option<PathBuf>,
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RiskConfig {
    /// Default: ordinal.
    pub encoding: Option<EncodingKind>,
    /// Ordinal labels, looked up by name; table order is not significant.
    /// Default: Low=1, Medium=2, High=3.
    pub labels: BTreeMap<String, f64>,
}

impl KpiConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    pub fn effective_asset_type_column(&self) -> &str {
        self.asset_type_column.as_deref().unwrap_or("Asset Type")
    }

    pub fn effective_condition_column(&self) -> &str {
        self.condition_column.as_deref().unwrap_or("Condition")
    }

    pub fn effective_risk_column(&self) -> &str {
        self.risk_column.as_deref().unwrap_or("Risk")
    }

    pub fn effective_condition_threshold(&self) -> f64 {
        self.condition_threshold.unwrap_or(DEFAULT_CONDITION_THRESHOLD)
    }

    pub fn effective_require_condition_data(&self) -> bool {
        self.require_condition_data.unwrap_or(false)
    }

    pub fn effective_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn effective_encoding_kind(&self) -> EncodingKind {
        self.risk.encoding.unwrap_or(EncodingKind::Ordinal)
    }

    /// Build the encoding for `kind`, using the configured labels for the
    /// ordinal case.
    pub fn risk_encoding(&self, kind: EncodingKind) -> Result<RiskEncoding, ConfigError> {
        match kind {
            EncodingKind::Numeric => Ok(RiskEncoding::Numeric),
            EncodingKind::Ordinal if self.risk.labels.is_empty() => {
                Ok(RiskEncoding::Ordinal(OrdinalLabels::default()))
            }
            EncodingKind::Ordinal => Ok(RiskEncoding::Ordinal(OrdinalLabels::new(
                self.risk.labels.iter().map(|(l, v)| (l.clone(), *v)),
            )?)),
        }
    }
}
