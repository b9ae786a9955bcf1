//! Error kinds for loading, configuring and deriving KPIs.

use std::path::PathBuf;

/// A required column is absent after label normalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing column: '{column}'")]
    MissingColumn { column: String },
}

/// Column-level data-quality gates that halt a derivation before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No valid risk values after encoding; cannot compute KPIs")]
    NoValidRisk,

    #[error("No valid condition values; cannot compute KPIs")]
    NoValidCondition,
}

/// Errors that terminate a single derivation attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File has no header row")]
    EmptyHeader,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Ordinal for risk label '{label}' must be a positive finite number, got {value}")]
    InvalidOrdinal { label: String, value: f64 },

    #[error("Ordinal risk encoding needs at least one label")]
    EmptyOrdinal,
}
