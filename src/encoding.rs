//! Risk encodings and the gauge scale each one implies.
//!
//! The scale is only ever obtained from [`RiskEncoding::gauge_scale`], so an
//! average risk is always drawn against the range of the encoding that
//! produced it.

use crate::error::ConfigError;
use crate::types::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the gauge when risk is already a numeric score.
pub const NUMERIC_GAUGE_MAX: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    Numeric,
    Ordinal,
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingKind::Numeric => f.write_str("numeric"),
            EncodingKind::Ordinal => f.write_str("ordinal"),
        }
    }
}

/// Label-to-ordinal mapping. Lookup is exact; a repeated label keeps its
/// last ordinal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrdinalLabels(Vec<(String, f64)>);

impl OrdinalLabels {
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut out: Vec<(String, f64)> = Vec::new();
        for (label, value) in labels {
            let label = label.into();
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidOrdinal { label, value });
            }
            match out.iter_mut().find(|(l, _)| *l == label) {
                Some(existing) => existing.1 = value,
                None => out.push((label, value)),
            }
        }
        if out.is_empty() {
            return Err(ConfigError::EmptyOrdinal);
        }
        Ok(Self(out))
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }

    pub fn max(&self) -> f64 {
        self.0.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }
}

impl Default for OrdinalLabels {
    fn default() -> Self {
        Self(vec![
            ("Low".to_string(), 1.0),
            ("Medium".to_string(), 2.0),
            ("High".to_string(), 3.0),
        ])
    }
}

/// How raw risk cells become numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "labels", rename_all = "snake_case")]
pub enum RiskEncoding {
    /// Risk is already numeric text; anything else is missing.
    Numeric,
    /// Numeric text passes through, known labels map to their ordinal.
    Ordinal(OrdinalLabels),
}

impl Default for RiskEncoding {
    fn default() -> Self {
        RiskEncoding::Ordinal(OrdinalLabels::default())
    }
}

impl RiskEncoding {
    pub fn kind(&self) -> EncodingKind {
        match self {
            RiskEncoding::Numeric => EncodingKind::Numeric,
            RiskEncoding::Ordinal(_) => EncodingKind::Ordinal,
        }
    }

    /// Encode one cell. Numbers are returned unchanged, which makes the
    /// operation idempotent.
    pub fn encode(&self, cell: &Cell) -> Cell {
        if let Some(v) = cell.to_number() {
            return Cell::Number(v);
        }
        match (self, cell) {
            (RiskEncoding::Ordinal(labels), Cell::Text(s)) => {
                labels.get(s).map(Cell::Number).unwrap_or(Cell::Null)
            }
            _ => Cell::Null,
        }
    }

    pub fn gauge_scale(&self) -> GaugeScale {
        match self {
            RiskEncoding::Numeric => GaugeScale {
                min: 0.0,
                max: NUMERIC_GAUGE_MAX,
                bands: vec![
                    GaugeBand::new(0.0, 2.0, "green"),
                    GaugeBand::new(2.0, 4.0, "yellow"),
                    GaugeBand::new(4.0, NUMERIC_GAUGE_MAX, "red"),
                ],
            },
            RiskEncoding::Ordinal(labels) => {
                let max = labels.max();
                let step = max / 3.0;
                GaugeScale {
                    min: 0.0,
                    max,
                    bands: vec![
                        GaugeBand::new(0.0, step, "green"),
                        GaugeBand::new(step, step * 2.0, "yellow"),
                        GaugeBand::new(step * 2.0, max, "red"),
                    ],
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeBand {
    pub from: f64,
    pub to: f64,
    pub color: &'static str,
}

impl GaugeBand {
    fn new(from: f64, to: f64, color: &'static str) -> Self {
        Self { from, to, color }
    }
}

/// Display range of the average-risk gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeScale {
    pub min: f64,
    pub max: f64,
    pub bands: Vec<GaugeBand>,
}

impl GaugeScale {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Band a value falls in; the last band is closed on the right.
    pub fn band_for(&self, value: f64) -> Option<&GaugeBand> {
        let last = self.bands.len().checked_sub(1)?;
        self.bands.iter().enumerate().find_map(|(i, b)| {
            let upper_ok = if i == last { value <= b.to } else { value < b.to };
            (value >= b.from && upper_ok).then_some(b)
        })
    }
}
