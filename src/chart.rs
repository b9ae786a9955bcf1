//! Chart inputs built from a derivation.
//!
//! These are plain data for whatever renders them: a bar chart of the four
//! KPIs and a gauge of the average risk on the encoding's scale.

use crate::deriver::Derivation;
use crate::encoding::GaugeScale;
use crate::types::{KpiBarRow, KpiRecord};
use crate::util::{format_int, format_optional};
use serde::Serialize;
use tracing::warn;

pub const BAR_TITLE: &str = "Asset KPI Summary";
pub const GAUGE_TITLE: &str = "Average Risk Level";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub label: &'static str,
    pub value: Option<f64>,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: &'static str,
    pub bars: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSpec {
    pub title: &'static str,
    pub value: Option<f64>,
    pub scale: GaugeScale,
    pub in_range: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub bar: BarChartSpec,
    pub gauge: GaugeSpec,
}

pub fn bar_chart(kpis: &KpiRecord) -> BarChartSpec {
    BarChartSpec {
        title: BAR_TITLE,
        bars: vec![
            BarSeries {
                label: "Avg. Condition",
                value: kpis.average_condition,
                color: "darkred",
            },
            BarSeries {
                label: "Avg. Risk",
                value: kpis.average_risk,
                color: "orange",
            },
            BarSeries {
                label: "Total Assets",
                value: Some(kpis.total_asset_count as f64),
                color: "gray",
            },
            BarSeries {
                label: "Below Threshold",
                value: Some(kpis.below_threshold_count as f64),
                color: "red",
            },
        ],
    }
}

/// Gauge of the average risk on the scale of the encoding that produced it.
pub fn risk_gauge(derivation: &Derivation) -> GaugeSpec {
    let scale = derivation.encoding.gauge_scale();
    let value = derivation.kpis.average_risk;
    let in_range = value.map_or(true, |v| scale.contains(v));
    if !in_range {
        warn!(
            value = ?value,
            max = scale.max,
            encoding = %derivation.encoding.kind(),
            "average risk falls outside the gauge scale"
        );
    }
    GaugeSpec {
        title: GAUGE_TITLE,
        value,
        scale,
        in_range,
    }
}

pub fn charts(derivation: &Derivation) -> ChartSet {
    ChartSet {
        bar: bar_chart(&derivation.kpis),
        gauge: risk_gauge(derivation),
    }
}

/// Bar chart as display rows, counts without decimals.
pub fn bar_rows(kpis: &KpiRecord) -> Vec<KpiBarRow> {
    bar_chart(kpis)
        .bars
        .into_iter()
        .map(|b| {
            let value = match b.label {
                "Total Assets" => format_int(kpis.total_asset_count),
                "Below Threshold" => format_int(kpis.below_threshold_count),
                _ => format_optional(b.value, 2),
            };
            KpiBarRow {
                metric: b.label.to_string(),
                value,
                color: b.color.to_string(),
            }
        })
        .collect()
}

/// One-line text gauge, e.g. `2.00 / 3 [#######-------] yellow`.
pub fn render_gauge_line(gauge: &GaugeSpec, width: usize) -> String {
    let Some(value) = gauge.value else {
        return format!("n/a / {}", gauge.scale.max);
    };
    let span = gauge.scale.max - gauge.scale.min;
    let frac = if span > 0.0 {
        ((value - gauge.scale.min) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (frac * width as f64).round() as usize;
    let band = gauge
        .scale
        .band_for(value)
        .map(|b| b.color)
        .unwrap_or("out of range");
    format!(
        "{:.2} / {} [{}{}] {}",
        value,
        gauge.scale.max,
        "#".repeat(filled),
        "-".repeat(width - filled),
        band
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::RiskEncoding;
    use crate::types::{AssetTable, Selection};

    fn derivation(average_risk: Option<f64>, encoding: RiskEncoding) -> Derivation {
        Derivation {
            selection: Selection::All,
            encoding,
            table: AssetTable::new(vec![], vec![]),
            kpis: KpiRecord {
                average_condition: Some(3.25),
                average_risk,
                total_asset_count: 1200,
                below_threshold_count: 1,
            },
        }
    }

    #[test]
    fn bars_follow_dashboard_order() {
        let spec = bar_chart(&derivation(Some(2.0), RiskEncoding::default()).kpis);
        let labels: Vec<_> = spec.bars.iter().map(|b| b.label).collect();
        assert_eq!(
            labels,
            ["Avg. Condition", "Avg. Risk", "Total Assets", "Below Threshold"]
        );
        assert_eq!(spec.bars[2].value, Some(1200.0));
    }

    #[test]
    fn bar_rows_format_counts_and_averages() {
        let rows = bar_rows(&derivation(None, RiskEncoding::default()).kpis);
        assert_eq!(rows[0].value, "3.25");
        assert_eq!(rows[1].value, "n/a");
        assert_eq!(rows[2].value, "1,200");
    }

    #[test]
    fn gauge_uses_encoding_scale() {
        let ordinal = risk_gauge(&derivation(Some(2.0), RiskEncoding::default()));
        assert_eq!(ordinal.scale.max, 3.0);
        assert!(ordinal.in_range);

        let numeric = risk_gauge(&derivation(Some(4.2), RiskEncoding::Numeric));
        assert_eq!(numeric.scale.max, 5.0);
        assert!(numeric.in_range);

        let over = risk_gauge(&derivation(Some(4.2), RiskEncoding::default()));
        assert!(!over.in_range);
    }

    #[test]
    fn gauge_line_fills_proportionally() {
        let g = risk_gauge(&derivation(Some(1.5), RiskEncoding::default()));
        assert_eq!(render_gauge_line(&g, 10), "1.50 / 3 [#####-----] yellow");
        let over = risk_gauge(&derivation(Some(9.0), RiskEncoding::default()));
        assert!(render_gauge_line(&over, 4).ends_with("[####] out of range"));
    }
}
