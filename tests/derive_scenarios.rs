use std::path::PathBuf;

use smartcapex_kpi::loader::{load_table, load_table_from_reader};
use smartcapex_kpi::{
    filter_by_category, list_categories, normalize_columns, AssetTable, Cell, DeriveError,
    EncodingKind, KpiRecord, MetricDeriver, RiskEncoding, SchemaError, Selection,
    ValidationError,
};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
}

fn load(csv: &str) -> AssetTable {
    load_table_from_reader(csv.as_bytes()).expect("csv").0
}

#[test]
fn scenario_a_ordinal_risk_over_all_assets() {
    let table = load("Asset Type,Condition,Risk\nTower,2.5,Low\nTower,4.0,High\n");
    let d = MetricDeriver::default()
        .derive(&table, &Selection::All, &RiskEncoding::default())
        .expect("derive");
    assert_eq!(
        d.kpis,
        KpiRecord {
            average_condition: Some(3.25),
            average_risk: Some(2.0),
            total_asset_count: 2,
            below_threshold_count: 1,
        }
    );
    assert_eq!(d.encoding.kind(), EncodingKind::Ordinal);
    assert_eq!(d.encoding.gauge_scale().max, 3.0);
}

#[test]
fn scenario_b_unmapped_risk_halts() {
    let table = load("Asset Type,Condition,Risk\nTower,2.5,N/A\nAntenna,4.0,N/A\n");
    let err = MetricDeriver::default()
        .derive(&table, &Selection::All, &RiskEncoding::default())
        .expect_err("all-null risk must fail");
    assert_eq!(err, DeriveError::Validation(ValidationError::NoValidRisk));
}

#[test]
fn scenario_c_filter_keeps_only_matching_rows_in_order() {
    let table = load(
        "Asset Type,Condition,Risk,Tag\n\
         Tower,1,Low,t1\nAntenna,2,Low,a1\nTower,3,High,t2\nAntenna,4,High,a2\nTower,5,Medium,t3\n",
    );
    let towers = filter_by_category(&table, "Asset Type", &Selection::Only("Tower".into()))
        .expect("filter");
    let tags: Vec<String> = towers
        .column("Tag")
        .expect("tag")
        .map(|c| c.to_string())
        .collect();
    assert_eq!(tags, ["t1", "t2", "t3"]);
    assert_eq!(table.len(), 5, "input must be untouched");
}

#[test]
fn scenario_d_padded_labels_resolve_after_normalization() {
    let raw = AssetTable::new(
        vec![" Asset Type ".into(), "Condition".into(), " Risk".into()],
        vec![vec![Cell::from_raw("Tower"), Cell::from_raw("2"), Cell::from_raw("Low")]],
    );
    assert_eq!(
        raw.column_index("Asset Type").unwrap_err(),
        SchemaError::MissingColumn {
            column: "Asset Type".into()
        }
    );
    let clean = normalize_columns(raw);
    assert_eq!(clean.column_index("Asset Type"), Ok(0));
    assert_eq!(normalize_columns(clean.clone()), clean);
}

#[test]
fn missing_required_column_is_reported_by_name() {
    let table = load("Asset Type,Condition\nTower,2\n");
    let err = MetricDeriver::default()
        .derive(&table, &Selection::All, &RiskEncoding::default())
        .unwrap_err();
    assert_eq!(
        err,
        DeriveError::Schema(SchemaError::MissingColumn {
            column: "Risk".into()
        })
    );
}

#[test]
fn fixture_inventory_end_to_end() {
    let (table, report) = load_table(&fixture("tests/fixtures/assets.csv")).expect("fixture");
    assert_eq!(report.total_rows, 7);
    assert_eq!(
        table.headers(),
        ["Asset ID", "Asset Type", "Condition", "Risk", "Region"]
    );

    let cats = list_categories(&table, "Asset Type").expect("categories");
    assert_eq!(
        cats,
        [
            Selection::All,
            Selection::Only("Tower".into()),
            Selection::Only("Antenna".into()),
        ]
    );

    let deriver = MetricDeriver::default();
    let all = deriver
        .derive(&table, &Selection::All, &RiskEncoding::default())
        .expect("all");
    // Condition: 2.5 3.8 4.0 1.2 3.0 2.9 -> 17.4 / 6 = 2.9
    // Risk: 1 2 3 3 2 1 -> 12 / 6 = 2.0
    assert_eq!(all.kpis.total_asset_count, 7);
    assert_eq!(all.kpis.average_condition, Some(2.9));
    assert_eq!(all.kpis.average_risk, Some(2.0));
    assert_eq!(all.kpis.below_threshold_count, 3);

    let antennas = deriver
        .derive(
            &table,
            &Selection::Only("Antenna".into()),
            &RiskEncoding::default(),
        )
        .expect("antennas");
    assert_eq!(antennas.kpis.total_asset_count, 3);
    assert_eq!(antennas.kpis.average_condition, Some(3.35));
    assert_eq!(antennas.kpis.average_risk, Some(2.0));
    assert_eq!(antennas.kpis.below_threshold_count, 1);

    // Labels are unreadable under the numeric encoding; only B-001's "2" survives.
    let numeric = deriver
        .derive(&table, &Selection::All, &RiskEncoding::Numeric)
        .expect("numeric");
    assert_eq!(numeric.kpis.average_risk, Some(2.0));
    assert_eq!(numeric.encoding.gauge_scale().max, 5.0);

    let towers_numeric = deriver
        .derive(
            &table,
            &Selection::Only("Tower".into()),
            &RiskEncoding::Numeric,
        )
        .unwrap_err();
    assert_eq!(
        towers_numeric,
        DeriveError::Validation(ValidationError::NoValidRisk)
    );
}

#[test]
fn averages_round_exact_ties_to_even() {
    let table = load("Asset Type,Condition,Risk\nTower,2.0,2.0\nTower,2.25,2.25\n");
    let d = MetricDeriver::default()
        .derive(&table, &Selection::All, &RiskEncoding::default())
        .expect("derive");
    assert_eq!(d.kpis.average_condition, Some(2.12));
    assert_eq!(d.kpis.average_risk, Some(2.12));
}

#[test]
fn decimal_comma_condition_is_missing_not_inflated() {
    let table = load("Asset Type,Condition,Risk\nTower,\"1,5\",Low\nTower,2.0,High\nTower,\"1,250\",Low\n");
    let d = MetricDeriver::default()
        .derive(&table, &Selection::All, &RiskEncoding::default())
        .expect("derive");
    // "1,5" is unreadable; "1,250" is a grouped 1250.
    assert_eq!(d.kpis.average_condition, Some(626.0));
    assert_eq!(d.kpis.below_threshold_count, 1);
    assert_eq!(d.kpis.total_asset_count, 3);
}

#[test]
fn missing_value_tokens_are_not_categories() {
    let table = load("Asset Type,Condition,Risk\nTower,2,Low\nN/A,4,High\nNA,1,null\n");
    let cats = list_categories(&table, "Asset Type").expect("categories");
    assert_eq!(cats, [Selection::All, Selection::Only("Tower".into())]);

    let all = MetricDeriver::default()
        .derive(&table, &Selection::All, &RiskEncoding::default())
        .expect("derive");
    assert_eq!(all.kpis.total_asset_count, 3);
    assert_eq!(all.kpis.average_risk, Some(2.0));
}
