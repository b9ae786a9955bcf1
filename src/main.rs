// Entry point and interactive console flow.
//
// - Option [1] loads a CSV inventory and normalizes its column labels.
// - Options [2] and [3] change the asset-type filter and risk encoding.
// - Option [4] derives the KPIs, prints the dashboard and writes the report
//   files.
use clap::{Parser, ValueEnum};
use smartcapex_kpi::chart::{bar_rows, render_gauge_line, risk_gauge, GAUGE_TITLE};
use smartcapex_kpi::encoding::EncodingKind;
use smartcapex_kpi::{loader, logging, output, util};
use smartcapex_kpi::{AssetTable, DeriveError, KpiConfig, MetricDeriver, Selection};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

const DEFAULT_INPUT: &str = "assets.csv";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Numeric,
    Ordinal,
}

impl From<EncodingArg> for EncodingKind {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Numeric => EncodingKind::Numeric,
            EncodingArg::Ordinal => EncodingKind::Ordinal,
        }
    }
}

#[derive(Parser)]
#[command(name = "smartcapex-kpi", version, about = "Asset inventory KPI dashboard")]
struct Cli {
    /// CSV inventory to load at startup
    #[arg(long, value_name = "CSV")]
    input: Option<PathBuf>,
    /// TOML configuration file
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,
    /// Directory report files are written to (overrides config)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Risk encoding (overrides config)
    #[arg(long, value_enum)]
    risk_encoding: Option<EncodingArg>,
    /// Initial asset-type filter; "All" for no filtering
    #[arg(long, value_name = "NAME")]
    asset_type: Option<String>,
}

/// Everything the menu acts on. Owned by `main` and handed to each handler.
struct Session {
    config: KpiConfig,
    deriver: MetricDeriver,
    output_dir: PathBuf,
    input: PathBuf,
    table: Option<AssetTable>,
    selection: Selection,
    encoding: EncodingKind,
}

/// Read one trimmed line after printing `prompt`. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Handle option [1]: load the CSV and reset the filter if its value no
/// longer exists in the new table.
fn handle_load(session: &mut Session, path: PathBuf) {
    match loader::load_table(&path) {
        Ok((table, report)) => {
            println!(
                "Processing dataset... ({} rows, {} columns loaded)",
                util::format_int(report.total_rows),
                util::format_int(report.columns)
            );
            if report.ragged_rows > 0 {
                println!(
                    "Note: {} rows had a different number of fields than the header.",
                    util::format_int(report.ragged_rows)
                );
            }
            if let Err(e) = session.deriver.check_schema(&table) {
                println!("Warning: {}. Fix the file and load it again.\n", e);
                return;
            }
            if let Ok(categories) = session.deriver.categories(&table) {
                if !categories.contains(&session.selection) {
                    session.selection = Selection::All;
                }
            }
            println!();
            session.input = path;
            session.table = Some(table);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: choose an asset type from the loaded table.
fn handle_select_type(session: &mut Session) {
    let Some(table) = session.table.as_ref() else {
        println!("Please upload a CSV file to continue.\n");
        return;
    };
    let categories = match session.deriver.categories(table) {
        Ok(c) => c,
        Err(e) => {
            println!("Warning: {}\n", e);
            return;
        }
    };
    println!("Select Asset Type:");
    for (i, c) in categories.iter().enumerate() {
        println!("[{}] {}", i + 1, c);
    }
    println!();
    let Some(choice) = read_choice() else { return };
    match choice.parse::<usize>().ok().and_then(|n| categories.get(n.wrapping_sub(1))) {
        Some(sel) => {
            session.selection = sel.clone();
            println!("Asset type set to {}.\n", sel);
        }
        None => println!("Invalid choice. Please enter 1 to {}.\n", categories.len()),
    }
}

/// Handle option [3]: choose how risk labels are read.
fn handle_select_encoding(session: &mut Session) {
    println!("Select Risk Encoding:");
    println!("[1] Numeric (risk is already a score)");
    println!("[2] Ordinal (Low/Medium/High)\n");
    let Some(choice) = read_choice() else { return };
    session.encoding = match choice.as_str() {
        "1" => EncodingKind::Numeric,
        "2" => EncodingKind::Ordinal,
        _ => {
            println!("Invalid choice. Please enter 1 or 2.\n");
            return;
        }
    };
    println!("Risk encoding set to {}.\n", session.encoding);
}

/// Handle option [4]: derive, print the dashboard and write report files.
fn handle_generate(session: &Session) {
    let Some(table) = session.table.as_ref() else {
        println!("Please upload a CSV file to continue.\n");
        return;
    };
    let encoding = match session.config.risk_encoding(session.encoding) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Config error: {}\n", e);
            return;
        }
    };
    let derivation = match session.deriver.derive(table, &session.selection, &encoding) {
        Ok(d) => d,
        Err(DeriveError::Validation(e)) => {
            println!("Warning: {}. Check the Risk column or choose another asset type.\n", e);
            return;
        }
        Err(e) => {
            println!("Warning: {}\n", e);
            return;
        }
    };

    println!("Infrastructure Health Overview");
    println!(
        "(Asset Type: {}, Risk encoding: {})\n",
        derivation.selection,
        derivation.encoding.kind()
    );
    println!("Asset KPI Summary\n");
    output::preview_table_rows(&bar_rows(&derivation.kpis), 4);

    let gauge = risk_gauge(&derivation);
    println!("{}: {}", GAUGE_TITLE, render_gauge_line(&gauge, 30));
    if !gauge.in_range {
        println!("Warning: average risk is outside the {} scale.", derivation.encoding.kind());
    }
    println!();

    match output::write_reports(&session.output_dir, &derivation) {
        Ok(paths) => {
            for p in paths {
                println!("(Exported {})", p.display());
            }
        }
        Err(e) => eprintln!("Write error: {}", e),
    }
    println!("\nSmartCAPEX DT-lite KPI Module\n");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing();

    let config = match cli.config.as_deref().map(KpiConfig::load).transpose() {
        Ok(c) => c.unwrap_or_default(),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let encoding = cli
        .risk_encoding
        .map(EncodingKind::from)
        .unwrap_or_else(|| config.effective_encoding_kind());
    if let Err(e) = config.risk_encoding(encoding) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let mut session = Session {
        deriver: MetricDeriver::from_config(&config),
        output_dir: cli
            .output_dir
            .unwrap_or_else(|| config.effective_output_dir()),
        input: cli
            .input
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
        table: None,
        selection: cli
            .asset_type
            .as_deref()
            .map(Selection::from_label)
            .unwrap_or(Selection::All),
        encoding,
        config,
    };
    if let Some(path) = cli.input {
        handle_load(&mut session, path);
    }

    loop {
        println!("SmartCAPEX KPI Dashboard");
        println!("[1] Load the file");
        println!("[2] Select asset type ({})", session.selection);
        println!("[3] Select risk encoding ({})", session.encoding);
        println!("[4] Generate KPI report");
        println!("[5] Exit\n");
        let Some(choice) = read_choice() else { break };
        match choice.as_str() {
            "1" => {
                let prompt = format!("CSV path [{}]: ", session.input.display());
                let Some(path) = read_line(&prompt) else { break };
                let path = if path.is_empty() {
                    session.input.clone()
                } else {
                    PathBuf::from(path)
                };
                handle_load(&mut session, path);
            }
            "2" => handle_select_type(&mut session),
            "3" => handle_select_encoding(&mut session),
            "4" => {
                println!();
                handle_generate(&session);
            }
            "5" => break,
            _ => println!("Invalid choice. Please enter 1 to 5.\n"),
        }
    }
    println!("Exiting the program.");
    ExitCode::SUCCESS
}
