//! wta - list and profile the tables of a web page

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use web_table_analyzer::charts::{
    box_stats, correlation_matrix, Availability, ChartKind, ChartPlan,
};
use web_table_analyzer::{
    fetch_tables, AnalyzerConfig, CellValue, ColumnKind, Dataset, FetchResult, Fetcher,
    HeaderPolicy, SchemaProfile, Session,
};

/// Find the HTML tables on a page and profile one of them
#[derive(Parser)]
#[command(name = "wta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Page to analyze
    url: String,
    /// Table to analyze, 1-based
    #[arg(short, long, default_value = "1")]
    table: usize,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// How column names are found
    #[arg(long, value_enum)]
    header: Option<HeaderArg>,
    /// Rows to preview
    #[arg(short = 'n', long, default_value = "10")]
    rows: usize,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeaderArg {
    Auto,
    Structural,
    None,
}

impl From<HeaderArg> for HeaderPolicy {
    fn from(arg: HeaderArg) -> Self {
        match arg {
            HeaderArg::Auto => HeaderPolicy::StructuralOrInferred,
            HeaderArg::Structural => HeaderPolicy::Structural,
            HeaderArg::None => HeaderPolicy::None,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AnalyzerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AnalyzerConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(secs) = cli.timeout {
        config.fetch.timeout_secs = secs;
    }
    if let Some(header) = cli.header {
        config.extract.header = header.into();
    }
    config.fetch.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;
    let fetcher = Fetcher::new(&config.fetch);

    let results = fetch_tables(&fetcher, &cli.url, &config.extract);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results.report())?);
        return Ok(exit_code(&results));
    }

    println!("{}", results.summary());
    for warning in results.warnings() {
        println!("  warning: {warning}");
    }
    if results.datasets().is_empty() {
        return Ok(ExitCode::FAILURE);
    }

    let mut session = Session::new();
    session.set_url(cli.url.as_str());
    session.replace(results);

    println!();
    for (i, ds) in session.datasets().iter().enumerate() {
        println!(
            "  [{}] {} ({} rows x {} columns)",
            i + 1,
            ds.title(),
            ds.row_count(),
            ds.column_count()
        );
    }

    let dataset = session.select(cli.table.saturating_sub(1))?;
    println!("\n== {} ==", dataset.title());
    print_preview(dataset, cli.rows);

    if let Some(profile) = session.active_profile() {
        print_profile(&profile);
        print_charts(&profile);
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(results: &FetchResult) -> ExitCode {
    if results.datasets().is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_preview(dataset: &Dataset, rows: usize) {
    println!("{}", dataset.columns().join(" | "));
    for row in dataset.rows().iter().take(rows) {
        let cells: Vec<&str> = row
            .iter()
            .map(|c| match c {
                CellValue::Text(t) => t.as_str(),
                CellValue::Missing => "",
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
    if dataset.row_count() > rows {
        println!("... {} more rows", dataset.row_count() - rows);
    }
}

fn print_profile(profile: &SchemaProfile) {
    println!("\nColumns:");
    for column in &profile.columns {
        let detail = match &column.kind {
            ColumnKind::Numeric(n) => format!(
                "min {} max {} mean {:.3} ({} distinct)",
                n.min, n.max, n.mean, n.distinct
            ),
            ColumnKind::Categorical(c) => {
                let top: Vec<String> = c
                    .counts
                    .iter()
                    .take(3)
                    .map(|cat| format!("{} ({})", cat.label, cat.count))
                    .collect();
                format!("{} categories, top: {}", c.distinct(), top.join(", "))
            }
            ColumnKind::Unusable => "no values".to_string(),
        };
        println!(
            "  {:<24} {:<12} missing {:<5} {}",
            column.name,
            column.kind_name(),
            column.missing,
            detail
        );
    }
}

fn print_charts(profile: &SchemaProfile) {
    let plan = ChartPlan::from_profile(profile);
    println!("\nCharts:");
    for option in &plan.options {
        let status = match &option.availability {
            Availability::Available { columns } => columns.join(", "),
            Availability::Insufficient { needed, available } => {
                format!("insufficient columns (need {needed}, have {available})")
            }
        };
        println!("  {:<20} {}", format!("{:?}", option.chart), status);
    }

    if let Some(column) = profile.numeric().next().and_then(|c| c.as_numeric()) {
        if let Some(stats) = box_stats(column) {
            println!(
                "\nBox plot of first numeric column: q1 {} median {} q3 {} ({} outliers)",
                stats.q1,
                stats.median,
                stats.q3,
                stats.outliers.len()
            );
        }
    }

    if matches!(
        plan.get(ChartKind::CorrelationHeatmap),
        Some(Availability::Available { .. })
    ) {
        if let Ok(matrix) = correlation_matrix(profile) {
            println!("\nCorrelation:");
            for (name, row) in matrix.columns.iter().zip(&matrix.values) {
                let cells: Vec<String> = row
                    .iter()
                    .map(|v| v.map_or_else(|| "  -  ".to_string(), |r| format!("{r:5.2}")))
                    .collect();
                println!("  {:<24} {}", name, cells.join(" "));
            }
        }
    }
}
