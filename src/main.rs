//! CLI entry point for the COVID-19 rate charts.
//!
//! Provides subcommands for the country group charts, the Canadian provinces
//! chart, or both.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use covid_rates::{
    analyzers::types::Metric,
    config::PlotConfig,
    fetch::BasicClient,
    output::load_font,
    pipeline::{Dataset, country_charts, province_chart, write_chart},
    plots::ChartSpec,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "covid_rates")]
#[command(about = "Per-capita COVID-19 case and death charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot the configured country groups, one chart per group
    Countries(RunArgs),
    /// Plot the Canadian provinces with the most cases
    Provinces(RunArgs),
    /// Plot both the country groups and the provinces (default)
    All(RunArgs),
}

#[derive(Args, Clone)]
struct RunArgs {
    /// Directory to save charts to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Count to plot
    #[arg(short, long, value_enum, default_value_t = Metric::Confirmed)]
    metric: Metric,

    /// Plot the smoothed daily change instead of cumulative counts
    #[arg(long, default_value_t = false)]
    daily: bool,

    /// JSON plot configuration; defaults apply to missing fields
    #[arg(short, long)]
    config: Option<String>,

    /// Also write the plotted rates as CSV next to each chart
    #[arg(long, default_value_t = false)]
    export: bool,

    /// TrueType font to label charts with, tried before the configured ones
    #[arg(long)]
    font: Option<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            metric: Metric::Confirmed,
            daily: false,
            config: None,
            export: false,
            font: None,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/covid_rates.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("covid_rates.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let (args, countries, provinces) = match cli.command {
        Some(Commands::Countries(args)) => (args, true, false),
        Some(Commands::Provinces(args)) => (args, false, true),
        Some(Commands::All(args)) => (args, true, true),
        None => (RunArgs::default(), true, true),
    };

    run(&args, countries, provinces)
}

/// Loads the data once and writes every requested chart.
#[tracing::instrument(skip(args), fields(metric = %args.metric, daily = args.daily))]
fn run(args: &RunArgs, countries: bool, provinces: bool) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PlotConfig::load(path)?,
        None => PlotConfig::default(),
    };
    if let Some(font) = &args.font {
        config.font_paths.insert(0, font.clone());
    }
    config.validate()?;
    load_font(&config.font_paths)?;

    let client = BasicClient::new()?;
    let dataset = Dataset::fetch(&client, &config.sources, provinces)?;

    let mut charts: Vec<ChartSpec> = Vec::new();
    if countries {
        charts.extend(country_charts(&dataset, &config, args.metric, args.daily)?);
    }
    if provinces {
        charts.push(province_chart(&dataset, &config, args.metric, args.daily)?);
    }

    let mut written = 0;
    for chart in &charts {
        written += write_chart(chart, &args.output_dir, args.export)?.len();
    }

    info!(
        charts = charts.len(),
        files = written,
        output_dir = %args.output_dir.display(),
        "Finished writing charts"
    );
    Ok(())
}
