//! Observer CLI: run pipeline steps and inspect the table store.
//!
//! Commands:
//! - `run`: execute the selected pipeline steps over the configured tickers
//! - `status`: per-table row counts and latest dates for each ticker
//! - `indicators`: fetch one ticker and print its latest indicator rows as CSV

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use observer_core::data::{
    BarSource, HistoricalStore, LogNotifier, Notifier, SyntheticSource, YahooSource,
};
use observer_core::domain::{Bar, DecisionRow, IndicatorRow, Row, SignalRow, Table};
use observer_core::IndicatorEngine;
use observer_runner::{CsvStore, ObserverConfig, OutboxNotifier, Pipeline, StepSelection};
use tracing_subscriber::EnvFilter;

/// Fixed first day of the synthetic walk, so every run extends the same series.
const SYNTHETIC_START: (i32, u32, u32) = (2020, 1, 1);

#[derive(Parser)]
#[command(name = "observer", about = "Observer: daily stock indicator and signal pipeline")]
struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pipeline steps. With no step flags, nothing runs.
    Run {
        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        download: bool,
        #[arg(long, default_value_t = false)]
        stage: bool,
        #[arg(long, default_value_t = false)]
        transform: bool,
        #[arg(long, default_value_t = false)]
        analyze: bool,
        #[arg(long, default_value_t = false)]
        decide: bool,
        #[arg(long, default_value_t = false)]
        notify: bool,

        /// Run every step.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Use the deterministic synthetic source instead of Yahoo.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Report row counts and latest dates per table and ticker.
    Status {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the latest indicator rows of one ticker as CSV.
    Indicators {
        #[arg(long)]
        ticker: String,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Calendar days of history to fetch from Yahoo.
        #[arg(long, default_value_t = 120)]
        days: u32,

        /// Number of rows to print.
        #[arg(long, default_value_t = 10)]
        last: usize,

        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            download,
            stage,
            transform,
            analyze,
            decide,
            notify,
            all,
            synthetic,
        } => {
            let selection = if all {
                StepSelection::all()
            } else {
                StepSelection {
                    download,
                    stage,
                    transform,
                    analyze,
                    decide,
                    notify,
                }
            };
            run_pipeline(config.as_deref(), selection, synthetic)
        }
        Commands::Status { config } => run_status(config.as_deref()),
        Commands::Indicators {
            ticker,
            config,
            days,
            last,
            synthetic,
        } => run_indicators(&ticker, config.as_deref(), days, last, synthetic),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ObserverConfig> {
    match path {
        Some(p) => ObserverConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(ObserverConfig::default()),
    }
}

fn make_source(synthetic: bool, lookback_days: u32) -> Result<Box<dyn BarSource>> {
    if synthetic {
        let (y, m, d) = SYNTHETIC_START;
        let start = NaiveDate::from_ymd_opt(y, m, d).context("invalid synthetic start date")?;
        Ok(Box::new(SyntheticSource::new(start, Utc::now().date_naive())))
    } else {
        Ok(Box::new(
            YahooSource::new(lookback_days).context("failed to build Yahoo client")?,
        ))
    }
}

fn run_pipeline(config_path: Option<&Path>, selection: StepSelection, synthetic: bool) -> Result<()> {
    if selection.is_empty() {
        bail!("no steps selected: pass --all or one of --download, --stage, --transform, --analyze, --decide, --notify");
    }
    let config = load_config(config_path)?;
    let tickers = config.resolve_tickers()?;
    if tickers.is_empty() && selection.download {
        bail!("no tickers configured: set `tickers` or `tickers_file` in the config");
    }

    let store = CsvStore::open(&config.store_dir, config.tables.clone())?;
    let source = make_source(synthetic, config.download_lookback_days)?;
    let notifier: Box<dyn Notifier> = match &config.outbox_dir {
        Some(dir) => Box::new(OutboxNotifier::new(dir)),
        None => Box::new(LogNotifier),
    };

    let report = Pipeline::new(&config, &store, source.as_ref(), notifier.as_ref())
        .run(&tickers, selection);
    println!("{}", report.summary());

    if !report.is_success() {
        bail!("pipeline run failed");
    }
    Ok(())
}

fn run_status(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = CsvStore::open(&config.store_dir, config.tables.clone())?;

    println!("Store: {}", config.store_dir.display());
    print_table::<Bar>(&store, &config)?;
    print_table::<IndicatorRow>(&store, &config)?;
    print_table::<SignalRow>(&store, &config)?;
    print_table::<DecisionRow>(&store, &config)?;
    Ok(())
}

fn print_table<R: Row>(store: &CsvStore, config: &ObserverConfig) -> Result<()> {
    let table: Table = R::TABLE;
    let rows: Vec<R> = store.read_all()?;
    println!();
    println!("{table} ({}): {} row(s)", config.tables.name(table), rows.len());
    for ticker in store.tickers::<R>()? {
        let count = rows.iter().filter(|r| r.ticker() == ticker).count();
        let latest = store
            .latest_date::<R>(&ticker)?
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        println!("  {ticker:<8} {count:>6} rows  latest {latest}");
    }
    Ok(())
}

fn run_indicators(
    ticker: &str,
    config_path: Option<&Path>,
    days: u32,
    last: usize,
    synthetic: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let ticker = ticker.trim().to_uppercase();
    let source = make_source(synthetic, days)?;

    let bars = source
        .fetch(&ticker)
        .with_context(|| format!("failed to fetch {ticker} from {}", source.name()))?;
    let engine = IndicatorEngine::new(&config.engine.indicators);
    let rows = engine.compute_ticker(&bars)?;
    if rows.len() < engine.warmup() {
        tracing::warn!(
            ticker = %ticker,
            bars = rows.len(),
            warmup = engine.warmup(),
            "history shorter than the indicator warmup"
        );
    }

    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows.iter().skip(rows.len().saturating_sub(last)) {
        wtr.serialize(row.clone().rounded(config.precision))?;
    }
    wtr.flush()?;
    Ok(())
}
