//! Confluence CLI — one-shot and batch signal analysis.
//!
//! Commands:
//! - `analyze` — run the full pipeline for one symbol and print the result JSON
//! - `batch` — analyze several symbols in parallel and print a summary report

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use confluence_core::{Analyzer, AnalyzerConfig, DEFAULT_LOOKBACK_DAYS};
use confluence_runner::{write_json, write_ohlc_csv, BatchReport, BatchRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "confluence",
    version,
    about = "Confluence CLI — crypto multi-factor signal analysis"
)]
struct Cli {
    /// Debug logging for the engine crates (overridden by RUST_LOG).
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one symbol and print the result as JSON.
    Analyze {
        /// Ticker, coin id or contract address (e.g., BTC, ethereum, 0x...).
        symbol: String,

        /// Days of daily history to analyze.
        #[arg(long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
        days: u32,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,

        /// Also write the analyzed candles to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Analyze several symbols in parallel and print a summary.
    Batch {
        /// Symbols to analyze.
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Days of daily history to analyze.
        #[arg(long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
        days: u32,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Worker threads.
        #[arg(long, default_value_t = 4)]
        workers: usize,

        /// Deadline for the whole batch, in seconds.
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,

        /// Write the report JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            symbol,
            days,
            config,
            pretty,
            csv,
        } => run_analyze(&symbol, days, config.as_deref(), pretty, csv.as_deref()),
        Commands::Batch {
            symbols,
            days,
            config,
            workers,
            timeout_secs,
            output,
        } => run_batch(
            symbols,
            days,
            config.as_deref(),
            workers,
            Duration::from_secs(timeout_secs),
            output.as_deref(),
        ),
    }
}

/// Logs go to stderr so stdout stays pure JSON.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "confluence_core=debug,confluence_runner=debug"
    } else {
        "confluence_core=info,confluence_runner=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn run_analyze(
    symbol: &str,
    days: u32,
    config_path: Option<&Path>,
    pretty: bool,
    csv_path: Option<&Path>,
) -> Result<()> {
    let analyzer = Analyzer::new(load_config(config_path)?);
    let result = analyzer.analyze(symbol, days);

    if let Some(path) = csv_path {
        write_ohlc_csv(path, &result.ohlc_data)?;
        tracing::info!(path = %path.display(), candles = result.ohlc_data.len(), "wrote CSV");
    }

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

fn run_batch(
    symbols: Vec<String>,
    days: u32,
    config_path: Option<&Path>,
    workers: usize,
    timeout: Duration,
    output: Option<&Path>,
) -> Result<()> {
    let analyzer = Arc::new(Analyzer::new(load_config(config_path)?));
    let runner = BatchRunner::new(workers, timeout)?;

    let outcomes = runner.run(&symbols, days, move |symbol, days| {
        analyzer.analyze(symbol, days)
    });
    let report = BatchReport::from_outcomes(&symbols, &outcomes, days, Utc::now());

    for hit in report.actionable() {
        tracing::info!(
            symbol = hit.symbol.as_str(),
            signal = ?hit.signal,
            confidence = hit.confidence,
            rr = hit.risk_reward,
            "actionable"
        );
    }

    match output {
        Some(path) => {
            write_json(path, &report)?;
            tracing::info!(path = %path.display(), "wrote batch report");
        }
        None => println!("{}", report.to_json_pretty()?),
    }
    Ok(())
}
