//! Breakout CLI: single backtests and grid-search optimization.
//!
//! Commands:
//! - `run`: backtest the configured parameters, print the summary, save artifacts
//! - `optimize`: grid search over the configured `[[grid]]`, print the top N,
//!   write the ranked table as CSV
//! - `show`: re-print the summary of a saved `manifest.json`

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use breakout_core::Bar;
use breakout_runner::{
    export_ranked_csv, load_bars_csv, load_manifest, render_summary, run_backtest, save_artifacts,
    synthetic_bars, BacktestConfig, GridSearch, SweepExecution, SweepReport,
};

#[derive(Parser)]
#[command(
    name = "breakout",
    about = "Breakout: daily opening-range breakout backtester and optimizer"
)]
struct Cli {
    /// Log engine details (debug level). RUST_LOG overrides.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
struct DataArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV bar file; overrides `[backtest].data`.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Use deterministic synthetic bars instead of a data file.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Number of synthetic trading days.
    #[arg(long, default_value_t = 250)]
    synthetic_days: usize,

    /// Seed for synthetic bars.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backtest with the configured parameters.
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Output directory for the artifact set.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Grid search over the configured `[[grid]]` dimensions.
    Optimize {
        #[command(flatten)]
        data: DataArgs,

        /// Number of ranked results to keep (0 = all). Overrides `[optimize].top_n`.
        #[arg(long)]
        top: Option<usize>,

        /// Worker threads (0 = rayon default). Overrides `[optimize].threads`.
        #[arg(long)]
        threads: Option<usize>,

        /// Evaluate combinations on the current thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Ranked results CSV.
        #[arg(long, default_value = "optimization.csv")]
        output: PathBuf,
    },
    /// Print the summary of a saved run.
    Show {
        /// `manifest.json` from a `run` artifact directory.
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { data, output_dir } => run_cmd(&data, output_dir),
        Commands::Optimize {
            data,
            top,
            threads,
            sequential,
            output,
        } => optimize_cmd(&data, top, threads, sequential, output),
        Commands::Show { manifest } => show_cmd(&manifest),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .init();
}

fn load_config(args: &DataArgs) -> Result<BacktestConfig> {
    let mut config = match &args.config {
        Some(path) => BacktestConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BacktestConfig::default(),
    };
    if let Some(data) = &args.data {
        config.backtest.data = Some(data.clone());
    }
    Ok(config)
}

fn load_bars(args: &DataArgs, config: &BacktestConfig) -> Result<Vec<Bar>> {
    if args.synthetic {
        let start = config
            .backtest
            .start_date
            .or_else(|| NaiveDate::from_ymd_opt(2020, 1, 6))
            .context("invalid synthetic start date")?;
        let bars = synthetic_bars(start, args.synthetic_days, 30, args.seed);
        info!(bars = bars.len(), seed = args.seed, "generated synthetic bars");
        return Ok(bars);
    }

    let Some(path) = config.backtest.data.as_deref() else {
        bail!("no data source: set [backtest].data, pass --data, or use --synthetic");
    };
    let bars = load_bars_csv(path, &config.load_options())
        .with_context(|| format!("failed to load bars from {}", path.display()))?;
    info!(bars = bars.len(), path = %path.display(), "loaded bars");
    Ok(bars)
}

fn run_cmd(args: &DataArgs, output_dir: PathBuf) -> Result<()> {
    let config = load_config(args)?;
    let bars = load_bars(args, &config)?;

    let result = run_backtest(&bars, &config.params, config.backtest.initial_balance)?;
    print!("{}", render_summary(&result));

    let run_dir = save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn show_cmd(manifest: &Path) -> Result<()> {
    let result = load_manifest(manifest)?;
    print!("{}", render_summary(&result));
    Ok(())
}

fn optimize_cmd(
    args: &DataArgs,
    top: Option<usize>,
    threads: Option<usize>,
    sequential: bool,
    output: PathBuf,
) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(top) = top {
        config.optimize.top_n = top;
    }
    if let Some(threads) = threads {
        config.optimize.threads = threads;
    }
    if sequential {
        config.optimize.sequential = true;
    }

    let grid = config.param_grid()?;
    if grid.is_empty() {
        bail!("no [[grid]] dimensions configured; nothing to optimize");
    }
    let bars = load_bars(args, &config)?;

    let execution = config.execution();
    let report = GridSearch::new(&bars, config.params.clone(), grid)
        .with_initial_balance(config.backtest.initial_balance)
        .with_top_n(config.optimize.top_n)
        .with_execution(execution)
        .run()?;

    print_ranked(&report, execution);

    let csv = export_ranked_csv(&report)?;
    std::fs::write(&output, csv)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Ranked results saved to: {}", output.display());
    Ok(())
}

fn print_ranked(report: &SweepReport, execution: SweepExecution) {
    println!(
        "===== Optimization: {} combinations, {} evaluated, {} skipped ({execution:?}) =====",
        report.total, report.evaluated, report.skipped
    );
    for r in &report.ranked {
        let values: Vec<String> = report
            .columns
            .iter()
            .zip(&r.values)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!(
            "#{:<3} score {:>12.3}  net {:>10.2}  pf {:>8.2}  win {:>5.1}%  sharpe {:>6.3}  trades {:>4}  dd {:>9.2}  {}",
            r.rank,
            r.score,
            r.metrics.net_profit,
            r.metrics.profit_factor,
            r.metrics.win_rate * 100.0,
            r.metrics.sharpe_ratio,
            r.metrics.total_trades,
            r.metrics.max_drawdown,
            values.join(" ")
        );
    }
}
