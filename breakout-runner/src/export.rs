//! Reporting and export: JSON, CSV, and text summary generation.
//!
//! Provides the export formats for backtest and grid-search results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade ledger, balance curve, and the ranked optimization table
//! - **Text**: the end-of-run summary printed by the CLI
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use breakout_core::domain::TradeRecord;

use crate::runner::{BacktestResult, SCHEMA_VERSION};
use crate::sweep::SweepReport;

/// Metric columns of the ranked table, before the grid dimensions.
pub const RANKED_METRIC_COLUMNS: [&str; 9] = [
    "rank",
    "score",
    "net_profit",
    "profit_factor",
    "win_rate",
    "sharpe_ratio",
    "total_trades",
    "max_drawdown",
    "return_on_account",
];

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Load a saved `manifest.json` artifact.
pub fn load_manifest(path: &Path) -> Result<BacktestResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    import_json(&json)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the ranked grid-search table.
///
/// Columns: rank, score, net_profit, profit_factor, win_rate, sharpe_ratio,
/// total_trades, max_drawdown, return_on_account, then one column per grid
/// dimension in declared order.
pub fn export_ranked_csv(report: &SweepReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let header: Vec<&str> = RANKED_METRIC_COLUMNS
        .iter()
        .copied()
        .chain(report.columns.iter().map(String::as_str))
        .collect();
    wtr.write_record(&header)?;

    for r in &report.ranked {
        let m = &r.metrics;
        let mut row = vec![
            r.rank.to_string(),
            format!("{:.6}", r.score),
            format!("{:.2}", m.net_profit),
            format!("{:.6}", m.profit_factor),
            format!("{:.6}", m.win_rate),
            format!("{:.6}", m.sharpe_ratio),
            m.total_trades.to_string(),
            format!("{:.2}", m.max_drawdown),
            format!("{:.4}", m.return_on_account),
        ];
        row.extend(r.values.iter().map(ToString::to_string));
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the trade ledger.
///
/// Columns: side, entry_time, entry_price, exit_time, exit_price, lot,
/// profit, reason, balance_after
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_time",
        "entry_price",
        "exit_time",
        "exit_price",
        "lot",
        "profit",
        "reason",
        "balance_after",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.side.to_string(),
            &t.entry_time.to_string(),
            &format!("{:.3}", t.entry_price),
            &t.exit_time.to_string(),
            &format!("{:.3}", t.exit_price),
            &format!("{:.2}", t.lot),
            &format!("{:.2}", t.profit),
            &t.reason.to_string(),
            &format!("{:.2}", t.balance_after),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export a balance curve as CSV with close_index and balance columns.
pub fn export_equity_csv(balance_history: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["close_index", "balance"])?;
    for (i, balance) in balance_history.iter().enumerate() {
        wtr.write_record([&i.to_string(), &format!("{:.2}", balance)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single backtest run.
///
/// Creates a directory named `run_{fingerprint prefix}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `trades.csv`: trade ledger
/// - `equity.csv`: balance after each close
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let prefix: String = result.fingerprint.chars().take(12).collect();
    let run_dir = output_dir.join(format!("run_{prefix}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(result)?;
    std::fs::write(run_dir.join("manifest.json"), &json)
        .with_context(|| format!("failed to write manifest in {}", run_dir.display()))?;

    let trades_csv = export_trades_csv(&result.trades)?;
    std::fs::write(run_dir.join("trades.csv"), &trades_csv)
        .with_context(|| format!("failed to write trades.csv in {}", run_dir.display()))?;

    let equity_csv = export_equity_csv(&result.balance_history)?;
    std::fs::write(run_dir.join("equity.csv"), &equity_csv)
        .with_context(|| format!("failed to write equity.csv in {}", run_dir.display()))?;

    Ok(run_dir)
}

// ─── Text summary ───────────────────────────────────────────────────

/// Human-readable end-of-run summary.
pub fn render_summary(result: &BacktestResult) -> String {
    Summary(result).to_string()
}

/// Display adapter behind [`render_summary`].
pub struct Summary<'a>(pub &'a BacktestResult);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let m = &result.metrics;
        let s = &result.final_state;
        let days = &result.day_stats;

        writeln!(f, "===== Backtest summary =====")?;
        if let (Some(first), Some(last)) = (result.first_date, result.last_date) {
            writeln!(f, "Period:            {first} .. {last} ({} bars)", result.bar_count)?;
        }
        writeln!(f, "Initial balance:   {:.2}", result.initial_balance)?;
        writeln!(f, "Final balance:     {:.2}", s.balance)?;
        writeln!(f, "Net profit:        {:.2}", s.balance - result.initial_balance)?;
        writeln!(
            f,
            "Trades:            {} ({} won, {} lost)",
            s.total_trades(),
            s.winning_trades,
            s.losing_trades
        )?;
        writeln!(f, "Win rate:          {:.2}%", m.win_rate * 100.0)?;
        writeln!(f, "Profit factor:     {:.2}", m.profit_factor)?;
        writeln!(f, "Sharpe ratio:      {:.3}", m.sharpe_ratio)?;
        writeln!(f, "Return on account: {:.2}%", m.return_on_account)?;
        writeln!(f, "Max equity:        {:.2}", s.max_equity)?;
        writeln!(f, "Min equity:        {:.2}", s.min_equity)?;
        writeln!(f, "Max drawdown:      {:.2}", s.max_drawdown)?;

        let extremes = &result.range_extremes;
        if let Some(max) = extremes.max {
            writeln!(f, "Largest range:     {:.0} points on {}", max.points, max.date)?;
        }
        if let Some(min) = extremes.min {
            writeln!(f, "Smallest range:    {:.0} points on {}", min.points, min.date)?;
        }

        writeln!(
            f,
            "Days:              {} seen, {} disabled weekday, {} without range, {} withheld, {} with orders, {} with entries",
            days.days_seen,
            days.skipped_weekday,
            days.no_range,
            days.orders_withheld,
            days.orders_placed,
            days.days_with_entries
        )?;
        if !days.no_range_dates.is_empty() {
            let dates: Vec<String> = days.no_range_dates.iter().map(ToString::to_string).collect();
            writeln!(f, "No-range dates:    {}", dates.join(", "))?;
        }
        if let Some(p) = &result.open_position {
            writeln!(
                f,
                "Open position:     {} {:.2} lots at {:.3} since {}",
                p.side, p.lot, p.entry_price, p.entry_time
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run_backtest;
    use crate::synthetic::synthetic_bars;
    use breakout_core::params::{ParameterSet, TradingDays};
    use chrono::NaiveDate;

    fn sample_result() -> BacktestResult {
        let params = ParameterSet {
            trading_days: TradingDays::all_weekdays(),
            max_range_points: 0.0,
            min_range_points: 0.0,
            ..ParameterSet::default()
        };
        let bars = synthetic_bars(NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(), 15, 30, 11);
        run_backtest(&bars, &params, 5000.0).unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let result = sample_result();
        let json = export_json(&result).unwrap();
        let back = import_json(&json).unwrap();
        assert_eq!(back.trades.len(), result.trades.len());
        assert!(back
            .trades
            .iter()
            .zip(&result.trades)
            .all(|(a, b)| a.exit_time == b.exit_time && a.reason == b.reason));
        assert_eq!(back.fingerprint, result.fingerprint);
        assert_eq!(back.day_stats, result.day_stats);
    }

    #[test]
    fn import_rejects_future_schema() {
        let mut result = sample_result();
        result.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&result).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn trades_csv_has_row_per_trade() {
        let result = sample_result();
        let csv = export_trades_csv(&result.trades).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "side,entry_time,entry_price,exit_time,exit_price,lot,profit,reason,balance_after");
        assert_eq!(lines.len(), result.trades.len() + 1);
    }

    #[test]
    fn equity_csv_starts_at_initial_balance() {
        let csv = export_equity_csv(&[5000.0, 5012.5]).unwrap();
        assert_eq!(csv, "close_index,balance\n0,5000.00\n1,5012.50\n");
    }

    #[test]
    fn summary_mentions_balances() {
        let result = sample_result();
        let text = render_summary(&result);
        assert!(text.contains("Initial balance:   5000.00"));
        assert!(text.contains("Max drawdown:"));
        assert!(text.contains("15 seen"));
    }

    #[test]
    fn summary_adapter_matches_render() {
        let result = sample_result();
        let text = render_summary(&result);
        assert_eq!(format!("{}", Summary(&result)), text);
        assert!(text.starts_with("===== Backtest summary =====\n"));
        assert!(text.ends_with('\n'));
    }
}
