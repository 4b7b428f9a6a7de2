//! Bar loading for the runner.
//!
//! Reads an OHLCV CSV file (columns datetime, open, high, low, close, volume;
//! header optional) and prepares the series the engine expects:
//! 1. Keep bars inside the inclusive `[start, end]` date filter
//! 2. Optionally drop Saturday/Sunday bars
//! 3. Sort ascending by timestamp
//! 4. Drop duplicate timestamps (first occurrence wins)
//!
//! An unreadable file, a malformed row, or an empty result is an error; the
//! simulation never starts on bad input.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use thiserror::Error;
use tracing::{debug, warn};

use breakout_core::domain::Bar;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("no bars left in '{}' after filtering", path.display())]
    Empty { path: PathBuf },
}

/// Options controlling which bars are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// First date to keep (inclusive).
    pub start: Option<NaiveDate>,
    /// Last date to keep (inclusive).
    pub end: Option<NaiveDate>,
    pub skip_weekends: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            skip_weekends: true,
        }
    }
}

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a bar timestamp in any of the accepted layouts.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Load and prepare bars from a CSV file.
pub fn load_bars_csv(path: &Path, opts: &LoadOptions) -> Result<Vec<Bar>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut raw = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(i as u64 + 1, |p| p.line());

        if i == 0 && is_header(&record) {
            debug!(path = %path.display(), "skipping header row");
            continue;
        }
        raw.push(parse_record(&record, line)?);
    }

    let bars = prepare_bars(raw, opts);
    if bars.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    debug!(
        path = %path.display(),
        bars = bars.len(),
        first = %bars[0].timestamp,
        last = %bars[bars.len() - 1].timestamp,
        "bars loaded"
    );
    Ok(bars)
}

/// A header has an unparseable datetime column and no numeric field.
fn is_header(record: &csv::StringRecord) -> bool {
    record.get(0).and_then(parse_datetime).is_none()
        && record.iter().all(|field| field.parse::<f64>().is_err())
}

fn parse_record(record: &csv::StringRecord, line: u64) -> Result<Bar, LoadError> {
    let malformed = |reason: String| LoadError::Malformed { line, reason };

    if record.len() < 5 {
        return Err(malformed(format!(
            "expected at least 5 columns, found {}",
            record.len()
        )));
    }
    let ts_field = &record[0];
    let timestamp = parse_datetime(ts_field)
        .ok_or_else(|| malformed(format!("unrecognised datetime '{ts_field}'")))?;

    let number = |idx: usize, name: &str| -> Result<f64, LoadError> {
        let field = record.get(idx).unwrap_or("");
        field
            .parse::<f64>()
            .map_err(|_| malformed(format!("invalid {name} '{field}'")))
    };

    Ok(Bar {
        timestamp,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: if record.len() > 5 { number(5, "volume")? } else { 0.0 },
    })
}

/// Filter, sort and deduplicate a raw bar list.
pub fn prepare_bars(mut bars: Vec<Bar>, opts: &LoadOptions) -> Vec<Bar> {
    bars.retain(|b| {
        let date = b.date();
        opts.start.map_or(true, |s| date >= s)
            && opts.end.map_or(true, |e| date <= e)
            && !(opts.skip_weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
    });

    // Stable: among equal timestamps the earlier row stays first.
    bars.sort_by_key(|b| b.timestamp);
    let before = bars.len();
    bars.dedup_by_key(|b| b.timestamp);
    let duplicates = before - bars.len();
    if duplicates > 0 {
        warn!(duplicates, "dropped bars with duplicate timestamps");
    }

    let insane = bars.iter().filter(|b| !b.is_sane()).count();
    if insane > 0 {
        warn!(insane, "bars with inconsistent OHLC values");
    }
    bars
}
