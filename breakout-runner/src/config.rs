//! TOML configuration for backtests and grid searches.
//!
//! ```toml
//! [backtest]
//! data = "XAUUSD_M30.csv"
//! start_date = "2019-11-01"
//! end_date = "2020-08-31"
//! initial_balance = 5000.0
//! skip_weekends = true
//!
//! [params]            # ParameterSet overrides; missing keys take defaults
//! stop_loss_pct = 90
//!
//! [optimize]
//! top_n = 5
//! threads = 0         # 0 = rayon default
//! sequential = false
//!
//! [[grid]]
//! param = "stop_loss_pct"
//! values = [50, 90, 120]
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use breakout_core::params::{ParamError, ParameterSet};

use crate::data_loader::LoadOptions;
use crate::sweep::{GridDimension, GridError, ParamGrid, SweepExecution};

/// Errors from reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error("start_date {start} is after end_date {end}")]
    DateOrder { start: NaiveDate, end: NaiveDate },

    #[error("initial_balance must be positive (got {0})")]
    InitialBalance(f64),
}

/// `[backtest]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestSection {
    /// CSV bar file; may be overridden on the command line.
    pub data: Option<PathBuf>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub initial_balance: f64,
    pub skip_weekends: bool,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            data: None,
            start_date: None,
            end_date: None,
            initial_balance: 5000.0,
            skip_weekends: true,
        }
    }
}

/// `[optimize]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeSection {
    pub top_n: usize,
    /// Worker threads; 0 uses the rayon default.
    pub threads: usize,
    pub sequential: bool,
}

impl Default for OptimizeSection {
    fn default() -> Self {
        Self {
            top_n: 10,
            threads: 0,
            sequential: false,
        }
    }
}

/// A complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub params: ParameterSet,
    pub optimize: OptimizeSection,
    pub grid: Vec<GridDimension>,
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: BacktestConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Reject anything that would fail before or during a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        if !(self.backtest.initial_balance > 0.0) {
            return Err(ConfigError::InitialBalance(self.backtest.initial_balance));
        }
        if let (Some(start), Some(end)) = (self.backtest.start_date, self.backtest.end_date) {
            if start > end {
                return Err(ConfigError::DateOrder { start, end });
            }
        }
        self.param_grid()?;
        Ok(())
    }

    pub fn param_grid(&self) -> Result<ParamGrid, GridError> {
        ParamGrid::new(self.grid.clone())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            start: self.backtest.start_date,
            end: self.backtest.end_date,
            skip_weekends: self.backtest.skip_weekends,
        }
    }

    pub fn execution(&self) -> SweepExecution {
        if self.optimize.sequential {
            SweepExecution::Sequential
        } else {
            SweepExecution::Parallel {
                threads: self.optimize.threads,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::ParamValue;
    use breakout_core::params::BreakoutMode;

    const SAMPLE: &str = r#"
[backtest]
data = "XAUUSD_M30.csv"
start_date = "2019-11-01"
end_date = "2020-08-31"
initial_balance = 5000.0

[params]
stop_loss_pct = 120
breakout_mode = "both_sides"
range_close_time_minutes = "off"

[params.trading_days]
tuesday = true

[optimize]
top_n = 5
sequential = true

[[grid]]
param = "stop_loss"
values = [50, 90, 120]

[[grid]]
param = "range_on_monday"
values = [true, false]
"#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.backtest.data, Some(PathBuf::from("XAUUSD_M30.csv")));
        assert_eq!(config.params.stop_loss_pct, 120.0);
        assert_eq!(config.params.breakout_mode, BreakoutMode::BothSides);
        assert_eq!(config.params.range_close_time_minutes, None);
        assert!(config.params.trading_days.tuesday);
        assert!(config.params.trading_days.monday);
        assert_eq!(config.optimize.top_n, 5);
        assert_eq!(config.execution(), SweepExecution::Sequential);
        assert_eq!(config.grid[0].values[0], ParamValue::Int(50));
        assert_eq!(config.param_grid().unwrap().combinations(), 6);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = BacktestConfig::from_toml("").unwrap();
        assert_eq!(config.params, ParameterSet::default());
        assert_eq!(config.backtest.initial_balance, 5000.0);
        assert_eq!(config.execution(), SweepExecution::Parallel { threads: 0 });
        assert!(config.grid.is_empty());
    }

    #[test]
    fn rejects_invalid_parameters() {
        let err = BacktestConfig::from_toml("[params]\npoint_size = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Params(_)));
    }

    #[test]
    fn rejects_misspelled_parameter() {
        let err = BacktestConfig::from_toml("[params]\nstop_los_pct = 10\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = BacktestConfig::from_toml("[params.trading_days]\ntusday = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parameter_aliases_still_accepted() {
        let config =
            BacktestConfig::from_toml("[params]\nstop_loss = 60\nsymbol_point = 0.01\n").unwrap();
        assert_eq!(config.params.stop_loss_pct, 60.0);
        assert_eq!(config.params.point_size, 0.01);
    }

    #[test]
    fn rejects_reversed_dates() {
        let err = BacktestConfig::from_toml(
            "[backtest]\nstart_date = \"2020-02-01\"\nend_date = \"2020-01-01\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DateOrder { .. }));
    }

    #[test]
    fn rejects_mistyped_grid_value() {
        let err = BacktestConfig::from_toml(
            "[[grid]]\nparam = \"autolot\"\nvalues = [\"yes\"]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Grid(GridError::InvalidValue { .. })));
    }

    #[test]
    fn rejects_unknown_grid_parameter() {
        let err =
            BacktestConfig::from_toml("[[grid]]\nparam = \"lookback\"\nvalues = [1]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Grid(GridError::UnknownParameter(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BacktestConfig::from_file(Path::new("/nonexistent/breakout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
