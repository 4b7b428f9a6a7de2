//! Strategy parameters: one immutable `ParameterSet` per simulation run.
//!
//! Every component (range calculator, order placement, execution rules) reads
//! its settings from the `ParameterSet` passed into the run. Nothing is global,
//! so any number of runs with different parameters can execute side by side.
//!
//! `ParameterSet::default()` is the reference configuration of the strategy.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parameter validation.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{name} must be positive (got {value})")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("min_lot ({min}) is greater than max_lot ({max})")]
    LotBounds { min: f64, max: f64 },

    #[error("range_start_offset_minutes must be below 1440 (got {0})")]
    OffsetOutOfDay(u32),

    #[error("failed to serialize parameters: {0}")]
    Serialize(String),
}

/// Whether both range boundaries may produce entries on the same day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakoutMode {
    /// The first triggered order cancels the opposite one.
    #[default]
    #[serde(alias = "one breakout per range")]
    OneBreakoutPerRange,
    /// Both orders stay live; each may open a position while none is open.
    #[serde(alias = "both sides")]
    BothSides,
}

impl std::fmt::Display for BreakoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakoutMode::OneBreakoutPerRange => f.write_str("one_breakout_per_range"),
            BreakoutMode::BothSides => f.write_str("both_sides"),
        }
    }
}

impl std::str::FromStr for BreakoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "one_breakout_per_range" => Ok(BreakoutMode::OneBreakoutPerRange),
            "both_sides" => Ok(BreakoutMode::BothSides),
            other => Err(format!("unknown breakout mode '{other}'")),
        }
    }
}

/// Per-weekday trading switches. Saturday and Sunday are never traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TradingDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
}

impl Default for TradingDays {
    fn default() -> Self {
        Self {
            monday: true,
            tuesday: false,
            wednesday: true,
            thursday: true,
            friday: true,
        }
    }
}

impl TradingDays {
    pub fn all_weekdays() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
        }
    }

    pub fn is_enabled(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat | Weekday::Sun => false,
        }
    }
}

/// Complete configuration of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterSet {
    // ── Sizing ──
    /// Scale the lot with account balance instead of trading `base_lot`.
    pub autolot: bool,
    /// Balance that corresponds to `base_lot` in autolot mode.
    pub base_balance: f64,
    #[serde(alias = "lot")]
    pub base_lot: f64,
    pub min_lot: f64,
    pub max_lot: f64,

    // ── Protective levels, percent of the range size (0 disables) ──
    #[serde(alias = "stop_loss")]
    pub stop_loss_pct: f64,
    #[serde(alias = "take_profit")]
    pub take_profit_pct: f64,

    // ── Range window, minutes from midnight ──
    #[serde(alias = "range_start_time")]
    pub range_start_offset_minutes: u32,
    #[serde(alias = "range_duration")]
    pub range_duration_minutes: u32,
    #[serde(alias = "range_close_time", deserialize_with = "close_time::deserialize")]
    pub range_close_time_minutes: Option<u32>,

    pub trading_days: TradingDays,
    pub breakout_mode: BreakoutMode,

    // ── Trailing stop, points (0 disables) ──
    #[serde(alias = "trailing_stop")]
    pub trailing_stop_points: f64,
    #[serde(alias = "trailing_start")]
    pub trailing_start_points: f64,

    // ── Range size filter, points (0 = unbounded) ──
    #[serde(alias = "max_range_size")]
    pub max_range_points: f64,
    #[serde(alias = "min_range_size")]
    pub min_range_points: f64,

    // ── Instrument ──
    /// Price units per point.
    #[serde(alias = "symbol_point")]
    pub point_size: f64,
    /// Account currency per one price unit per lot.
    pub contract_multiplier: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            autolot: true,
            base_balance: 100.0,
            base_lot: 0.01,
            min_lot: 0.01,
            max_lot: 10.0,
            stop_loss_pct: 90.0,
            take_profit_pct: 0.0,
            range_start_offset_minutes: 90,
            range_duration_minutes: 270,
            range_close_time_minutes: Some(1200),
            trading_days: TradingDays::default(),
            breakout_mode: BreakoutMode::OneBreakoutPerRange,
            trailing_stop_points: 300.0,
            trailing_start_points: 500.0,
            max_range_points: 1500.0,
            min_range_points: 500.0,
            point_size: 0.001,
            contract_multiplier: 100.0,
        }
    }
}

impl ParameterSet {
    /// Check the invariants every run relies on.
    pub fn validate(&self) -> Result<(), ParamError> {
        positive("base_balance", self.base_balance)?;
        positive("base_lot", self.base_lot)?;
        positive("min_lot", self.min_lot)?;
        positive("max_lot", self.max_lot)?;
        positive("point_size", self.point_size)?;
        positive("contract_multiplier", self.contract_multiplier)?;
        non_negative("stop_loss_pct", self.stop_loss_pct)?;
        non_negative("take_profit_pct", self.take_profit_pct)?;
        non_negative("trailing_stop_points", self.trailing_stop_points)?;
        non_negative("trailing_start_points", self.trailing_start_points)?;
        non_negative("max_range_points", self.max_range_points)?;
        non_negative("min_range_points", self.min_range_points)?;

        if self.min_lot > self.max_lot {
            return Err(ParamError::LotBounds {
                min: self.min_lot,
                max: self.max_lot,
            });
        }
        if self.range_start_offset_minutes >= 24 * 60 {
            return Err(ParamError::OffsetOutOfDay(self.range_start_offset_minutes));
        }
        Ok(())
    }

    /// Trailing is active only when both distance and start threshold are set.
    pub fn trailing_enabled(&self) -> bool {
        self.trailing_stop_points > 0.0 && self.trailing_start_points > 0.0
    }

    /// Deterministic identity of this parameter set (BLAKE3 over its JSON form).
    pub fn fingerprint(&self) -> Result<String, ParamError> {
        let json = serde_json::to_vec(self).map_err(|e| ParamError::Serialize(e.to_string()))?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParamError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ParamError::Negative { name, value })
    }
}

/// Range close time accepts minutes, `<= 0`, `"off"`/`"disabled"`, or null.
mod close_time {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Minutes(i64),
        Keyword(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Minutes(m)) => super::close_time_from_minutes(m).map_err(D::Error::custom),
            Some(Raw::Keyword(k)) if matches!(k.as_str(), "off" | "disabled") => Ok(None),
            Some(Raw::Keyword(k)) => Err(D::Error::custom(format!(
                "invalid range close time '{k}' (expected minutes, \"off\" or \"disabled\")"
            ))),
        }
    }
}

/// Map a minutes value to a close time; zero or negative disables it.
pub fn close_time_from_minutes(minutes: i64) -> Result<Option<u32>, String> {
    if minutes <= 0 {
        return Ok(None);
    }
    u32::try_from(minutes)
        .map(Some)
        .map_err(|_| format!("range close time {minutes} is out of range"))
}
