//! Opening range: the time-of-day window and the high/low observed in it.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::params::ParameterSet;

/// Time anchors of one trading day, derived from the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Forced-close instant, if enabled.
    pub close_time: Option<NaiveDateTime>,
}

impl RangeWindow {
    pub fn for_date(date: NaiveDate, params: &ParameterSet) -> Self {
        let day_start = date.and_time(chrono::NaiveTime::MIN);
        let start = day_start + Duration::minutes(i64::from(params.range_start_offset_minutes));
        let end = start + Duration::minutes(i64::from(params.range_duration_minutes));
        let close_time = params
            .range_close_time_minutes
            .filter(|&m| m > 0)
            .map(|m| day_start + Duration::minutes(i64::from(m)));
        Self {
            start,
            end,
            close_time,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// True for bars that may trigger, close or trail.
    pub fn is_post_range(&self, ts: NaiveDateTime) -> bool {
        ts > self.end
    }

    pub fn forces_close_at(&self, ts: NaiveDateTime) -> bool {
        self.close_time.is_some_and(|c| ts >= c)
    }
}

/// High/low of the bars inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningRange {
    pub high: f64,
    pub low: f64,
    /// `high - low` in price units.
    pub size: f64,
    /// `size / point_size`.
    pub points: f64,
}

/// Range over `bars` inside `window`; `None` if the window holds no bars.
pub fn compute_range(bars: &[Bar], window: &RangeWindow, point_size: f64) -> Option<OpeningRange> {
    let mut inside = bars.iter().filter(|b| window.contains(b.timestamp));
    let first = inside.next()?;
    let (high, low) = inside.fold((first.high, first.low), |(h, l), b| {
        (h.max(b.high), l.min(b.low))
    });
    let size = high - low;
    Some(OpeningRange {
        high,
        low,
        size,
        points: size / point_size,
    })
}

/// A range size observation and the day it was seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeObservation {
    pub points: f64,
    pub date: NaiveDate,
}

/// Largest and smallest range seen during a run, rejected ranges included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeExtremes {
    pub max: Option<RangeObservation>,
    pub min: Option<RangeObservation>,
}

impl RangeExtremes {
    /// Record one range. Returns `(new_max, new_min)`.
    pub fn observe(&mut self, points: f64, date: NaiveDate) -> (bool, bool) {
        let obs = RangeObservation { points, date };
        let new_max = self.max.map_or(true, |m| points > m.points);
        let new_min = self.min.map_or(true, |m| points < m.points);
        if new_max {
            self.max = Some(obs);
        }
        if new_min {
            self.min = Some(obs);
        }
        (new_max, new_min)
    }
}
