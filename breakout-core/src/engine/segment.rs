//! Day segmentation: partitions an ordered bar series into calendar days.

use chrono::NaiveDate;

use crate::domain::Bar;

/// One calendar day of bars, borrowed from the full series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySlice<'a> {
    pub date: NaiveDate,
    pub bars: &'a [Bar],
}

/// Lazy, single-pass iterator over consecutive equal-date runs of `bars`.
///
/// Never yields an empty day. Calling `segment_days` again starts a fresh pass.
pub fn segment_days(bars: &[Bar]) -> DaySegments<'_> {
    DaySegments { rest: bars }
}

#[derive(Debug, Clone)]
pub struct DaySegments<'a> {
    rest: &'a [Bar],
}

impl<'a> Iterator for DaySegments<'a> {
    type Item = DaySlice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.rest.first()?.date();
        let len = self
            .rest
            .iter()
            .position(|b| b.date() != date)
            .unwrap_or(self.rest.len());
        let (day, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(DaySlice { date, bars: day })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_at(day: u32, hour: u32) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2020, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 0.0,
        }
    }

    #[test]
    fn empty_series_yields_nothing() {
        assert_eq!(segment_days(&[]).count(), 0);
    }

    #[test]
    fn groups_consecutive_dates_in_order() {
        let bars = vec![bar_at(6, 1), bar_at(6, 2), bar_at(7, 1), bar_at(9, 5), bar_at(9, 6)];
        let days: Vec<_> = segment_days(&bars).collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].bars.len(), 2);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2020, 1, 7).unwrap());
        assert_eq!(days[2].bars, &bars[3..]);
    }

    #[test]
    fn fresh_pass_resegments() {
        let bars = vec![bar_at(6, 1), bar_at(7, 1)];
        assert_eq!(segment_days(&bars).count(), 2);
        assert_eq!(segment_days(&bars).count(), 2);
    }
}
