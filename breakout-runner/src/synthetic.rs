//! Deterministic synthetic bars for demos, tests and benchmarks.
//!
//! A seeded random walk around 1950.0 with intraday bars on weekdays only.
//! The same `(start, days, step_minutes, seed)` always yields the same series.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use breakout_core::domain::Bar;

const START_PRICE: f64 = 1950.0;

/// Generate `days` weekdays of bars from `start`, one bar every `step_minutes`.
pub fn synthetic_bars(start: NaiveDate, days: usize, step_minutes: u32, seed: u64) -> Vec<Bar> {
    let step = i64::from(step_minutes.max(1));
    let bars_per_day = (24 * 60 + step - 1) / step;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut bars = Vec::with_capacity(days * bars_per_day as usize);
    let mut price = START_PRICE;
    let mut date = start;
    let mut produced = 0;

    while produced < days {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += Duration::days(1);
            continue;
        }
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        for i in 0..bars_per_day {
            let open = price;
            let close = open + rng.gen_range(-0.35..0.35);
            let high = open.max(close) + rng.gen_range(0.0..0.25);
            let low = open.min(close) - rng.gen_range(0.0..0.25);
            bars.push(Bar {
                timestamp: midnight + Duration::minutes(i * step),
                open,
                high,
                low,
                close,
                volume: f64::from(rng.gen_range(100u32..5_000)),
            });
            price = close;
        }
        produced += 1;
        date += Duration::days(1);
    }

    bars
}
