//! # Trend Aggregation
//! Turns per-post sentiment into a daily series, smooths it with a trailing
//! moving average and classifies the last smoothed value.
//!
//! - Posts are bucketed by UTC calendar day and averaged per day.
//! - Days without posts are absent from the series (not zero).
//! - The moving average at day D covers the calendar days D-(w-1)..=D. It is
//!   defined only when every one of those days has posts; a gap leaves it
//!   undefined and no point is emitted.
//! - When the last day's average is undefined (too few days, or a gap inside
//!   the final window), `current_sentiment` is 0 and the trend is Neutral.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::analyze::ScoredPost;
use crate::config::TrendCfg;

pub const DEFAULT_WINDOW_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

/// One value of a day-indexed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub trend: Trend,
    pub daily_sentiment: Vec<DailyPoint>,
    pub moving_average: Vec<DailyPoint>,
    pub current_sentiment: f64,
}

impl TrendResult {
    /// Result for an empty collection.
    pub fn neutral() -> Self {
        Self {
            trend: Trend::Neutral,
            daily_sentiment: Vec::new(),
            moving_average: Vec::new(),
            current_sentiment: 0.0,
        }
    }
}

impl Default for TrendResult {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrendAggregator {
    window_size: usize,
    bullish_above: f64,
    bearish_below: f64,
}

impl Default for TrendAggregator {
    fn default() -> Self {
        Self::with_window(DEFAULT_WINDOW_SIZE)
    }
}

impl TrendAggregator {
    pub fn new(cfg: &TrendCfg) -> Self {
        Self {
            window_size: cfg.window_size.max(1),
            bullish_above: cfg.bullish_above,
            bearish_below: cfg.bearish_below,
        }
    }

    /// Default ±0.2 thresholds with a custom window.
    pub fn with_window(window_size: usize) -> Self {
        Self::new(&TrendCfg {
            window_size,
            ..TrendCfg::default()
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn aggregate(&self, posts: &[ScoredPost]) -> TrendResult {
        self.aggregate_samples(posts.iter().map(|sp| (sp.post.created_at, sp.sentiment)))
    }

    /// Same as [`aggregate`](Self::aggregate) over raw `(timestamp, sentiment)` pairs.
    /// Non-finite sentiments are skipped.
    pub fn aggregate_samples<I>(&self, samples: I) -> TrendResult
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        let daily = daily_means(samples);
        if daily.is_empty() {
            return TrendResult::neutral();
        }
        self.aggregate_daily(daily)
    }

    /// Classify an already resampled daily series. Points are sorted by date first.
    pub fn aggregate_daily(&self, mut daily: Vec<DailyPoint>) -> TrendResult {
        daily.sort_by_key(|p| p.date);
        let moving_average = rolling_mean(&daily, self.window_size);

        // defined only if the tail of the smoothed series lines up with the last day
        let current = match (moving_average.last(), daily.last()) {
            (Some(ma), Some(d)) if ma.date == d.date && ma.value.is_finite() => ma.value,
            _ => 0.0,
        };

        TrendResult {
            trend: self.classify(current),
            daily_sentiment: daily,
            moving_average,
            current_sentiment: current,
        }
    }

    pub fn classify(&self, value: f64) -> Trend {
        if value > self.bullish_above {
            Trend::Bullish
        } else if value < self.bearish_below {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }
}

/// Mean sentiment per UTC calendar day, ordered by date.
pub fn daily_means<I>(samples: I) -> Vec<DailyPoint>
where
    I: IntoIterator<Item = (DateTime<Utc>, f64)>,
{
    let mut buckets: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (ts, s) in samples {
        if !s.is_finite() {
            continue;
        }
        let e = buckets.entry(ts.date_naive()).or_insert((0.0, 0));
        e.0 += s;
        e.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(date, (sum, n))| DailyPoint {
            date,
            value: sum / n as f64,
        })
        .collect()
}

/// Trailing mean over a `window`-day calendar window ending on each present day.
/// Input must be date ordered with one point per day. A window with a missing
/// day is undefined and yields no point.
pub fn rolling_mean(series: &[DailyPoint], window: usize) -> Vec<DailyPoint> {
    let window = window.max(1);
    let span = Duration::days(window as i64 - 1);
    let mut buf: VecDeque<DailyPoint> = VecDeque::with_capacity(window);
    let mut sum = 0.0;
    let mut out = Vec::with_capacity(series.len().saturating_sub(window - 1));

    for p in series {
        buf.push_back(*p);
        sum += p.value;
        // drop everything older than the calendar window
        while let Some(front) = buf.front() {
            if front.date + span < p.date {
                sum -= front.value;
                buf.pop_front();
            } else {
                break;
            }
        }
        if buf.len() == window {
            out.push(DailyPoint {
                date: p.date,
                value: sum / window as f64,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn empty_is_neutral_zero() {
        let r = TrendAggregator::default().aggregate(&[]);
        assert_eq!(r, TrendResult::neutral());
        assert_eq!(r.trend, Trend::Neutral);
        assert!(r.daily_sentiment.is_empty());
        assert!(r.moving_average.is_empty());
        assert_eq!(r.current_sentiment, 0.0);
    }

    #[test]
    fn same_day_samples_are_averaged_and_gaps_stay_absent() {
        let samples = vec![
            (day(0), 0.5),
            (day(0) + Duration::hours(3), -0.1),
            (day(2), 0.4),
            (day(2), f64::NAN),
        ];
        let daily = daily_means(samples);
        assert_eq!(daily.len(), 2);
        assert!((daily[0].value - 0.2).abs() < 1e-12);
        assert_eq!(daily[1].date, day(2).date_naive());
        assert!((daily[1].value - 0.4).abs() < 1e-12);
    }

    #[test]
    fn seven_day_mildly_positive_series_is_bullish() {
        let vals = [0.3, 0.25, 0.3, 0.25, 0.3, 0.25, 0.3];
        let samples: Vec<_> = vals
            .iter()
            .enumerate()
            .map(|(i, v)| (day(i as i64), *v))
            .collect();
        let r = TrendAggregator::with_window(7).aggregate_samples(samples);
        assert_eq!(r.daily_sentiment.len(), 7);
        assert_eq!(r.moving_average.len(), 1);
        assert!(r.current_sentiment > 0.2);
        assert!((r.current_sentiment - 1.95 / 7.0).abs() < 1e-12);
        assert_eq!(r.trend, Trend::Bullish);
    }

    #[test]
    fn bearish_and_neutral_bands() {
        let agg = TrendAggregator::with_window(2);
        let bear = agg.aggregate_samples(vec![(day(0), -0.5), (day(1), -0.3)]);
        assert_eq!(bear.trend, Trend::Bearish);

        let flat = agg.aggregate_samples(vec![(day(0), 0.2), (day(1), 0.2)]);
        // exactly at the threshold is not above it
        assert_eq!(flat.trend, Trend::Neutral);
    }

    #[test]
    fn fewer_days_than_window_falls_back_to_zero() {
        let r = TrendAggregator::with_window(7)
            .aggregate_samples(vec![(day(0), 0.9), (day(1), 0.9), (day(2), 0.9)]);
        assert_eq!(r.daily_sentiment.len(), 3);
        assert!(r.moving_average.is_empty());
        assert_eq!(r.current_sentiment, 0.0);
        assert_eq!(r.trend, Trend::Neutral);
    }

    #[test]
    fn gaps_inside_the_window_leave_it_undefined() {
        // seven posting days spread over thirteen calendar days
        let samples: Vec<_> = (0..7).map(|i| (day(i * 2), 0.9)).collect();
        let r = TrendAggregator::with_window(7).aggregate_samples(samples);
        assert_eq!(r.daily_sentiment.len(), 7);
        assert!(r.moving_average.is_empty());
        assert_eq!(r.current_sentiment, 0.0);
        assert_eq!(r.trend, Trend::Neutral);
    }

    #[test]
    fn tail_follows_the_last_calendar_day() {
        // days 0..=2 are complete, then a gap before day 4
        let agg = TrendAggregator::with_window(3);
        let r = agg.aggregate_samples(vec![
            (day(0), 0.6),
            (day(1), 0.6),
            (day(2), 0.6),
            (day(4), 0.6),
        ]);
        assert_eq!(r.moving_average.len(), 1);
        assert_eq!(r.moving_average[0].date, day(2).date_naive());
        assert_eq!(r.current_sentiment, 0.0);
        assert_eq!(r.trend, Trend::Neutral);

        // window becomes complete again once days 4..=6 are all present
        let r = agg.aggregate_samples(vec![
            (day(0), 0.6),
            (day(2), 0.6),
            (day(4), 0.3),
            (day(5), 0.3),
            (day(6), 0.3),
        ]);
        let dates: Vec<_> = r.moving_average.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(6).date_naive()]);
        assert!((r.current_sentiment - 0.3).abs() < 1e-12);
        assert_eq!(r.trend, Trend::Bullish);
    }

    #[test]
    fn aggregate_daily_sorts_its_input() {
        let pts: Vec<DailyPoint> = [2, 0, 1]
            .iter()
            .map(|&i| DailyPoint {
                date: day(i).date_naive(),
                value: -0.5,
            })
            .collect();
        let r = TrendAggregator::with_window(3).aggregate_daily(pts);
        assert_eq!(r.daily_sentiment[0].date, day(0).date_naive());
        assert_eq!(r.moving_average.len(), 1);
        assert_eq!(r.trend, Trend::Bearish);
    }

    #[test]
    fn rolling_mean_slides() {
        let series: Vec<DailyPoint> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, v)| DailyPoint {
                date: day(i as i64).date_naive(),
                value: *v,
            })
            .collect();
        let ma = rolling_mean(&series, 2);
        let vals: Vec<f64> = ma.iter().map(|p| p.value).collect();
        assert_eq!(vals, vec![1.5, 2.5, 3.5]);
        assert_eq!(ma[0].date, series[1].date);
        assert_eq!(rolling_mean(&series, 1).len(), 4);
    }
}
