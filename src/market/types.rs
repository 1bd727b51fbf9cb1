// src/market/types.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PriceError, SourceError};

/// Raw quote as the upstream returned it; the price may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    pub current_price: Option<f64>,
    pub currency: Option<String>,
}

/// OHLCV closes/volumes addressed by (period, interval).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    pub dates: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
    pub volume: Vec<u64>,
}

impl PriceHistory {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Upstream market-data API. One call = one attempt; retries live in the fetcher.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote, SourceError>;
    async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceHistory, SourceError>;
    fn name(&self) -> &'static str;
}

/// Outcome of one current-price query, by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub success: bool,
    pub current_price: Option<f64>,
    pub currency: Option<String>,
    pub error: Option<String>,
    /// Short failure label (`rate_limited`, `unavailable`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl PriceResult {
    pub fn ok(price: f64, currency: Option<String>) -> Self {
        Self {
            success: true,
            current_price: Some(price),
            currency,
            error: None,
            failure: None,
        }
    }

    pub fn fail(err: &PriceError) -> Self {
        Self {
            success: false,
            current_price: None,
            currency: None,
            error: Some(err.to_string()),
            failure: Some(err.kind().to_string()),
        }
    }
}

macro_rules! str_enum {
    ($(#[$m:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$m])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> anyhow::Result<Self> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| anyhow::anyhow!(concat!("unknown ", stringify!($name), " `{}`"), s))
            }
        }
    };
}

str_enum!(
    /// Lookback range for historical prices.
    Period {
        OneDay => "1d",
        FiveDays => "5d",
        OneMonth => "1mo",
        ThreeMonths => "3mo",
        SixMonths => "6mo",
        OneYear => "1y",
        TwoYears => "2y",
        FiveYears => "5y",
        YearToDate => "ytd",
        Max => "max",
    }
);

str_enum!(
    /// Bar size for historical prices.
    Interval {
        OneMinute => "1m",
        FiveMinutes => "5m",
        FifteenMinutes => "15m",
        ThirtyMinutes => "30m",
        OneHour => "1h",
        OneDay => "1d",
        OneWeek => "1wk",
        OneMonth => "1mo",
    }
);

impl Default for Period {
    fn default() -> Self {
        Period::OneMonth
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::OneDay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_and_interval_round_trip_strings() {
        assert_eq!("1MO".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!(Interval::OneWeek.to_string(), "1wk");
        assert!("2w".parse::<Interval>().is_err());
        assert_eq!(
            serde_json::to_string(&Period::YearToDate).unwrap(),
            "\"ytd\""
        );
    }

    #[test]
    fn price_result_from_error_carries_message_and_kind() {
        let r = PriceResult::fail(&PriceError::RateLimited);
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("Rate limit exceeded. Try again later"));
        assert_eq!(r.failure.as_deref(), Some("rate_limited"));
    }
}
