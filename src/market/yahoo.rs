// src/market/yahoo.rs
//! Yahoo Finance chart endpoint (`/v8/finance/chart/{symbol}`).
//!
//! One HTTP call per method; 429 maps to `SourceError::RateLimited`, every
//! other failure (connect, non-2xx, undecodable body) to `SourceError::Request`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::types::{Interval, MarketDataSource, Period, PriceHistory, Quote};
use crate::config::PricesCfg;
use crate::error::SourceError;

pub struct YahooSource {
    http: reqwest::Client,
    api_url: String,
}

impl YahooSource {
    pub fn new(cfg: &PricesCfg) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; stock-sentiment/0.1)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn chart(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<ChartResult, SourceError> {
        let url = format!("{}/v8/finance/chart/{}", self.api_url, symbol);
        let resp = self
            .http
            .get(&url)
            .query(&[("range", period.as_str()), ("interval", interval.as_str())])
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(SourceError::Request(format!("HTTP {status} for {symbol}")));
        }

        let env: ChartEnvelope = resp
            .json()
            .await
            .map_err(|e| SourceError::Request(format!("decoding chart: {e}")))?;
        env.chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| SourceError::Request(format!("empty chart result for {symbol}")))
    }
}

#[async_trait]
impl MarketDataSource for YahooSource {
    async fn quote(&self, symbol: &str) -> Result<Quote, SourceError> {
        let res = self.chart(symbol, Period::OneDay, Interval::OneDay).await?;
        Ok(Quote {
            current_price: res.meta.regular_market_price.filter(|p| p.is_finite()),
            currency: res.meta.currency,
        })
    }

    async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceHistory, SourceError> {
        let res = self.chart(symbol, period, interval).await?;
        Ok(history_from_chart(res))
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Bars>,
}

#[derive(Debug, Default, Deserialize)]
struct Bars {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Rows without a close are dropped; a missing volume reads as 0.
fn history_from_chart(res: ChartResult) -> PriceHistory {
    let bars = res
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();

    let mut out = PriceHistory::default();
    for (i, ts) in res.timestamp.iter().enumerate() {
        let Some(close) = bars.close.get(i).copied().flatten() else {
            continue;
        };
        let Some(date) = DateTime::<Utc>::from_timestamp(*ts, 0) else {
            continue;
        };
        let volume = bars
            .volume
            .get(i)
            .copied()
            .flatten()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0);
        out.dates.push(date);
        out.prices.push(close);
        out.volume.push(volume as u64);
    }
    out
}
