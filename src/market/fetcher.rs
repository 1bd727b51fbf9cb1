// src/market/fetcher.rs
//! # Price Fetcher
//! Bounded retry around a [`MarketDataSource`].
//!
//! Per attempt:
//! - attempt > 0 sleeps `delay` first (through the injected [`Sleeper`])
//! - 429 is retried until the last attempt, which ends in `RateLimited`
//! - any other request failure ends immediately in `Request`
//! - a quote without a price ends in `Unavailable` and is never retried
//!
//! With a deadline set, a sleep that would overshoot it ends the loop in
//! `DeadlineExceeded`, and each attempt is cut at the remaining budget.

use async_trait::async_trait;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::types::{Interval, MarketDataSource, Period, PriceHistory, PriceResult};
use crate::config::PricesCfg;
use crate::error::{PriceError, SourceError};

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, d: Duration);
}

/// Real wall-clock wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, d: Duration) {
        tokio::time::sleep(d).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_tries: u32,
    pub delay: Duration,
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 5,
            delay: Duration::from_secs(6),
            deadline: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_tries: u32, delay: Duration) -> Self {
        Self {
            max_tries,
            delay,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn from_cfg(cfg: &PricesCfg) -> Self {
        Self {
            max_tries: cfg.max_tries,
            delay: cfg.delay(),
            deadline: cfg.deadline(),
        }
    }
}

static METRICS_DESCRIBED: OnceCell<()> = OnceCell::new();

pub fn ensure_metrics_described() {
    METRICS_DESCRIBED.get_or_init(|| {
        describe_counter!(
            "price_attempts_total",
            "Upstream market-data requests made, retries included."
        );
        describe_counter!(
            "price_rate_limited_total",
            "Upstream answers with HTTP 429."
        );
        describe_counter!(
            "price_failures_total",
            "Price queries that ended without data, labelled by kind."
        );
    });
}

pub struct PriceFetcher {
    source: Arc<dyn MarketDataSource>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl PriceFetcher {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
    ) -> Self {
        ensure_metrics_described();
        Self {
            source,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Current price with the configured policy, as a value.
    pub async fn get_current(&self, symbol: &str) -> PriceResult {
        self.get_current_with(symbol, self.policy).await
    }

    pub async fn get_current_with(&self, symbol: &str, policy: RetryPolicy) -> PriceResult {
        match self.try_current(symbol, policy).await {
            Ok((price, currency)) => PriceResult::ok(price, currency),
            Err(e) => PriceResult::fail(&e),
        }
    }

    /// `(price, currency)` or the terminal error.
    pub async fn try_current(
        &self,
        symbol: &str,
        policy: RetryPolicy,
    ) -> Result<(f64, Option<String>), PriceError> {
        let src = Arc::clone(&self.source);
        let quote = self
            .with_retry(symbol, policy, || {
                let src = Arc::clone(&src);
                let symbol = symbol.to_string();
                async move { src.quote(&symbol).await }
            })
            .await?;

        match quote.current_price {
            Some(p) => Ok((p, quote.currency)),
            None => Err(self.failed(PriceError::Unavailable {
                symbol: symbol.to_string(),
            })),
        }
    }

    pub async fn get_historical(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceHistory, PriceError> {
        self.get_historical_with(symbol, period, interval, self.policy)
            .await
    }

    pub async fn get_historical_with(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
        policy: RetryPolicy,
    ) -> Result<PriceHistory, PriceError> {
        let src = Arc::clone(&self.source);
        let history = self
            .with_retry(symbol, policy, || {
                let src = Arc::clone(&src);
                let symbol = symbol.to_string();
                async move { src.history(&symbol, period, interval).await }
            })
            .await?;

        if history.is_empty() {
            return Err(self.failed(PriceError::HistoryUnavailable {
                symbol: symbol.to_string(),
            }));
        }
        Ok(history)
    }

    async fn with_retry<T, F, Fut>(
        &self,
        symbol: &str,
        policy: RetryPolicy,
        mut op: F,
    ) -> Result<T, PriceError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, SourceError>> + Send,
        T: Send,
    {
        let max_tries = policy.max_tries.max(1);
        let started = Instant::now();
        let deadline_hit = || PriceError::DeadlineExceeded {
            symbol: symbol.to_string(),
        };

        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                if let Some(deadline) = policy.deadline {
                    if started.elapsed() + policy.delay > deadline {
                        warn!(target: "market", symbol, attempt, "retry budget exhausted");
                        return Err(self.failed(deadline_hit()));
                    }
                }
                self.sleeper.sleep(policy.delay).await;
            }

            counter!("price_attempts_total", "source" => self.source.name()).increment(1);
            let outcome = match policy.deadline {
                Some(deadline) => {
                    let Some(left) = deadline.checked_sub(started.elapsed()) else {
                        return Err(self.failed(deadline_hit()));
                    };
                    match tokio::time::timeout(left, op()).await {
                        Ok(r) => r,
                        Err(_) => return Err(self.failed(deadline_hit())),
                    }
                }
                None => op().await,
            };

            match outcome {
                Ok(v) => {
                    debug!(target: "market", symbol, attempts = attempt + 1, "price data fetched");
                    return Ok(v);
                }
                Err(SourceError::RateLimited) if attempt == max_tries - 1 => {
                    counter!("price_rate_limited_total").increment(1);
                    warn!(target: "market", symbol, max_tries, "rate limited on final attempt");
                    return Err(self.failed(PriceError::RateLimited));
                }
                Err(SourceError::RateLimited) => {
                    counter!("price_rate_limited_total").increment(1);
                    warn!(
                        target: "market",
                        symbol,
                        attempt = attempt + 1,
                        max_tries,
                        "rate limited, retrying"
                    );
                }
                Err(SourceError::Request(e)) => {
                    warn!(target: "market", symbol, error = %e, "price request failed");
                    return Err(self.failed(PriceError::Request {
                        symbol: symbol.to_string(),
                    }));
                }
            }
            attempt += 1;
        }
    }

    fn failed(&self, e: PriceError) -> PriceError {
        counter!("price_failures_total", "kind" => e.kind()).increment(1);
        e
    }
}
