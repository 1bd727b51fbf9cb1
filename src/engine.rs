//! # Sentiment Engine
//! Facade over the pipeline stages. Each operation runs its stages one after
//! another and returns a value; nothing here raises past the boundary.
//!
//! - `analyze_lexicon`: fetch → clean + lexicon score → summarize
//! - `analyze_blended`: fetch → preprocess + blended score → (quality filter) → summarize
//! - `trend`: fetch → score → daily resample → moving average → classify
//! - `current_price` / `historical_prices`: retrying market-data queries

use anyhow::Result;
use metrics::{describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::analyze::{
    score_posts, BlendedScorer, LexiconScorer, QualityFilter, ScoredPost, ScorerKind,
    SentimentScorer,
};
use crate::config::SentimentConfig;
use crate::ingest::types::{PostSource, TimeFilter};
use crate::ingest::PostCollector;
use crate::market::{
    Interval, MarketDataSource, Period, PriceFetcher, PriceHistory, PriceResult, RetryPolicy,
    Sleeper,
};
use crate::resources::SentimentResources;
use crate::summary::{summarize, PipelineResult, SentimentSummary};
use crate::text::TextCleaner;
use crate::trend::{TrendAggregator, TrendResult};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_histogram!(
            "pipeline_run_ms",
            "End-to-end pipeline run time in milliseconds, by operation."
        );
    });
}

pub struct SentimentEngine {
    collector: PostCollector,
    lexicon: LexiconScorer,
    blended: BlendedScorer,
    quality: QualityFilter,
    aggregator: TrendAggregator,
    prices: PriceFetcher,
    cfg: SentimentConfig,
}

impl SentimentEngine {
    /// Fails only if the configured allowed-character class is not a valid regex.
    pub fn new(
        posts: Arc<dyn PostSource>,
        market: Arc<dyn MarketDataSource>,
        sleeper: Arc<dyn Sleeper>,
        resources: Arc<SentimentResources>,
        cfg: SentimentConfig,
    ) -> Result<Self> {
        ensure_metrics_described();
        let cfg = cfg.sanitized();
        let cleaner = TextCleaner::new(&cfg.text.allowed)?;
        Ok(Self {
            collector: PostCollector::new(posts),
            lexicon: LexiconScorer::new(Arc::clone(&resources), cleaner),
            blended: BlendedScorer::new(Arc::clone(&resources)),
            quality: QualityFilter::new(resources, cfg.quality.threshold),
            aggregator: TrendAggregator::new(&cfg.trend),
            prices: PriceFetcher::new(market, sleeper, RetryPolicy::from_cfg(&cfg.prices)),
            cfg,
        })
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.cfg
    }

    /// Lexicon path: every fetched post is scored and summarised, no filtering.
    pub async fn analyze_lexicon(
        &self,
        symbol: &str,
        time_filter: TimeFilter,
    ) -> PipelineResult<SentimentSummary> {
        let t0 = Instant::now();
        let symbol = normalize_symbol(symbol);
        let scored = self
            .scored(&symbol, time_filter, ScorerKind::Lexicon, self.cfg.reddit.default_limit)
            .await;
        let out = summarize(&symbol, &scored, time_filter);
        log_summary("analyze_lexicon", &symbol, &out, t0);
        out
    }

    /// Blended path; `limit` caps the fetch (the configured default is 50).
    pub async fn analyze_blended(
        &self,
        symbol: &str,
        time_filter: TimeFilter,
        limit: usize,
    ) -> PipelineResult<SentimentSummary> {
        let t0 = Instant::now();
        let symbol = normalize_symbol(symbol);
        let scored = self
            .scored(&symbol, time_filter, ScorerKind::Blended, limit)
            .await;
        let out = summarize(&symbol, &scored, time_filter);
        log_summary("analyze_blended", &symbol, &out, t0);
        out
    }

    pub async fn trend(&self, symbol: &str, time_filter: TimeFilter) -> TrendResult {
        self.trend_with(symbol, time_filter, ScorerKind::default())
            .await
    }

    pub async fn trend_with(
        &self,
        symbol: &str,
        time_filter: TimeFilter,
        kind: ScorerKind,
    ) -> TrendResult {
        let t0 = Instant::now();
        let symbol = normalize_symbol(symbol);
        let limit = match kind {
            ScorerKind::Lexicon => self.cfg.reddit.default_limit,
            ScorerKind::Blended => self.cfg.reddit.blended_limit,
        };
        let scored = self.scored(&symbol, time_filter, kind, limit).await;
        let result = self.aggregator.aggregate(&scored);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("pipeline_run_ms", "op" => "trend").record(ms);
        info!(
            target: "engine",
            symbol = %symbol,
            provider = self.collector.source_name(),
            scorer = ?kind,
            window = self.aggregator.window_size(),
            days = result.daily_sentiment.len(),
            trend = ?result.trend,
            current = result.current_sentiment,
            ms,
            "trend computed"
        );
        result
    }

    pub async fn current_price(&self, symbol: &str) -> PriceResult {
        let t0 = Instant::now();
        let symbol = normalize_symbol(symbol);
        let out = self.prices.get_current(&symbol).await;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("pipeline_run_ms", "op" => "current_price").record(ms);
        info!(
            target: "engine",
            symbol = %symbol,
            success = out.success,
            price = out.current_price,
            ms,
            "current price"
        );
        out
    }

    pub async fn historical_prices(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> PipelineResult<PriceHistory> {
        let symbol = normalize_symbol(symbol);
        match self.prices.get_historical(&symbol, period, interval).await {
            Ok(h) => PipelineResult::ok(h),
            Err(e) => PipelineResult::fail(e.to_string()),
        }
    }

    /// Fetch and score with one strategy. The quality filter runs only on the
    /// blended path and only when enabled in config.
    pub async fn scored(
        &self,
        symbol: &str,
        time_filter: TimeFilter,
        kind: ScorerKind,
        limit: usize,
    ) -> Vec<ScoredPost> {
        let posts = self.collector.fetch(symbol, limit, time_filter).await;
        if posts.is_empty() {
            return Vec::new();
        }
        let scorer: &dyn SentimentScorer = match kind {
            ScorerKind::Lexicon => &self.lexicon,
            ScorerKind::Blended => &self.blended,
        };
        let scored = score_posts(scorer, posts);
        match kind {
            ScorerKind::Blended if self.cfg.quality.enabled_for_blended => {
                self.quality.filter(scored)
            }
            _ => scored,
        }
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

fn log_summary(op: &'static str, symbol: &str, out: &PipelineResult<SentimentSummary>, t0: Instant) {
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("pipeline_run_ms", "op" => op).record(ms);
    match &out.data {
        Some(s) => info!(
            target: "engine",
            op,
            symbol,
            posts = s.post_count,
            avg = s.average_sentiment,
            ms,
            "summary ready"
        ),
        None => info!(
            target: "engine",
            op,
            symbol,
            error = out.error.as_deref().unwrap_or_default(),
            ms,
            "no summary"
        ),
    }
}
