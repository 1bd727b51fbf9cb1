// src/lib.rs
// Public library surface for the probe binary and integration tests.

pub mod config;
pub mod error;
pub mod resources;
pub mod text;

// Collection and scoring
pub mod analyze;
pub mod ingest;

// Aggregation
pub mod summary;
pub mod trend;

pub mod engine;
pub mod market;

pub mod debug;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{ScoredPost, ScorerKind, SentimentCategory};
pub use crate::config::SentimentConfig;
pub use crate::engine::SentimentEngine;
pub use crate::error::{PriceError, SourceError};
pub use crate::ingest::types::{Post, PostSource, TimeFilter};
pub use crate::market::{MarketDataSource, PriceResult};
pub use crate::summary::{PipelineResult, SentimentSummary};
pub use crate::trend::{Trend, TrendResult};

use std::sync::Arc;
use tracing::info;

use crate::ingest::providers::{RedditCredentials, RedditSource};
use crate::market::{TokioSleeper, YahooSource};
use crate::resources::SentimentResources;

/// Build an engine against the live Reddit and Yahoo endpoints.
///
/// Loads the lexicon/stopword resources named by `cfg`. A resource failure is
/// fatal here, not per request. Install a metrics recorder before calling this
/// so the metric descriptions land in it.
/// ```ignore
/// let cfg = SentimentConfig::load_default()?;
/// let engine = stock_sentiment::build_live_engine(cfg)?;
/// let summary = engine.analyze_lexicon("AAPL", TimeFilter::Month).await;
/// ```
pub fn build_live_engine(cfg: SentimentConfig) -> anyhow::Result<SentimentEngine> {
    let resources = SentimentResources::load(&cfg.resources)?;
    let reddit = RedditSource::new(RedditCredentials::from_env()?, &cfg.reddit)?;
    let yahoo = YahooSource::new(&cfg.prices)?;
    info!(
        subreddits = ?cfg.reddit.subreddits,
        stopwords = resources.stopword_count(),
        "live engine ready"
    );
    SentimentEngine::new(
        Arc::new(reddit),
        Arc::new(yahoo),
        Arc::new(TokioSleeper),
        resources,
        cfg,
    )
}
