// src/config/sentiment.rs
//! Pipeline configuration loaded from TOML.
//!
//! Resolution order:
//! 1) `$SENTIMENT_CONFIG_PATH` (must exist)
//! 2) `config/sentiment.toml`
//! 3) built-in defaults
//!
//! Every field carries a serde default, so a partial file is fine.
//! Reddit credentials are never read from the file, only from the environment.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";
pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub reddit: RedditCfg,
    #[serde(default)]
    pub prices: PricesCfg,
    #[serde(default)]
    pub quality: QualityCfg,
    #[serde(default)]
    pub trend: TrendCfg,
    #[serde(default)]
    pub text: TextCfg,
    #[serde(default)]
    pub resources: ResourcesCfg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCfg {
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
    /// Fetch limit for the lexicon path and trend.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Fetch limit for the blended path.
    #[serde(default = "default_blended_limit")]
    pub blended_limit: usize,
    #[serde(default = "default_reddit_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_reddit_api_url")]
    pub api_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesCfg {
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// Ceiling on the whole retry loop. `None` disables it.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: Option<u64>,
    #[serde(default = "default_prices_api_url")]
    pub api_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityCfg {
    #[serde(default = "default_quality_threshold")]
    pub threshold: f64,
    /// Drop low-quality posts before summarising the blended path.
    #[serde(default)]
    pub enabled_for_blended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendCfg {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_bullish_above")]
    pub bullish_above: f64,
    #[serde(default = "default_bearish_below")]
    pub bearish_below: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextCfg {
    /// Body of a regex character class; everything outside it is stripped.
    #[serde(default = "default_allowed_chars")]
    pub allowed: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcesCfg {
    /// Newline separated stopword list. Embedded English list if absent.
    #[serde(default)]
    pub stopwords_path: Option<PathBuf>,
}

fn default_subreddits() -> Vec<String> {
    vec![
        "stocks".to_string(),
        "investing".to_string(),
        "wallstreetbets".to_string(),
    ]
}
fn default_limit() -> usize {
    100
}
fn default_blended_limit() -> usize {
    50
}
fn default_reddit_auth_url() -> String {
    "https://www.reddit.com/api/v1/access_token".to_string()
}
fn default_reddit_api_url() -> String {
    "https://oauth.reddit.com".to_string()
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_max_tries() -> u32 {
    5
}
fn default_delay_secs() -> u64 {
    6
}
fn default_deadline_secs() -> Option<u64> {
    Some(60)
}
fn default_prices_api_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_quality_threshold() -> f64 {
    0.5
}
fn default_window_size() -> usize {
    7
}
fn default_bullish_above() -> f64 {
    0.2
}
fn default_bearish_below() -> f64 {
    -0.2
}
fn default_allowed_chars() -> String {
    r"A-Za-z0-9\s".to_string()
}

impl Default for RedditCfg {
    fn default() -> Self {
        Self {
            subreddits: default_subreddits(),
            default_limit: default_limit(),
            blended_limit: default_blended_limit(),
            auth_url: default_reddit_auth_url(),
            api_url: default_reddit_api_url(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for PricesCfg {
    fn default() -> Self {
        Self {
            max_tries: default_max_tries(),
            delay_secs: default_delay_secs(),
            deadline_secs: default_deadline_secs(),
            api_url: default_prices_api_url(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for QualityCfg {
    fn default() -> Self {
        Self {
            threshold: default_quality_threshold(),
            enabled_for_blended: false,
        }
    }
}

impl Default for TrendCfg {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            bullish_above: default_bullish_above(),
            bearish_below: default_bearish_below(),
        }
    }
}

impl Default for TextCfg {
    fn default() -> Self {
        Self {
            allowed: default_allowed_chars(),
        }
    }
}

impl PricesCfg {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Overall retry ceiling. `deadline_secs = 0` turns it off.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}

impl SentimentConfig {
    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default().sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sentiment config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing sentiment config at {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: SentimentConfig = toml::from_str(s)?;
        Ok(cfg.sanitized())
    }

    /// Clamp values that would otherwise break the pipeline.
    pub fn sanitized(mut self) -> Self {
        if self.prices.max_tries == 0 {
            self.prices.max_tries = 1;
        }
        if self.trend.window_size == 0 {
            self.trend.window_size = 1;
        }
        if !self.quality.threshold.is_finite() {
            self.quality.threshold = default_quality_threshold();
        }
        if self.trend.bullish_above < self.trend.bearish_below {
            std::mem::swap(&mut self.trend.bullish_above, &mut self.trend.bearish_below);
        }
        self.reddit.subreddits = self
            .reddit
            .subreddits
            .into_iter()
            .map(|s| s.trim().trim_start_matches("r/").to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if self.reddit.subreddits.is_empty() {
            self.reddit.subreddits = default_subreddits();
        }
        self
    }
}
