// src/resources.rs
//! Process-wide scoring resources: the VADER valence lexicon and a stopword list.
//!
//! Built once at startup and shared via `Arc` into every scorer. A missing or
//! empty stopword file is a startup error, never a per-request one.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::config::ResourcesCfg;

const EMBEDDED_STOPWORDS: &str = include_str!("../resources/stopwords_en.txt");

/// Shared, read-only lexicon + stopwords.
pub struct SentimentResources {
    analyzer: SentimentIntensityAnalyzer<'static>,
    stopwords: HashSet<String>,
}

impl fmt::Debug for SentimentResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentResources")
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

impl SentimentResources {
    /// Load according to config: explicit stopword path or the embedded list.
    pub fn load(cfg: &ResourcesCfg) -> Result<Arc<Self>> {
        let res = match &cfg.stopwords_path {
            Some(p) => Self::from_stopwords_file(p)?,
            None => Self::from_stopwords_str(EMBEDDED_STOPWORDS)?,
        };
        info!(stopwords = res.stopwords.len(), "sentiment resources loaded");
        Ok(Arc::new(res))
    }

    /// Embedded resources (no I/O). Handy for tests and tools.
    pub fn embedded() -> Arc<Self> {
        Arc::new(
            Self::from_stopwords_str(EMBEDDED_STOPWORDS)
                .expect("embedded stopword list is non-empty"),
        )
    }

    pub fn from_stopwords_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading stopwords from {}", path.display()))?;
        Self::from_stopwords_str(&raw)
            .with_context(|| format!("loading stopwords from {}", path.display()))
    }

    pub fn from_stopwords_str(raw: &str) -> Result<Self> {
        let stopwords: HashSet<String> = raw
            .lines()
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        if stopwords.is_empty() {
            bail!("stopword list is empty");
        }
        Ok(Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            stopwords,
        })
    }

    /// VADER compound polarity in [-1, 1]. Blank text scores 0.
    pub fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        let c = scores.get("compound").copied().unwrap_or(0.0);
        if c.is_finite() {
            c.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }
}
