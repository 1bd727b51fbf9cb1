// src/analyze/mod.rs
//! Per-post scoring.
//!
//! Two independent strategies, picked by the caller:
//! - `lexicon`: cleaned title + body → VADER compound, bounded in [-1, 1]
//! - `blended`: preprocessed body → compound blended with length/punctuation
//!   features, deliberately left unclamped
//!
//! They do not share a cleaning step and must not be chained.
//! `quality` scores informativeness and drops weak posts (blended path only).

pub mod blended;
pub mod lexicon;
pub mod quality;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ingest::types::Post;

pub use blended::BlendedScorer;
pub use lexicon::LexiconScorer;
pub use quality::QualityFilter;

/// Sign bucket of a sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    Positive,
    Negative,
    Neutral,
}

impl SentimentCategory {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            SentimentCategory::Positive
        } else if score < 0.0 {
            SentimentCategory::Negative
        } else {
            SentimentCategory::Neutral
        }
    }
}

/// A post plus the output of one scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    #[serde(flatten)]
    pub post: Post,
    pub sentiment: f64,
    pub sentiment_category: SentimentCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

impl ScoredPost {
    pub fn new(post: Post, sentiment: f64) -> Self {
        Self {
            post,
            sentiment,
            sentiment_category: SentimentCategory::from_score(sentiment),
            quality_score: None,
        }
    }

    /// Creation time for display, e.g. `2024-03-01 14:05:00`.
    pub fn created_at_label(&self) -> String {
        self.post.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Strategy seam: one score per post.
pub trait SentimentScorer: Send + Sync {
    fn score_post(&self, post: &Post) -> f64;
    fn name(&self) -> &'static str;
}

/// Which scorer a caller wants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Lexicon,
    Blended,
}

impl FromStr for ScorerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" => Ok(ScorerKind::Lexicon),
            "blended" | "ml" => Ok(ScorerKind::Blended),
            other => anyhow::bail!("unknown scorer `{other}` (expected lexicon|blended)"),
        }
    }
}

/// Score every post, preserving fetch order.
pub fn score_posts(scorer: &dyn SentimentScorer, posts: Vec<Post>) -> Vec<ScoredPost> {
    posts
        .into_iter()
        .map(|p| {
            let s = scorer.score_post(&p);
            crate::debug::dev_log_score(scorer.name(), &p.full_text(), s);
            ScoredPost::new(p, s)
        })
        .collect()
}
