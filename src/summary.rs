//! Aggregate view over one scored collection, plus the tagged
//! result shape handed across the pipeline boundary.
//!
//! Nothing here errors: empty input is a `success: false` value, not a panic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyze::{ScoredPost, SentimentCategory};
use crate::ingest::types::TimeFilter;

pub const TOP_POSTS: usize = 5;

/// `{success, data, error}`; callers branch on `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> PipelineResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(d)) => Ok(d),
            _ => Err(self.error.unwrap_or_else(|| "unknown failure".to_string())),
        }
    }
}

/// One row of the top-posts list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPost {
    pub title: String,
    pub score: f64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub symbol: String,
    pub average_sentiment: f64,
    /// Only categories that occur are present.
    pub distribution: BTreeMap<SentimentCategory, usize>,
    pub post_count: usize,
    pub top_posts: Vec<TopPost>,
    pub time_filter: TimeFilter,
}

impl SentimentSummary {
    pub fn count(&self, cat: SentimentCategory) -> usize {
        self.distribution.get(&cat).copied().unwrap_or(0)
    }
}

pub fn no_posts_message(symbol: &str) -> String {
    format!("No posts found for {symbol}")
}

/// Average, category counts and top posts of a scored collection.
pub fn summarize(
    symbol: &str,
    posts: &[ScoredPost],
    time_filter: TimeFilter,
) -> PipelineResult<SentimentSummary> {
    if posts.is_empty() {
        return PipelineResult::fail(no_posts_message(symbol));
    }

    let sum: f64 = posts.iter().map(|p| p.sentiment).sum();
    let average_sentiment = sum / posts.len() as f64;

    let mut distribution = BTreeMap::new();
    for p in posts {
        *distribution.entry(p.sentiment_category).or_insert(0) += 1;
    }

    PipelineResult::ok(SentimentSummary {
        symbol: symbol.to_string(),
        average_sentiment,
        distribution,
        post_count: posts.len(),
        top_posts: top_posts(posts, TOP_POSTS),
        time_filter,
    })
}

/// Highest scores first; equal scores keep fetch order (stable sort).
pub fn top_posts(posts: &[ScoredPost], n: usize) -> Vec<TopPost> {
    let mut ranked: Vec<&ScoredPost> = posts.iter().collect();
    ranked.sort_by(|a, b| b.sentiment.total_cmp(&a.sentiment));
    ranked
        .into_iter()
        .take(n)
        .map(|p| TopPost {
            title: p.post.title.clone(),
            score: p.sentiment,
            url: p.post.permalink.clone(),
        })
        .collect()
}
