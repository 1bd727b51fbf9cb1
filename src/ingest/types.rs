// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One social post as fetched. Never mutated downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub permalink: String, // absolute URL
    pub source: String,    // community label, e.g. "wallstreetbets"
    /// Engagement (net upvotes).
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
}

impl Post {
    /// Title and body joined the way the lexicon path scores them.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

/// Lookback window for collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Week,
    #[default]
    Month,
    Year,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            other => anyhow::bail!("unknown time filter `{other}` (expected week|month|year)"),
        }
    }
}

/// Upstream search API for posts.
#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    async fn search(&self, query: &str, limit: usize, time_filter: TimeFilter)
        -> Result<Vec<Post>>;
    fn name(&self) -> &'static str;
}
