// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{Post, PostSource, TimeFilter};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// One-time metrics registration (so series show up on the exporter).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("posts_fetched_total", "Posts returned by the post source.");
        describe_counter!(
            "post_fetch_errors_total",
            "Collection-level failures (auth, network, decode)."
        );
        describe_counter!(
            "posts_skipped_total",
            "Individual posts skipped because they could not be decoded."
        );
        describe_histogram!("post_fetch_ms", "Post collection time in milliseconds.");
    });
}

/// Search query sent upstream for a symbol.
pub fn search_query(symbol: &str) -> String {
    format!("{} stock", symbol.trim())
}

/// Collects posts mentioning a symbol. Failures never escape: they are logged
/// and turned into an empty collection, same as "no results".
#[derive(Clone)]
pub struct PostCollector {
    source: Arc<dyn PostSource>,
}

impl PostCollector {
    pub fn new(source: Arc<dyn PostSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub async fn fetch(&self, symbol: &str, limit: usize, time_filter: TimeFilter) -> Vec<Post> {
        ensure_metrics_described();
        if limit == 0 {
            return Vec::new();
        }

        let query = search_query(symbol);
        let t0 = std::time::Instant::now();
        let result = self.source.search(&query, limit, time_filter).await;
        histogram!("post_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        match result {
            Ok(mut posts) => {
                posts.truncate(limit);
                counter!("posts_fetched_total").increment(posts.len() as u64);
                tracing::info!(
                    target: "ingest",
                    symbol,
                    provider = self.source.name(),
                    %time_filter,
                    fetched = posts.len(),
                    "posts collected"
                );
                posts
            }
            Err(e) => {
                tracing::error!(
                    target: "ingest",
                    error = ?e,
                    symbol,
                    provider = self.source.name(),
                    "error fetching posts"
                );
                counter!("post_fetch_errors_total").increment(1);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    struct Recording {
        calls: Mutex<Vec<(String, usize, TimeFilter)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl PostSource for Recording {
        async fn search(&self, query: &str, limit: usize, tf: TimeFilter) -> Result<Vec<Post>> {
            self.calls.lock().unwrap().push((query.to_string(), limit, tf));
            if self.fail {
                anyhow::bail!("401 unauthorized");
            }
            let p = Post {
                title: "t".into(),
                body: "b".into(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                permalink: "https://www.reddit.com/r/stocks/x".into(),
                source: "stocks".into(),
                score: 1,
                num_comments: 0,
            };
            Ok(vec![p; limit + 2])
        }
        fn name(&self) -> &'static str {
            "recording"
        }
    }

    #[test]
    fn query_is_symbol_plus_stock() {
        assert_eq!(search_query(" AAPL "), "AAPL stock");
    }

    #[tokio::test]
    async fn passes_query_and_caps_to_limit() {
        let src = Arc::new(Recording {
            calls: Mutex::new(vec![]),
            fail: false,
        });
        let c = PostCollector::new(src.clone());
        let out = c.fetch("TSLA", 3, TimeFilter::Week).await;
        assert_eq!(out.len(), 3);
        let calls = src.calls.lock().unwrap();
        assert_eq!(calls[0], ("TSLA stock".to_string(), 3, TimeFilter::Week));
    }

    #[tokio::test]
    async fn failure_becomes_empty() {
        let src = Arc::new(Recording {
            calls: Mutex::new(vec![]),
            fail: true,
        });
        let c = PostCollector::new(src);
        assert!(c.fetch("TSLA", 10, TimeFilter::Month).await.is_empty());
    }

    #[test]
    fn time_filter_parses_and_displays() {
        assert_eq!("Week".parse::<TimeFilter>().unwrap(), TimeFilter::Week);
        assert_eq!(TimeFilter::Year.to_string(), "year");
        assert!("day".parse::<TimeFilter>().is_err());
        assert_eq!(TimeFilter::default(), TimeFilter::Month);
    }
}
