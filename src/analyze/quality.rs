// src/analyze/quality.rs
//! Informativeness heuristic in [0, 1], built from three bounded parts:
//! - body of at least 100 chars      → +0.25
//! - engagement (score) above 10     → +0.25
//! - |compound(body)| * 0.5          → up to +0.5
//!
//! Posts at or below the threshold (default 0.5) are dropped.

use metrics::counter;
use std::sync::Arc;

use super::ScoredPost;
use crate::ingest::types::Post;
use crate::resources::SentimentResources;

pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.5;

const MIN_SUBSTANTIVE_CHARS: usize = 100;
const LENGTH_BONUS: f64 = 0.25;
const MIN_ENGAGEMENT: i64 = 10;
const ENGAGEMENT_BONUS: f64 = 0.25;
const INTENSITY_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct QualityFilter {
    resources: Arc<SentimentResources>,
    threshold: f64,
}

impl QualityFilter {
    pub fn new(resources: Arc<SentimentResources>, threshold: f64) -> Self {
        Self {
            resources,
            threshold,
        }
    }

    pub fn quality_score(&self, post: &Post) -> f64 {
        let mut qs = 0.0;
        if post.body.chars().count() >= MIN_SUBSTANTIVE_CHARS {
            qs += LENGTH_BONUS;
        }
        if post.score > MIN_ENGAGEMENT {
            qs += ENGAGEMENT_BONUS;
        }
        let intensity = self.resources.compound(&post.body).abs().min(1.0);
        qs + intensity * INTENSITY_WEIGHT
    }

    /// Annotate every post with its quality score and keep those above threshold.
    pub fn filter(&self, posts: Vec<ScoredPost>) -> Vec<ScoredPost> {
        let before = posts.len();
        let kept: Vec<ScoredPost> = posts
            .into_iter()
            .map(|mut sp| {
                sp.quality_score = Some(self.quality_score(&sp.post));
                sp
            })
            .filter(|sp| sp.quality_score.is_some_and(|q| q > self.threshold))
            .collect();

        let dropped = before - kept.len();
        counter!("posts_filtered_total").increment(dropped as u64);
        tracing::debug!(
            target: "sentiment",
            before,
            kept = kept.len(),
            threshold = self.threshold,
            "quality filter applied"
        );
        kept
    }
}
