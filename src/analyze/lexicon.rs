// src/analyze/lexicon.rs
//! Baseline scorer: clean the text, then take the VADER compound polarity.

use serde_json::Value;
use std::sync::Arc;

use super::SentimentScorer;
use crate::ingest::types::Post;
use crate::resources::SentimentResources;
use crate::text::TextCleaner;

#[derive(Debug, Clone)]
pub struct LexiconScorer {
    resources: Arc<SentimentResources>,
    cleaner: TextCleaner,
}

impl LexiconScorer {
    pub fn new(resources: Arc<SentimentResources>, cleaner: TextCleaner) -> Self {
        Self { resources, cleaner }
    }

    /// Polarity in [-1, 1]; 0 when nothing survives cleaning.
    pub fn score(&self, text: &str) -> f64 {
        let cleaned = self.cleaner.clean(text);
        if cleaned.is_empty() {
            return 0.0;
        }
        self.resources.compound(&cleaned)
    }

    /// Loosely typed input; non-strings score 0.
    pub fn score_value(&self, value: &Value) -> f64 {
        match value {
            Value::String(s) => self.score(s),
            _ => 0.0,
        }
    }
}

impl SentimentScorer for LexiconScorer {
    fn score_post(&self, post: &Post) -> f64 {
        self.score(&post.full_text())
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}
