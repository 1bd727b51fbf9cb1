// src/analyze/blended.rs
//! Blended scorer: lexicon compound mixed with cheap structural features.
//!
//! score = compound * 0.7
//!       + (min(len, 1000) / 1000) * 0.1
//!       - 0.1 if the text has a `?`
//!       + 0.1 if the text has a `!`
//!
//! The result is NOT clamped to [-1, 1]; trend thresholds were tuned on the raw
//! range. Input is expected to be preprocessed with [`BlendedScorer::preprocess`],
//! which is a separate step from the lexicon path's cleaner.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;

use super::SentimentScorer;
use crate::ingest::types::Post;
use crate::resources::SentimentResources;

const COMPOUND_WEIGHT: f64 = 0.7;
const LENGTH_CAP: usize = 1000;
const LENGTH_WEIGHT: f64 = 0.1;
const QUESTION_PENALTY: f64 = -0.1;
const EXCLAMATION_BONUS: f64 = 0.1;

fn re_non_letters() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z\s]").unwrap())
}

#[derive(Debug, Clone)]
pub struct BlendedScorer {
    resources: Arc<SentimentResources>,
}

impl BlendedScorer {
    pub fn new(resources: Arc<SentimentResources>) -> Self {
        Self { resources }
    }

    /// Lowercase, keep letters and whitespace, tokenize, drop stopwords.
    pub fn preprocess(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let letters = re_non_letters().replace_all(&lowered, "");
        tokenize(&letters)
            .filter(|t| !self.resources.is_stopword(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn score(&self, text: &str) -> f64 {
        let compound = self.resources.compound(text);
        let length = text.chars().count().min(LENGTH_CAP) as f64 / LENGTH_CAP as f64;
        let question = if text.contains('?') { QUESTION_PENALTY } else { 0.0 };
        let exclamation = if text.contains('!') { EXCLAMATION_BONUS } else { 0.0 };

        compound * COMPOUND_WEIGHT + length * LENGTH_WEIGHT + question + exclamation
    }
}

impl SentimentScorer for BlendedScorer {
    /// Body only, preprocessed first.
    fn score_post(&self, post: &Post) -> f64 {
        self.score(&self.preprocess(&post.body))
    }

    fn name(&self) -> &'static str {
        "blended"
    }
}

/// Whitespace tokens, empty pieces dropped.
fn tokenize(s: &str) -> impl Iterator<Item = &str> + '_ {
    s.split_whitespace().filter(|t| !t.is_empty())
}
