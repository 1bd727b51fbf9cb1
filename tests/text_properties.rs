// tests/text_properties.rs
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use stock_sentiment::analyze::LexiconScorer;
use stock_sentiment::resources::SentimentResources;
use stock_sentiment::text::{clean_text, clean_value, TextCleaner};

const FILLER: &[&str] = &[
    "stock", "moon", "buy", "sell", "gains", "AAPL", "calls", "puts", "great", "terrible",
];
const LINKS: &[&str] = &[
    "https://example.com/a?b=c",
    "http://t.co/xyz",
    "www.reddit.com/r/stocks",
    "(https://finance.yahoo.com/quote/AAPL)",
];

fn random_post(rng: &mut StdRng) -> String {
    let n = rng.random_range(1..12);
    let mut words = Vec::with_capacity(n + 1);
    for _ in 0..n {
        words.push(FILLER[rng.random_range(0..FILLER.len())].to_string());
    }
    let link = LINKS[rng.random_range(0..LINKS.len())];
    let pos = rng.random_range(0..=words.len());
    words.insert(pos, link.to_string());
    if rng.random_bool(0.5) {
        words.push("@someone".into());
    }
    words.join(" ")
}

#[test]
fn cleaned_text_never_keeps_links() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let raw = random_post(&mut rng);
        let out = clean_text(&raw);
        assert!(!out.contains("http"), "{raw:?} -> {out:?}");
        assert!(!out.contains("www"), "{raw:?} -> {out:?}");
        assert!(!out.contains("someone"), "{raw:?} -> {out:?}");
        assert!(!out.contains("  "));
        assert_eq!(out, out.trim());
    }
}

#[test]
fn non_string_values_clean_to_empty() {
    let values: Vec<Value> = vec![
        Value::Null,
        json!(42),
        json!(3.5),
        json!(true),
        json!(["a", "b"]),
        json!({"text": "great"}),
    ];
    let cleaner = TextCleaner::default();
    for v in &values {
        assert_eq!(clean_value(v), "");
        assert_eq!(cleaner.clean_value(v), "");
    }
}

#[test]
fn lexicon_scores_stay_in_unit_interval() {
    let scorer = LexiconScorer::new(SentimentResources::embedded(), TextCleaner::default());
    assert_eq!(scorer.score(""), 0.0);
    assert_eq!(scorer.score("https://only.a.link"), 0.0);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..300 {
        let raw = random_post(&mut rng);
        let s = scorer.score(&raw);
        assert!((-1.0..=1.0).contains(&s), "{raw:?} -> {s}");
    }
}
