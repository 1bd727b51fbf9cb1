// src/text.rs
//! Text cleaning for the lexicon path.
//!
//! Stages, in order:
//! 1) drop URL-like substrings (`http…`, `www…`)
//! 2) drop `@mention` / `#hashtag` tokens (whole word)
//! 3) drop every character outside the allowed class
//! 4) collapse whitespace runs and trim
//!
//! Pure and deterministic. Anything that is not a string cleans to "".

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;

fn re_links() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?m)https?\S*|www\S*").unwrap())
}

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[@#]\w+").unwrap())
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Cleaner with a configurable allowed character class.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    disallowed: Regex,
}

impl TextCleaner {
    /// `allowed` is the body of a character class, e.g. `A-Za-z0-9\s`.
    pub fn new(allowed: &str) -> Result<Self> {
        let disallowed = Regex::new(&format!("[^{allowed}]"))
            .with_context(|| format!("invalid allowed character class `{allowed}`"))?;
        Ok(Self { disallowed })
    }

    pub fn clean(&self, text: &str) -> String {
        let out = re_links().replace_all(text, "");
        let out = re_tags().replace_all(&out, "");
        let out = self.disallowed.replace_all(&out, "");
        let out = re_ws().replace_all(&out, " ");
        out.trim().to_string()
    }

    /// Loosely typed input (decoded JSON). Non-strings clean to "".
    pub fn clean_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => self.clean(s),
            _ => String::new(),
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        static DEFAULT: OnceCell<TextCleaner> = OnceCell::new();
        DEFAULT
            .get_or_init(|| {
                TextCleaner::new(r"A-Za-z0-9\s").expect("default allowed class compiles")
            })
            .clone()
    }
}

/// Clean with the default ASCII alphanumeric class.
pub fn clean_text(text: &str) -> String {
    TextCleaner::default().clean(text)
}

/// Clean a JSON value with the default class; non-strings become "".
pub fn clean_value(value: &Value) -> String {
    TextCleaner::default().clean_value(value)
}
