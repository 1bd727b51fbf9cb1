// src/debug.rs
//! Dev-only anonymised logging of per-post scores.
//!
//! Gate: SENTIMENT_DEV_LOG=1 AND a dev environment (debug build or
//! SENTIMENT_ENV in {local, development, dev}). Raw text is never logged,
//! only a short SHA-256 prefix.

use tracing::info;

pub const ENV_DEV_LOG: &str = "SENTIMENT_DEV_LOG";
pub const ENV_RUNTIME_ENV: &str = "SENTIMENT_ENV";

pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var(ENV_RUNTIME_ENV)
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// First 6 bytes of SHA-256, hex encoded.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub(crate) fn dev_log_score(scorer: &str, text: &str, score: f64) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    info!(
        target: "sentiment",
        %id, scorer, score, chars = text.chars().count(),
        "post scored"
    );
}
