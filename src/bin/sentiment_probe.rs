//! Runs every pipeline operation once for a symbol against the live upstreams
//! and prints the results as JSON.
//!
//! Usage: `sentiment-probe [SYMBOL] [week|month|year] [lexicon|blended]`
//! Needs REDDIT_CLIENT_ID / REDDIT_CLIENT_SECRET (a `.env` file works).

use stock_sentiment::market::{Interval, Period};
use stock_sentiment::metrics::Metrics;
use stock_sentiment::{build_live_engine, ScorerKind, SentimentConfig, TimeFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const RECENT_POSTS: usize = 10;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_sentiment=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn print_json<T: serde::Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("== {label}\n{s}"),
        Err(e) => tracing::warn!(error = ?e, label, "could not serialize result"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op otherwise.
    let _ = dotenvy::dotenv();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let symbol = args.next().unwrap_or_else(|| "AAPL".to_string());
    let time_filter: TimeFilter = match args.next() {
        Some(s) => s.parse()?,
        None => TimeFilter::default(),
    };
    let scorer: ScorerKind = match args.next() {
        Some(s) => s.parse()?,
        None => ScorerKind::default(),
    };

    // Startup-fatal: config, lexicon resources, credentials.
    let cfg = SentimentConfig::load_default()?;
    // Recorder first, so the engine's metric descriptions are kept.
    let metrics = match Metrics::init(&cfg) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };
    let engine = build_live_engine(cfg)?;

    let lexicon = engine.analyze_lexicon(&symbol, time_filter).await;
    print_json("analyze_lexicon", &lexicon);

    let blended_limit = engine.config().reddit.blended_limit;
    let blended = engine
        .analyze_blended(&symbol, time_filter, blended_limit)
        .await;
    print_json("analyze_blended", &blended);

    let recent: Vec<serde_json::Value> = engine
        .scored(&symbol, time_filter, scorer, RECENT_POSTS)
        .await
        .iter()
        .map(|sp| {
            serde_json::json!({
                "created_at": sp.created_at_label(),
                "sentiment": sp.sentiment,
                "category": sp.sentiment_category,
                "title": sp.post.title,
            })
        })
        .collect();
    print_json("scored_posts", &recent);

    let trend = engine.trend_with(&symbol, time_filter, scorer).await;
    print_json("trend", &trend);

    let price = engine.current_price(&symbol).await;
    print_json("current_price", &price);

    let history = engine
        .historical_prices(&symbol, Period::OneMonth, Interval::OneDay)
        .await;
    print_json("historical_prices", &history);

    if let Some(m) = metrics {
        println!("== metrics\n{}", m.render());
    }
    Ok(())
}
