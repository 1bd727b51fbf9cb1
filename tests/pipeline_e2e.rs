// tests/pipeline_e2e.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use stock_sentiment::analyze::{ScorerKind, SentimentCategory};
use stock_sentiment::error::SourceError;
use stock_sentiment::ingest::types::{Post, PostSource, TimeFilter};
use stock_sentiment::market::{
    Interval, MarketDataSource, Period, PriceHistory, Quote, TokioSleeper,
};
use stock_sentiment::resources::SentimentResources;
use stock_sentiment::trend::Trend;
use stock_sentiment::{SentimentConfig, SentimentEngine};

struct MemoryPosts {
    posts: Vec<Post>,
    seen: Mutex<Vec<(String, usize, TimeFilter)>>,
}

impl MemoryPosts {
    fn new(posts: Vec<Post>) -> Arc<Self> {
        Arc::new(Self {
            posts,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PostSource for MemoryPosts {
    async fn search(&self, query: &str, limit: usize, tf: TimeFilter) -> Result<Vec<Post>> {
        self.seen.lock().unwrap().push((query.to_string(), limit, tf));
        Ok(self.posts.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct DownPosts;

#[async_trait]
impl PostSource for DownPosts {
    async fn search(&self, _q: &str, _limit: usize, _tf: TimeFilter) -> Result<Vec<Post>> {
        Err(anyhow!("reddit token non-2xx"))
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

struct FixedMarket;

#[async_trait]
impl MarketDataSource for FixedMarket {
    async fn quote(&self, _symbol: &str) -> std::result::Result<Quote, SourceError> {
        Ok(Quote {
            current_price: Some(150.0),
            currency: Some("USD".into()),
        })
    }

    async fn history(
        &self,
        _symbol: &str,
        _period: Period,
        _interval: Interval,
    ) -> std::result::Result<PriceHistory, SourceError> {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        Ok(PriceHistory {
            dates: vec![t0, t0 + Duration::days(1)],
            prices: vec![149.0, 150.0],
            volume: vec![10, 20],
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn at(day: i64, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap() + Duration::days(day)
}

fn post(title: &str, body: &str, created_at: DateTime<Utc>) -> Post {
    Post {
        title: title.into(),
        body: body.into(),
        created_at,
        permalink: format!("https://www.reddit.com/r/stocks/{}", created_at.timestamp()),
        source: "stocks".into(),
        score: 20,
        num_comments: 3,
    }
}

fn engine(source: Arc<dyn PostSource>) -> SentimentEngine {
    SentimentEngine::new(
        source,
        Arc::new(FixedMarket),
        Arc::new(TokioSleeper),
        SentimentResources::embedded(),
        SentimentConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn no_posts_yields_failure_and_neutral_trend() {
    let e = engine(MemoryPosts::new(vec![]));

    let lex = e.analyze_lexicon("AAPL", TimeFilter::Month).await;
    assert!(!lex.success);
    assert_eq!(lex.error.as_deref(), Some("No posts found for AAPL"));

    let bl = e.analyze_blended("AAPL", TimeFilter::Month, 50).await;
    assert!(!bl.success);

    let t = e.trend("AAPL", TimeFilter::Month).await;
    assert_eq!(t.trend, Trend::Neutral);
    assert!(t.daily_sentiment.is_empty());
    assert!(t.moving_average.is_empty());
    assert_eq!(t.current_sentiment, 0.0);
}

#[tokio::test]
async fn failed_collection_is_treated_like_no_results() {
    let e = engine(Arc::new(DownPosts));
    let r = e.analyze_lexicon("TSLA", TimeFilter::Week).await;
    assert!(!r.success);
    assert_eq!(r.error.as_deref(), Some("No posts found for TSLA"));
    assert_eq!(e.trend("TSLA", TimeFilter::Week).await.trend, Trend::Neutral);
}

#[tokio::test]
async fn lexicon_summary_counts_each_side() {
    let src = MemoryPosts::new(vec![
        post("Love this stock", "Great earnings, amazing growth", at(0, 10)),
        post("Terrible quarter", "Awful guidance, horrible losses", at(0, 12)),
        post("AAPL", "ticker", at(1, 9)),
    ]);
    let e = engine(src.clone());

    let s = e
        .analyze_lexicon("aapl", TimeFilter::Week)
        .await
        .into_result()
        .unwrap();
    assert_eq!(s.symbol, "AAPL");
    assert_eq!(s.post_count, 3);
    assert_eq!(s.count(SentimentCategory::Positive), 1);
    assert_eq!(s.count(SentimentCategory::Negative), 1);
    assert_eq!(s.count(SentimentCategory::Neutral), 1);
    assert_eq!(s.time_filter, TimeFilter::Week);
    assert_eq!(s.top_posts[0].title, "Love this stock");
    assert!(s.top_posts.iter().all(|t| (-1.0..=1.0).contains(&t.score)));

    let seen = src.seen.lock().unwrap();
    assert_eq!(seen[0], ("AAPL stock".to_string(), 100, TimeFilter::Week));
}

#[tokio::test]
async fn blended_path_scores_body_and_respects_limit() {
    let posts: Vec<Post> = (0..8)
        .map(|i| post("Terrible title", "great strong results", at(i, 8)))
        .collect();
    let src = MemoryPosts::new(posts);
    let e = engine(src.clone());

    let s = e
        .analyze_blended("NVDA", TimeFilter::Year, 5)
        .await
        .into_result()
        .unwrap();
    // collector truncates to the requested limit
    assert_eq!(s.post_count, 5);
    // title is ignored on this path, so every post leans positive
    assert_eq!(s.count(SentimentCategory::Positive), 5);
    assert_eq!(src.seen.lock().unwrap()[0].1, 5);
}

#[tokio::test]
async fn week_of_upbeat_posts_is_bullish() {
    let posts: Vec<Post> = (0..7)
        .flat_map(|d| {
            vec![
                post("Great buy", "Love the strong growth, excellent team", at(d, 9)),
                post("Still bullish", "Good results, happy holder", at(d, 15)),
            ]
        })
        .collect();
    let e = engine(MemoryPosts::new(posts));

    let t = e.trend("MSFT", TimeFilter::Week).await;
    assert_eq!(t.daily_sentiment.len(), 7);
    assert_eq!(t.moving_average.len(), 1);
    assert!(t.current_sentiment > 0.2, "{}", t.current_sentiment);
    assert_eq!(t.trend, Trend::Bullish);
}

#[tokio::test]
async fn week_of_gloomy_posts_is_bearish_with_either_scorer() {
    let posts: Vec<Post> = (0..7)
        .map(|d| post("Crash", "terrible awful horrible disaster, huge losses", at(d, 11)))
        .collect();
    let e = engine(MemoryPosts::new(posts));

    let lex = e.trend_with("GME", TimeFilter::Month, ScorerKind::Lexicon).await;
    assert_eq!(lex.trend, Trend::Bearish);

    let bl = e.trend_with("GME", TimeFilter::Month, ScorerKind::Blended).await;
    assert_eq!(bl.trend, Trend::Bearish);
}

#[tokio::test]
async fn short_history_falls_back_to_neutral() {
    let posts = vec![
        post("Great", "love it", at(0, 9)),
        post("Great", "love it", at(2, 9)),
    ];
    let e = engine(MemoryPosts::new(posts));
    let t = e.trend("AMD", TimeFilter::Month).await;
    assert_eq!(t.daily_sentiment.len(), 2);
    assert!(t.moving_average.is_empty());
    assert_eq!(t.current_sentiment, 0.0);
    assert_eq!(t.trend, Trend::Neutral);
}

#[tokio::test]
async fn price_operations_return_values() {
    let e = engine(MemoryPosts::new(vec![]));

    let p = e.current_price("aapl").await;
    assert!(p.success);
    assert_eq!(p.current_price, Some(150.0));
    assert_eq!(p.currency.as_deref(), Some("USD"));

    let h = e
        .historical_prices("AAPL", Period::FiveDays, Interval::OneDay)
        .await
        .into_result()
        .unwrap();
    assert_eq!(h.prices, vec![149.0, 150.0]);
}
