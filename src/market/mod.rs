// src/market/mod.rs
pub mod fetcher;
pub mod types;
pub mod yahoo;

pub use fetcher::{PriceFetcher, RetryPolicy, Sleeper, TokioSleeper};
pub use types::{Interval, MarketDataSource, Period, PriceHistory, PriceResult, Quote};
pub use yahoo::YahooSource;
