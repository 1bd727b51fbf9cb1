// src/config/mod.rs
pub mod sentiment;

pub use sentiment::{
    PricesCfg, QualityCfg, RedditCfg, ResourcesCfg, SentimentConfig, TextCfg, TrendCfg,
    DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH,
};
