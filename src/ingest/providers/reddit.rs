// src/ingest/providers/reddit.rs
//! Reddit search over a pooled multi-subreddit path (`r/a+b+c/search`).
//!
//! Auth is OAuth2 client credentials; a fresh token is requested per search,
//! nothing is cached across calls. Results are paged with `after` until `limit`
//! posts are collected or the listing runs dry.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::config::RedditCfg;
use crate::ingest::types::{Post, PostSource, TimeFilter};

/// Reddit caps a listing page at 100 items.
const PAGE_MAX: usize = 100;
const PERMALINK_BASE: &str = "https://www.reddit.com";

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl RedditCredentials {
    /// Read from REDDIT_CLIENT_ID / REDDIT_CLIENT_SECRET / REDDIT_USER_AGENT.
    pub fn from_env() -> Result<Self> {
        let get = |k: &str| std::env::var(k).map_err(|_| anyhow!("Missing {k} env var"));
        Ok(Self {
            client_id: get(ENV_CLIENT_ID)?,
            client_secret: get(ENV_CLIENT_SECRET)?,
            user_agent: std::env::var(ENV_USER_AGENT)
                .unwrap_or_else(|_| "stock-sentiment/0.1".to_string()),
        })
    }
}

pub struct RedditSource {
    http: reqwest::Client,
    creds: RedditCredentials,
    auth_url: String,
    api_url: String,
    subreddits: String,
}

impl RedditSource {
    pub fn new(creds: RedditCredentials, cfg: &RedditCfg) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(creds.user_agent.clone())
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .context("building reddit http client")?;
        Ok(Self {
            http,
            creds,
            auth_url: cfg.auth_url.clone(),
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            subreddits: cfg.subreddits.join("+"),
        })
    }

    async fn access_token(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
        }

        let resp = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("reddit token request")?
            .error_for_status()
            .context("reddit token non-2xx")?;
        let body: TokenResp = resp.json().await.context("reddit token body")?;
        if body.access_token.is_empty() {
            bail!("reddit returned an empty access token");
        }
        Ok(body.access_token)
    }

    async fn search_page(
        &self,
        token: &str,
        query: &str,
        page_size: usize,
        time_filter: TimeFilter,
        after: Option<&str>,
    ) -> Result<Listing> {
        let url = format!("{}/r/{}/search", self.api_url, self.subreddits);
        let page_size = page_size.to_string();
        let mut params = vec![
            ("q", query),
            ("restrict_sr", "1"),
            ("sort", "relevance"),
            ("t", time_filter.as_str()),
            ("limit", page_size.as_str()),
        ];
        if let Some(a) = after {
            params.push(("after", a));
        }

        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .context("reddit search request")?
            .error_for_status()
            .context("reddit search non-2xx")?;
        resp.json::<Listing>().await.context("reddit search body")
    }
}

#[async_trait]
impl PostSource for RedditSource {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        time_filter: TimeFilter,
    ) -> Result<Vec<Post>> {
        let token = self.access_token().await?;

        let mut out = Vec::with_capacity(limit.min(PAGE_MAX));
        let mut after: Option<String> = None;
        while out.len() < limit {
            let want = (limit - out.len()).min(PAGE_MAX);
            let page = self
                .search_page(&token, query, want, time_filter, after.as_deref())
                .await?;
            let n = page.data.children.len();
            out.extend(posts_from_children(page.data.children));

            after = page.data.after;
            if n == 0 || after.is_none() {
                break;
            }
        }
        out.truncate(limit);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<serde_json::Value>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RawPost,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    selftext: String,
    created_utc: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    permalink: String,
    #[serde(default, deserialize_with = "lenient_string")]
    subreddit: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
}

/// Non-string text fields (null, numbers, objects) decode to "".
fn lenient_string<'de, D>(de: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// Decode listing children one by one; an undecodable child is skipped.
fn posts_from_children(children: Vec<serde_json::Value>) -> Vec<Post> {
    let mut out = Vec::with_capacity(children.len());
    for raw in children {
        match serde_json::from_value::<Child>(raw) {
            Ok(c) => out.push(into_post(c.data)),
            Err(e) => {
                tracing::debug!(target: "ingest", error = %e, "skipping undecodable post");
                counter!("posts_skipped_total").increment(1);
            }
        }
    }
    out
}

fn into_post(p: RawPost) -> Post {
    let created_at =
        DateTime::<Utc>::from_timestamp(p.created_utc.max(0.0) as i64, 0).unwrap_or_default();
    let permalink = if p.permalink.starts_with("http") {
        p.permalink
    } else {
        format!("{PERMALINK_BASE}{}", p.permalink)
    };
    Post {
        title: decode_entities(&p.title),
        body: decode_entities(&p.selftext),
        created_at,
        permalink,
        source: p.subreddit,
        score: p.score,
        num_comments: p.num_comments,
    }
}

fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_children_leniently() {
        let children = vec![
            json!({"kind": "t3", "data": {
                "title": "AAPL &amp; earnings",
                "selftext": null,
                "created_utc": 1_700_000_000.0,
                "permalink": "/r/stocks/comments/abc/aapl/",
                "subreddit": "stocks",
                "score": 42,
                "num_comments": 7
            }}),
            // no created_utc -> skipped
            json!({"kind": "t3", "data": {"title": "broken"}}),
            json!({"kind": "t3", "data": {
                "title": 12345,
                "selftext": "body",
                "created_utc": 1_700_086_400.5,
                "permalink": "https://www.reddit.com/r/investing/x",
                "subreddit": "investing"
            }}),
        ];
        let posts = posts_from_children(children);
        assert_eq!(posts.len(), 2);

        assert_eq!(posts[0].title, "AAPL & earnings");
        assert_eq!(posts[0].body, "");
        assert_eq!(
            posts[0].permalink,
            "https://www.reddit.com/r/stocks/comments/abc/aapl/"
        );
        assert_eq!(posts[0].created_at.timestamp(), 1_700_000_000);
        assert_eq!(posts[0].score, 42);

        assert_eq!(posts[1].title, "");
        assert_eq!(posts[1].permalink, "https://www.reddit.com/r/investing/x");
        assert_eq!(posts[1].score, 0);
    }
}
