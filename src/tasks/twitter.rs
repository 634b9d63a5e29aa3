//! Social platform monitoring and engagement.
//!
//! Reads community metrics and mentions for the listen phase, and
//! executes the engagement actions personas decide on.

use crate::types::{CommunityMetrics, Mention, SocialAction};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::sync::Mutex;
use tracing::{debug, info, warn};

const MAX_POST_LEN: usize = 280;

/// Social platform client (API v2 style).
#[derive(Debug)]
pub struct SocialMonitor {
    api_url: String,
    bearer_token: String,
    handle: String,
    http: reqwest::Client,
    /// Follower count from the previous sample, for growth deltas.
    last_followers: Mutex<Option<u64>>,
    /// Numeric account id, cached after the first profile fetch.
    user_id: Mutex<Option<String>>,
}

// -- API response shapes -----------------------------------------------------

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Deserialize, Default)]
struct PublicMetrics {
    #[serde(default)]
    followers_count: u64,
    #[serde(default)]
    following_count: u64,
    #[serde(default)]
    tweet_count: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<TweetData>>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
    author_id: Option<String>,
    public_metrics: Option<TweetMetrics>,
}

#[derive(Debug, Deserialize, Default)]
struct TweetMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
}

impl SocialMonitor {
    pub fn new(api_url: &str, bearer_token: &str, handle: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.to_string(),
            handle: handle.trim_start_matches('@').to_string(),
            http: reqwest::Client::new(),
            last_followers: Mutex::new(None),
            user_id: Mutex::new(None),
        }
    }

    /// Fetch follower metrics for the monitored account. Growth is
    /// relative to the previous call; zero on the first sample.
    pub async fn community_metrics(&self) -> Result<CommunityMetrics> {
        let resp = self
            .http
            .get(format!("{}/users/by/username/{}", self.api_url, self.handle))
            .query(&[("user.fields", "public_metrics")])
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .context("Failed to fetch account profile")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Profile fetch failed ({}): {}", status, body);
        }

        let body: UserResponse = resp.json().await.context("Failed to parse profile")?;
        let Some(user) = body.data else {
            bail!("Profile fetch returned no account data");
        };

        *self.user_id.lock().unwrap() = Some(user.id);

        let metrics = user.public_metrics.unwrap_or_default();
        let previous = self
            .last_followers
            .lock()
            .unwrap()
            .replace(metrics.followers_count);
        let growth = previous
            .map(|p| metrics.followers_count.saturating_sub(p))
            .unwrap_or(0);

        debug!(
            "Community metrics: {} followers (+{})",
            metrics.followers_count, growth
        );

        Ok(CommunityMetrics {
            followers_count: metrics.followers_count,
            following_count: metrics.following_count,
            tweet_count: metrics.tweet_count,
            follower_growth: growth,
        })
    }

    /// Recent mentions of the monitored handle.
    pub async fn recent_mentions(&self) -> Result<Vec<Mention>> {
        let query = format!("@{}", self.handle);
        let resp = self
            .http
            .get(format!("{}/tweets/search/recent", self.api_url))
            .query(&[
                ("query", query.as_str()),
                ("max_results", "10"),
                ("tweet.fields", "author_id,public_metrics"),
            ])
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .context("Failed to search mentions")?;

        let status = resp.status();
        if !status.is_success() {
            if status.as_u16() == 404 {
                return Ok(Vec::new());
            }
            let body = resp.text().await.unwrap_or_default();
            bail!("Mention search failed ({}): {}", status, body);
        }

        let body: SearchResponse = resp.json().await.context("Failed to parse mentions")?;
        let mentions = body
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|t| {
                let metrics = t.public_metrics.unwrap_or_default();
                Mention {
                    id: t.id,
                    text: t.text,
                    author_id: t.author_id,
                    like_count: metrics.like_count,
                    retweet_count: metrics.retweet_count,
                }
            })
            .collect::<Vec<_>>();

        debug!("Found {} recent mentions", mentions.len());
        Ok(mentions)
    }

    /// Execute a batch of engagement actions. Individual failures are
    /// logged and skipped; returns how many succeeded.
    pub async fn engage(&self, actions: &[SocialAction]) -> usize {
        let mut succeeded = 0;
        for action in actions {
            match self.execute(action).await {
                Ok(()) => succeeded += 1,
                Err(e) => warn!("Engagement action '{}' failed: {}", action.action, e),
            }
        }
        info!("Completed {}/{} engagement actions", succeeded, actions.len());
        succeeded
    }

    async fn execute(&self, action: &SocialAction) -> Result<()> {
        match action.action.as_str() {
            "tweet" => {
                if action.content.is_empty() || action.content.len() > MAX_POST_LEN {
                    bail!("post content empty or over {} characters", MAX_POST_LEN);
                }
                self.post(serde_json::json!({ "text": action.content }))
                    .await
            }
            "reply" => {
                let target = action
                    .target_id
                    .as_deref()
                    .context("reply action without target_id")?;
                if action.content.is_empty() {
                    bail!("reply action without content");
                }
                self.post(serde_json::json!({
                    "text": action.content,
                    "reply": { "in_reply_to_tweet_id": target },
                }))
                .await
            }
            "like" => {
                let target = action
                    .target_id
                    .as_deref()
                    .context("like action without target_id")?;
                self.user_action("likes", target).await
            }
            "retweet" => {
                let target = action
                    .target_id
                    .as_deref()
                    .context("retweet action without target_id")?;
                self.user_action("retweets", target).await
            }
            other => bail!("unknown engagement action: {}", other),
        }
    }

    async fn post(&self, payload: serde_json::Value) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/tweets", self.api_url))
            .bearer_auth(&self.bearer_token)
            .json(&payload)
            .send()
            .await
            .context("Failed to post")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Post failed ({}): {}", status, body);
        }
        Ok(())
    }

    /// Likes and retweets act on behalf of the account, so they need the
    /// numeric id cached by a prior profile fetch.
    async fn user_action(&self, endpoint: &str, tweet_id: &str) -> Result<()> {
        let user_id = self
            .user_id
            .lock()
            .unwrap()
            .clone()
            .context("account id not yet known")?;

        let resp = self
            .http
            .post(format!("{}/users/{}/{}", self.api_url, user_id, endpoint))
            .bearer_auth(&self.bearer_token)
            .json(&serde_json::json!({ "tweet_id": tweet_id }))
            .send()
            .await
            .context("Failed to send user action")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("User action failed ({}): {}", status, body);
        }
        Ok(())
    }
}
