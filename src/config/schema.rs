//! Configuration schema for quorum.toml.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumConfig {
    /// Human-readable daemon name.
    pub name: String,

    /// Seconds between autonomous cycles.
    pub cycle_interval_secs: u64,

    /// Backoff after a failed cycle before retrying.
    pub error_backoff_secs: u64,

    /// How many context entries the think phase feeds to the model.
    pub context_window: usize,

    /// Record store backend: "rest" or "sqlite".
    pub store_backend: String,

    /// Remote record store base URL (rest backend).
    pub store_url: String,

    /// Remote record store API key.
    pub store_api_key: String,

    /// Path to the embedded record store (sqlite backend).
    pub db_path: String,

    /// Inference API base URL (OpenAI-compatible).
    pub inference_api_url: String,

    /// Inference API key.
    pub inference_api_key: String,

    /// Model used for persona decisions.
    pub inference_model: String,

    /// Maximum tokens per decision call.
    pub max_decision_tokens: u32,

    /// Social platform API base URL.
    pub social_api_url: String,

    /// Social platform bearer token.
    pub social_bearer_token: String,

    /// Account handle monitored for mentions and metrics.
    pub social_handle: String,

    /// Mining metrics API base URL.
    pub miner_api_url: String,

    /// Governance service base URL.
    pub governance_api_url: String,

    /// Discord webhook URL for notifications.
    pub discord_webhook_url: String,

    /// Log level (debug, info, warn, error).
    pub log_level: String,

    /// Config version.
    pub version: u32,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            name: "quorum".into(),
            cycle_interval_secs: 600,
            error_backoff_secs: 60,
            context_window: 5,
            store_backend: "sqlite".into(),
            store_url: String::new(),
            store_api_key: String::new(),
            db_path: "~/.quorum/records.db".into(),
            inference_api_url: "https://api.openai.com".into(),
            inference_api_key: String::new(),
            inference_model: "gpt-4o".into(),
            max_decision_tokens: 2048,
            social_api_url: "https://api.twitter.com/2".into(),
            social_bearer_token: String::new(),
            social_handle: String::new(),
            miner_api_url: String::new(),
            governance_api_url: String::new(),
            discord_webhook_url: String::new(),
            log_level: "info".into(),
            version: 1,
        }
    }
}

impl QuorumConfig {
    /// Resolve a path that may contain `~` to an absolute path.
    pub fn resolve_path(&self, path: &str) -> String {
        shellexpand::tilde(path).into_owned()
    }

    /// Resolved embedded store path.
    pub fn resolved_db_path(&self) -> String {
        self.resolve_path(&self.db_path)
    }
}
