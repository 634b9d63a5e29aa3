//! Governance service client.

use crate::types::{Proposal, ProposalDraft};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Client for the DAO governance service.
#[derive(Debug, Clone)]
pub struct GovernanceClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CreateProposalRequest<'a> {
    title: &'a str,
    summary: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateProposalResponse {
    id: String,
}

impl GovernanceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Proposals currently awaiting a vote.
    pub async fn pending_proposals(&self) -> Result<Vec<Proposal>> {
        let resp = self
            .http
            .get(format!("{}/proposals", self.base_url))
            .query(&[("status", "pending")])
            .send()
            .await
            .context("Failed to fetch proposals")?;

        let status = resp.status();
        if !status.is_success() {
            if status.as_u16() == 404 {
                return Ok(Vec::new());
            }
            let body = resp.text().await.unwrap_or_default();
            bail!("Proposal fetch failed ({}): {}", status, body);
        }

        let proposals: Vec<Proposal> = resp.json().await.context("Failed to parse proposals")?;
        debug!("Fetched {} pending proposals", proposals.len());
        Ok(proposals)
    }

    /// Submit a new proposal draft. Returns the assigned proposal id.
    pub async fn submit_proposal(&self, draft: &ProposalDraft) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/proposals", self.base_url))
            .json(&CreateProposalRequest {
                title: &draft.title,
                summary: &draft.summary,
            })
            .send()
            .await
            .context("Failed to submit proposal")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Proposal submission failed ({}): {}", status, body);
        }

        let body: CreateProposalResponse = resp
            .json()
            .await
            .context("Failed to parse proposal response")?;

        info!("Submitted proposal '{}' as {}", draft.title, body.id);
        Ok(body.id)
    }
}
