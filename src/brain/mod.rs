//! Decision engine: persona-conditioned reasoning over a hosted model.
//!
//! One call per persona per cycle. The model is asked to answer with a
//! JSON object matching [`DecisionSet`]; anything it cannot parse is an
//! error the caller isolates.

use crate::types::*;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chat-completions client used for persona decision making.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    http: reqwest::Client,
}

// -- OpenAI-compatible request/response types --------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<MessagePayload<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl DecisionEngine {
    pub fn new(base_url: &str, api_key: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
            http: reqwest::Client::new(),
        }
    }

    /// Ask the model for one persona's decisions over the gathered data.
    pub async fn decide(
        &self,
        persona: &AgentPersona,
        data: &GatheredData,
        recent: &[ContextEntry],
    ) -> Result<DecisionSet> {
        let system = persona_prompt(persona);
        let user = serde_json::json!({
            "current_data": data,
            "recent_context": recent,
        });

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                MessagePayload {
                    role: "system",
                    content: system,
                },
                MessagePayload {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.3,
        };

        debug!("Decision request for persona {}", persona.name);

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Decision request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Decision request failed ({}): {}", status, body);
        }

        let body: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse decision response")?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        parse_decisions(&content)
    }
}

/// Build the system prompt conditioning the model on a persona.
fn persona_prompt(persona: &AgentPersona) -> String {
    let focus = match persona.role {
        AgentRole::Executive => "governance, strategic decisions, community leadership",
        AgentRole::Technical => "mining statistics, technical issues, blockchain data",
        AgentRole::Community => "social activity, community engagement, user feedback",
        AgentRole::Compliance => "regulatory compliance, legal requirements, risk assessment",
        AgentRole::Coordinator => "cross-role coordination and escalation",
    };

    format!(
        "You are {name}, an autonomous {role} agent for a DAO.\n\
         Communication style: {style}. Expertise: {expertise}.\n\
         Authority level: {authority}/10. Focus areas: {focus}.\n\n\
         Analyze the data objectively and favor long-term community benefit.\n\
         Respond with a single JSON object with these optional keys:\n\
         \"social\" (engagement actions), \"notifications\" (alerts),\n\
         \"rewards\" (distributions), \"governance\" (proposal drafts),\n\
         \"reasoning\" (string). Omit categories with nothing to do.",
        name = persona.name,
        role = persona.role,
        style = persona.communication_style,
        expertise = persona.expertise_areas.join(", "),
        authority = persona.authority_level,
        focus = focus,
    )
}

/// Parse the model's reply into a decision set, tolerating markdown code
/// fences around the JSON.
fn parse_decisions(content: &str) -> Result<DecisionSet> {
    let trimmed = content.trim();
    let json = if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        rest.trim_end_matches('`').trim()
    } else {
        trimmed
    };

    if json.is_empty() {
        return Ok(DecisionSet::default());
    }

    serde_json::from_str(json).context("Model reply is not a valid decision set")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let decisions = parse_decisions(
            r#"{"notifications": [{"message": "hashrate dropped"}], "reasoning": "alerting"}"#,
        )
        .unwrap();
        assert_eq!(decisions.notifications.len(), 1);
        assert_eq!(decisions.notifications[0].channel, "general");
        assert_eq!(decisions.notifications[0].priority, "normal");
    }

    #[test]
    fn parses_fenced_json() {
        let decisions = parse_decisions(
            "```json\n{\"governance\": [{\"title\": \"Adjust emissions\"}]}\n```",
        )
        .unwrap();
        assert_eq!(decisions.governance.len(), 1);
        assert_eq!(decisions.governance[0].title, "Adjust emissions");
    }

    #[test]
    fn empty_reply_means_no_decisions() {
        let decisions = parse_decisions("").unwrap();
        assert_eq!(decisions.action_count(), 0);
    }

    #[test]
    fn garbage_reply_is_an_error() {
        assert!(parse_decisions("I think we should do nothing today.").is_err());
    }
}
