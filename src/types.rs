//! Shared types used across the quorum runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Persona roles and status
// ---------------------------------------------------------------------------

/// Functional role of an agent persona, used in task matching.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Executive,
    Technical,
    Community,
    Compliance,
    Coordinator,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executive => write!(f, "executive"),
            Self::Technical => write!(f, "technical"),
            Self::Community => write!(f, "community"),
            Self::Compliance => write!(f, "compliance"),
            Self::Coordinator => write!(f, "coordinator"),
        }
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "executive" => Ok(Self::Executive),
            "technical" => Ok(Self::Technical),
            "community" => Ok(Self::Community),
            "compliance" => Ok(Self::Compliance),
            "coordinator" => Ok(Self::Coordinator),
            other => Err(format!("unknown agent role: {other}")),
        }
    }
}

/// Operational status of a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
    Suspended,
    Maintenance,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Suspended => write!(f, "suspended"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

impl FromStr for AgentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(format!("unknown agent status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Personas
// ---------------------------------------------------------------------------

/// A configured identity for one autonomous decision unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPersona {
    pub agent_id: String,
    pub name: String,
    pub role: AgentRole,
    pub personality_traits: HashMap<String, f64>,
    pub communication_style: String,
    /// Ordered keywords matched against task descriptions.
    pub expertise_areas: Vec<String>,
    /// Decision weight on a 1-10 scale.
    pub authority_level: u8,
    pub social_accounts: HashMap<String, String>,
    pub contact_info: HashMap<String, String>,
    pub status: AgentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input for a new persona. `role` stays a string until
/// validated at the registry boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub personality_traits: HashMap<String, f64>,
    #[serde(default = "default_communication_style")]
    pub communication_style: String,
    #[serde(default)]
    pub expertise_areas: Vec<String>,
    #[serde(default = "default_authority_level")]
    pub authority_level: u8,
    #[serde(default)]
    pub social_accounts: HashMap<String, String>,
    #[serde(default)]
    pub contact_info: HashMap<String, String>,
}

fn default_communication_style() -> String {
    "professional".into()
}

fn default_authority_level() -> u8 {
    5
}

// ---------------------------------------------------------------------------
// Tasks and assignments
// ---------------------------------------------------------------------------

/// An incoming unit of work to be matched against personas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSpec {
    pub task_type: String,
    pub description: String,
}

/// Append-only record of a scheduling decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub assignment_id: String,
    pub agent_id: String,
    pub task_type: String,
    pub task_description: String,
    pub assigned_at: DateTime<Utc>,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Coordination sessions
// ---------------------------------------------------------------------------

/// Append-only record of a multi-persona interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationSession {
    pub session_id: String,
    pub coordination_type: String,
    pub participants: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub status: String,
}

/// Short persona summary returned from coordination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
}

/// Structured result of a coordination attempt. Never an error: zero
/// resolvable participants yields `success == false` with a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationOutcome {
    pub success: bool,
    pub session_id: Option<String>,
    pub participants: usize,
    pub agents: Vec<ParticipantSummary>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Registry stats
// ---------------------------------------------------------------------------

/// One line of recent registry activity, derived from task assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub agent_id: String,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the registry working set plus recent activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_agents: usize,
    pub active_agents: usize,
    pub agents_by_role: BTreeMap<AgentRole, usize>,
    pub recent_activity: Vec<ActivityRecord>,
}

// ---------------------------------------------------------------------------
// Context memory
// ---------------------------------------------------------------------------

/// An entry in the daemon's persistent context log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    pub kind: String,
    pub data: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// A social engagement action proposed by a persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialAction {
    /// "tweet", "reply", "like" or "retweet".
    pub action: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub target_id: Option<String>,
}

/// A notification to be relayed to a webhook channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default = "default_channel")]
    pub channel: String,
    pub message: String,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_channel() -> String {
    "general".into()
}

fn default_priority() -> String {
    "normal".into()
}

/// A reward distribution proposed or computed for a contributor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardGrant {
    pub recipient: String,
    pub amount: f64,
    pub reason: String,
}

/// A governance proposal draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

/// The set of decisions one persona produced in a think phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionSet {
    #[serde(default)]
    pub social: Vec<SocialAction>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub rewards: Vec<RewardGrant>,
    #[serde(default)]
    pub governance: Vec<ProposalDraft>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl DecisionSet {
    /// Total number of proposed actions across categories.
    pub fn action_count(&self) -> usize {
        self.social.len() + self.notifications.len() + self.rewards.len() + self.governance.len()
    }

    /// High-impact decisions (governance, treasury) require cross-persona
    /// coordination before execution.
    pub fn requires_coordination(&self) -> bool {
        !self.governance.is_empty() || !self.rewards.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Monitoring snapshots
// ---------------------------------------------------------------------------

/// A mention of the DAO account on the social platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
}

/// Follower metrics for the DAO's social account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityMetrics {
    pub followers_count: u64,
    pub following_count: u64,
    pub tweet_count: u64,
    /// Followers gained since the previous sample (0 on first sample).
    #[serde(default)]
    pub follower_growth: u64,
}

/// One miner as reported by the mining metrics API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerEntry {
    pub address: String,
    #[serde(default)]
    pub hashrate: f64,
    #[serde(default = "default_uptime")]
    pub uptime: f64,
}

fn default_uptime() -> f64 {
    0.5
}

/// Aggregate mining network statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinerStats {
    pub total_miners: u64,
    pub active_miners: u64,
    pub total_hashrate: f64,
    #[serde(default)]
    pub network_difficulty: f64,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub top_miners: Vec<MinerEntry>,
}

/// An operational alert derived from monitoring data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorAlert {
    pub kind: String,
    pub severity: String,
    pub message: String,
}

/// A pending governance proposal fetched from the governance service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: String,
}

/// Everything the listen phase gathered for one cycle. Fields are `None`
/// or empty when the corresponding source failed; a failed source never
/// aborts the cycle.
#[derive(Debug, Clone, Serialize)]
pub struct GatheredData {
    pub timestamp: DateTime<Utc>,
    pub community: Option<CommunityMetrics>,
    pub mentions: Vec<Mention>,
    pub miners: Option<MinerStats>,
    pub miner_alerts: Vec<MonitorAlert>,
    pub proposals: Vec<Proposal>,
    pub registry: RegistryStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trip() {
        for role in [
            AgentRole::Executive,
            AgentRole::Technical,
            AgentRole::Community,
            AgentRole::Compliance,
            AgentRole::Coordinator,
        ] {
            assert_eq!(role.to_string().parse::<AgentRole>(), Ok(role));
        }
    }

    #[test]
    fn unknown_role_rejected() {
        assert!("wizard".parse::<AgentRole>().is_err());
        assert!("".parse::<AgentRole>().is_err());
    }

    #[test]
    fn status_parse_round_trip() {
        for status in [
            AgentStatus::Active,
            AgentStatus::Inactive,
            AgentStatus::Suspended,
            AgentStatus::Maintenance,
        ] {
            assert_eq!(status.to_string().parse::<AgentStatus>(), Ok(status));
        }
        assert!("retired".parse::<AgentStatus>().is_err());
    }

    #[test]
    fn decision_set_coordination_trigger() {
        let mut decisions = DecisionSet::default();
        assert!(!decisions.requires_coordination());

        decisions.notifications.push(Notification {
            channel: "general".into(),
            message: "hello".into(),
            priority: "normal".into(),
        });
        assert!(!decisions.requires_coordination());

        decisions.governance.push(ProposalDraft {
            title: "Increase reward pool".into(),
            summary: String::new(),
        });
        assert!(decisions.requires_coordination());
        assert_eq!(decisions.action_count(), 2);
    }

    #[test]
    fn decision_set_tolerates_missing_fields() {
        let decisions: DecisionSet = serde_json::from_str(r#"{"reasoning": "idle"}"#).unwrap();
        assert!(decisions.social.is_empty());
        assert!(decisions.rewards.is_empty());
        assert_eq!(decisions.reasoning.as_deref(), Some("idle"));
    }
}
