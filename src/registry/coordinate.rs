//! Coordination sessions: record that a set of personas jointly handled a
//! decision requiring cross-role input.

use crate::registry::AgentRegistry;
use crate::types::*;
use chrono::Utc;
use tracing::{error, info};

impl AgentRegistry {
    /// Start a coordination session between the given participants.
    ///
    /// Participants that are unknown or not ACTIVE are dropped. Zero
    /// remaining participants is a structured failure, not an error, and
    /// no session is created. The session record is persisted
    /// best-effort.
    pub async fn coordinate_agents(
        &self,
        coordination_type: &str,
        participants: &[String],
    ) -> CoordinationOutcome {
        info!(
            "Coordinating '{}' with {} requested participants",
            coordination_type,
            participants.len()
        );

        let accepted: Vec<ParticipantSummary> = {
            let agents = self.agents.read().await;
            participants
                .iter()
                .filter_map(|id| agents.get(id))
                .filter(|a| a.status == AgentStatus::Active)
                .map(|a| ParticipantSummary {
                    id: a.agent_id.clone(),
                    name: a.name.clone(),
                    role: a.role,
                })
                .collect()
        };

        if accepted.is_empty() {
            return CoordinationOutcome {
                success: false,
                session_id: None,
                participants: 0,
                agents: Vec::new(),
                message: Some("no active personas found for coordination".into()),
            };
        }

        let session = CoordinationSession {
            session_id: ulid::Ulid::new().to_string(),
            coordination_type: coordination_type.to_string(),
            participants: accepted.iter().map(|a| a.id.clone()).collect(),
            started_at: Utc::now(),
            status: "active".into(),
        };

        if let Err(e) = self.store.append_coordination_session(&session).await {
            error!("Failed to persist coordination session: {}", e);
        }

        CoordinationOutcome {
            success: true,
            session_id: Some(session.session_id),
            participants: accepted.len(),
            agents: accepted,
            message: None,
        }
    }
}
