//! Task-assignment scoring: pick the best-matching active persona for an
//! incoming task.
//!
//! Scoring: +30 for a role matching the task type, +10 per expertise
//! entry containing a task keyword, plus the persona's authority level.
//! Ties break deterministically: highest authority, then smallest id.

use crate::registry::AgentRegistry;
use crate::types::*;
use chrono::Utc;
use std::cmp::Ordering;
use tracing::{error, info, warn};

/// Fixed mapping from task type to the role best suited for it.
fn role_for_task_type(task_type: &str) -> Option<AgentRole> {
    match task_type {
        "governance" | "proposal" => Some(AgentRole::Executive),
        "technical" | "development" => Some(AgentRole::Technical),
        "community" | "social" => Some(AgentRole::Community),
        "compliance" | "legal" => Some(AgentRole::Compliance),
        _ => None,
    }
}

/// Score one candidate against a task.
pub(crate) fn score_task_fit(task: &TaskSpec, persona: &AgentPersona) -> u32 {
    let mut score = 0u32;

    let task_type = task.task_type.to_lowercase();
    if role_for_task_type(&task_type) == Some(persona.role) {
        score += 30;
    }

    let description = task.description.to_lowercase();
    let keywords: Vec<&str> = description.split_whitespace().collect();
    for expertise in &persona.expertise_areas {
        let expertise = expertise.to_lowercase();
        if keywords.iter().any(|kw| expertise.contains(kw)) {
            score += 10;
        }
    }

    score + persona.authority_level as u32
}

/// Select the best candidate. The comparison is total (score, then
/// authority, then reversed id), so the result is reproducible.
pub(crate) fn select_best<'a>(
    task: &TaskSpec,
    candidates: &'a [AgentPersona],
) -> Option<&'a AgentPersona> {
    candidates.iter().max_by(|a, b| {
        match score_task_fit(task, a).cmp(&score_task_fit(task, b)) {
            Ordering::Equal => {}
            other => return other,
        }
        match a.authority_level.cmp(&b.authority_level) {
            Ordering::Equal => {}
            other => return other,
        }
        // Smaller id wins, so reverse for max_by
        b.agent_id.cmp(&a.agent_id)
    })
}

impl AgentRegistry {
    /// Assign a task to the most suitable active persona.
    ///
    /// Returns the chosen agent id, or `None` when no active persona
    /// exists (not an error). A preferred role only narrows the candidate
    /// set when at least one active persona holds that role. The
    /// assignment record is written through best-effort; a persistence
    /// failure does not block the result.
    pub async fn assign_task_to_agent(
        &self,
        task: &TaskSpec,
        preferred_role: Option<AgentRole>,
    ) -> Option<String> {
        let mut candidates: Vec<AgentPersona> = {
            let agents = self.agents.read().await;
            agents
                .values()
                .filter(|a| a.status == AgentStatus::Active)
                .cloned()
                .collect()
        };

        if candidates.is_empty() {
            warn!("No active personas available for task assignment");
            return None;
        }

        if let Some(role) = preferred_role {
            let narrowed: Vec<AgentPersona> = candidates
                .iter()
                .filter(|a| a.role == role)
                .cloned()
                .collect();
            if !narrowed.is_empty() {
                candidates = narrowed;
            }
        }

        let best = select_best(task, &candidates)?;
        info!(
            "Assigned '{}' task to {} ({})",
            task.task_type, best.name, best.role
        );

        let assignment = TaskAssignment {
            assignment_id: ulid::Ulid::new().to_string(),
            agent_id: best.agent_id.clone(),
            task_type: task.task_type.clone(),
            task_description: task.description.clone(),
            assigned_at: Utc::now(),
            status: "assigned".into(),
        };
        if let Err(e) = self.store.append_task_assignment(&assignment).await {
            error!("Failed to record task assignment: {}", e);
        }

        Some(best.agent_id.clone())
    }
}
