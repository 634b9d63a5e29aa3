//! Multi-persona agent registry.
//!
//! Holds the authoritative in-memory working set of personas and mirrors
//! it to the record store (write-behind: a failed write is logged, never
//! rolled back). Reads may run concurrently; all mutation goes through
//! the write lock so a persona record is always observed whole.

pub mod assign;
pub mod coordinate;
pub mod defaults;

use crate::error::RegistryError;
use crate::store::{PersonaUpdate, RecordStore};
use crate::types::*;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// How many task-assignment records `get_registry_stats` reports.
const RECENT_ACTIVITY_LIMIT: usize = 10;

/// The agent registry: persona catalogue, task assignment, coordination.
pub struct AgentRegistry {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) agents: RwLock<HashMap<String, AgentPersona>>,
}

impl AgentRegistry {
    /// Create a registry over an explicitly constructed record store.
    /// The store's lifecycle is owned by the caller.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Load known personas into the working set, bootstrapping the
    /// default set when none exist.
    ///
    /// Only ACTIVE personas enter the working set: inactive or suspended
    /// personas stay in the durable store but are excluded from live
    /// scheduling. Returns false only if bootstrap registration itself
    /// fails.
    pub async fn initialize(&self) -> bool {
        info!("Initializing agent registry");

        match self.store.load_all_personas().await {
            Ok(personas) => {
                let mut agents = self.agents.write().await;
                for persona in personas {
                    if persona.status == AgentStatus::Active {
                        agents.insert(persona.agent_id.clone(), persona);
                    }
                }
            }
            Err(e) => {
                warn!("Could not load existing personas: {}", e);
            }
        }

        let empty = self.agents.read().await.is_empty();
        if empty {
            info!("No personas found, creating default set");
            for config in defaults::default_personas() {
                let name = config.name.clone();
                match self.register_agent(config).await {
                    Ok(_) => info!("Created default persona: {}", name),
                    Err(e) => {
                        error!("Failed to create default persona {}: {}", name, e);
                        return false;
                    }
                }
            }
        }

        let count = self.agents.read().await.len();
        info!("Agent registry initialized with {} personas", count);
        true
    }

    /// Register a new persona.
    ///
    /// Validates the config at the boundary; the persona enters the
    /// working set as ACTIVE and is written through best-effort.
    pub async fn register_agent(&self, config: PersonaConfig) -> Result<String, RegistryError> {
        if config.name.trim().is_empty() {
            return Err(RegistryError::Validation("persona name is empty".into()));
        }
        let role: AgentRole = config
            .role
            .parse()
            .map_err(RegistryError::Validation)?;
        if !(1..=10).contains(&config.authority_level) {
            return Err(RegistryError::Validation(format!(
                "authority level {} outside 1-10",
                config.authority_level
            )));
        }

        let now = Utc::now();
        let persona = AgentPersona {
            agent_id: ulid::Ulid::new().to_string(),
            name: config.name,
            role,
            personality_traits: config.personality_traits,
            communication_style: config.communication_style,
            expertise_areas: config.expertise_areas,
            authority_level: config.authority_level,
            social_accounts: config.social_accounts,
            contact_info: config.contact_info,
            status: AgentStatus::Active,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.insert_persona(&persona).await {
            error!("Failed to persist persona {}: {}", persona.name, e);
        }

        let agent_id = persona.agent_id.clone();
        info!("Registered persona: {} ({})", persona.name, persona.role);
        self.agents
            .write()
            .await
            .insert(agent_id.clone(), persona);

        Ok(agent_id)
    }

    /// Look up a persona by id. Pure read, no side effects.
    pub async fn get_agent(&self, agent_id: &str) -> Option<AgentPersona> {
        self.agents.read().await.get(agent_id).cloned()
    }

    /// All personas with the given role, any status, unordered.
    pub async fn get_agents_by_role(&self, role: AgentRole) -> Vec<AgentPersona> {
        self.agents
            .read()
            .await
            .values()
            .filter(|a| a.role == role)
            .cloned()
            .collect()
    }

    /// Snapshot of every ACTIVE persona, unordered.
    pub async fn active_agents(&self) -> Vec<AgentPersona> {
        self.agents
            .read()
            .await
            .values()
            .filter(|a| a.status == AgentStatus::Active)
            .cloned()
            .collect()
    }

    /// Update a persona's operational status. Any status may transition
    /// to any other. Returns false when the id is unknown.
    pub async fn update_agent_status(&self, agent_id: &str, status: AgentStatus) -> bool {
        let updated_at = {
            let mut agents = self.agents.write().await;
            match agents.get_mut(agent_id) {
                Some(persona) => {
                    persona.status = status;
                    persona.updated_at = Utc::now();
                    persona.updated_at
                }
                None => {
                    warn!("Persona {} not found for status update", agent_id);
                    return false;
                }
            }
        };

        let update = PersonaUpdate {
            status: Some(status),
            updated_at,
        };
        if let Err(e) = self.store.update_persona_fields(agent_id, &update).await {
            error!("Failed to persist status update for {}: {}", agent_id, e);
        }

        info!("Persona {} status set to {}", agent_id, status);
        true
    }

    /// Snapshot of the working set plus recent assignment activity.
    /// A record-store failure yields an empty activity list.
    pub async fn get_registry_stats(&self) -> RegistryStats {
        let (total_agents, active_agents, agents_by_role) = {
            let agents = self.agents.read().await;
            let mut by_role: BTreeMap<AgentRole, usize> = BTreeMap::new();
            let mut active = 0usize;
            for persona in agents.values() {
                *by_role.entry(persona.role).or_insert(0) += 1;
                if persona.status == AgentStatus::Active {
                    active += 1;
                }
            }
            (agents.len(), active, by_role)
        };

        let recent_activity = match self
            .store
            .query_recent_task_assignments(RECENT_ACTIVITY_LIMIT)
            .await
        {
            Ok(assignments) => assignments
                .into_iter()
                .map(|a| ActivityRecord {
                    agent_id: a.agent_id,
                    activity: format!("Assigned task: {}", a.task_type),
                    timestamp: a.assigned_at,
                })
                .collect(),
            Err(e) => {
                warn!("Could not fetch recent activity: {}", e);
                Vec::new()
            }
        };

        RegistryStats {
            total_agents,
            active_agents,
            agents_by_role,
            recent_activity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn registry() -> AgentRegistry {
        AgentRegistry::new(Arc::new(SqliteStore::open_memory().unwrap()))
    }

    fn config(name: &str, role: &str) -> PersonaConfig {
        PersonaConfig {
            name: name.into(),
            role: role.into(),
            personality_traits: HashMap::new(),
            communication_style: "professional".into(),
            expertise_areas: vec!["governance".into()],
            authority_level: 6,
            social_accounts: HashMap::new(),
            contact_info: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn registration_ids_are_distinct() {
        let registry = registry();
        let mut ids = std::collections::HashSet::new();
        for i in 0..20 {
            let id = registry
                .register_agent(config(&format!("P{i}"), "executive"))
                .await
                .unwrap();
            assert!(ids.insert(id));
        }
    }

    #[tokio::test]
    async fn registered_persona_matches_config() {
        let registry = registry();
        let mut cfg = config("Ada", "technical");
        cfg.expertise_areas = vec!["blockchain".into(), "security".into()];
        cfg.authority_level = 7;

        let id = registry.register_agent(cfg).await.unwrap();
        let persona = registry.get_agent(&id).await.unwrap();

        assert_eq!(persona.name, "Ada");
        assert_eq!(persona.role, AgentRole::Technical);
        assert_eq!(persona.expertise_areas, vec!["blockchain", "security"]);
        assert_eq!(persona.authority_level, 7);
        assert_eq!(persona.status, AgentStatus::Active);
    }

    #[tokio::test]
    async fn invalid_registration_is_rejected() {
        let registry = registry();

        let err = registry
            .register_agent(config("Ghost", "overlord"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let err = registry
            .register_agent(config("  ", "executive"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let mut cfg = config("Maxed", "executive");
        cfg.authority_level = 11;
        let err = registry.register_agent(cfg).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[tokio::test]
    async fn status_update_observed_and_idempotent() {
        let registry = registry();
        let id = registry
            .register_agent(config("Flip", "community"))
            .await
            .unwrap();

        assert!(registry.update_agent_status(&id, AgentStatus::Suspended).await);
        let first = registry.get_agent(&id).await.unwrap();
        assert_eq!(first.status, AgentStatus::Suspended);

        // Same status again: only updated_at advances
        assert!(registry.update_agent_status(&id, AgentStatus::Suspended).await);
        let second = registry.get_agent(&id).await.unwrap();
        assert_eq!(second.status, AgentStatus::Suspended);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.created_at, first.created_at);

        assert!(!registry.update_agent_status("missing", AgentStatus::Active).await);
    }

    #[tokio::test]
    async fn assignment_none_when_no_active_personas() {
        let registry = registry();
        let task = TaskSpec {
            task_type: "technical".into(),
            description: "anything".into(),
        };
        assert!(registry.assign_task_to_agent(&task, None).await.is_none());

        // A suspended persona does not count as available
        let id = registry
            .register_agent(config("Paused", "technical"))
            .await
            .unwrap();
        registry.update_agent_status(&id, AgentStatus::Suspended).await;
        assert!(registry.assign_task_to_agent(&task, None).await.is_none());
    }

    #[tokio::test]
    async fn preferred_role_is_advisory() {
        let registry = registry();
        let id = registry
            .register_agent(config("Only", "community"))
            .await
            .unwrap();

        let task = TaskSpec {
            task_type: "community".into(),
            description: String::new(),
        };
        // No executive exists; the preference must not empty the pool
        let chosen = registry
            .assign_task_to_agent(&task, Some(AgentRole::Executive))
            .await;
        assert_eq!(chosen, Some(id));
    }

    #[tokio::test]
    async fn assignments_show_up_in_recent_activity() {
        let registry = registry();
        let id = registry
            .register_agent(config("Worker", "technical"))
            .await
            .unwrap();

        let task = TaskSpec {
            task_type: "technical".into(),
            description: "governance review".into(),
        };
        registry.assign_task_to_agent(&task, None).await.unwrap();

        let stats = registry.get_registry_stats().await;
        assert_eq!(stats.recent_activity.len(), 1);
        assert_eq!(stats.recent_activity[0].agent_id, id);
        assert_eq!(stats.recent_activity[0].activity, "Assigned task: technical");
    }

    #[tokio::test]
    async fn coordination_filters_inactive_participants() {
        let registry = registry();
        let active = registry
            .register_agent(config("Active", "executive"))
            .await
            .unwrap();
        let suspended = registry
            .register_agent(config("Benched", "technical"))
            .await
            .unwrap();
        registry
            .update_agent_status(&suspended, AgentStatus::Suspended)
            .await;

        let outcome = registry
            .coordinate_agents(
                "decision_coordination",
                &[active.clone(), suspended.clone(), "unknown".into()],
            )
            .await;
        assert!(outcome.success);
        assert!(outcome.session_id.is_some());
        assert_eq!(outcome.participants, 1);
        assert_eq!(outcome.agents[0].id, active);

        let outcome = registry
            .coordinate_agents("decision_coordination", &[suspended])
            .await;
        assert!(!outcome.success);
        assert!(outcome.session_id.is_none());
        assert!(outcome.message.is_some());
    }
}
