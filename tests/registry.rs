//! End-to-end registry behavior over the embedded record store.

use std::collections::HashMap;
use std::sync::Arc;

use quorum::registry::AgentRegistry;
use quorum::store::{RecordStore, SqliteStore};
use quorum::types::*;

fn shared_store() -> Arc<dyn RecordStore> {
    Arc::new(SqliteStore::open_memory().unwrap())
}

fn persona_config(name: &str, role: &str, expertise: &[&str], authority: u8) -> PersonaConfig {
    PersonaConfig {
        name: name.into(),
        role: role.into(),
        personality_traits: HashMap::new(),
        communication_style: "professional".into(),
        expertise_areas: expertise.iter().map(|s| s.to_string()).collect(),
        authority_level: authority,
        social_accounts: HashMap::new(),
        contact_info: HashMap::new(),
    }
}

#[tokio::test]
async fn initialize_bootstraps_one_persona_per_core_role() {
    let registry = AgentRegistry::new(shared_store());
    assert!(registry.initialize().await);

    let stats = registry.get_registry_stats().await;
    assert_eq!(stats.total_agents, 4);
    assert_eq!(stats.active_agents, 4);
    for role in [
        AgentRole::Executive,
        AgentRole::Technical,
        AgentRole::Community,
        AgentRole::Compliance,
    ] {
        assert_eq!(stats.agents_by_role.get(&role), Some(&1), "role {role}");
    }
    assert!(stats.agents_by_role.get(&AgentRole::Coordinator).is_none());

    // The executive outranks the specialists
    let executives = registry.get_agents_by_role(AgentRole::Executive).await;
    assert_eq!(executives[0].authority_level, 9);
    for role in [
        AgentRole::Technical,
        AgentRole::Community,
        AgentRole::Compliance,
    ] {
        assert_eq!(registry.get_agents_by_role(role).await[0].authority_level, 8);
    }
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let registry = AgentRegistry::new(shared_store());
    assert!(registry.initialize().await);
    assert!(registry.initialize().await);

    let first = registry.get_registry_stats().await;
    let second = registry.get_registry_stats().await;
    assert_eq!(first.total_agents, 4);
    assert_eq!(first, second);
}

#[tokio::test]
async fn personas_survive_a_restart() {
    let store = shared_store();

    let first = AgentRegistry::new(store.clone());
    assert!(first.initialize().await);
    let extra = first
        .register_agent(persona_config(
            "Nadia Kove",
            "coordinator",
            &["escalation"],
            6,
        ))
        .await
        .unwrap();

    let second = AgentRegistry::new(store);
    assert!(second.initialize().await);

    let stats = second.get_registry_stats().await;
    assert_eq!(stats.total_agents, 5);
    assert_eq!(second.get_agent(&extra).await.unwrap().name, "Nadia Kove");
}

#[tokio::test]
async fn suspended_personas_stay_out_of_the_working_set_on_reload() {
    let store = shared_store();

    let first = AgentRegistry::new(store.clone());
    assert!(first.initialize().await);
    let technical = first.get_agents_by_role(AgentRole::Technical).await[0]
        .agent_id
        .clone();
    assert!(
        first
            .update_agent_status(&technical, AgentStatus::Suspended)
            .await
    );

    let second = AgentRegistry::new(store);
    assert!(second.initialize().await);

    let stats = second.get_registry_stats().await;
    assert_eq!(stats.total_agents, 3);
    assert!(second.get_agent(&technical).await.is_none());
}

#[tokio::test]
async fn governance_task_lands_on_the_executive() {
    let registry = AgentRegistry::new(shared_store());
    assert!(registry.initialize().await);

    let task = TaskSpec {
        task_type: "governance".into(),
        description: "Review the treasury diversification proposal".into(),
    };
    let chosen = registry.assign_task_to_agent(&task, None).await.unwrap();

    let executives = registry.get_agents_by_role(AgentRole::Executive).await;
    assert_eq!(chosen, executives[0].agent_id);
}

#[tokio::test]
async fn expertise_outweighs_a_bare_role_match() {
    let registry = AgentRegistry::new(shared_store());

    let generalist = registry
        .register_agent(persona_config("Generalist", "technical", &[], 4))
        .await
        .unwrap();
    let specialist = registry
        .register_agent(persona_config(
            "Specialist",
            "community",
            &["mining", "security", "blockchain"],
            5,
        ))
        .await
        .unwrap();

    // Generalist: role match 30 + authority 4 = 34. Specialist: three
    // matching expertise entries 30 + authority 5 = 35.
    let task = TaskSpec {
        task_type: "development".into(),
        description: "harden mining pool security on the blockchain".into(),
    };
    let chosen = registry.assign_task_to_agent(&task, None).await.unwrap();
    assert_eq!(chosen, specialist);

    // Without keyword overlap the role match wins
    let task = TaskSpec {
        task_type: "development".into(),
        description: "refactor the build pipeline".into(),
    };
    let chosen = registry.assign_task_to_agent(&task, None).await.unwrap();
    assert_eq!(chosen, generalist);
}

#[tokio::test]
async fn coordination_session_spans_the_default_set() {
    let registry = AgentRegistry::new(shared_store());
    assert!(registry.initialize().await);

    let ids: Vec<String> = registry
        .active_agents()
        .await
        .into_iter()
        .map(|p| p.agent_id)
        .collect();
    assert_eq!(ids.len(), 4);

    let outcome = registry
        .coordinate_agents("decision_coordination", &ids)
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.participants, 4);
    assert!(outcome.session_id.is_some());

    // Suspend one participant; a new session excludes it
    registry
        .update_agent_status(&ids[0], AgentStatus::Suspended)
        .await;
    let outcome = registry
        .coordinate_agents("decision_coordination", &ids)
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.participants, 3);
}
