//! The autonomous operations loop: listen, think, act, sleep.
//!
//! Each cycle gathers monitoring data, fans it out to every active
//! persona for independent decisions, runs a coordination session when
//! high-impact decisions appear, then executes the decided actions with
//! role-based dispatch. Source and action failures are isolated; a
//! cycle only fails outright when there is nothing to run it with.

use crate::brain::DecisionEngine;
use crate::config::QuorumConfig;
use crate::memory::ContextMemory;
use crate::registry::AgentRegistry;
use crate::tasks::{DiscordNotifier, GovernanceClient, MinerMonitor, RewardHandler, SocialMonitor};
use crate::types::*;
use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// One persona's decisions for a cycle.
pub struct PersonaDecisions {
    pub persona: AgentPersona,
    pub decisions: DecisionSet,
}

/// Result of the think phase.
pub struct ThinkOutcome {
    pub decisions: Vec<PersonaDecisions>,
    pub coordination: Option<CoordinationOutcome>,
}

/// What one completed cycle did, for the CLI and the context log.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub personas: usize,
    pub actions: usize,
    pub coordinated: bool,
}

/// The quorum operations daemon.
pub struct Daemon {
    config: QuorumConfig,
    registry: Arc<AgentRegistry>,
    memory: ContextMemory,
    brain: Arc<DecisionEngine>,
    social: Arc<SocialMonitor>,
    miners: MinerMonitor,
    governance: GovernanceClient,
    rewards: RewardHandler,
    discord: DiscordNotifier,
    cycle_count: u64,
}

impl Daemon {
    pub fn new(config: QuorumConfig, registry: Arc<AgentRegistry>, memory: ContextMemory) -> Self {
        let brain = Arc::new(DecisionEngine::new(
            &config.inference_api_url,
            &config.inference_api_key,
            &config.inference_model,
            config.max_decision_tokens,
        ));
        let social = Arc::new(SocialMonitor::new(
            &config.social_api_url,
            &config.social_bearer_token,
            &config.social_handle,
        ));
        let miners = MinerMonitor::new(&config.miner_api_url);
        let governance = GovernanceClient::new(&config.governance_api_url);
        let discord = DiscordNotifier::new(&config.discord_webhook_url);

        Self {
            config,
            registry,
            memory,
            brain,
            social,
            miners,
            governance,
            rewards: RewardHandler::new(),
            discord,
            cycle_count: 0,
        }
    }

    /// Run cycles until `cancel` is triggered. A failed cycle backs off
    /// for `error_backoff_secs` instead of the full interval.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!("Operations daemon started for '{}'", self.config.name);

        loop {
            let wait = match self.run_cycle().await {
                Ok(summary) => {
                    info!(
                        "Cycle #{} complete: {} personas, {} actions",
                        summary.cycle, summary.personas, summary.actions
                    );
                    tokio::time::Duration::from_secs(self.config.cycle_interval_secs)
                }
                Err(e) => {
                    error!("Cycle #{} failed: {}", self.cycle_count, e);
                    tokio::time::Duration::from_secs(self.config.error_backoff_secs)
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancel.cancelled() => {
                    info!("Operations daemon shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Execute a single listen/think/act cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleSummary> {
        self.cycle_count += 1;
        info!("Starting cycle #{}", self.cycle_count);

        if self.registry.active_agents().await.is_empty() {
            bail!("no active personas in the registry");
        }

        let data = self.listen().await;
        let outcome = self.think(&data).await;
        let actions = self.act(&data, &outcome).await;

        let summary = CycleSummary {
            cycle: self.cycle_count,
            personas: outcome.decisions.len(),
            actions,
            coordinated: outcome.coordination.is_some(),
        };

        if let Ok(value) = serde_json::to_value(&summary) {
            self.memory.store_context("cycle_summary", &value).await;
        }

        Ok(summary)
    }

    // -- Listen --------------------------------------------------------------

    /// Gather data from all configured sources concurrently. A failed
    /// source leaves its field empty.
    async fn listen(&self) -> GatheredData {
        let ((community, mentions), (miners, miner_alerts), proposals) = tokio::join!(
            self.gather_social(),
            self.gather_miners(),
            self.gather_proposals(),
        );

        let data = GatheredData {
            timestamp: Utc::now(),
            community,
            mentions,
            miners,
            miner_alerts,
            proposals,
            registry: self.registry.get_registry_stats().await,
        };

        if let Ok(value) = serde_json::to_value(&data) {
            self.memory.store_context("gathered_data", &value).await;
        }

        data
    }

    async fn gather_social(&self) -> (Option<CommunityMetrics>, Vec<Mention>) {
        if self.config.social_bearer_token.is_empty() {
            return (None, Vec::new());
        }

        let (metrics, mentions) = tokio::join!(
            self.social.community_metrics(),
            self.social.recent_mentions(),
        );

        let metrics = metrics
            .map_err(|e| warn!("Community metrics unavailable: {}", e))
            .ok();
        let mentions = mentions.unwrap_or_else(|e| {
            warn!("Mentions unavailable: {}", e);
            Vec::new()
        });

        (metrics, mentions)
    }

    async fn gather_miners(&self) -> (Option<MinerStats>, Vec<MonitorAlert>) {
        if self.config.miner_api_url.is_empty() {
            return (None, Vec::new());
        }

        match self.miners.fetch_stats().await {
            Ok(stats) => {
                let alerts = self.miners.check_alerts(&stats);
                (Some(stats), alerts)
            }
            Err(e) => {
                warn!("Miner stats unavailable: {}", e);
                (None, Vec::new())
            }
        }
    }

    async fn gather_proposals(&self) -> Vec<Proposal> {
        if self.config.governance_api_url.is_empty() {
            return Vec::new();
        }

        self.governance.pending_proposals().await.unwrap_or_else(|e| {
            warn!("Governance proposals unavailable: {}", e);
            Vec::new()
        })
    }

    // -- Think ---------------------------------------------------------------

    /// Fan the gathered data out to every active persona. Each decides
    /// independently; a persona whose decision call fails is omitted.
    /// High-impact decisions trigger a coordination session.
    async fn think(&self, data: &GatheredData) -> ThinkOutcome {
        let recent = Arc::new(self.memory.recent_context(self.config.context_window).await);
        let data = Arc::new(data.clone());

        let mut set = JoinSet::new();
        for persona in self.registry.active_agents().await {
            let brain = self.brain.clone();
            let data = data.clone();
            let recent = recent.clone();
            set.spawn(async move {
                let result = brain.decide(&persona, &data, &recent).await;
                (persona, result)
            });
        }

        let mut decisions = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((persona, Ok(decided))) => {
                    info!(
                        "{} ({}) decided {} actions",
                        persona.name,
                        persona.role,
                        decided.action_count()
                    );
                    decisions.push(PersonaDecisions {
                        persona,
                        decisions: decided,
                    });
                }
                Ok((persona, Err(e))) => {
                    warn!("Decision making failed for {}: {}", persona.name, e);
                }
                Err(e) => warn!("Decision task aborted: {}", e),
            }
        }

        let needing_coordination: Vec<String> = decisions
            .iter()
            .filter(|d| d.decisions.requires_coordination())
            .map(|d| d.persona.agent_id.clone())
            .collect();

        let coordination = if needing_coordination.is_empty() {
            None
        } else {
            let outcome = self
                .registry
                .coordinate_agents("decision_coordination", &needing_coordination)
                .await;
            if outcome.success {
                info!(
                    "Coordination session {} with {} participants",
                    outcome.session_id.as_deref().unwrap_or("?"),
                    outcome.participants
                );
            } else {
                warn!(
                    "Coordination failed: {}",
                    outcome.message.as_deref().unwrap_or("unknown")
                );
            }
            Some(outcome)
        };

        ThinkOutcome {
            decisions,
            coordination,
        }
    }

    // -- Act -----------------------------------------------------------------

    /// Execute all persona decisions and send the cycle summary. Returns
    /// how many actions succeeded.
    async fn act(&self, data: &GatheredData, outcome: &ThinkOutcome) -> usize {
        let mut total = 0;

        for entry in &outcome.decisions {
            let count = self.act_for(entry, data).await;
            total += count;

            let performance = serde_json::json!({
                "agent_id": entry.persona.agent_id,
                "actions_completed": count,
                "timestamp": Utc::now().to_rfc3339(),
            });
            self.memory
                .store_context("agent_performance", &performance)
                .await;
        }

        self.send_cycle_summary(outcome, total).await;
        total
    }

    /// Role-based dispatch for one persona's decisions. Notifications go
    /// out for every role; governance submission is executive-only and
    /// reward distribution community-only.
    async fn act_for(&self, entry: &PersonaDecisions, data: &GatheredData) -> usize {
        let persona = &entry.persona;
        let decisions = &entry.decisions;
        let mut count = 0;

        if self.discord.is_configured() {
            for notification in &decisions.notifications {
                match self.discord.notify(notification).await {
                    Ok(()) => count += 1,
                    Err(e) => warn!("Notification from {} failed: {}", persona.name, e),
                }
            }
        }

        match persona.role {
            AgentRole::Executive => {
                count += self.submit_proposals(persona, &decisions.governance).await;
                count += self.engage_social(&decisions.social).await;
            }
            AgentRole::Community => {
                count += self.engage_social(&decisions.social).await;
                count += self.rewards.distribute(&decisions.rewards);
                // Monitoring-derived payouts go out alongside whatever the
                // persona proposed.
                let computed = self.rewards.calculate_rewards(data);
                count += self.rewards.distribute(&computed);
            }
            AgentRole::Technical | AgentRole::Compliance | AgentRole::Coordinator => {}
        }

        count
    }

    async fn submit_proposals(&self, persona: &AgentPersona, drafts: &[ProposalDraft]) -> usize {
        if self.config.governance_api_url.is_empty() || drafts.is_empty() {
            return 0;
        }

        let mut count = 0;
        for draft in drafts {
            match self.governance.submit_proposal(draft).await {
                Ok(id) => {
                    info!("{} submitted proposal {} ('{}')", persona.name, id, draft.title);
                    count += 1;
                }
                Err(e) => warn!("Proposal '{}' failed: {}", draft.title, e),
            }
        }
        count
    }

    async fn engage_social(&self, actions: &[SocialAction]) -> usize {
        if self.config.social_bearer_token.is_empty() || actions.is_empty() {
            return 0;
        }
        self.social.engage(actions).await
    }

    async fn send_cycle_summary(&self, outcome: &ThinkOutcome, actions: usize) {
        if !self.discord.is_configured() {
            return;
        }

        let mut message = format!(
            "Cycle #{}: {} personas decided, {} actions executed, coordination: {}\n",
            self.cycle_count,
            outcome.decisions.len(),
            actions,
            if outcome.coordination.is_some() {
                "yes"
            } else {
                "no"
            },
        );
        for entry in &outcome.decisions {
            message.push_str(&format!(
                "- {} ({}): {} decisions\n",
                entry.persona.name,
                entry.persona.role,
                entry.decisions.action_count()
            ));
        }

        let summary = Notification {
            channel: "general".into(),
            message,
            priority: "normal".into(),
        };
        if let Err(e) = self.discord.notify(&summary).await {
            warn!("Cycle summary notification failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use std::collections::HashMap;

    fn daemon() -> Daemon {
        let store: Arc<dyn crate::store::RecordStore> =
            Arc::new(SqliteStore::open_memory().unwrap());
        let registry = Arc::new(AgentRegistry::new(store.clone()));
        Daemon::new(QuorumConfig::default(), registry, ContextMemory::new(store))
    }

    fn persona(role: AgentRole) -> AgentPersona {
        let now = Utc::now();
        AgentPersona {
            agent_id: "p1".into(),
            name: "Persona".into(),
            role,
            personality_traits: HashMap::new(),
            communication_style: "professional".into(),
            expertise_areas: Vec::new(),
            authority_level: 8,
            social_accounts: HashMap::new(),
            contact_info: HashMap::new(),
            status: AgentStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn gathered(miners: Option<MinerStats>, community: Option<CommunityMetrics>) -> GatheredData {
        GatheredData {
            timestamp: Utc::now(),
            community,
            mentions: Vec::new(),
            miners,
            miner_alerts: Vec::new(),
            proposals: Vec::new(),
            registry: RegistryStats {
                total_agents: 0,
                active_agents: 0,
                agents_by_role: Default::default(),
                recent_activity: Vec::new(),
            },
        }
    }

    #[tokio::test]
    async fn community_dispatch_pays_decided_and_computed_grants() {
        let daemon = daemon();

        let mut decisions = DecisionSet::default();
        decisions.rewards.push(RewardGrant {
            recipient: "contributor".into(),
            amount: 40.0,
            reason: "event hosting".into(),
        });

        let data = gathered(
            Some(MinerStats {
                top_miners: vec![MinerEntry {
                    address: "m1".into(),
                    hashrate: 1000.0,
                    uptime: 0.8,
                }],
                ..Default::default()
            }),
            Some(CommunityMetrics {
                followers_count: 100,
                follower_growth: 3,
                ..Default::default()
            }),
        );

        // One decided grant plus one miner payout and one growth grant;
        // social and webhook channels are unconfigured and contribute
        // nothing.
        let entry = PersonaDecisions {
            persona: persona(AgentRole::Community),
            decisions,
        };
        assert_eq!(daemon.act_for(&entry, &data).await, 3);
    }

    #[tokio::test]
    async fn non_community_roles_skip_treasury_actions() {
        let daemon = daemon();

        let mut decisions = DecisionSet::default();
        decisions.rewards.push(RewardGrant {
            recipient: "contributor".into(),
            amount: 40.0,
            reason: "event hosting".into(),
        });

        let data = gathered(
            Some(MinerStats {
                top_miners: vec![MinerEntry {
                    address: "m1".into(),
                    hashrate: 1000.0,
                    uptime: 0.8,
                }],
                ..Default::default()
            }),
            None,
        );

        let entry = PersonaDecisions {
            persona: persona(AgentRole::Technical),
            decisions,
        };
        assert_eq!(daemon.act_for(&entry, &data).await, 0);
    }
}
