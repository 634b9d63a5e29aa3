//! Reward computation and distribution.
//!
//! Rewards are computed deterministically from monitoring data: ranked
//! mining payouts with an uptime bonus, plus a community growth grant.
//! Distribution itself is recorded but not settled on-chain here.

use crate::types::{GatheredData, MinerEntry, RewardGrant};
use tracing::info;

/// Payout table for the top miners, by rank.
const BASE_REWARDS: [f64; 10] = [
    1000.0, 750.0, 500.0, 400.0, 300.0, 250.0, 200.0, 150.0, 100.0, 50.0,
];

/// Tokens granted to the community fund per follower gained.
const GROWTH_REWARD_PER_FOLLOWER: f64 = 10.0;

#[derive(Debug, Clone, Default)]
pub struct RewardHandler;

impl RewardHandler {
    pub fn new() -> Self {
        Self
    }

    /// Compute reward grants from one cycle's gathered data.
    pub fn calculate_rewards(&self, data: &GatheredData) -> Vec<RewardGrant> {
        let mut grants = Vec::new();

        if let Some(miners) = &data.miners {
            for (rank, miner) in miners.top_miners.iter().take(BASE_REWARDS.len()).enumerate() {
                let amount = mining_reward(rank, miner);
                if amount > 0.0 && !miner.address.is_empty() {
                    grants.push(RewardGrant {
                        recipient: miner.address.clone(),
                        amount,
                        reason: format!("Top {} miner performance", rank + 1),
                    });
                }
            }
        }

        if let Some(community) = &data.community {
            if community.follower_growth > 0 {
                grants.push(RewardGrant {
                    recipient: "community_fund".into(),
                    amount: community.follower_growth as f64 * GROWTH_REWARD_PER_FOLLOWER,
                    reason: format!(
                        "Community grew by {} followers",
                        community.follower_growth
                    ),
                });
            }
        }

        grants
    }

    /// Record the grants. Settlement happens out of band; this logs each
    /// grant so the treasury pipeline can pick them up.
    pub fn distribute(&self, grants: &[RewardGrant]) -> usize {
        for grant in grants {
            info!(
                "Reward: {} to {} for {}",
                grant.amount, grant.recipient, grant.reason
            );
        }
        grants.len()
    }
}

/// Base payout for a rank, scaled by an uptime bonus. Uptime above 0.8
/// earns up to a 10% bonus; below it the payout shrinks.
fn mining_reward(rank: usize, miner: &MinerEntry) -> f64 {
    let Some(base) = BASE_REWARDS.get(rank) else {
        return 0.0;
    };
    let multiplier = 1.0 + (miner.uptime - 0.8) * 0.5;
    base * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommunityMetrics, MinerStats, RegistryStats};
    use chrono::Utc;

    fn miner(address: &str, uptime: f64) -> MinerEntry {
        MinerEntry {
            address: address.into(),
            hashrate: 1000.0,
            uptime,
        }
    }

    fn data_with(miners: Option<MinerStats>, community: Option<CommunityMetrics>) -> GatheredData {
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

    #[test]
    fn payouts_decrease_with_rank() {
        let stats = MinerStats {
            top_miners: vec![miner("aa", 0.8), miner("bb", 0.8), miner("cc", 0.8)],
            ..Default::default()
        };
        let grants = RewardHandler::new().calculate_rewards(&data_with(Some(stats), None));
        assert_eq!(grants.len(), 3);
        assert_eq!(grants[0].amount, 1000.0);
        assert_eq!(grants[1].amount, 750.0);
        assert_eq!(grants[2].amount, 500.0);
        assert_eq!(grants[0].recipient, "aa");
    }

    #[test]
    fn uptime_scales_the_payout() {
        let stats = MinerStats {
            top_miners: vec![miner("aa", 1.0)],
            ..Default::default()
        };
        let grants = RewardHandler::new().calculate_rewards(&data_with(Some(stats), None));
        assert_eq!(grants[0].amount, 1100.0);

        let stats = MinerStats {
            top_miners: vec![miner("aa", 0.5)],
            ..Default::default()
        };
        let grants = RewardHandler::new().calculate_rewards(&data_with(Some(stats), None));
        assert_eq!(grants[0].amount, 850.0);
    }

    #[test]
    fn only_top_ten_miners_are_paid() {
        let stats = MinerStats {
            top_miners: (0..15).map(|i| miner(&format!("m{i}"), 0.8)).collect(),
            ..Default::default()
        };
        let grants = RewardHandler::new().calculate_rewards(&data_with(Some(stats), None));
        assert_eq!(grants.len(), 10);
        assert_eq!(grants[9].amount, 50.0);
    }

    #[test]
    fn follower_growth_funds_the_community() {
        let community = CommunityMetrics {
            followers_count: 1200,
            follower_growth: 25,
            ..Default::default()
        };
        let grants = RewardHandler::new().calculate_rewards(&data_with(None, Some(community)));
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].recipient, "community_fund");
        assert_eq!(grants[0].amount, 250.0);
    }

    #[test]
    fn no_data_means_no_grants() {
        let grants = RewardHandler::new().calculate_rewards(&data_with(None, None));
        assert!(grants.is_empty());
    }
}
