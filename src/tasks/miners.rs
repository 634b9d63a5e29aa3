//! Mining network monitoring.
//!
//! Fetches aggregate miner statistics and derives operational alerts
//! from cycle-to-cycle changes.

use crate::types::{MinerEntry, MinerStats, MonitorAlert};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::sync::Mutex;
use tracing::debug;

/// Network hashrate drop that raises a high-severity alert.
const HASHRATE_DROP_THRESHOLD: f64 = 0.2;
/// Active-miner ratio below which activity is considered low.
const LOW_ACTIVITY_THRESHOLD: f64 = 0.5;

/// Mining metrics API client.
#[derive(Debug)]
pub struct MinerMonitor {
    api_url: String,
    http: reqwest::Client,
    /// Total hashrate from the previous sample, for drop detection.
    last_hashrate: Mutex<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    total_miners: u64,
    #[serde(default)]
    active_miners: u64,
    #[serde(default)]
    total_hashrate: f64,
    #[serde(default)]
    difficulty: f64,
    #[serde(default)]
    block_height: u64,
    #[serde(default)]
    top_miners: Vec<MinerEntry>,
}

impl MinerMonitor {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            last_hashrate: Mutex::new(None),
        }
    }

    /// Fetch the latest network statistics.
    pub async fn fetch_stats(&self) -> Result<MinerStats> {
        let resp = self
            .http
            .get(format!("{}/miners", self.api_url))
            .send()
            .await
            .context("Failed to fetch miner stats")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Miner stats fetch failed ({}): {}", status, body);
        }

        let body: StatsResponse = resp.json().await.context("Failed to parse miner stats")?;
        debug!(
            "Miner stats: {}/{} active, {:.0} H/s",
            body.active_miners, body.total_miners, body.total_hashrate
        );

        Ok(MinerStats {
            total_miners: body.total_miners,
            active_miners: body.active_miners,
            total_hashrate: body.total_hashrate,
            network_difficulty: body.difficulty,
            block_height: body.block_height,
            top_miners: body.top_miners,
        })
    }

    /// Derive alerts from the given sample against the previous one, and
    /// remember the sample for the next cycle.
    pub fn check_alerts(&self, stats: &MinerStats) -> Vec<MonitorAlert> {
        let previous = self
            .last_hashrate
            .lock()
            .unwrap()
            .replace(stats.total_hashrate);
        alerts_for(stats, previous)
    }
}

fn alerts_for(stats: &MinerStats, previous_hashrate: Option<f64>) -> Vec<MonitorAlert> {
    let mut alerts = Vec::new();

    if let Some(last) = previous_hashrate {
        if last > 0.0 {
            let change = (stats.total_hashrate - last) / last;
            if change < -HASHRATE_DROP_THRESHOLD {
                alerts.push(MonitorAlert {
                    kind: "hashrate_drop".into(),
                    severity: "high".into(),
                    message: format!("Network hashrate dropped by {:.1}%", change.abs() * 100.0),
                });
            }
        }
    }

    if stats.total_miners > 0 {
        let active_ratio = stats.active_miners as f64 / stats.total_miners as f64;
        if active_ratio < LOW_ACTIVITY_THRESHOLD {
            alerts.push(MonitorAlert {
                kind: "low_activity".into(),
                severity: "medium".into(),
                message: format!("Only {:.1}% of miners are active", active_ratio * 100.0),
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: u64, active: u64, hashrate: f64) -> MinerStats {
        MinerStats {
            total_miners: total,
            active_miners: active,
            total_hashrate: hashrate,
            ..Default::default()
        }
    }

    #[test]
    fn hashrate_drop_raises_high_alert() {
        let alerts = alerts_for(&stats(100, 90, 700_000.0), Some(1_000_000.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "hashrate_drop");
        assert_eq!(alerts[0].severity, "high");
        assert!(alerts[0].message.contains("30.0%"));
    }

    #[test]
    fn small_drop_is_quiet() {
        let alerts = alerts_for(&stats(100, 90, 900_000.0), Some(1_000_000.0));
        assert!(alerts.is_empty());
    }

    #[test]
    fn first_sample_never_raises_hashrate_alert() {
        let alerts = alerts_for(&stats(100, 90, 1.0), None);
        assert!(alerts.is_empty());
    }

    #[test]
    fn low_activity_raises_medium_alert() {
        let alerts = alerts_for(&stats(100, 40, 1_000_000.0), Some(1_000_000.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "low_activity");
        assert_eq!(alerts[0].severity, "medium");
    }

    #[test]
    fn both_conditions_stack() {
        let alerts = alerts_for(&stats(100, 10, 100_000.0), Some(1_000_000.0));
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn monitor_remembers_previous_sample() {
        let monitor = MinerMonitor::new("http://localhost:0");
        assert!(monitor.check_alerts(&stats(10, 9, 1_000_000.0)).is_empty());
        let alerts = monitor.check_alerts(&stats(10, 9, 500_000.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, "hashrate_drop");
    }
}
