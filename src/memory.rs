//! Persistent context memory for the daemon.
//!
//! Thin wrapper over the record store's context log. Store failures
//! degrade to log-and-continue: losing a context entry never stops a
//! cycle.

use crate::store::RecordStore;
use crate::types::ContextEntry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Context memory backed by the record store.
#[derive(Clone)]
pub struct ContextMemory {
    store: Arc<dyn RecordStore>,
}

impl ContextMemory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Append a context entry. Best-effort.
    pub async fn store_context(&self, kind: &str, data: &serde_json::Value) {
        match self.store.store_context(kind, data).await {
            Ok(()) => debug!("Stored context entry: {}", kind),
            Err(e) => warn!("Could not store context entry '{}': {}", kind, e),
        }
    }

    /// Most recent context entries, newest first. Empty on store failure.
    pub async fn recent_context(&self, limit: usize) -> Vec<ContextEntry> {
        match self.store.recent_context(limit).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not fetch recent context: {}", e);
                Vec::new()
            }
        }
    }
}
