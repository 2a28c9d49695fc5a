//! Path revalidation.
//!
//! After a write, actions mark the pages whose data changed. Each path
//! carries a version that only ever increases; every bump is broadcast to
//! subscribers (the SSE endpoint, and through it the client cache).

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Channel capacity for broadcast.
const CHANNEL_CAPACITY: usize = 256;

/// A path whose cached render is out of date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revalidation {
    pub path: String,
    pub version: u64,
}

/// Per-path version counter plus fan-out.
#[derive(Clone)]
pub struct Revalidator {
    versions: Arc<RwLock<HashMap<String, u64>>>,
    sender: broadcast::Sender<Revalidation>,
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Revalidator {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            versions: Arc::new(RwLock::new(HashMap::new())),
            sender,
        }
    }

    /// Bump `path` and notify subscribers. Returns the new version.
    pub async fn revalidate(&self, path: &str) -> u64 {
        let version = {
            let mut versions = self.versions.write().await;
            let entry = versions.entry(path.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        debug!(path = %path, version, "Revalidating path");

        // No receivers is fine: nobody is watching.
        let _ = self.sender.send(Revalidation {
            path: path.to_string(),
            version,
        });
        version
    }

    /// Bump every path in order.
    pub async fn revalidate_all(&self, paths: &[&str]) {
        for path in paths {
            self.revalidate(path).await;
        }
    }

    /// Current version of `path`; 0 if never revalidated.
    pub async fn version(&self, path: &str) -> u64 {
        self.versions.read().await.get(path).copied().unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Revalidation> {
        self.sender.subscribe()
    }
}
