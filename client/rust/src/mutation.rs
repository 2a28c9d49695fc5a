//! Optimistic writes.
//!
//! A mutation writes its expected result into the cache before the request
//! is sent. On success the key is invalidated so the next read confirms
//! the server's view; on failure the exact previous data is restored.
//! Each optimistic write stamps the entry with a token, and a rollback
//! only restores when its token is still the latest, so a failing older
//! mutation never clobbers a newer one.

use std::collections::HashMap;
use std::future::Future;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::Entry;
use crate::client::QueryClient;
use crate::error::Result;
use crate::key::QueryKey;
use crate::policy::QueryPolicy;

/// Lifecycle of an optimistic write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}

/// Entry contents before the optimistic write.
#[derive(Debug, Clone)]
struct Snapshot {
    data: Option<Value>,
    updated_at: Option<Instant>,
    invalidated: bool,
}

/// An optimistic write waiting for its request to settle.
///
/// Dropping a pending mutation keeps the optimistic data but marks it
/// stale and releases the entry for garbage collection.
#[derive(Debug)]
#[must_use = "a pending mutation must be committed or rolled back"]
pub struct Mutation {
    client: QueryClient,
    key: QueryKey,
    token: u64,
    snapshot: Snapshot,
    state: MutationState,
}

/// Result of [`QueryClient::mutate`].
#[derive(Debug)]
pub struct MutationOutcome<V> {
    pub state: MutationState,
    pub result: Result<V>,
}

impl<V> MutationOutcome<V> {
    pub fn into_result(self) -> Result<V> {
        self.result
    }

    pub fn is_committed(&self) -> bool {
        self.state == MutationState::Committed
    }
}

impl QueryClient {
    /// Apply `update` to the cached data for `key` and return the pending
    /// mutation. In-flight fetches under `key` are cancelled first so they
    /// cannot overwrite the optimistic value.
    pub async fn begin_mutation<T, U>(&self, key: &QueryKey, update: U) -> Result<Mutation>
    where
        T: Serialize + DeserializeOwned,
        U: FnOnce(Option<T>) -> T,
    {
        self.cancel_queries(key).await;
        let token = self.next_token();

        let mut entries = self.inner.entries.lock().await;
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(QueryPolicy::for_key(key)));
        let snapshot = Snapshot {
            data: entry.data.clone(),
            updated_at: entry.updated_at,
            invalidated: entry.invalidated,
        };
        let current: Option<T> = entry
            .data
            .clone()
            .map(serde_json::from_value)
            .transpose()?;
        let optimistic = serde_json::to_value(update(current))?;
        entry.store(optimistic, Instant::now());
        entry.mutation_token = Some(token);
        debug!(key = %key, token, "Applied optimistic update");

        Ok(Mutation {
            client: self.clone(),
            key: key.clone(),
            token,
            snapshot,
            state: MutationState::Pending,
        })
    }

    /// Run `request` as an optimistic mutation of `key`.
    ///
    /// Commits when the request succeeds and rolls back when it fails.
    pub async fn mutate<T, U, V, Fut>(&self, key: &QueryKey, update: U, request: Fut) -> MutationOutcome<V>
    where
        T: Serialize + DeserializeOwned,
        U: FnOnce(Option<T>) -> T,
        Fut: Future<Output = Result<V>>,
    {
        let mutation = match self.begin_mutation(key, update).await {
            Ok(mutation) => mutation,
            Err(e) => {
                return MutationOutcome {
                    state: MutationState::RolledBack,
                    result: Err(e),
                }
            }
        };
        let result = request.await;
        let state = match &result {
            Ok(_) => mutation.commit().await,
            Err(_) => mutation.rollback().await,
        };
        MutationOutcome { state, result }
    }
}

impl Mutation {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    /// The request succeeded. Invalidates the key so the server's data
    /// replaces the optimistic value on the next read.
    pub async fn commit(mut self) -> MutationState {
        {
            let mut entries = self.client.inner.entries.lock().await;
            if let Some(entry) = entries.get_mut(&self.key) {
                if entry.mutation_token == Some(self.token) {
                    entry.mutation_token = None;
                }
            }
        }
        self.client.invalidate_queries(&self.key).await;
        self.state = MutationState::Committed;
        debug!(key = %self.key, token = self.token, "Committed optimistic update");
        self.state
    }

    /// The request failed. Restores the data seen before the optimistic
    /// write unless a newer write has replaced it since.
    pub async fn rollback(mut self) -> MutationState {
        let mut entries = self.client.inner.entries.lock().await;
        match entries.get_mut(&self.key) {
            Some(entry) if entry.mutation_token == Some(self.token) => {
                entry.data = self.snapshot.data.take();
                entry.updated_at = self.snapshot.updated_at;
                entry.invalidated = self.snapshot.invalidated;
                entry.mutation_token = None;
                debug!(key = %self.key, token = self.token, "Rolled back optimistic update");
            }
            _ => {
                debug!(key = %self.key, token = self.token, "Newer write present, skipping rollback");
            }
        }
        self.state = MutationState::RolledBack;
        self.state
    }
}

/// Clear `token` from `key` if it is still the latest write.
fn release(entries: &mut HashMap<QueryKey, Entry>, key: &QueryKey, token: u64) {
    if let Some(entry) = entries.get_mut(key) {
        if entry.mutation_token == Some(token) {
            entry.mutation_token = None;
            entry.invalidated = true;
        }
    }
}

impl Drop for Mutation {
    fn drop(&mut self) {
        if self.state != MutationState::Pending {
            return;
        }
        debug!(key = %self.key, token = self.token, "Pending mutation dropped");
        if let Ok(mut entries) = self.client.inner.entries.try_lock() {
            release(&mut entries, &self.key, self.token);
            return;
        }
        // Lock is busy: finish on the runtime if there is one.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let client = self.client.clone();
            let key = self.key.clone();
            let token = self.token;
            handle.spawn(async move {
                let mut entries = client.inner.entries.lock().await;
                release(&mut entries, &key, token);
            });
        }
    }
}
