//! Keyed query cache with freshness, cancellation and background refetch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use backon::Retryable;
use futures::future::{join_all, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{Entry, QueryState};
use crate::error::{ClientError, Result};
use crate::key::QueryKey;
use crate::keys;
use crate::policy::{QueryPolicy, RetryPolicy};

/// Type-erased fetcher kept for observed queries.
type Refetch = Arc<dyn Fn() -> BoxFuture<'static, Result<Value>> + Send + Sync>;

struct Observer {
    refetch: Refetch,
    policy: QueryPolicy,
    count: usize,
    interval: Option<JoinHandle<()>>,
}

pub(crate) struct Inner {
    pub(crate) entries: Mutex<HashMap<QueryKey, Entry>>,
    observers: Mutex<HashMap<QueryKey, Observer>>,
    retry: RetryPolicy,
    tokens: AtomicU64,
}

/// Which observed queries a refetch trigger applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Focus,
    Reconnect,
}

/// Shared query cache.
///
/// Cloning is cheap; clones share the same cache.
#[derive(Clone)]
pub struct QueryClient {
    pub(crate) inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl QueryClient {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                observers: Mutex::new(HashMap::new()),
                retry,
                tokens: AtomicU64::new(0),
            }),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    /// Return cached data when fresh under `policy`, otherwise fetch it.
    ///
    /// Retryable failures are retried per the client's [`RetryPolicy`].
    /// A result superseded by a newer fetch or a cancel is discarded and
    /// reported as [`ClientError::Cancelled`].
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: &QueryKey,
        policy: QueryPolicy,
        fetcher: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh_data(key, policy).await {
            debug!(key = %key, "Serving fresh cached query");
            return Ok(serde_json::from_value(value)?);
        }
        let value = self
            .run_fetch(key, policy, || {
                let fut = fetcher();
                async move { fut.await.and_then(to_json) }
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Warm the cache for `key`.
    ///
    /// Fetches only when the entry is missing or stale under `policy` and
    /// no fetch for it is already in flight, so a prefetch never
    /// supersedes a pending request. Failures are logged, never returned.
    /// Returns true when a fetch stored new data.
    pub async fn prefetch_query<T, F, Fut>(
        &self,
        key: &QueryKey,
        policy: QueryPolicy,
        fetcher: F,
    ) -> bool
    where
        T: Serialize,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        {
            let entries = self.inner.entries.lock().await;
            if let Some(entry) = entries.get(key) {
                if entry.fetching {
                    debug!(key = %key, "Skipping prefetch, fetch in flight");
                    return false;
                }
                if entry.data.is_some() && !entry.is_stale_for(policy.stale_time, Instant::now()) {
                    return false;
                }
            }
        }
        let result = self
            .run_fetch(key, policy, || {
                let fut = fetcher();
                async move { fut.await.and_then(to_json) }
            })
            .await;
        match result {
            Ok(_) => true,
            Err(e) => {
                debug!(key = %key, error = %e, "Prefetch failed");
                false
            }
        }
    }

    pub async fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>> {
        let entries = self.inner.entries.lock().await;
        entries
            .get(key)
            .and_then(|entry| entry.data.clone())
            .map(serde_json::from_value)
            .transpose()
            .map_err(ClientError::from)
    }

    /// Write data directly, marking it fresh.
    pub async fn set_query_data<T: Serialize>(&self, key: &QueryKey, data: &T) -> Result<()> {
        let value = serde_json::to_value(data)?;
        let mut entries = self.inner.entries.lock().await;
        entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(QueryPolicy::for_key(key)))
            .store(value, Instant::now());
        Ok(())
    }

    pub async fn query_state(&self, key: &QueryKey) -> Option<QueryState> {
        let entries = self.inner.entries.lock().await;
        entries.get(key).map(|entry| entry.state(Instant::now()))
    }

    /// Keys currently cached, in key order.
    pub async fn cached_keys(&self) -> Vec<QueryKey> {
        let entries = self.inner.entries.lock().await;
        let mut keys: Vec<QueryKey> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Mark every entry under `prefix` stale. Returns how many matched.
    pub async fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries.lock().await;
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(prefix = %prefix, count, "Invalidated queries");
        count
    }

    /// Abandon in-flight fetches under `prefix`. Their results will be
    /// discarded when they arrive. Returns how many were cancelled.
    pub async fn cancel_queries(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries.lock().await;
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) && entry.fetching {
                entry.generation += 1;
                entry.fetching = false;
                count += 1;
            }
        }
        if count > 0 {
            debug!(prefix = %prefix, count, "Cancelled queries");
        }
        count
    }

    /// Drop every entry under `prefix`.
    pub async fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.inner.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    /// Register an observer for `key`.
    ///
    /// Observed entries are kept out of garbage collection, refetched on
    /// focus and reconnect when stale, and refetched every
    /// `policy.refetch_interval` when one is set. Each call must be paired
    /// with [`QueryClient::unobserve`].
    pub async fn observe<T, F, Fut>(&self, key: QueryKey, policy: QueryPolicy, fetcher: F)
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let refetch: Refetch = Arc::new(move || {
            let fut = fetcher();
            async move { fut.await.and_then(to_json) }.boxed()
        });

        {
            let mut entries = self.inner.entries.lock().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(policy));
            entry.policy = policy;
            entry.observers += 1;
        }

        let mut observers = self.inner.observers.lock().await;
        match observers.get_mut(&key) {
            Some(observer) => {
                observer.count += 1;
                observer.refetch = refetch;
            }
            None => {
                let interval = policy
                    .refetch_interval
                    .map(|period| spawn_interval(Arc::downgrade(&self.inner), key.clone(), period));
                observers.insert(
                    key,
                    Observer {
                        refetch,
                        policy,
                        count: 1,
                        interval,
                    },
                );
            }
        }
    }

    /// Release one observer of `key`. The last release stops background
    /// refetching and starts the garbage-collection clock.
    pub async fn unobserve(&self, key: &QueryKey) {
        let released = {
            let mut observers = self.inner.observers.lock().await;
            match observers.get_mut(key) {
                Some(observer) if observer.count > 1 => {
                    observer.count -= 1;
                    false
                }
                Some(_) => {
                    if let Some(observer) = observers.remove(key) {
                        if let Some(task) = observer.interval {
                            task.abort();
                        }
                    }
                    true
                }
                None => return,
            }
        };

        let mut entries = self.inner.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.observers = entry.observers.saturating_sub(1);
            if released {
                entry.observers = 0;
                entry.last_used = Instant::now();
            }
        }
    }

    /// Refetch an observed query now. Returns None when `key` is not observed.
    pub async fn refetch(&self, key: &QueryKey) -> Option<Result<Value>> {
        let (refetch, policy) = {
            let observers = self.inner.observers.lock().await;
            let observer = observers.get(key)?;
            (observer.refetch.clone(), observer.policy)
        };
        Some(self.run_fetch(key, policy, || refetch()).await)
    }

    /// The application regained focus. Refetches stale observed queries
    /// that opted in. Returns how many were refetched.
    pub async fn window_focused(&self) -> usize {
        self.refetch_stale(Trigger::Focus).await
    }

    /// Network connectivity came back.
    pub async fn reconnected(&self) -> usize {
        self.refetch_stale(Trigger::Reconnect).await
    }

    /// Drop unobserved entries idle for longer than their gc time.
    pub async fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.inner.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_collectable(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Collected idle queries");
        }
        removed
    }

    /// Apply a server revalidation of `path`: invalidate the mapped key
    /// prefixes, then refetch what is observed under them. Returns the
    /// prefixes invalidated.
    pub async fn apply_revalidation(&self, path: &str) -> Vec<QueryKey> {
        let prefixes = keys::for_revalidated_path(path);
        if prefixes.is_empty() {
            debug!(path, "Revalidation matches no queries");
            return prefixes;
        }
        for prefix in &prefixes {
            self.invalidate_queries(prefix).await;
        }

        let observed: Vec<QueryKey> = {
            let observers = self.inner.observers.lock().await;
            observers
                .keys()
                .filter(|key| prefixes.iter().any(|prefix| key.starts_with(prefix)))
                .cloned()
                .collect()
        };
        self.refetch_all(observed).await;
        prefixes
    }

    /// Allocate a fresh optimistic-write token.
    pub(crate) fn next_token(&self) -> u64 {
        self.inner.tokens.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn fresh_data(&self, key: &QueryKey, policy: QueryPolicy) -> Option<Value> {
        let entries = self.inner.entries.lock().await;
        let entry = entries.get(key)?;
        if entry.is_stale_for(policy.stale_time, Instant::now()) {
            None
        } else {
            entry.data.clone()
        }
    }

    async fn run_fetch<F, Fut>(&self, key: &QueryKey, policy: QueryPolicy, fetch: F) -> Result<Value>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let generation = {
            let mut entries = self.inner.entries.lock().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(policy));
            entry.generation += 1;
            entry.fetching = true;
            entry.generation
        };
        debug!(key = %key, generation, "Fetching query");

        let result = fetch
            .retry(self.inner.retry.backoff())
            .when(ClientError::is_retryable)
            .notify(|err, delay| {
                warn!(key = %key, error = %err, ?delay, "Query failed, retrying");
            })
            .await;

        let mut entries = self.inner.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            return Err(ClientError::Cancelled);
        };
        if entry.generation != generation {
            debug!(key = %key, generation, current = entry.generation, "Discarding superseded result");
            return Err(ClientError::Cancelled);
        }
        entry.fetching = false;
        match result {
            Ok(value) => {
                entry.store(value.clone(), Instant::now());
                Ok(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Query failed");
                entry.error = Some(e.clone());
                Err(e)
            }
        }
    }

    async fn refetch_stale(&self, trigger: Trigger) -> usize {
        let candidates: Vec<QueryKey> = {
            let observers = self.inner.observers.lock().await;
            observers
                .iter()
                .filter(|(_, observer)| match trigger {
                    Trigger::Focus => observer.policy.refetch_on_focus,
                    Trigger::Reconnect => observer.policy.refetch_on_reconnect,
                })
                .map(|(key, _)| key.clone())
                .collect()
        };

        let stale: Vec<QueryKey> = {
            let now = Instant::now();
            let entries = self.inner.entries.lock().await;
            candidates
                .into_iter()
                .filter(|key| entries.get(key).map_or(true, |entry| entry.is_stale(now)))
                .collect()
        };
        debug!(?trigger, count = stale.len(), "Refetching stale observed queries");
        self.refetch_all(stale).await
    }

    async fn refetch_all(&self, keys: Vec<QueryKey>) -> usize {
        let count = keys.len();
        let results = join_all(keys.iter().map(|key| self.refetch(key))).await;
        for (key, result) in keys.iter().zip(results) {
            if let Some(Err(e)) = result {
                debug!(key = %key, error = %e, "Background refetch failed");
            }
        }
        count
    }
}

fn to_json<T: Serialize>(data: T) -> Result<Value> {
    serde_json::to_value(data).map_err(ClientError::from)
}

fn spawn_interval(inner: Weak<Inner>, key: QueryKey, period: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(inner) = inner.upgrade() else {
                break;
            };
            let client = QueryClient { inner };
            if let Some(Err(e)) = client.refetch(&key).await {
                debug!(key = %key, error = %e, "Interval refetch failed");
            }
        }
    })
}
