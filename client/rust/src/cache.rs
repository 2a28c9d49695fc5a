//! Cache entries.

use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::ClientError;
use crate::policy::QueryPolicy;

/// Cached state of one query.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub data: Option<Value>,
    pub updated_at: Option<Instant>,
    /// Set by invalidation; cleared by the next successful write.
    pub invalidated: bool,
    /// Bumped by every fetch start and every cancel. A fetch may only
    /// store its result while the generation it started with is current.
    pub generation: u64,
    pub fetching: bool,
    pub error: Option<ClientError>,
    pub observers: usize,
    /// Last time the entry was written or lost its final observer.
    pub last_used: Instant,
    pub policy: QueryPolicy,
    /// Token of the optimistic mutation that last wrote `data`.
    pub mutation_token: Option<u64>,
}

impl Entry {
    pub fn new(policy: QueryPolicy) -> Self {
        Self {
            data: None,
            updated_at: None,
            invalidated: false,
            generation: 0,
            fetching: false,
            error: None,
            observers: 0,
            last_used: Instant::now(),
            policy,
            mutation_token: None,
        }
    }

    pub fn is_stale_for(&self, stale_time: Duration, now: Instant) -> bool {
        if self.invalidated || self.data.is_none() {
            return true;
        }
        match self.updated_at {
            Some(at) => now.saturating_duration_since(at) >= stale_time,
            None => true,
        }
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        self.is_stale_for(self.policy.stale_time, now)
    }

    pub fn is_collectable(&self, now: Instant) -> bool {
        self.observers == 0
            && self.mutation_token.is_none()
            && now.saturating_duration_since(self.last_used) >= self.policy.gc_time
    }

    /// Store fetched or written data as fresh.
    pub fn store(&mut self, value: Value, now: Instant) {
        self.data = Some(value);
        self.updated_at = Some(now);
        self.invalidated = false;
        self.error = None;
        self.last_used = now;
    }

    pub fn state(&self, now: Instant) -> QueryState {
        QueryState {
            has_data: self.data.is_some(),
            is_stale: self.is_stale(now),
            is_fetching: self.fetching,
            generation: self.generation,
            observers: self.observers,
            error: self.error.clone(),
            pending_mutation: self.mutation_token.is_some(),
        }
    }
}

/// Point-in-time view of a cached query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub has_data: bool,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub generation: u64,
    pub observers: usize,
    /// Error of the last failed fetch, cleared by the next success.
    pub error: Option<ClientError>,
    pub pending_mutation: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_stale() {
        let entry = Entry::new(QueryPolicy::default());
        assert!(entry.is_stale(Instant::now()));
    }

    #[test]
    fn test_stored_entry_is_fresh_until_invalidated() {
        let now = Instant::now();
        let mut entry = Entry::new(QueryPolicy::default());
        entry.store(Value::from(1), now);
        assert!(!entry.is_stale(now));

        entry.invalidated = true;
        assert!(entry.is_stale(now));
    }

    #[test]
    fn test_zero_stale_time_is_always_stale() {
        let now = Instant::now();
        let mut entry = Entry::new(QueryPolicy::default());
        entry.store(Value::from(1), now);
        assert!(entry.is_stale_for(Duration::ZERO, now));
    }

    #[test]
    fn test_observed_entries_are_not_collected() {
        let now = Instant::now();
        let mut entry = Entry::new(QueryPolicy::default().with_gc_time(Duration::ZERO));
        assert!(entry.is_collectable(now));
        entry.observers = 1;
        assert!(!entry.is_collectable(now));
    }
}
