//! Freshness and retry policies.

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::key::QueryKey;
use crate::keys;

/// Cached data younger than this is served without a fetch.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Unobserved entries older than this are dropped by garbage collection.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(10 * 60);

/// How long a query's data stays fresh and when it is refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub stale_time: Duration,
    pub gc_time: Duration,
    /// Background refetch period while the query is observed.
    pub refetch_interval: Option<Duration>,
    pub refetch_on_focus: bool,
    pub refetch_on_reconnect: bool,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            refetch_interval: None,
            refetch_on_focus: true,
            refetch_on_reconnect: true,
        }
    }
}

impl QueryPolicy {
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    pub fn with_refetch_interval(mut self, interval: Option<Duration>) -> Self {
        self.refetch_interval = interval;
        self
    }

    pub fn with_refetch_on_focus(mut self, enabled: bool) -> Self {
        self.refetch_on_focus = enabled;
        self
    }

    pub fn with_refetch_on_reconnect(mut self, enabled: bool) -> Self {
        self.refetch_on_reconnect = enabled;
        self
    }

    /// Policy the dashboard uses for `key`.
    ///
    /// - revenue: refetch every 2 minutes
    /// - latest invoices: refetch every 30 seconds
    /// - cards: refetch every 5 minutes
    pub fn for_key(key: &QueryKey) -> Self {
        let interval = if *key == keys::revenue() {
            Some(Duration::from_secs(2 * 60))
        } else if *key == keys::latest_invoices() {
            Some(Duration::from_secs(30))
        } else if *key == keys::card_data() {
            Some(Duration::from_secs(5 * 60))
        } else {
            None
        };
        Self::default().with_refetch_interval(interval)
    }
}

/// Retry schedule for failed fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Exponential backoff doubling from `min_delay` up to `max_delay`.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
    }
}
