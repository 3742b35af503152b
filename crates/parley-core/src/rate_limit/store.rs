use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub attempts: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitInfo {
    /// Whole seconds until the window closes, rounded up, never negative.
    pub fn available_in(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.reset_at - now).num_milliseconds().max(0);
        (millis + 999) / 1000
    }
}

/// Counter storage. Implement for a shared store when running several instances.
pub trait RateLimitStore: Send + Sync {
    /// Count one hit for `key`, opening a fresh window when none is active.
    fn increment(&self, key: &str, window: Duration, now: DateTime<Utc>) -> RateLimitInfo;

    fn get(&self, key: &str) -> Option<RateLimitInfo>;

    fn reset(&self, key: &str);

    /// Drop every window that has closed by `now`. Returns how many were removed.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize;
}

/// Process-local store. Counters are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, RateLimitInfo>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RateLimitStore for InMemoryStore {
    fn increment(&self, key: &str, window: Duration, now: DateTime<Utc>) -> RateLimitInfo {
        let mut entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| RateLimitInfo {
                attempts: 0,
                reset_at: now + window,
            });

        if entry.reset_at <= now {
            // Window elapsed, start a new one
            entry.attempts = 0;
            entry.reset_at = now + window;
        }
        entry.attempts = entry.attempts.saturating_add(1);

        entry.value().clone()
    }

    fn get(&self, key: &str) -> Option<RateLimitInfo> {
        self.entries.get(key).map(|info| info.value().clone())
    }

    fn reset(&self, key: &str) {
        self.entries.remove(key);
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, info| info.reset_at > now);
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store_increment() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let window = Duration::seconds(60);

        assert_eq!(store.increment("k", window, now).attempts, 1);
        assert_eq!(store.increment("k", window, now).attempts, 2);
        let info = store.increment("k", window, now);
        assert_eq!(info.attempts, 3);
        assert_eq!(info.reset_at, now + window);
    }

    #[test]
    fn test_window_does_not_slide() {
        let store = InMemoryStore::new();
        let start = Utc::now();
        let window = Duration::seconds(60);

        store.increment("k", window, start);
        let later = store.increment("k", window, start + Duration::seconds(59));
        assert_eq!(later.reset_at, start + window);
    }

    #[test]
    fn test_expired_window_restarts_count() {
        let store = InMemoryStore::new();
        let start = Utc::now();
        let window = Duration::seconds(60);

        store.increment("k", window, start);
        store.increment("k", window, start);
        let info = store.increment("k", window, start + window);
        assert_eq!(info.attempts, 1);
        assert_eq!(info.reset_at, start + window + window);
    }

    #[test]
    fn test_reset_and_get() {
        let store = InMemoryStore::new();
        assert!(store.get("k").is_none());
        store.increment("k", Duration::seconds(60), Utc::now());
        assert!(store.get("k").is_some());
        store.reset("k");
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_cleanup_expired() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        store.increment("short", Duration::seconds(10), now);
        store.increment("long", Duration::seconds(600), now);

        let removed = store.cleanup_expired(now + Duration::seconds(11));
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_available_in_rounds_up() {
        let now = Utc::now();
        let info = RateLimitInfo {
            attempts: 1,
            reset_at: now + Duration::milliseconds(1500),
        };
        assert_eq!(info.available_in(now), 2);
        assert_eq!(info.available_in(now + Duration::seconds(5)), 0);
    }
}
