use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::limit::Limit;
use super::store::RateLimitStore;

const DEFAULT_MESSAGE: &str = "Too many requests. Please try again later.";

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed. Contains remaining attempts.
    Allowed {
        limit: u32,
        remaining: u32,
        reset_at: DateTime<Utc>,
    },
    /// Request is rate limited.
    Limited {
        limit: u32,
        retry_after: i64,
        message: String,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, Self::Limited { .. })
    }

    /// Seconds to wait, if rate limited.
    pub fn retry_after(&self) -> Option<i64> {
        match self {
            Self::Limited { retry_after, .. } => Some(*retry_after),
            Self::Allowed { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit '{0}' not configured")]
    UnknownLimit(String),
}

/// Rate limiter with named limit configurations.
///
/// ```rust
/// use parley_core::rate_limit::{RateLimiter, Limit, InMemoryStore};
/// use std::sync::Arc;
///
/// let limiter = RateLimiter::new(Arc::new(InMemoryStore::new()))
///     .for_("auth", Limit::per_minutes(5, 15))
///     .for_("chat", Limit::per_minutes(30, 15));
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    limits: HashMap<String, Limit>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            limits: HashMap::new(),
        }
    }

    /// Registers a named rate limit.
    #[must_use]
    pub fn for_(mut self, name: impl Into<String>, limit: Limit) -> Self {
        self.limits.insert(name.into(), limit);
        self
    }

    pub fn get_limit(&self, name: &str) -> Option<&Limit> {
        self.limits.get(name)
    }

    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    /// Records a hit against a rate limit and checks if allowed.
    pub fn hit(&self, limit_name: &str, key: &str) -> Result<RateLimitResult, RateLimitError> {
        self.hit_at(limit_name, key, Utc::now())
    }

    pub fn hit_at(
        &self,
        limit_name: &str,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<RateLimitResult, RateLimitError> {
        let limit = self
            .limits
            .get(limit_name)
            .ok_or_else(|| RateLimitError::UnknownLimit(limit_name.to_owned()))?;

        let full_key = format!("{limit_name}:{key}");
        let info = self.store.increment(&full_key, limit.window, now);

        if info.attempts > limit.max_attempts {
            Ok(RateLimitResult::Limited {
                limit: limit.max_attempts,
                retry_after: info.available_in(now),
                message: limit.get_message().unwrap_or(DEFAULT_MESSAGE).to_owned(),
            })
        } else {
            Ok(RateLimitResult::Allowed {
                limit: limit.max_attempts,
                remaining: limit.max_attempts - info.attempts,
                reset_at: info.reset_at,
            })
        }
    }

    /// Clears the rate limit for a key.
    pub fn clear(&self, limit_name: &str, key: &str) {
        self.store.reset(&format!("{limit_name}:{key}"));
    }

    /// Purge closed windows from the store.
    pub fn cleanup_expired(&self) -> usize {
        self.store.cleanup_expired(Utc::now())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limits", &self.limits.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::InMemoryStore;
    use chrono::Duration;

    #[test]
    fn test_nth_allowed_next_limited() {
        let limiter =
            RateLimiter::new(Arc::new(InMemoryStore::new())).for_("auth", Limit::per_minutes(5, 15));

        for i in 0..5 {
            let result = limiter.hit("auth", "10.0.0.1").unwrap();
            assert!(result.is_allowed(), "request {} should be allowed", i + 1);
        }

        let result = limiter.hit("auth", "10.0.0.1").unwrap();
        assert!(result.is_limited());
        assert!(result.retry_after().unwrap() > 0);
    }

    #[test]
    fn test_keys_and_classes_are_independent() {
        let limiter = RateLimiter::new(Arc::new(InMemoryStore::new()))
            .for_("auth", Limit::per_minute(1))
            .for_("chat", Limit::per_minute(1));

        assert!(limiter.hit("auth", "a").unwrap().is_allowed());
        assert!(limiter.hit("auth", "b").unwrap().is_allowed());
        assert!(limiter.hit("chat", "a").unwrap().is_allowed());
        assert!(limiter.hit("auth", "a").unwrap().is_limited());
    }

    #[test]
    fn test_window_boundary_resets() {
        let limiter =
            RateLimiter::new(Arc::new(InMemoryStore::new())).for_("api", Limit::per_minute(2));
        let start = Utc::now();

        limiter.hit_at("api", "k", start).unwrap();
        limiter.hit_at("api", "k", start).unwrap();
        assert!(limiter.hit_at("api", "k", start).unwrap().is_limited());

        let next_window = start + Duration::minutes(1);
        let result = limiter.hit_at("api", "k", next_window).unwrap();
        assert_eq!(
            result,
            RateLimitResult::Allowed {
                limit: 2,
                remaining: 1,
                reset_at: next_window + Duration::minutes(1),
            }
        );
    }

    #[test]
    fn test_unknown_limit() {
        let limiter = RateLimiter::new(Arc::new(InMemoryStore::new()));
        assert!(matches!(
            limiter.hit("missing", "k"),
            Err(RateLimitError::UnknownLimit(_))
        ));
    }

    #[test]
    fn test_clear() {
        let limiter =
            RateLimiter::new(Arc::new(InMemoryStore::new())).for_("auth", Limit::per_minute(1));
        limiter.hit("auth", "k").unwrap();
        limiter.clear("auth", "k");
        assert!(limiter.hit("auth", "k").unwrap().is_allowed());
    }
}
