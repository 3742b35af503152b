//! In-memory denylist of session token ids.
//!
//! Tokens are stateless, so logging out only clears the cookie on the
//! client. Recording the token id here until its natural expiry makes the
//! server refuse the token even if a copy survives elsewhere.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

/// Shared set of revoked token ids, each kept until the token would expire anyway.
#[derive(Debug, Clone, Default)]
pub struct RevocationList {
    entries: Arc<DashMap<String, DateTime<Utc>>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke `token_id` until `expires_at`. Expired entries are pruned first.
    pub fn revoke(&self, token_id: &str, expires_at: DateTime<Utc>) {
        let now = Utc::now();
        self.prune(now);
        if expires_at > now {
            self.entries.insert(token_id.to_string(), expires_at);
            debug!(token_id, "token revoked");
        }
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.entries
            .get(token_id)
            .is_some_and(|expires_at| *expires_at > Utc::now())
    }

    /// Drop entries whose token has expired by `now`. Returns how many were removed.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_revoke_and_check() {
        let list = RevocationList::new();
        list.revoke("jti-1", Utc::now() + Duration::hours(1));
        assert!(list.is_revoked("jti-1"));
        assert!(!list.is_revoked("jti-2"));
    }

    #[test]
    fn test_already_expired_token_not_stored() {
        let list = RevocationList::new();
        list.revoke("old", Utc::now() - Duration::seconds(1));
        assert!(list.is_empty());
    }

    #[test]
    fn test_prune_drops_expired() {
        let list = RevocationList::new();
        list.revoke("a", Utc::now() + Duration::hours(1));
        list.revoke("b", Utc::now() + Duration::hours(3));
        let removed = list.prune(Utc::now() + Duration::hours(2));
        assert_eq!(removed, 1);
        assert!(list.is_revoked("b"));
    }

    #[test]
    fn test_clones_share_state() {
        let list = RevocationList::new();
        let other = list.clone();
        other.revoke("shared", Utc::now() + Duration::minutes(5));
        assert!(list.is_revoked("shared"));
        assert_eq!(list.len(), 1);
    }
}
