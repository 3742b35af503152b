//! Fixed-window request throttling keyed by client identity.
//!
//! A window opens on the first hit for a key and lasts for the limit's
//! duration. Every hit counts, whatever the request's outcome; the count
//! starts over only when the window has elapsed.

mod limit;
mod limiter;
mod store;

pub use limit::Limit;
pub use limiter::{RateLimitError, RateLimitResult, RateLimiter};
pub use store::{InMemoryStore, RateLimitInfo, RateLimitStore};

/// Limit names used by the HTTP layer.
pub const AUTH: &str = "auth";
pub const CHAT: &str = "chat";
pub const API: &str = "api";
