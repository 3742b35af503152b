//! HTTP/REST API layer for Parley.
//!
//! Axum-based REST API at `/api/v1/` with signed-cookie sessions,
//! envelope response format, per-client throttling and CORS support.

pub mod cookie;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
pub mod throttle;
