//! Per-client request throttling middleware.
//!
//! Each [`Throttle`] binds one named limit of the shared [`RateLimiter`].
//! Clients are keyed by socket address, or by the first `X-Forwarded-For`
//! hop when the server sits behind a trusted proxy.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio_util::sync::CancellationToken;

use parley_core::rate_limit::{RateLimitResult, RateLimiter};

use crate::http::error::AppError;

/// Middleware state: which limit to charge and how to identify the client.
#[derive(Clone)]
pub struct Throttle {
    limiter: RateLimiter,
    limit: &'static str,
    trust_proxy: bool,
}

impl Throttle {
    pub fn new(limiter: RateLimiter, limit: &'static str, trust_proxy: bool) -> Self {
        Self {
            limiter,
            limit,
            trust_proxy,
        }
    }
}

/// Charge one hit to the client's window; reject with 429 once it is spent.
pub async fn throttle(State(throttle): State<Throttle>, request: Request, next: Next) -> Response {
    let key = client_key(&request, throttle.trust_proxy);

    match throttle.limiter.hit(throttle.limit, &key) {
        Ok(RateLimitResult::Allowed {
            limit,
            remaining,
            reset_at,
        }) => {
            let mut response = next.run(request).await;
            let reset = (reset_at - chrono::Utc::now()).num_seconds().max(0);
            let headers = response.headers_mut();
            headers.insert("ratelimit-limit", HeaderValue::from(limit));
            headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
            headers.insert("ratelimit-reset", HeaderValue::from(reset));
            response
        }
        Ok(RateLimitResult::Limited {
            limit,
            retry_after,
            message,
        }) => {
            tracing::warn!(limit = throttle.limit, client = %key, "rate limit exceeded");
            let retry_after_secs = u64::try_from(retry_after).unwrap_or(0);
            let mut response = AppError::RateLimited {
                retry_after_secs,
                message,
            }
            .into_response();
            let headers = response.headers_mut();
            headers.insert("ratelimit-limit", HeaderValue::from(limit));
            headers.insert("ratelimit-remaining", HeaderValue::from(0_u32));
            headers.insert("ratelimit-reset", HeaderValue::from(retry_after_secs));
            response
        }
        Err(e) => AppError::Internal(e.to_string()).into_response(),
    }
}

fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = forwarded_for(request.headers()) {
            return ip;
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Periodically purge closed windows until `cancel` fires.
pub fn spawn_sweeper(
    limiter: RateLimiter,
    every: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let purged = limiter.cleanup_expired();
                    if purged > 0 {
                        tracing::debug!(purged, "expired rate limit windows removed");
                    }
                }
            }
        }
    })
}
