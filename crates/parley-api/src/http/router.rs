//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: tracing, CORS, cookie jar, per-client throttling.

use axum::http::{HeaderValue, Method, header};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use parley_core::rate_limit::{API, AUTH, CHAT};

use crate::http::handlers;
use crate::http::throttle::{Throttle, throttle};
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let trust_proxy = state.config.settings.server.trust_proxy;
    let limiter = |name| Throttle::new(state.rate_limiter.clone(), name, trust_proxy);

    let user_routes = Router::new()
        .route("/signup", post(handlers::user::signup))
        .route("/login", post(handlers::user::login))
        .route("/refresh", get(handlers::user::refresh))
        .route_layer(from_fn_with_state(limiter(AUTH), throttle))
        .route("/auth-status", get(handlers::user::auth_status))
        .route("/logout", get(handlers::user::logout));

    let chat_routes = Router::new()
        .route("/new", post(handlers::chat::new_message))
        .route_layer(from_fn_with_state(limiter(CHAT), throttle))
        .route("/all-chats", get(handlers::chat::all_chats))
        .route("/delete", delete(handlers::chat::delete_chats));

    let api_routes = Router::new()
        .nest("/user", user_routes)
        .nest("/chat", chat_routes)
        .route_layer(from_fn_with_state(limiter(API), throttle))
        .route("/health", get(handlers::health::health_check));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(CookieManagerLayer::new())
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured frontend origin.
///
/// Without a configured origin, development mirrors the caller's origin and
/// production allows none.
fn cors_layer(state: &AppState) -> CorsLayer {
    let config = &state.config;
    let origin = match config.frontend_url.as_deref() {
        Some(url) => match HeaderValue::from_str(url) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                tracing::warn!(url, error = %e, "FRONTEND_URL is not a valid origin; CORS disabled");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        },
        None if config.environment.is_production() => AllowOrigin::list(Vec::<HeaderValue>::new()),
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
