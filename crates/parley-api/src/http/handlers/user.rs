//! Account and session handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use tower_cookies::Cookies;

use parley_core::validation::{LoginForm, SignupForm};
use parley_types::user::UserProfile;

use super::{StatusMessage, json_body};
use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// POST /api/v1/user/signup - Create an account and start a session.
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<SignupForm>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), AppError> {
    let timer = RequestTimer::start();
    let form = json_body(payload)?;

    let session = state.auth_service.signup(&form).await?;
    state.cookies.set(&cookies, &session.token.token);

    Ok((
        StatusCode::CREATED,
        Json(timer.finish(UserProfile::from(&session.user))),
    ))
}

/// POST /api/v1/user/login - Check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let timer = RequestTimer::start();
    let form = json_body(payload)?;

    let session = state.auth_service.login(&form).await?;
    state.cookies.set(&cookies, &session.token.token);

    Ok(Json(timer.finish(UserProfile::from(&session.user))))
}

/// GET /api/v1/user/auth-status - Who the session belongs to.
pub async fn auth_status(auth: AuthUser) -> Json<ApiResponse<UserProfile>> {
    Json(RequestTimer::start().finish(UserProfile::from(&auth.user)))
}

/// GET /api/v1/user/logout - Revoke the session token and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    auth: AuthUser,
) -> Json<ApiResponse<StatusMessage>> {
    let timer = RequestTimer::start();

    state.auth_service.logout(&auth.claims);
    state.cookies.clear(&cookies);

    Json(timer.finish(StatusMessage { message: "OK" }))
}

/// GET /api/v1/user/refresh - Swap the session token for a fresh one.
pub async fn refresh(
    State(state): State<AppState>,
    cookies: Cookies,
    auth: AuthUser,
) -> Result<Json<ApiResponse<StatusMessage>>, AppError> {
    let timer = RequestTimer::start();

    let token = state.auth_service.refresh(&auth.user, &auth.claims)?;
    state.cookies.set(&cookies, &token.token);

    Ok(Json(timer.finish(StatusMessage {
        message: "Token refreshed",
    })))
}
