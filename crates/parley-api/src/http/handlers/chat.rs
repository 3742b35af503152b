//! Chat handlers: send a message, read and clear the history.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::Json;

use parley_core::validation::ChatForm;
use parley_types::chat::ChatHistory;

use super::{StatusMessage, json_body};
use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// POST /api/v1/chat/new - Send a message and get the updated conversation.
pub async fn new_message(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<ChatForm>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatHistory>>, AppError> {
    let timer = RequestTimer::start();
    let form = json_body(payload)?;

    let chats = state
        .chat_service
        .send_message(&auth.user.id, &form.message)
        .await?;

    Ok(Json(timer.finish(ChatHistory { chats })))
}

/// GET /api/v1/chat/all-chats - The caller's full conversation.
pub async fn all_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<ChatHistory>>, AppError> {
    let timer = RequestTimer::start();
    let chats = state.chat_service.get_history(&auth.user.id).await?;
    Ok(Json(timer.finish(ChatHistory { chats })))
}

/// DELETE /api/v1/chat/delete - Drop the caller's conversation.
pub async fn delete_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<StatusMessage>>, AppError> {
    let timer = RequestTimer::start();
    state.chat_service.clear_history(&auth.user.id).await?;
    Ok(Json(timer.finish(StatusMessage { message: "OK" })))
}
