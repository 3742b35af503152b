//! HTTP request handlers for the REST API.

pub mod chat;
pub mod health;
pub mod user;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;

use crate::http::error::AppError;

/// Payload for endpoints whose only result is an acknowledgement.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

/// Unwrap a JSON body, turning axum's rejection into an envelope error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}
