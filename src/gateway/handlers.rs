use super::AppState;
use crate::chat::{TurnRequest, TurnResponse};
use crate::error::TurnError;
use crate::mood::MoodState;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::Value;

type ApiError = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, error: &str, details: impl Into<String>) -> ApiError {
    let body = serde_json::json!({
        "error": error,
        "details": details.into(),
    });
    (status, Json(body))
}

/// GET /health
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// A present but undecodable mood state is corruption, not a bad request.
fn check_mood_state(body: &Value) -> Result<(), ApiError> {
    let Some(raw) = body.get("moodState").or_else(|| body.get("aiState")) else {
        return Ok(());
    };
    if raw.is_null() {
        return Ok(());
    }
    serde_json::from_value::<MoodState>(raw.clone())
        .map(|_| ())
        .map_err(|e| {
            tracing::error!(error = %e, "Rejected undecodable mood state");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Corrupt mood state",
                e.to_string(),
            )
        })
}

/// POST /api/chat: run one turn
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TurnResponse>, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::warn!(error = %e, "Chat request JSON parse error");
        error_body(StatusCode::BAD_REQUEST, "Invalid JSON body", e.body_text())
    })?;

    check_mood_state(&body)?;

    let request: TurnRequest = serde_json::from_value(body).map_err(|e| {
        tracing::warn!(error = %e, "Chat request has an invalid shape");
        error_body(StatusCode::BAD_REQUEST, "Invalid request", e.to_string())
    })?;

    match state.orchestrator.run_turn(request).await {
        Ok(response) => {
            tracing::info!(
                bubbles = response.messages.len(),
                filtered = response.filtered,
                mood = %response.mood_state.current_mood,
                "Chat turn served"
            );
            Ok(Json(response))
        }
        Err(TurnError::MissingMessage) => {
            tracing::warn!("Chat request without a message");
            Err(error_body(
                StatusCode::BAD_REQUEST,
                "Message is required",
                TurnError::MissingMessage.to_string(),
            ))
        }
        Err(e @ TurnError::InvalidState(_)) => {
            tracing::error!(error = %e, "Chat request carried corrupt mood state");
            Err(error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Corrupt mood state",
                e.to_string(),
            ))
        }
        Err(e @ TurnError::Prompt(_)) => {
            tracing::error!(error = %e, "Chat turn failed");
            Err(error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                e.to_string(),
            ))
        }
    }
}
