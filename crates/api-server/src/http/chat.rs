use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::audio::audio_url;
use shared::models::{ChatRequest, ChatResponse};

use super::AppState;
use super::errors::{bad_request_response, chat_error_response};

pub(super) async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    if req.message.trim().is_empty() {
        return bad_request_response("invalid_message", "Message must not be empty");
    }

    match state
        .conversation
        .chat(req.session_id.as_deref(), &req.message)
        .await
    {
        Ok(reply) => (
            StatusCode::OK,
            Json(ChatResponse {
                session_id: reply.session_id,
                response: reply.response,
                audio_url: Some(audio_url(&reply.audio_filename)),
                transcript: None,
            }),
        )
            .into_response(),
        Err(err) => chat_error_response(err),
    }
}
