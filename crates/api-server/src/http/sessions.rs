use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{
    ListSavedSessionsResponse, MessageResponse, SavedSessionResponse, SessionResponse,
};

use super::AppState;
use super::errors::{archive_error_response, session_not_found_response};

pub(super) async fn create_session(State(state): State<AppState>) -> Response {
    let session = state.conversation.sessions().create();

    (
        StatusCode::OK,
        Json(SessionResponse {
            session_id: session.id,
            messages: session.messages,
        }),
    )
        .into_response()
}

pub(super) async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.conversation.sessions().get(&session_id) {
        Ok(session) => (
            StatusCode::OK,
            Json(SessionResponse {
                session_id: session.id,
                messages: session.messages,
            }),
        )
            .into_response(),
        Err(_) => session_not_found_response(),
    }
}

pub(super) async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.conversation.sessions().delete(&session_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Session deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(_) => session_not_found_response(),
    }
}

pub(super) async fn save_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state
        .archive
        .save(state.conversation.sessions(), &session_id)
        .await
    {
        Ok(filename) => (
            StatusCode::OK,
            Json(SavedSessionResponse {
                message: "Session saved successfully".to_string(),
                filename,
            }),
        )
            .into_response(),
        Err(err) => archive_error_response(err),
    }
}

pub(super) async fn list_saved_sessions(State(state): State<AppState>) -> Response {
    match state.archive.list().await {
        Ok(sessions) => (StatusCode::OK, Json(ListSavedSessionsResponse { sessions })).into_response(),
        Err(err) => archive_error_response(err),
    }
}
