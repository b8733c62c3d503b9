use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::AppState;
use super::errors::{internal_error_response, not_found_response};

const AUDIO_NOT_FOUND: &str = "Audio file not found or invalid path";

pub(super) async fn get_audio(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let Ok(path) = state.conversation.audio().resolve(&filename).await else {
        return not_found_response(AUDIO_NOT_FOUND);
    };

    match tokio::fs::read(&path).await {
        Ok(audio) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            audio,
        )
            .into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            not_found_response(AUDIO_NOT_FOUND)
        }
        Err(err) => {
            error!("failed to read audio file: {err}");
            internal_error_response()
        }
    }
}
