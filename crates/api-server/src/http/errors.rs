use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::archive::ArchiveError;
use shared::conversation::ChatError;
use shared::models::{ErrorBody, ErrorResponse};
use tracing::{error, warn};

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }),
    )
        .into_response()
}

pub(super) fn bad_request_response(code: &str, message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, code, message)
}

pub(super) fn payload_too_large_response() -> Response {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "audio_too_large",
        "Audio upload exceeds the allowed size",
    )
}

pub(super) fn not_found_response(message: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found", message)
}

pub(super) fn session_not_found_response() -> Response {
    not_found_response("Session not found")
}

pub(super) fn internal_error_response() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Unexpected server error",
    )
}

pub(super) fn chat_error_response(err: ChatError) -> Response {
    match err {
        ChatError::NotFound => session_not_found_response(),
        ChatError::Upstream(err) => {
            warn!("ai provider call failed: {err}");
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "upstream_unavailable",
                "The assistant is temporarily unavailable",
            )
        }
        ChatError::Storage(err) => {
            error!("audio storage failed: {err}");
            internal_error_response()
        }
    }
}

pub(super) fn archive_error_response(err: ArchiveError) -> Response {
    match err {
        ArchiveError::NotFound => session_not_found_response(),
        other => {
            error!("session archive operation failed: {other}");
            internal_error_response()
        }
    }
}
