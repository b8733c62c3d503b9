use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::models::{ErrorBody, ErrorResponse, OkResponse, ServiceInfoResponse};
use tracing::warn;

use super::AppState;

pub(super) async fn service_info() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ServiceInfoResponse {
            message: "Dr. HealBot API is running".to_string(),
            version: "1.0".to_string(),
        }),
    )
}

pub(super) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(OkResponse { ok: true }))
}

pub(super) async fn readyz(State(state): State<AppState>) -> Response {
    let dirs = [state.archive.dir(), state.conversation.audio().root()];

    for dir in dirs {
        match tokio::fs::metadata(dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                warn!("readiness check failed: {} is not a directory", dir.display());
                return storage_unavailable_response();
            }
            Err(err) => {
                warn!("readiness check failed for {}: {err}", dir.display());
                return storage_unavailable_response();
            }
        }
    }

    (StatusCode::OK, Json(OkResponse { ok: true })).into_response()
}

fn storage_unavailable_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: ErrorBody {
                code: "storage_unavailable".to_string(),
                message: "Storage directories not ready".to_string(),
            },
        }),
    )
        .into_response()
}
