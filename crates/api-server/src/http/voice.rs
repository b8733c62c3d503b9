use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::audio::audio_url;
use shared::models::ChatResponse;
use tracing::warn;

use super::AppState;
use super::errors::{bad_request_response, chat_error_response, payload_too_large_response};

const SESSION_ID_FIELD: &str = "session_id";
const AUDIO_FIELD: &str = "audio";

struct VoiceUpload {
    session_id: Option<String>,
    audio: Bytes,
    file_name: Option<String>,
}

pub(super) async fn chat_voice(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let upload = match read_voice_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    match state
        .voice
        .handle(
            upload.session_id.as_deref(),
            &upload.audio,
            upload.file_name.as_deref(),
        )
        .await
    {
        Ok(reply) => (
            StatusCode::OK,
            Json(ChatResponse {
                session_id: reply.session_id,
                response: reply.response,
                audio_url: Some(audio_url(&reply.audio_filename)),
                transcript: Some(reply.transcript),
            }),
        )
            .into_response(),
        Err(err) => chat_error_response(err),
    }
}

async fn read_voice_upload(multipart: &mut Multipart) -> Result<VoiceUpload, Response> {
    let mut session_id = None;
    let mut audio = None;
    let mut file_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error_response)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            SESSION_ID_FIELD => {
                session_id = Some(field.text().await.map_err(multipart_error_response)?);
            }
            AUDIO_FIELD => {
                file_name = field.file_name().map(ToString::to_string);
                audio = Some(field.bytes().await.map_err(multipart_error_response)?);
            }
            _ => {}
        }
    }

    let Some(audio) = audio.filter(|audio| !audio.is_empty()) else {
        return Err(bad_request_response(
            "invalid_audio_upload",
            "A non-empty audio file is required",
        ));
    };

    Ok(VoiceUpload {
        session_id,
        audio,
        file_name,
    })
}

fn multipart_error_response(err: MultipartError) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return payload_too_large_response();
    }

    warn!("rejected voice upload: {err}");
    bad_request_response("invalid_audio_upload", "Malformed multipart body")
}
