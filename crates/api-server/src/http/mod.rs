use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use shared::archive::SessionArchive;
use shared::conversation::ConversationService;
use shared::voice::VoicePipeline;

mod audio;
mod chat;
mod errors;
mod health;
mod sessions;
mod voice;

#[derive(Clone)]
pub struct AppState {
    pub conversation: ConversationService,
    pub voice: VoicePipeline,
    pub archive: SessionArchive,
    pub max_audio_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        conversation: ConversationService,
        archive: SessionArchive,
        max_audio_upload_bytes: usize,
    ) -> Self {
        Self {
            voice: VoicePipeline::new(conversation.clone()),
            conversation,
            archive,
            max_audio_upload_bytes,
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    let upload_routes = Router::new()
        .route("/chat/voice", post(voice::chat_voice))
        .layer(DefaultBodyLimit::max(app_state.max_audio_upload_bytes))
        .with_state(app_state.clone());

    let routes = Router::new()
        .route("/", get(health::service_info))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/session/new", post(sessions::create_session))
        .route(
            "/session/{session_id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/session/{session_id}/save", post(sessions::save_session))
        .route("/sessions", get(sessions::list_saved_sessions))
        .route("/chat", post(chat::chat))
        .route("/audio/{filename}", get(audio::get_audio))
        .with_state(app_state);

    routes.merge(upload_routes)
}
