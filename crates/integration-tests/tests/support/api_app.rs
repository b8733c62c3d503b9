use std::sync::Arc;

use api_server::http::{AppState, build_router};
use shared::archive::SessionArchive;
use shared::audio::AudioDirectory;
use shared::conversation::ConversationService;
use shared::sessions::SessionStore;
use tempfile::TempDir;

use super::gateway::TestGateway;

const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 1024 * 1024;

pub struct TestApp {
    pub router: axum::Router,
    pub state: AppState,
    pub gateway: Arc<TestGateway>,
    _data_dir: TempDir,
}

impl TestApp {
    pub fn sessions(&self) -> &SessionStore {
        self.state.conversation.sessions()
    }

    pub fn audio(&self) -> &AudioDirectory {
        self.state.conversation.audio()
    }

    pub fn archive(&self) -> &SessionArchive {
        &self.state.archive
    }
}

pub async fn build_test_app(gateway: TestGateway) -> TestApp {
    build_test_app_with_upload_limit(gateway, DEFAULT_UPLOAD_LIMIT_BYTES).await
}

pub async fn build_test_app_with_upload_limit(
    gateway: TestGateway,
    max_audio_upload_bytes: usize,
) -> TestApp {
    let data_dir = tempfile::tempdir().expect("data dir should be created");
    let audio = AudioDirectory::open(data_dir.path().join("audio_files"))
        .await
        .expect("audio dir should open");
    let archive = SessionArchive::open(data_dir.path().join("sessions"))
        .await
        .expect("sessions dir should open");

    let gateway = Arc::new(gateway);
    let conversation = ConversationService::new(SessionStore::new(), gateway.clone(), audio);
    let state = AppState::new(conversation, archive, max_audio_upload_bytes);

    TestApp {
        router: build_router(state.clone()),
        state,
        gateway,
        _data_dir: data_dir,
    }
}
