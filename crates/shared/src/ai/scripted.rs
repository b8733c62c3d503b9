use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::gateway::{AiGatewayError, AiGatewayFuture, AssistantGateway, Transcription};
use crate::models::ChatMessage;

/// In-process gateway that replays canned provider results and records calls.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    completions: Mutex<VecDeque<Result<String, AiGatewayError>>>,
    transcription: Mutex<Option<Result<Transcription, AiGatewayError>>>,
    fail_synthesis: bool,
    stall_completions: bool,
    pub(crate) seen_completions: Mutex<Vec<Vec<ChatMessage>>>,
    pub(crate) seen_uploads: Mutex<Vec<(PathBuf, Vec<u8>)>>,
    pub(crate) synthesized: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub(crate) fn with_completions(replies: Vec<Result<String, AiGatewayError>>) -> Self {
        Self {
            completions: Mutex::new(VecDeque::from(replies)),
            ..Self::default()
        }
    }

    pub(crate) fn with_transcription(
        mut self,
        transcription: Result<Transcription, AiGatewayError>,
    ) -> Self {
        self.transcription = Mutex::new(Some(transcription));
        self
    }

    /// Completions are recorded but never resolve.
    pub(crate) fn stalled() -> Self {
        Self {
            stall_completions: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_synthesis(mut self) -> Self {
        self.fail_synthesis = true;
        self
    }
}

impl AssistantGateway for ScriptedGateway {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> AiGatewayFuture<'a, String> {
        Box::pin(async move {
            self.seen_completions
                .lock()
                .expect("lock")
                .push(messages.to_vec());
            if self.stall_completions {
                return std::future::pending().await;
            }
            self.completions
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| {
                    Err(AiGatewayError::ProviderFailure(
                        "exhausted_test_replies".to_string(),
                    ))
                })
        })
    }

    fn transcribe<'a>(&'a self, audio_path: &'a Path) -> AiGatewayFuture<'a, Transcription> {
        Box::pin(async move {
            let audio = tokio::fs::read(audio_path)
                .await
                .map_err(AiGatewayError::AudioInput)?;
            self.seen_uploads
                .lock()
                .expect("lock")
                .push((audio_path.to_path_buf(), audio));
            self.transcription
                .lock()
                .expect("lock")
                .take()
                .unwrap_or_else(|| {
                    Err(AiGatewayError::ProviderFailure(
                        "no_scripted_transcription".to_string(),
                    ))
                })
        })
    }

    fn synthesize<'a>(&'a self, text: &'a str) -> AiGatewayFuture<'a, Vec<u8>> {
        Box::pin(async move {
            if self.fail_synthesis {
                return Err(AiGatewayError::Timeout);
            }
            self.synthesized.lock().expect("lock").push(text.to_string());
            Ok(format!("mp3:{text}").into_bytes())
        })
    }
}
