use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shared::ai::{AiGatewayError, AiGatewayFuture, AssistantGateway, Transcription};
use shared::models::ChatMessage;

#[derive(Default)]
pub struct TestGateway {
    completions: Mutex<VecDeque<Result<String, AiGatewayError>>>,
    transcription: Mutex<Option<Result<Transcription, AiGatewayError>>>,
    pub seen_completions: Mutex<Vec<Vec<ChatMessage>>>,
    pub seen_upload_paths: Mutex<Vec<PathBuf>>,
}

impl TestGateway {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            completions: Mutex::new(
                replies
                    .iter()
                    .map(|reply| Ok((*reply).to_string()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing_completion() -> Self {
        Self {
            completions: Mutex::new(VecDeque::from([Err(AiGatewayError::ProviderFailure(
                "status=500 code=server_error".to_string(),
            ))])),
            ..Self::default()
        }
    }

    pub fn hearing(self, text: &str, confidence: f64) -> Self {
        *self.transcription.lock().expect("lock") = Some(Ok(Transcription {
            text: text.to_string(),
            confidence,
        }));
        self
    }

    pub fn failing_transcription(self) -> Self {
        *self.transcription.lock().expect("lock") = Some(Err(AiGatewayError::Timeout));
        self
    }

    pub fn completion_calls(&self) -> usize {
        self.seen_completions.lock().expect("lock").len()
    }

    pub fn upload_paths(&self) -> Vec<PathBuf> {
        self.seen_upload_paths.lock().expect("lock").clone()
    }
}

impl AssistantGateway for TestGateway {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> AiGatewayFuture<'a, String> {
        Box::pin(async move {
            self.seen_completions
                .lock()
                .expect("lock")
                .push(messages.to_vec());
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
            assert!(
                audio_path.exists(),
                "staged upload should exist while transcribing"
            );
            self.seen_upload_paths
                .lock()
                .expect("lock")
                .push(audio_path.to_path_buf());
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
        Box::pin(async move { Ok(format!("mp3:{text}").into_bytes()) })
    }
}
