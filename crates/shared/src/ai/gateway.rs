use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ChatMessage;

pub type AiGatewayFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, AiGatewayError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    /// Average of the per-segment confidences, in `[0, 1]`.
    pub confidence: f64,
}

#[derive(Debug, Error)]
pub enum AiGatewayError {
    #[error("ai provider request timed out")]
    Timeout,
    #[error("ai provider request failed: {0}")]
    ProviderFailure(String),
    #[error("ai provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
    #[error("failed to read audio input: {0}")]
    AudioInput(std::io::Error),
}

/// The three provider capabilities the assistant relies on.
pub trait AssistantGateway: Send + Sync {
    /// Returns the assistant reply for the full ordered conversation.
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> AiGatewayFuture<'a, String>;

    fn transcribe<'a>(&'a self, audio_path: &'a Path) -> AiGatewayFuture<'a, Transcription>;

    /// Returns encoded audio (mp3) for `text` spoken in the configured voice.
    fn synthesize<'a>(&'a self, text: &'a str) -> AiGatewayFuture<'a, Vec<u8>>;
}
