use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use super::gateway::{AiGatewayError, AiGatewayFuture, AssistantGateway, Transcription};
use crate::config::ConfigError;
use crate::config_env::{optional_trimmed_env, parse_u64_env, require_non_empty_env, string_env_or};
use crate::models::ChatMessage;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-1106";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const DEFAULT_SPEECH_MODEL: &str = "tts-1";
const DEFAULT_SPEECH_VOICE: &str = "nova";

const FALLBACK_UPLOAD_NAME: &str = "audio.mp3";

#[derive(Debug, Clone)]
pub struct OpenAiGatewayConfig {
    pub base_url: Url,
    pub api_key: String,
    pub timeout_ms: u64,
    pub chat_model: String,
    pub transcription_model: String,
    pub speech_model: String,
    pub speech_voice: String,
}

impl OpenAiGatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = match optional_trimmed_env("OPENAI_BASE_URL") {
            Some(raw) => normalize_base_url(&raw)?,
            None => normalize_base_url(DEFAULT_BASE_URL)?,
        };

        Ok(Self {
            base_url,
            api_key: require_non_empty_env(&["OPENAI_API_KEY", "openai_api_key"])?,
            timeout_ms: parse_u64_env("OPENAI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            chat_model: string_env_or("OPENAI_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            transcription_model: string_env_or(
                "OPENAI_TRANSCRIPTION_MODEL",
                DEFAULT_TRANSCRIPTION_MODEL,
            ),
            speech_model: string_env_or("OPENAI_SPEECH_MODEL", DEFAULT_SPEECH_MODEL),
            speech_voice: string_env_or("OPENAI_SPEECH_VOICE", DEFAULT_SPEECH_VOICE),
        })
    }
}

/// Parses a provider base URL, forcing a trailing slash so endpoint paths
/// join underneath it instead of replacing the last segment.
pub fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash).map_err(|err| {
        ConfigError::InvalidConfiguration(format!("OPENAI_BASE_URL is not a valid URL: {err}"))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidConfiguration(
            "OPENAI_BASE_URL must start with http:// or https://".to_string(),
        ));
    }

    Ok(url)
}

pub struct OpenAiGateway {
    client: reqwest::Client,
    config: OpenAiGatewayConfig,
}

impl OpenAiGateway {
    pub fn new(config: OpenAiGatewayConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ConfigError::InvalidConfiguration(format!("http client: {err}")))?;

        Ok(Self { client, config })
    }

    async fn complete_messages(&self, messages: &[ChatMessage]) -> Result<String, AiGatewayError> {
        let request_body = json!({
            "model": self.config.chat_model,
            "messages": messages,
        });

        let response = self
            .send(
                self.client
                    .post(self.endpoint("chat/completions")?)
                    .json(&request_body),
            )
            .await?;

        let parsed: ChatCompletionResponse = response.json().await.map_err(|_| {
            AiGatewayError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiGatewayError::InvalidProviderPayload("missing_choice".to_string()))?
            .message
            .content
            .ok_or_else(|| AiGatewayError::InvalidProviderPayload("missing_content".to_string()))
    }

    async fn transcribe_file(&self, audio_path: &Path) -> Result<Transcription, AiGatewayError> {
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(AiGatewayError::AudioInput)?;
        let upload_name = audio_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(FALLBACK_UPLOAD_NAME)
            .to_string();

        let form = Form::new()
            .text("model", self.config.transcription_model.clone())
            .text("response_format", "verbose_json")
            .part("file", Part::bytes(audio).file_name(upload_name));

        let response = self
            .send(
                self.client
                    .post(self.endpoint("audio/transcriptions")?)
                    .multipart(form),
            )
            .await?;

        let parsed: VerboseTranscriptionResponse = response.json().await.map_err(|_| {
            AiGatewayError::InvalidProviderPayload("response_json_parse_failed".to_string())
        })?;

        Ok(Transcription {
            text: parsed.text.unwrap_or_default(),
            confidence: average_confidence(parsed.segments.as_deref().unwrap_or_default()),
        })
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Vec<u8>, AiGatewayError> {
        let request_body = json!({
            "model": self.config.speech_model,
            "voice": self.config.speech_voice,
            "input": text,
            "response_format": "mp3",
        });

        let response = self
            .send(
                self.client
                    .post(self.endpoint("audio/speech")?)
                    .json(&request_body),
            )
            .await?;

        let audio = response.bytes().await.map_err(|_| {
            AiGatewayError::InvalidProviderPayload("response_body_read_failed".to_string())
        })?;
        if audio.is_empty() {
            return Err(AiGatewayError::InvalidProviderPayload(
                "empty_audio".to_string(),
            ));
        }

        Ok(audio.to_vec())
    }

    fn endpoint(&self, path: &str) -> Result<Url, AiGatewayError> {
        self.config
            .base_url
            .join(path)
            .map_err(|_| AiGatewayError::ProviderFailure("invalid_endpoint".to_string()))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AiGatewayError> {
        let response = request
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AiGatewayError::Timeout
                } else {
                    AiGatewayError::ProviderFailure("request_unavailable".to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let provider_code = parse_provider_error_code(&body);
        Err(AiGatewayError::ProviderFailure(format!(
            "status={} code={provider_code}",
            status.as_u16()
        )))
    }
}

impl AssistantGateway for OpenAiGateway {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> AiGatewayFuture<'a, String> {
        Box::pin(self.complete_messages(messages))
    }

    fn transcribe<'a>(&'a self, audio_path: &'a Path) -> AiGatewayFuture<'a, Transcription> {
        Box::pin(self.transcribe_file(audio_path))
    }

    fn synthesize<'a>(&'a self, text: &'a str) -> AiGatewayFuture<'a, Vec<u8>> {
        Box::pin(self.synthesize_speech(text))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerboseTranscriptionResponse {
    text: Option<String>,
    segments: Option<Vec<TranscriptionSegment>>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionSegment {
    confidence: Option<f64>,
}

/// Segments without a confidence count as fully confident; no segments at
/// all yields 1.0.
fn average_confidence(segments: &[TranscriptionSegment]) -> f64 {
    if segments.is_empty() {
        return 1.0;
    }

    let total: f64 = segments
        .iter()
        .map(|segment| segment.confidence.unwrap_or(1.0))
        .sum();
    let average = total / segments.len() as f64;

    if average.is_nan() {
        return 0.0;
    }
    average.clamp(0.0, 1.0)
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let Some(details) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match details.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => details.kind.unwrap_or_else(|| "unknown".to_string()),
    }
}
