use tracing::info;

use crate::ai::Transcription;
use crate::conversation::{ChatError, ConversationService};
use crate::prompts::{CLARIFICATION_REPLY, UNCLEAR_TRANSCRIPT};

/// Transcripts below this average confidence are not treated as a turn.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptGate {
    /// Ask the speaker to repeat; the session history is left untouched.
    Clarify,
    /// Use the transcript as the user's turn.
    Proceed,
}

pub fn classify(transcript: &str, confidence: f64) -> TranscriptGate {
    if transcript.trim().is_empty() || confidence.is_nan() || confidence < CONFIDENCE_THRESHOLD {
        TranscriptGate::Clarify
    } else {
        TranscriptGate::Proceed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReply {
    pub session_id: String,
    pub response: String,
    pub audio_filename: String,
    pub transcript: String,
}

#[derive(Clone)]
pub struct VoicePipeline {
    conversation: ConversationService,
}

impl VoicePipeline {
    pub fn new(conversation: ConversationService) -> Self {
        Self { conversation }
    }

    pub async fn handle(
        &self,
        session_id: Option<&str>,
        audio: &[u8],
        original_name: Option<&str>,
    ) -> Result<VoiceReply, ChatError> {
        let Transcription { text, confidence } = self.transcribe(audio, original_name).await?;
        let (session_id, handle) = self.conversation.sessions().resolve_or_create(session_id);
        let transcript = text.trim().to_string();

        match classify(&transcript, confidence) {
            TranscriptGate::Clarify => {
                info!(
                    session_id = %session_id,
                    confidence,
                    empty = transcript.is_empty(),
                    "voice message failed the confidence gate"
                );
                let audio_filename = self.conversation.speak(CLARIFICATION_REPLY).await?;
                let transcript = if transcript.is_empty() {
                    UNCLEAR_TRANSCRIPT.to_string()
                } else {
                    transcript
                };

                Ok(VoiceReply {
                    session_id,
                    response: CLARIFICATION_REPLY.to_string(),
                    audio_filename,
                    transcript,
                })
            }
            TranscriptGate::Proceed => {
                let response = self.conversation.respond_in(&handle, &transcript).await?;
                let audio_filename = self.conversation.speak(&response).await?;

                Ok(VoiceReply {
                    session_id,
                    response,
                    audio_filename,
                    transcript,
                })
            }
        }
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        original_name: Option<&str>,
    ) -> Result<Transcription, ChatError> {
        let staged = self
            .conversation
            .audio()
            .stage_upload(audio, original_name)
            .await?;
        let transcription = self.conversation.gateway().transcribe(staged.path()).await;
        staged.discard().await;
        Ok(transcription?)
    }
}
