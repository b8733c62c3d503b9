use std::io;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::ai::{AiGatewayError, AssistantGateway};
use crate::audio::AudioDirectory;
use crate::models::ChatMessage;
use crate::sessions::{SessionError, SessionHandle, SessionStore};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("session not found")]
    NotFound,
    #[error(transparent)]
    Upstream(AiGatewayError),
    #[error("audio storage failed: {0}")]
    Storage(#[from] io::Error),
}

impl From<SessionError> for ChatError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => Self::NotFound,
        }
    }
}

impl From<AiGatewayError> for ChatError {
    fn from(err: AiGatewayError) -> Self {
        match err {
            AiGatewayError::AudioInput(io_err) => Self::Storage(io_err),
            other => Self::Upstream(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub session_id: String,
    pub response: String,
    pub audio_filename: String,
}

#[derive(Clone)]
pub struct ConversationService {
    sessions: SessionStore,
    gateway: Arc<dyn AssistantGateway>,
    audio: AudioDirectory,
}

impl ConversationService {
    pub fn new(
        sessions: SessionStore,
        gateway: Arc<dyn AssistantGateway>,
        audio: AudioDirectory,
    ) -> Self {
        Self {
            sessions,
            gateway,
            audio,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn gateway(&self) -> &dyn AssistantGateway {
        self.gateway.as_ref()
    }

    pub fn audio(&self) -> &AudioDirectory {
        &self.audio
    }

    /// Runs one text turn against an existing session and returns the reply.
    pub async fn respond(&self, session_id: &str, user_text: &str) -> Result<String, ChatError> {
        let handle = self.sessions.handle(session_id)?;
        self.respond_in(&handle, user_text).await
    }

    /// Text turn for the chat endpoint: unknown or missing ids start a new
    /// session, and the reply is also rendered to audio.
    pub async fn chat(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply, ChatError> {
        let (session_id, handle) = self.sessions.resolve_or_create(session_id);
        let response = self.respond_in(&handle, message).await?;
        let audio_filename = self.speak(&response).await?;

        Ok(ChatReply {
            session_id,
            response,
            audio_filename,
        })
    }

    /// Synthesizes `text` and stores the clip, returning its filename.
    pub async fn speak(&self, text: &str) -> Result<String, ChatError> {
        let audio = self.gateway.synthesize(text).await.inspect_err(|err| {
            warn!("speech synthesis failed: {err}");
        })?;
        Ok(self.audio.store_clip(&audio).await?)
    }

    // Turns on one session run one at a time. The provider sees a copy of the
    // history plus the new user message; the session itself only changes once
    // a reply arrives, so a failed or abandoned turn leaves it untouched.
    pub(crate) async fn respond_in(
        &self,
        handle: &SessionHandle,
        user_text: &str,
    ) -> Result<String, ChatError> {
        let _turn = handle.begin_turn().await;
        let user_message = ChatMessage::user(user_text);
        let (session_id, mut prompt) =
            handle.with_session(|session| (session.id.clone(), session.messages.clone()));
        prompt.push(user_message.clone());

        let reply = self.gateway.complete(&prompt).await.inspect_err(|err| {
            warn!(session_id = %session_id, "chat completion failed: {err}");
        })?;

        let messages = handle.with_session(|session| {
            session.push(user_message);
            session.push(ChatMessage::assistant(reply.clone()));
            session.messages.len()
        });
        debug!(
            session_id = %session_id,
            messages,
            "conversation turn completed"
        );
        Ok(reply)
    }
}
