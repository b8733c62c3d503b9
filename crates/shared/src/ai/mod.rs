pub mod gateway;
pub mod openai;

#[cfg(test)]
pub(crate) mod scripted;

pub use gateway::{AiGatewayError, AiGatewayFuture, AssistantGateway, Transcription};
pub use openai::{OpenAiGateway, OpenAiGatewayConfig};
