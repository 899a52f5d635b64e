//! Completion provider integrations

mod openai_compat;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::{Message, Role};

pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One entry of the prompt sent to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    System(String),
    Human(String),
    Assistant(String),
}

impl From<&Message> for Turn {
    fn from(message: &Message) -> Self {
        match message.role {
            Role::User => Turn::Human(message.content.clone()),
            Role::Assistant => Turn::Assistant(message.content.clone()),
        }
    }
}

/// A service that turns a prompt into generated text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, turns: &[Turn]) -> Result<String, ProviderError>;
}
