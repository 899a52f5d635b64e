//! Chat engine
//!
//! The ChatEngine runs one turn of a conversation:
//! 1. Loads the full thread history from memory
//! 2. Sends system prompt, history and the new message to the provider
//! 3. Saves the user message, then the assistant reply
//! 4. Returns the reply text
//!
//! Nothing is saved when the provider call fails.

use std::sync::Arc;

use thiserror::Error;

use crate::conversation::Message;
use crate::providers::{CompletionProvider, ProviderError, Turn};

use super::memory::{MemoryError, MemoryStore};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant engaged in a conversation. \
     Maintain context of the conversation and provide relevant, \
     accurate responses based on the chat history.";

/// Errors from the chat engine
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
}

/// The core chat engine
pub struct ChatEngine {
    provider: Arc<dyn CompletionProvider>,
    memory: Arc<MemoryStore>,
}

impl ChatEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>, memory: Arc<MemoryStore>) -> Self {
        Self { provider, memory }
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Process one incoming message and return the generated reply
    pub async fn process_message(&self, message: &Message) -> Result<String, ChatError> {
        let history = self
            .memory
            .get_thread_messages(&message.thread_id, None)
            .await?;

        tracing::debug!(
            thread_id = %message.thread_id,
            history = history.len(),
            "processing message"
        );

        let turns = build_turns(&history, &message.content);
        let response = self.provider.complete(&turns).await?;

        self.memory.save_message(message).await?;
        self.memory
            .save_message(&Message::assistant(message.thread_id.clone(), response.clone()))
            .await?;

        Ok(response)
    }
}

/// System prompt, then history in order, then the new input as the last
/// human turn
fn build_turns(history: &[Message], input: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(Turn::System(SYSTEM_PROMPT.to_string()));
    turns.extend(history.iter().map(Turn::from));
    turns.push(Turn::Human(input.to_string()));
    turns
}
