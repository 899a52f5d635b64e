//! Conversation types
//!
//! A thread has no storage of its own: it is whatever ordered list of
//! messages currently lives under its id.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub role: Role,
    pub thread_id: String,
}

impl Message {
    pub fn user(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::User,
            thread_id: thread_id.into(),
        }
    }

    pub fn assistant(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::Assistant,
            thread_id: thread_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub metadata: ThreadMetadata,
}

impl Thread {
    /// Materialize a thread from its stored messages. `None` when empty.
    pub fn from_messages(id: impl Into<String>, messages: Vec<Message>) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        Some(Self {
            id: id.into(),
            messages,
            metadata: ThreadMetadata::default(),
        })
    }
}

/// Per-thread metadata. Nothing in the chat flow sets it yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
