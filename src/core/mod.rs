//! Core chat components
//!
//! The chat engine orchestrates a turn; the memory store keeps threads.

mod chat;
mod memory;

pub use chat::{ChatEngine, ChatError};
pub use memory::{MemoryError, MemoryStore, DEFAULT_MESSAGE_TTL};
