//! LLM client for chat completions.

mod client;
mod error;
mod types;

pub use client::{ChatClient, CompletionClient};
pub use error::LlmError;
pub use types::{ChatRequest, ChatResponse, Choice, Message, Role, Usage};
