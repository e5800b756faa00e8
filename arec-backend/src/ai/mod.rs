//! Claude integration: the messages API client, prompt assembly, and the
//! action-marker protocol embedded in assistant replies.

pub mod actions;
pub mod claude;
pub mod prompts;

pub use claude::{ChatMessage, ClaudeClient};
