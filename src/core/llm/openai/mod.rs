//! OpenAI Chat Completions dialogue generator.
//!
//! API Reference: https://platform.openai.com/docs/api-reference/chat/create

mod client;
mod config;
pub mod messages;

pub use client::OpenAIChat;
pub use config::OpenAIChatConfig;
