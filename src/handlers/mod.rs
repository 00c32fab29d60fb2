//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `webhook` - Telephony webhook turns

pub mod api;
pub mod webhook;

pub use webhook::{conversation_webhook, echo_webhook};
