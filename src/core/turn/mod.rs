//! Per-callback turn handling.
//!
//! A turn takes one telephony callback and produces the document telling the
//! provider what to do next. Every failure inside a turn degrades to a spoken
//! fallback; the caller never hears silence and the provider never sees an error
//! status.

pub mod budget;
pub mod chain;
pub mod event;
mod orchestrator;

pub use budget::TurnBudget;
pub use chain::{SpokenReply, TranscriptChain, TranscriptSource, VoiceChain, VoiceStrategy};
pub use event::{CallEvent, CallStatus};
pub use orchestrator::{TurnOrchestrator, TurnServices};

use crate::core::twiml::CallControlDocument;

/// Which behavior a webhook route runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnStrategy {
    /// Transcribe, generate a reply, synthesize and play it
    Conversational,
    /// Repeat the caller's words back; used to verify telephony wiring
    Echo,
}

impl TurnStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStrategy::Conversational => "conversational",
            TurnStrategy::Echo => "echo",
        }
    }
}

impl std::fmt::Display for TurnStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handling one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Instructions for the provider
    Document(CallControlDocument),
    /// The call has ended; a plain acknowledgement is enough
    Acknowledge,
}

impl TurnOutcome {
    pub fn document(&self) -> Option<&CallControlDocument> {
        match self {
            TurnOutcome::Document(doc) => Some(doc),
            TurnOutcome::Acknowledge => None,
        }
    }
}
