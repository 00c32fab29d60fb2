use thiserror::Error;

use crate::core::llm::DialogueError;
use crate::core::storage::PublishError;
use crate::core::stt::TranscriptionError;
use crate::core::tts::SynthesisError;

/// Any failure inside a turn.
///
/// None of these reach the HTTP boundary; the orchestrator maps each kind to a
/// fallback the caller can hear.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Missing configuration: {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Dialogue generation failed: {0}")]
    Dialogue(#[from] DialogueError),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Audio publishing failed: {0}")]
    Publish(#[from] PublishError),

    #[error("Turn budget exhausted before {0}")]
    BudgetExhausted(&'static str),
}

pub type TurnResult<T> = Result<T, TurnError>;
