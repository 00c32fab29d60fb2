pub mod gate;
pub mod llm;
pub mod openai;
pub mod script;
pub mod storage;
pub mod stt;
pub mod tts;
pub mod turn;
pub mod twiml;

// Re-export commonly used types for convenience
pub use gate::Readiness;
pub use llm::{DialogueError, DialogueGenerator, OpenAIChat, OpenAIChatConfig};
pub use script::CallScript;
pub use storage::{
    AudioPublisher, ObjectStorePublisher, PublishError, PublishedAudio, SupabasePublisher,
    create_audio_publisher,
};
pub use stt::{Transcriber, TranscriptionError, WhisperConfig, WhisperTranscriber};
pub use tts::{AudioClip, ElevenLabsConfig, ElevenLabsTTS, SpeechSynthesizer, SynthesisError};
pub use turn::{CallEvent, CallStatus, TurnOrchestrator, TurnOutcome, TurnServices, TurnStrategy};
pub use twiml::{CallControlDocument, ResponseBuilder};
