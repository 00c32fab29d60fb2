//! In-process provider doubles
//!
//! Each double implements one adapter trait, counts its invocations and can be
//! told to succeed, fail, answer slowly, or hang past any reasonable deadline.

// Not every test binary uses every double
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use autocaller_gateway::core::{
    AudioClip, AudioPublisher, DialogueError, DialogueGenerator, PublishError, PublishedAudio,
    SpeechSynthesizer, SynthesisError, Transcriber, TranscriptionError, TurnServices,
};

/// How a double answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Succeed after the given delay
    Slow(Duration),
    /// Never answer within the turn deadline
    Hang,
}

async fn hang() {
    tokio::time::sleep(Duration::from_secs(3600)).await;
}

/// Wait out a `Slow` behavior; true when the double should then succeed.
async fn delay(behavior: Behavior) -> bool {
    match behavior {
        Behavior::Succeed => true,
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            true
        }
        Behavior::Fail | Behavior::Hang => false,
    }
}

/// Invocation counter shared by the doubles
#[derive(Debug, Default)]
pub struct CallCounter(AtomicU64);

impl CallCounter {
    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct MockTranscriber {
    pub behavior: Behavior,
    pub text: String,
    pub calls: CallCounter,
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _recording_url: &str) -> Result<String, TranscriptionError> {
        self.calls.record();
        if delay(self.behavior).await {
            return Ok(self.text.clone());
        }
        match self.behavior {
            Behavior::Fail => Err(TranscriptionError::Download(
                "Recording fetch returned 404 Not Found".to_string(),
            )),
            _ => {
                hang().await;
                Ok(self.text.clone())
            }
        }
    }
}

pub struct MockDialogue {
    pub behavior: Behavior,
    pub reply: String,
    pub calls: CallCounter,
    pub transcripts: std::sync::Mutex<Vec<String>>,
}

impl MockDialogue {
    pub fn last_transcript(&self) -> Option<String> {
        self.transcripts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DialogueGenerator for MockDialogue {
    async fn reply(&self, transcript: &str) -> Result<String, DialogueError> {
        self.calls.record();
        self.transcripts.lock().unwrap().push(transcript.to_string());
        if delay(self.behavior).await {
            return Ok(self.reply.clone());
        }
        match self.behavior {
            Behavior::Fail => Err(DialogueError::Provider("model overloaded".to_string())),
            _ => {
                hang().await;
                Ok(self.reply.clone())
            }
        }
    }
}

pub struct MockSynthesizer {
    pub behavior: Behavior,
    pub calls: CallCounter,
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<AudioClip, SynthesisError> {
        self.calls.record();
        if delay(self.behavior).await {
            return Ok(AudioClip::mpeg(Bytes::from_static(b"ID3\x04\x00mock")));
        }
        match self.behavior {
            Behavior::Fail => Err(SynthesisError::Provider {
                status: 429,
                message: "quota exceeded".to_string(),
            }),
            _ => {
                hang().await;
                Err(SynthesisError::EmptyAudio)
            }
        }
    }
}

pub struct MockPublisher {
    pub behavior: Behavior,
    pub base_url: String,
    pub calls: CallCounter,
}

#[async_trait]
impl AudioPublisher for MockPublisher {
    async fn publish(
        &self,
        object_name: &str,
        _clip: AudioClip,
    ) -> Result<PublishedAudio, PublishError> {
        self.calls.record();
        if delay(self.behavior).await {
            return Ok(PublishedAudio {
                object_name: object_name.to_string(),
                url: format!("{}/{}?token=signed", self.base_url, object_name),
                expires_at: SystemTime::now() + Duration::from_secs(3600),
            });
        }
        match self.behavior {
            Behavior::Fail => Err(PublishError::Sign("signature rejected".to_string())),
            _ => {
                hang().await;
                Err(PublishError::Store("unreachable".to_string()))
            }
        }
    }
}

/// One double per adapter, all succeeding unless changed.
pub struct MockSuite {
    pub transcriber: Arc<MockTranscriber>,
    pub dialogue: Arc<MockDialogue>,
    pub synthesizer: Arc<MockSynthesizer>,
    pub publisher: Arc<MockPublisher>,
}

pub const MOCK_AUDIO_BASE: &str = "https://audio.example.com/tts";
pub const MOCK_REPLY: &str = "Vad roligt att höra! Berätta mer om ditt företag.";

impl MockSuite {
    pub fn new() -> Self {
        Self::with(
            Behavior::Succeed,
            Behavior::Succeed,
            Behavior::Succeed,
            Behavior::Succeed,
        )
    }

    pub fn with(
        transcriber: Behavior,
        dialogue: Behavior,
        synthesizer: Behavior,
        publisher: Behavior,
    ) -> Self {
        Self {
            transcriber: Arc::new(MockTranscriber {
                behavior: transcriber,
                text: "Jag vill veta mer".to_string(),
                calls: CallCounter::default(),
            }),
            dialogue: Arc::new(MockDialogue {
                behavior: dialogue,
                reply: MOCK_REPLY.to_string(),
                calls: CallCounter::default(),
                transcripts: std::sync::Mutex::new(Vec::new()),
            }),
            synthesizer: Arc::new(MockSynthesizer {
                behavior: synthesizer,
                calls: CallCounter::default(),
            }),
            publisher: Arc::new(MockPublisher {
                behavior: publisher,
                base_url: MOCK_AUDIO_BASE.to_string(),
                calls: CallCounter::default(),
            }),
        }
    }

    pub fn services(&self) -> TurnServices {
        TurnServices {
            transcriber: self.transcriber.clone(),
            dialogue: self.dialogue.clone(),
            synthesizer: self.synthesizer.clone(),
            publisher: self.publisher.clone(),
        }
    }

    /// Invocations across all four doubles
    pub fn total_calls(&self) -> u64 {
        self.transcriber.calls.get()
            + self.dialogue.calls.get()
            + self.synthesizer.calls.get()
            + self.publisher.calls.get()
    }
}
