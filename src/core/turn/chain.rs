//! Ordered fallback chains used within a turn.
//!
//! Each chain is a list of strategies tried in order; the first success wins and
//! every failure is logged and absorbed. Both chains end in an element that
//! cannot fail, so a turn always has a transcript and always has a way to speak.
//! External calls draw their deadlines from the turn's [`TurnBudget`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::budget::TurnBudget;
use super::event::CallEvent;
use crate::core::storage::{AudioPublisher, PublishError, PublishedAudio, audio_object_name};
use crate::core::stt::{Transcriber, TranscriptionError};
use crate::core::tts::{SpeechSynthesizer, SynthesisError};
use crate::errors::{TurnError, TurnResult};

/// One way of recovering what the caller said.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when this source has nothing to offer for the event.
    async fn transcript(&self, event: &CallEvent, budget: &TurnBudget) -> Option<String>;
}

/// Speech already recognized by the telephony provider.
pub struct InlineSpeech;

#[async_trait]
impl TranscriptSource for InlineSpeech {
    fn name(&self) -> &'static str {
        "inline-speech"
    }

    async fn transcript(&self, event: &CallEvent, _budget: &TurnBudget) -> Option<String> {
        event.speech().map(str::to_string)
    }
}

/// Transcription of the call recording.
pub struct RecordedSpeech {
    transcriber: Arc<dyn Transcriber>,
}

impl RecordedSpeech {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self { transcriber }
    }
}

#[async_trait]
impl TranscriptSource for RecordedSpeech {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn transcript(&self, event: &CallEvent, budget: &TurnBudget) -> Option<String> {
        let url = event.recording()?;
        let Some(hop) = budget.next_hop() else {
            warn!(call_id = %event.call_id, "Turn budget exhausted, skipping transcription");
            return None;
        };

        let result = match timeout(hop, self.transcriber.transcribe(url)).await {
            Ok(result) => result,
            Err(_) => Err(TranscriptionError::Timeout(hop)),
        };

        match result {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!(call_id = %event.call_id, "Recording transcribed to empty text");
                None
            }
            Err(e) => {
                warn!(call_id = %event.call_id, error = %e, "Recording transcription failed");
                None
            }
        }
    }
}

/// Transcript sources tried in order, ending in a fixed placeholder.
pub struct TranscriptChain {
    sources: Vec<Box<dyn TranscriptSource>>,
    placeholder: String,
}

impl TranscriptChain {
    pub fn new(sources: Vec<Box<dyn TranscriptSource>>, placeholder: impl Into<String>) -> Self {
        Self {
            sources,
            placeholder: placeholder.into(),
        }
    }

    /// Inline speech, then the recording, then the placeholder.
    pub fn standard(transcriber: Arc<dyn Transcriber>, placeholder: impl Into<String>) -> Self {
        Self::new(
            vec![
                Box::new(InlineSpeech),
                Box::new(RecordedSpeech::new(transcriber)),
            ],
            placeholder,
        )
    }

    pub async fn resolve(&self, event: &CallEvent, budget: &TurnBudget) -> String {
        for source in &self.sources {
            if let Some(text) = source.transcript(event, budget).await {
                debug!(call_id = %event.call_id, source = source.name(), "Transcript acquired");
                return text;
            }
        }
        debug!(call_id = %event.call_id, "No transcript recovered, using placeholder");
        self.placeholder.clone()
    }
}

/// How a reply reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpokenReply {
    /// Synthesized and published; played from its URL
    Hosted(PublishedAudio),
    /// Read out by the telephony provider's built-in voice
    ProviderVoice(String),
}

/// One way of voicing a reply.
#[async_trait]
pub trait VoiceStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn voice(
        &self,
        reply: &str,
        call_id: &str,
        budget: &TurnBudget,
    ) -> TurnResult<SpokenReply>;
}

/// Primary synthesis, published to storage.
pub struct HostedVoice {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    publisher: Arc<dyn AudioPublisher>,
}

impl HostedVoice {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, publisher: Arc<dyn AudioPublisher>) -> Self {
        Self {
            synthesizer,
            publisher,
        }
    }
}

#[async_trait]
impl VoiceStrategy for HostedVoice {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn voice(
        &self,
        reply: &str,
        call_id: &str,
        budget: &TurnBudget,
    ) -> TurnResult<SpokenReply> {
        let hop = budget
            .next_hop()
            .ok_or(TurnError::BudgetExhausted("synthesis"))?;
        let clip = timeout(hop, self.synthesizer.synthesize(reply))
            .await
            .map_err(|_| SynthesisError::Timeout(hop))??;

        let object_name = audio_object_name(call_id, &clip.content_type, SystemTime::now());
        let hop = budget
            .next_hop()
            .ok_or(TurnError::BudgetExhausted("publishing"))?;
        let published = timeout(hop, self.publisher.publish(&object_name, clip))
            .await
            .map_err(|_| PublishError::Timeout(hop))??;

        Ok(SpokenReply::Hosted(published))
    }
}

/// The telephony provider speaks the reply itself. Never fails.
pub struct ProviderVoice;

#[async_trait]
impl VoiceStrategy for ProviderVoice {
    fn name(&self) -> &'static str {
        "provider"
    }

    async fn voice(
        &self,
        reply: &str,
        _call_id: &str,
        _budget: &TurnBudget,
    ) -> TurnResult<SpokenReply> {
        Ok(SpokenReply::ProviderVoice(reply.to_string()))
    }
}

/// Voice strategies tried in order, ending in the provider voice.
pub struct VoiceChain {
    strategies: Vec<Box<dyn VoiceStrategy>>,
}

impl VoiceChain {
    pub fn new(strategies: Vec<Box<dyn VoiceStrategy>>) -> Self {
        Self { strategies }
    }

    /// Hosted audio, then the provider voice.
    pub fn standard(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        publisher: Arc<dyn AudioPublisher>,
    ) -> Self {
        Self::new(vec![
            Box::new(HostedVoice::new(synthesizer, publisher)),
            Box::new(ProviderVoice),
        ])
    }

    pub async fn speak(&self, reply: &str, call_id: &str, budget: &TurnBudget) -> SpokenReply {
        for strategy in &self.strategies {
            match strategy.voice(reply, call_id, budget).await {
                Ok(spoken) => {
                    debug!(call_id = %call_id, strategy = strategy.name(), "Reply voiced");
                    return spoken;
                }
                Err(e) => {
                    warn!(
                        call_id = %call_id,
                        strategy = strategy.name(),
                        error = %e,
                        "Voice strategy failed, trying next"
                    );
                }
            }
        }
        SpokenReply::ProviderVoice(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tts::AudioClip;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn budget() -> TurnBudget {
        TurnBudget::start(Duration::from_secs(12), Duration::from_secs(5))
    }

    struct FixedTranscriber {
        result: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _url: &str) -> Result<String, TranscriptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .map(str::to_string)
                .map_err(|e| TranscriptionError::Download(e.to_string()))
        }
    }

    struct SlowTranscriber;

    #[async_trait]
    impl Transcriber for SlowTranscriber {
        async fn transcribe(&self, _url: &str) -> Result<String, TranscriptionError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn transcriber(result: Result<&'static str, &'static str>) -> Arc<FixedTranscriber> {
        Arc::new(FixedTranscriber {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    fn event(speech: Option<&str>, recording: Option<&str>) -> CallEvent {
        CallEvent {
            call_id: "CA1".to_string(),
            speech_text: speech.map(str::to_string),
            recording_url: recording.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_inline_speech_wins() {
        let stt = transcriber(Ok("from recording"));
        let chain = TranscriptChain::standard(stt.clone(), "?");

        let text = chain
            .resolve(&event(Some("hej"), Some("https://rec.example.com/1")), &budget())
            .await;
        assert_eq!(text, "hej");
        assert_eq!(stt.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recording_used_without_speech() {
        let stt = transcriber(Ok(" from recording "));
        let chain = TranscriptChain::standard(stt.clone(), "?");

        let text = chain
            .resolve(&event(None, Some("https://rec.example.com/1")), &budget())
            .await;
        assert_eq!(text, "from recording");
        assert_eq!(stt.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_or_empty_transcription_uses_placeholder() {
        let failing =
            TranscriptChain::standard(transcriber(Err("404")), "Jag förstod inte vad du sa");
        assert_eq!(
            failing
                .resolve(&event(None, Some("https://rec.example.com/1")), &budget())
                .await,
            "Jag förstod inte vad du sa"
        );

        let empty = TranscriptChain::standard(transcriber(Ok("  ")), "placeholder");
        assert_eq!(
            empty
                .resolve(&event(None, Some("https://rec.example.com/1")), &budget())
                .await,
            "placeholder"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_transcription_hits_deadline() {
        let chain = TranscriptChain::standard(Arc::new(SlowTranscriber), "timeout");
        let started = tokio::time::Instant::now();
        let text = chain
            .resolve(&event(None, Some("https://rec.example.com/1")), &budget())
            .await;
        assert_eq!(text, "timeout");
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spent_budget_skips_transcription() {
        let stt = transcriber(Ok("from recording"));
        let chain = TranscriptChain::standard(stt.clone(), "placeholder");
        let budget = TurnBudget::start(Duration::from_secs(1), Duration::from_secs(5));
        tokio::time::advance(Duration::from_secs(1)).await;

        let text = chain
            .resolve(&event(None, Some("https://rec.example.com/1")), &budget)
            .await;
        assert_eq!(text, "placeholder");
        assert_eq!(stt.calls.load(Ordering::SeqCst), 0);
    }

    struct FixedSynthesizer(bool);

    #[async_trait]
    impl SpeechSynthesizer for FixedSynthesizer {
        async fn synthesize(&self, _text: &str) -> Result<AudioClip, SynthesisError> {
            if self.0 {
                Ok(AudioClip::mpeg(Bytes::from_static(b"ID3")))
            } else {
                Err(SynthesisError::EmptyAudio)
            }
        }
    }

    struct FixedPublisher {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AudioPublisher for FixedPublisher {
        async fn publish(
            &self,
            object_name: &str,
            _clip: AudioClip,
        ) -> Result<PublishedAudio, PublishError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PublishError::Sign("denied".to_string()));
            }
            Ok(PublishedAudio {
                object_name: object_name.to_string(),
                url: format!("https://cdn.example.com/{object_name}"),
                expires_at: SystemTime::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_hosted_voice_success() {
        let publisher = Arc::new(FixedPublisher {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let chain = VoiceChain::standard(Arc::new(FixedSynthesizer(true)), publisher.clone());

        match chain.speak("Hej!", "CA1", &budget()).await {
            SpokenReply::Hosted(audio) => {
                assert!(audio.object_name.starts_with("tts-CA1-"));
                assert!(audio.url.ends_with(".mp3"));
            }
            other => panic!("expected hosted audio, got {other:?}"),
        }
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_synthesis_failure_skips_publish() {
        let publisher = Arc::new(FixedPublisher {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let chain = VoiceChain::standard(Arc::new(FixedSynthesizer(false)), publisher.clone());

        assert_eq!(
            chain.speak("Hej!", "CA1", &budget()).await,
            SpokenReply::ProviderVoice("Hej!".to_string())
        );
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_falls_back() {
        let chain = VoiceChain::standard(
            Arc::new(FixedSynthesizer(true)),
            Arc::new(FixedPublisher {
                fail: true,
                calls: AtomicUsize::new(0),
            }),
        );

        assert_eq!(
            chain.speak("Hej!", "CA1", &budget()).await,
            SpokenReply::ProviderVoice("Hej!".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_chain_still_speaks() {
        let chain = VoiceChain::new(vec![]);
        assert_eq!(
            chain.speak("Hej!", "CA1", &budget()).await,
            SpokenReply::ProviderVoice("Hej!".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_low_budget_skips_hosted_voice() {
        let publisher = Arc::new(FixedPublisher {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let chain = VoiceChain::standard(Arc::new(FixedSynthesizer(true)), publisher.clone());
        let budget = TurnBudget::start(Duration::from_secs(12), Duration::from_secs(5));
        tokio::time::advance(Duration::from_millis(11_800)).await;

        assert_eq!(
            chain.speak("Hej!", "CA1", &budget).await,
            SpokenReply::ProviderVoice("Hej!".to_string())
        );
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
    }
}
