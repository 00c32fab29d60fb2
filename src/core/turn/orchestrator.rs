use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::budget::{DEFAULT_TURN_BUDGET, TurnBudget};
use super::chain::{SpokenReply, TranscriptChain, VoiceChain};
use super::event::CallEvent;
use super::{TurnOutcome, TurnStrategy};
use crate::config::ServerConfig;
use crate::core::gate::{self, Readiness};
use crate::core::llm::{DialogueError, DialogueGenerator, OpenAIChat, OpenAIChatConfig};
use crate::core::script::CallScript;
use crate::core::storage::{AudioPublisher, create_audio_publisher};
use crate::core::stt::{Transcriber, WhisperConfig, WhisperTranscriber};
use crate::core::tts::{ElevenLabsConfig, ElevenLabsTTS, SpeechSynthesizer};
use crate::core::twiml::{CallControlDocument, NextStep, ResponseBuilder, Utterance};
use crate::errors::{TurnError, TurnResult};

/// External adapters a conversational turn calls.
#[derive(Clone)]
pub struct TurnServices {
    pub transcriber: Arc<dyn Transcriber>,
    pub dialogue: Arc<dyn DialogueGenerator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub publisher: Arc<dyn AudioPublisher>,
}

impl TurnServices {
    /// Build the production adapters (Whisper, OpenAI chat, ElevenLabs, configured storage).
    pub fn from_config(config: &ServerConfig) -> TurnResult<Self> {
        let transcriber = WhisperTranscriber::new(WhisperConfig::from_server_config(config))?;
        let dialogue = OpenAIChat::new(OpenAIChatConfig::from_server_config(config))?;
        let synthesizer = ElevenLabsTTS::new(ElevenLabsConfig::from_server_config(config))?;
        let publisher = create_audio_publisher(config)?;

        Ok(Self {
            transcriber: Arc::new(transcriber),
            dialogue: Arc::new(dialogue),
            synthesizer: Arc::new(synthesizer),
            publisher,
        })
    }
}

struct Conversation {
    transcripts: TranscriptChain,
    dialogue: Arc<dyn DialogueGenerator>,
    voices: VoiceChain,
}

/// Runs turns for one webhook route.
///
/// Built once at startup. The gate result is computed at construction since
/// configuration does not change while the process runs.
pub struct TurnOrchestrator {
    strategy: TurnStrategy,
    readiness: Readiness,
    script: CallScript,
    responses: ResponseBuilder,
    conversation: Option<Conversation>,
    deadline: Duration,
    turn_budget: Duration,
}

impl TurnOrchestrator {
    /// `deadline` bounds each external call made during a turn; all of them
    /// together are bounded by the turn budget (see [`Self::with_turn_budget`]).
    pub fn new(
        strategy: TurnStrategy,
        readiness: Readiness,
        script: CallScript,
        responses: ResponseBuilder,
        services: Option<TurnServices>,
        deadline: Duration,
    ) -> Self {
        let conversation = services.map(|services| Conversation {
            transcripts: TranscriptChain::standard(services.transcriber, script.not_understood.clone()),
            dialogue: services.dialogue,
            voices: VoiceChain::standard(services.synthesizer, services.publisher),
        });

        Self {
            strategy,
            readiness,
            script,
            responses,
            conversation,
            deadline,
            turn_budget: DEFAULT_TURN_BUDGET.max(deadline),
        }
    }

    /// Bound the external calls of a whole turn to `budget`.
    pub fn with_turn_budget(mut self, budget: Duration) -> Self {
        self.turn_budget = budget;
        self
    }

    /// Orchestrator for the route at `route_path`, with production adapters.
    ///
    /// Adapters are only built when the gate passes for a conversational route.
    pub fn from_config(config: &ServerConfig, strategy: TurnStrategy, route_path: &str) -> Self {
        let readiness = gate::readiness(config, strategy);
        let action_url = config.callback_url(route_path).unwrap_or_default();
        let responses = ResponseBuilder::new(action_url, &config.telephony_voice)
            .with_language(config.telephony_language.clone());

        let services = if strategy == TurnStrategy::Conversational && readiness.is_ready() {
            match TurnServices::from_config(config) {
                Ok(services) => Some(services),
                Err(e) => {
                    error!(error = %e, "Failed to initialize turn adapters");
                    None
                }
            }
        } else {
            None
        };

        if let Readiness::Missing(missing) = &readiness {
            warn!(
                strategy = %strategy,
                missing = %missing.join(", "),
                "Route will answer with the not-configured message"
            );
        }

        Self::new(
            strategy,
            readiness,
            config.script.clone(),
            responses,
            services,
            config.provider_timeout(),
        )
        .with_turn_budget(config.turn_budget())
    }

    pub fn strategy(&self) -> TurnStrategy {
        self.strategy
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Handle one callback. Never fails; every error path yields a spoken fallback.
    pub async fn handle(&self, event: &CallEvent) -> TurnOutcome {
        if let Readiness::Missing(missing) = &self.readiness {
            let err = TurnError::Configuration(missing.clone());
            warn!(call_id = %event.call_id, strategy = %self.strategy, error = %err, "Turn declined");
            return self.not_configured();
        }

        if event.status.is_terminal() {
            info!(call_id = %event.call_id, status = %event.status, "Call ended");
            return TurnOutcome::Acknowledge;
        }

        match self.strategy {
            TurnStrategy::Conversational => self.conversational_turn(event).await,
            TurnStrategy::Echo => self.echo_turn(event),
        }
    }

    /// Document for a callback that could not be processed at all.
    pub fn unexpected_error(&self) -> CallControlDocument {
        self.responses.say_and_hang_up(&self.script.unexpected_error)
    }

    async fn conversational_turn(&self, event: &CallEvent) -> TurnOutcome {
        let Some(conversation) = &self.conversation else {
            error!(call_id = %event.call_id, "Conversational adapters unavailable");
            return self.not_configured();
        };

        if !event.status.is_active() {
            debug!(call_id = %event.call_id, status = %event.status, "Inactive status, saying goodbye");
            return self.say_and_hang_up(&self.script.default_farewell);
        }

        if !event.has_transcript_source() {
            info!(call_id = %event.call_id, "Greeting caller");
            return self.listen(
                Utterance::Speak(self.script.greeting.clone()),
                &self.script.greeting_prompt,
                &self.script.greeting_closing,
            );
        }

        let budget = TurnBudget::start(self.turn_budget, self.deadline);

        let transcript = conversation.transcripts.resolve(event, &budget).await;
        debug!(call_id = %event.call_id, transcript = %transcript, "Caller transcript");

        let Some(hop) = budget.next_hop() else {
            return self.technical_problem(event, TurnError::BudgetExhausted("dialogue"));
        };
        let reply = match timeout(hop, conversation.dialogue.reply(&transcript)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return self.technical_problem(event, e.into()),
            Err(_) => return self.technical_problem(event, DialogueError::Timeout(hop).into()),
        };
        debug!(call_id = %event.call_id, reply = %reply, "Dialogue reply");

        let spoken = conversation.voices.speak(&reply, &event.call_id, &budget).await;
        debug!(
            call_id = %event.call_id,
            budget_left_ms = budget.remaining().as_millis() as u64,
            "Turn finished"
        );

        match spoken {
            SpokenReply::Hosted(audio) => {
                info!(call_id = %event.call_id, object = %audio.object_name, "Playing hosted reply");
                self.listen(
                    Utterance::Play(audio.url),
                    &self.script.reply_prompt,
                    &self.script.reply_closing,
                )
            }
            SpokenReply::ProviderVoice(text) => {
                info!(call_id = %event.call_id, "Speaking reply with provider voice");
                self.listen(
                    Utterance::Speak(text),
                    &self.script.fallback_prompt,
                    &self.script.fallback_closing,
                )
            }
        }
    }

    fn echo_turn(&self, event: &CallEvent) -> TurnOutcome {
        if !event.status.is_active() {
            return self.say_and_hang_up(&self.script.echo_farewell);
        }

        match event.speech() {
            Some(speech) => {
                info!(call_id = %event.call_id, speech = %speech, "Echoing caller speech");
                self.listen(
                    Utterance::Speak(self.script.echo_reply(speech)),
                    &self.script.echo_prompt,
                    &self.script.echo_closing,
                )
            }
            None => self.listen(
                Utterance::Speak(self.script.echo_greeting.clone()),
                &self.script.echo_greeting_prompt,
                &self.script.echo_greeting_closing,
            ),
        }
    }

    fn technical_problem(&self, event: &CallEvent, err: TurnError) -> TurnOutcome {
        warn!(call_id = %event.call_id, error = %err, "Dialogue failed, ending call");
        self.say_and_hang_up(&self.script.technical_problem)
    }

    fn not_configured(&self) -> TurnOutcome {
        self.say_and_hang_up(&self.script.not_configured)
    }

    fn say_and_hang_up(&self, line: &str) -> TurnOutcome {
        TurnOutcome::Document(self.responses.say_and_hang_up(line))
    }

    fn listen(&self, utterance: Utterance, prompt: &str, closing: &str) -> TurnOutcome {
        TurnOutcome::Document(
            self.responses
                .build(&utterance, NextStep::Listen { prompt, closing }),
        )
    }
}
