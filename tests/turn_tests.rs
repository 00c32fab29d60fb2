//! Turn Orchestrator Tests
//!
//! Drives the conversational and echo strategies with in-process provider doubles
//! and checks the documents they produce.

mod mock_providers;

use std::time::Duration;

use autocaller_gateway::{
    ServerConfig,
    core::{
        CallEvent, CallScript, CallStatus, Readiness, ResponseBuilder, TurnOrchestrator,
        TurnOutcome, TurnStrategy, gate, twiml::Verb,
    },
};
use mock_providers::{Behavior, MOCK_AUDIO_BASE, MOCK_REPLY, MockSuite};

const ACTION_URL: &str = "https://calls.example.com/api/twilio-webhook";

fn orchestrator(mocks: &MockSuite) -> TurnOrchestrator {
    TurnOrchestrator::new(
        TurnStrategy::Conversational,
        Readiness::Ready,
        CallScript::default(),
        ResponseBuilder::new(ACTION_URL, "alice"),
        Some(mocks.services()),
        Duration::from_secs(5),
    )
}

fn event(status: &str, speech: Option<&str>, recording: Option<&str>) -> CallEvent {
    CallEvent {
        call_id: "CA0123456789abcdef".to_string(),
        from_number: Some("+46701234567".to_string()),
        status: CallStatus::parse(status),
        speech_text: speech.map(str::to_string),
        recording_url: recording.map(str::to_string),
    }
}

fn document(outcome: TurnOutcome) -> autocaller_gateway::core::CallControlDocument {
    match outcome {
        TurnOutcome::Document(doc) => doc,
        TurnOutcome::Acknowledge => panic!("expected a document, got an acknowledgement"),
    }
}

// =============================================================================
// Greeting
// =============================================================================

#[tokio::test]
async fn test_greeting_opens_capture_window_on_own_endpoint() {
    let mocks = MockSuite::new();
    let doc = document(orchestrator(&mocks).handle(&event("ringing", None, None)).await);

    assert_eq!(doc.outline(), vec!["Say", "Gather", "Say", "Hangup"]);
    assert_eq!(doc.spoken_lines()[0], CallScript::default().greeting);

    let Verb::Gather { action, .. } = &doc.verbs()[1] else {
        panic!("second verb should be a gather");
    };
    assert_eq!(action, ACTION_URL);
    assert_eq!(mocks.total_calls(), 0);
}

#[tokio::test]
async fn test_in_progress_without_transcript_source_greets() {
    let mocks = MockSuite::new();
    let doc = document(
        orchestrator(&mocks)
            .handle(&event("in-progress", Some("   "), None))
            .await,
    );
    assert_eq!(doc.spoken_lines()[0], CallScript::default().greeting);
}

// =============================================================================
// Full turn
// =============================================================================

#[tokio::test]
async fn test_inline_speech_plays_hosted_reply() {
    let mocks = MockSuite::new();
    let doc = document(
        orchestrator(&mocks)
            .handle(&event("in-progress", Some("Jag är intresserad"), None))
            .await,
    );

    assert_eq!(doc.outline(), vec!["Play", "Gather", "Say", "Hangup"]);
    let Verb::Play { url } = &doc.verbs()[0] else {
        panic!("first verb should play audio");
    };
    assert!(url.starts_with(MOCK_AUDIO_BASE));
    assert!(url.contains("tts-CA0123456789abcdef-"));

    let xml = doc.render();
    assert!(xml.contains(r#"speechTimeout="2""#));
    assert!(xml.contains(r#"timeout="5""#));
    assert!(xml.contains(&format!(r#"action="{ACTION_URL}""#)));

    assert_eq!(
        mocks.dialogue.last_transcript().as_deref(),
        Some("Jag är intresserad")
    );
    assert_eq!(mocks.transcriber.calls.get(), 0);
    assert_eq!(mocks.synthesizer.calls.get(), 1);
    assert_eq!(mocks.publisher.calls.get(), 1);
}

#[tokio::test]
async fn test_recording_is_transcribed_when_no_inline_speech() {
    let mocks = MockSuite::new();
    let doc = document(
        orchestrator(&mocks)
            .handle(&event(
                "in-progress",
                None,
                Some("https://api.twilio.com/recordings/RE1"),
            ))
            .await,
    );

    assert_eq!(doc.outline()[0], "Play");
    assert_eq!(mocks.transcriber.calls.get(), 1);
    assert_eq!(
        mocks.dialogue.last_transcript().as_deref(),
        Some("Jag vill veta mer")
    );
}

// =============================================================================
// Fallbacks
// =============================================================================

#[tokio::test]
async fn test_transcription_failure_uses_placeholder_transcript() {
    let mocks = MockSuite::with(
        Behavior::Fail,
        Behavior::Succeed,
        Behavior::Succeed,
        Behavior::Succeed,
    );
    let doc = document(
        orchestrator(&mocks)
            .handle(&event(
                "in-progress",
                None,
                Some("https://api.twilio.com/recordings/RE1"),
            ))
            .await,
    );

    assert_eq!(
        mocks.dialogue.last_transcript().unwrap(),
        CallScript::default().not_understood
    );
    assert!(doc.ends_with_hangup());
    assert_eq!(doc.outline()[0], "Play");
}

#[tokio::test]
async fn test_dialogue_failure_apologizes_and_hangs_up() {
    let mocks = MockSuite::with(
        Behavior::Succeed,
        Behavior::Fail,
        Behavior::Succeed,
        Behavior::Succeed,
    );
    let doc = document(
        orchestrator(&mocks)
            .handle(&event("in-progress", Some("Hej"), None))
            .await,
    );

    assert_eq!(doc.outline(), vec!["Say", "Hangup"]);
    assert_eq!(
        doc.spoken_lines(),
        vec![CallScript::default().technical_problem]
    );
    assert_eq!(mocks.synthesizer.calls.get(), 0);
}

#[tokio::test]
async fn test_synthesis_failure_speaks_generated_reply() {
    let mocks = MockSuite::with(
        Behavior::Succeed,
        Behavior::Succeed,
        Behavior::Fail,
        Behavior::Succeed,
    );
    let doc = document(
        orchestrator(&mocks)
            .handle(&event("in-progress", Some("Hej"), None))
            .await,
    );

    let script = CallScript::default();
    assert_eq!(doc.outline(), vec!["Say", "Gather", "Say", "Hangup"]);
    assert_eq!(
        doc.spoken_lines(),
        vec![
            MOCK_REPLY,
            script.fallback_prompt.as_str(),
            script.fallback_closing.as_str()
        ]
    );
    assert_eq!(mocks.publisher.calls.get(), 0);
}

#[tokio::test]
async fn test_publish_failure_speaks_generated_reply() {
    let mocks = MockSuite::with(
        Behavior::Succeed,
        Behavior::Succeed,
        Behavior::Succeed,
        Behavior::Fail,
    );
    let doc = document(
        orchestrator(&mocks)
            .handle(&event("in-progress", Some("Hej"), None))
            .await,
    );

    assert_eq!(doc.spoken_lines()[0], MOCK_REPLY);
    assert!(doc.ends_with_hangup());
}

#[tokio::test(start_paused = true)]
async fn test_every_stage_hanging_still_answers() {
    for hung in 0..4 {
        let mut behaviors = [Behavior::Succeed; 4];
        behaviors[hung] = Behavior::Hang;
        let mocks = MockSuite::with(behaviors[0], behaviors[1], behaviors[2], behaviors[3]);

        let doc = document(
            orchestrator(&mocks)
                .handle(&event(
                    "in-progress",
                    None,
                    Some("https://api.twilio.com/recordings/RE1"),
                ))
                .await,
        );

        assert!(doc.ends_with_hangup(), "stage {hung} left the call open");
        assert!(
            doc.spoken_lines().iter().any(|line| !line.is_empty()),
            "stage {hung} produced silence"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_pipeline_answers_within_turn_budget() {
    let slow = Behavior::Slow(Duration::from_millis(4900));
    let mocks = MockSuite::with(slow, slow, slow, slow);
    let started = tokio::time::Instant::now();

    let doc = document(
        orchestrator(&mocks)
            .handle(&event(
                "in-progress",
                None,
                Some("https://api.twilio.com/recordings/RE1"),
            ))
            .await,
    );

    assert!(started.elapsed() <= Duration::from_millis(12_050));
    assert_eq!(doc.outline(), vec!["Say", "Gather", "Say", "Hangup"]);
    assert_eq!(doc.spoken_lines()[0], MOCK_REPLY);
    assert_eq!(mocks.synthesizer.calls.get(), 1);
    assert_eq!(mocks.publisher.calls.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_moderately_slow_pipeline_still_plays_hosted_audio() {
    let slow = Behavior::Slow(Duration::from_secs(2));
    let mocks = MockSuite::with(slow, slow, slow, slow);

    let doc = document(
        orchestrator(&mocks)
            .handle(&event(
                "in-progress",
                None,
                Some("https://api.twilio.com/recordings/RE1"),
            ))
            .await,
    );

    assert_eq!(doc.outline()[0], "Play");
    assert_eq!(mocks.publisher.calls.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_short_turn_budget_cuts_dialogue() {
    let slow = Behavior::Slow(Duration::from_millis(4900));
    let mocks = MockSuite::with(slow, slow, Behavior::Succeed, Behavior::Succeed);
    let orchestrator = orchestrator(&mocks).with_turn_budget(Duration::from_secs(9));
    let started = tokio::time::Instant::now();

    let doc = document(
        orchestrator
            .handle(&event(
                "in-progress",
                None,
                Some("https://api.twilio.com/recordings/RE1"),
            ))
            .await,
    );

    assert!(started.elapsed() <= Duration::from_millis(9_050));
    assert_eq!(
        doc.spoken_lines(),
        vec![CallScript::default().technical_problem]
    );
    assert_eq!(mocks.synthesizer.calls.get(), 0);
}

// =============================================================================
// Status handling and gate
// =============================================================================

#[tokio::test]
async fn test_terminal_statuses_are_acknowledged() {
    let mocks = MockSuite::new();
    let orchestrator = orchestrator(&mocks);

    for status in ["completed", "busy", "failed", "no-answer", "canceled"] {
        let outcome = orchestrator.handle(&event(status, Some("Hej"), None)).await;
        assert_eq!(outcome, TurnOutcome::Acknowledge, "status {status}");
    }
    assert_eq!(mocks.total_calls(), 0);
}

#[tokio::test]
async fn test_unrecognized_status_says_goodbye() {
    let mocks = MockSuite::new();
    let doc = document(orchestrator(&mocks).handle(&event("queued", None, None)).await);

    assert_eq!(doc.outline(), vec!["Say", "Hangup"]);
    assert_eq!(
        doc.spoken_lines(),
        vec![CallScript::default().default_farewell]
    );
}

#[tokio::test]
async fn test_zero_secrets_gives_apology_without_adapter_calls() {
    let mocks = MockSuite::new();
    let config = ServerConfig::default();
    let orchestrator = TurnOrchestrator::new(
        TurnStrategy::Conversational,
        gate::readiness(&config, TurnStrategy::Conversational),
        CallScript::default(),
        ResponseBuilder::new("", "alice"),
        Some(mocks.services()),
        Duration::from_secs(5),
    );

    for status in ["ringing", "in-progress", "completed"] {
        let doc = document(
            orchestrator
                .handle(&event(
                    status,
                    Some("Hej"),
                    Some("https://api.twilio.com/recordings/RE1"),
                ))
                .await,
        );
        assert_eq!(doc.outline(), vec!["Say", "Hangup"]);
        assert_eq!(doc.spoken_lines(), vec![CallScript::default().not_configured]);
    }
    assert_eq!(mocks.total_calls(), 0);
}

#[tokio::test]
async fn test_replayed_event_gives_same_structure() {
    let mocks = MockSuite::new();
    let orchestrator = orchestrator(&mocks);
    let event = event("in-progress", Some("Jag är intresserad"), None);

    let first = document(orchestrator.handle(&event).await);
    let second = document(orchestrator.handle(&event).await);

    assert_eq!(first.outline(), second.outline());
    assert_eq!(first.spoken_lines(), second.spoken_lines());
}

// =============================================================================
// Echo strategy
// =============================================================================

#[tokio::test]
async fn test_echo_from_config() {
    let mut config = ServerConfig::default();
    config.public_url = Some("https://calls.example.com/".to_string());

    let orchestrator =
        TurnOrchestrator::from_config(&config, TurnStrategy::Echo, "/api/twilio-webhook-test");
    assert!(orchestrator.readiness().is_ready());

    let doc = document(
        orchestrator
            .handle(&event("in-progress", Some("testar ett två"), None))
            .await,
    );
    assert_eq!(doc.spoken_lines()[0], "Hej! Jag hörde: testar ett två");
    assert!(
        doc.render()
            .contains(r#"action="https://calls.example.com/api/twilio-webhook-test""#)
    );
}
