//! Telephony webhook handlers.
//!
//! The provider treats any non-200 answer as a dead call, so every POST gets a
//! 200: a TwiML document, or a plain `OK` once the call has ended.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::turn::{CallEvent, TurnOrchestrator, TurnOutcome};
use crate::core::twiml::CallControlDocument;
use crate::state::AppState;

/// `POST /api/twilio-webhook`
pub async fn conversation_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handle_turn(&state.conversation, &headers, &body).await
}

/// `POST /api/twilio-webhook-test`
pub async fn echo_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    handle_turn(&state.echo, &headers, &body).await
}

/// Plain OPTIONS on a webhook route. Browser preflights are answered by the CORS layer.
pub async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Method not allowed",
    )
}

async fn handle_turn(orchestrator: &TurnOrchestrator, headers: &HeaderMap, body: &[u8]) -> Response {
    let event = match parse_event(headers, body) {
        Ok(event) => event,
        Err(e) => {
            warn!(strategy = %orchestrator.strategy(), error = %e, "Unreadable webhook body");
            return twiml(orchestrator.unexpected_error());
        }
    };

    info!(
        call_id = %event.call_id,
        status = %event.status,
        strategy = %orchestrator.strategy(),
        has_speech = event.speech().is_some(),
        has_recording = event.recording().is_some(),
        "Webhook received"
    );

    match orchestrator.handle(&event).await {
        TurnOutcome::Document(doc) => twiml(doc),
        TurnOutcome::Acknowledge => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "OK",
        )
            .into_response(),
    }
}

/// JSON when the content type says so, form-encoded otherwise.
fn parse_event(headers: &HeaderMap, body: &[u8]) -> Result<CallEvent, serde_json::Error> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("json"));

    if is_json {
        CallEvent::from_json(body)
    } else {
        CallEvent::from_form(body)
    }
}

fn twiml(doc: CallControlDocument) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        doc.render(),
    )
        .into_response()
}
