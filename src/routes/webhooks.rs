use axum::{
    Router,
    routing::{MethodRouter, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::webhook::{
    conversation_webhook, echo_webhook, method_not_allowed, preflight,
};
use crate::state::AppState;

/// Conversational turns
pub const CONVERSATION_WEBHOOK_PATH: &str = "/api/twilio-webhook";
/// Echo turns, for checking telephony wiring
pub const ECHO_WEBHOOK_PATH: &str = "/api/twilio-webhook-test";

/// Create the telephony webhook router
///
/// Each route accepts POST (the turn) and OPTIONS (CORS); any other method gets 405.
/// No authentication: the provider posts directly to these URLs.
pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(CONVERSATION_WEBHOOK_PATH, webhook_route(post(conversation_webhook)))
        .route(ECHO_WEBHOOK_PATH, webhook_route(post(echo_webhook)))
        .layer(TraceLayer::new_for_http())
}

fn webhook_route(turn: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    turn.options(preflight).fallback(method_not_allowed)
}
