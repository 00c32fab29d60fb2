pub mod webhooks;

use axum::{Router, body::Body, routing::get};
use governor::middleware::NoOpMiddleware;
use http::{
    HeaderName, HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::api::health_check;
use crate::state::AppState;

/// Rates at or above this disable rate limiting (load testing)
pub const RATE_LIMIT_DISABLED_AT: u32 = 100_000;

pub type RateLimitLayer = GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware, Body>;

/// Per-IP rate limit for every method except POST.
///
/// Webhook callbacks are POSTs from the telephony provider's small pool of
/// egress addresses, and a 429 on one of them drops the call, so POSTs pass
/// through unlimited. Returns `None` when rate limiting is disabled.
pub fn rate_limit_layer(config: &ServerConfig) -> Option<RateLimitLayer> {
    let rps = config.rate_limit_requests_per_second;
    if rps == 0 || rps >= RATE_LIMIT_DISABLED_AT {
        info!("Rate limiting disabled (rate >= {RATE_LIMIT_DISABLED_AT}/s)");
        return None;
    }

    // One token every 1/rps seconds, up to `burst` stored
    let governor_config = GovernorConfigBuilder::default()
        .period(Duration::from_secs(1) / rps)
        .burst_size(config.rate_limit_burst_size)
        .methods(vec![
            Method::GET,
            Method::HEAD,
            Method::OPTIONS,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .key_extractor(SmartIpKeyExtractor)
        .finish();

    match governor_config {
        Some(governor_config) => Some(GovernorLayer::new(governor_config)),
        None => {
            warn!(rps, burst = config.rate_limit_burst_size, "Invalid rate limit, not limiting");
            None
        }
    }
}

/// Headers browser-based tooling sends to the webhooks
fn allowed_headers() -> [HeaderName; 4] {
    [
        AUTHORIZATION,
        CONTENT_TYPE,
        HeaderName::from_static("x-client-info"),
        HeaderName::from_static("apikey"),
    ]
}

/// CORS layer from the configured origins
///
/// `"*"` allows any origin, a comma-separated list allows those origins, and
/// `None` leaves cross-origin requests blocked.
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let methods = [Method::POST, Method::OPTIONS];

    match origins {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(allowed_headers())
            .allow_credentials(false),
        Some(origins) => {
            // Parse comma-separated origins
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(methods)
                .allow_headers(allowed_headers())
                .allow_credentials(true)
        }
        None => {
            info!(
                "CORS not configured, defaulting to same-origin only. \
                 Set CORS_ALLOWED_ORIGINS to enable cross-origin access."
            );
            CorsLayer::new()
                .allow_methods(methods)
                .allow_headers(allowed_headers())
                .allow_credentials(false)
        }
    }
}

/// Complete application router: health check, webhooks, CORS, security headers
/// and rate limiting.
///
/// The rate limiter keys on `X-Forwarded-For`/`X-Real-IP`, falling back to the
/// peer address, so serve with `into_make_service_with_connect_info`.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_allowed_origins.as_deref());
    let rate_limit = rate_limit_layer(&state.config);

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    Router::new()
        .route("/", get(health_check))
        .merge(webhooks::create_webhook_router())
        .with_state(state)
        .layer(cors)
        .layer(security_headers)
        .layer(tower::util::option_layer(rate_limit))
}
