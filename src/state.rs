use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::turn::{TurnOrchestrator, TurnStrategy};
use crate::routes::webhooks::{CONVERSATION_WEBHOOK_PATH, ECHO_WEBHOOK_PATH};

/// Application state shared by all handlers
pub struct AppState {
    pub config: ServerConfig,
    /// Turns for the conversational webhook
    pub conversation: Arc<TurnOrchestrator>,
    /// Turns for the echo test webhook
    pub echo: Arc<TurnOrchestrator>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let conversation = Arc::new(TurnOrchestrator::from_config(
            &config,
            TurnStrategy::Conversational,
            CONVERSATION_WEBHOOK_PATH,
        ));
        let echo = Arc::new(TurnOrchestrator::from_config(
            &config,
            TurnStrategy::Echo,
            ECHO_WEBHOOK_PATH,
        ));

        Arc::new(Self {
            config,
            conversation,
            echo,
        })
    }

    /// State with caller-supplied orchestrators, for tests and embedding.
    pub fn with_orchestrators(
        config: ServerConfig,
        conversation: TurnOrchestrator,
        echo: TurnOrchestrator,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            conversation: Arc::new(conversation),
            echo: Arc::new(echo),
        })
    }
}
