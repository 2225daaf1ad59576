use std::sync::Arc;

use crate::config::Config;
use crate::errors::ErrorResponder;
use crate::llm_client::ModelClient;
use crate::shifts::parser::ShiftParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub parser: ShiftParser,
    /// Redacts diagnostic context in production.
    pub responder: ErrorResponder,
}

impl AppState {
    pub fn new(config: Config, model: Arc<dyn ModelClient>) -> Self {
        Self {
            responder: ErrorResponder::new(config.environment),
            parser: ShiftParser::new(model),
            config: Arc::new(config),
        }
    }
}
