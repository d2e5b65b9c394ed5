//! Shared application state

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::llm::OllamaClient;
use crate::prompt::SqlGenerator;

/// Shared application state, read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BridgeConfig>,
    pub generator: SqlGenerator,
}

impl AppState {
    /// Build state with an Ollama-backed generator
    pub fn new(config: BridgeConfig) -> BridgeResult<Self> {
        let llm = OllamaClient::new(&config.llm)?;
        Ok(Self::with_generator(config, SqlGenerator::new(Arc::new(llm))))
    }

    /// Build state around an existing generator
    pub fn with_generator(config: BridgeConfig, generator: SqlGenerator) -> Self {
        Self {
            config: Arc::new(config),
            generator,
        }
    }
}
