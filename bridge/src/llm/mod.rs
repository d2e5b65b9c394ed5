//! LLM abstraction layer

mod ollama;

pub use ollama::{list_models, ModelInfo, OllamaClient};

use async_trait::async_trait;

use crate::error::BridgeResult;

/// Trait for single-shot completion backends
#[async_trait]
pub trait Llm: Send + Sync {
    /// Send one prompt and return the raw completion text
    async fn generate(&self, prompt: &str) -> BridgeResult<String>;

    /// Get the model name
    fn model(&self) -> &str;
}
