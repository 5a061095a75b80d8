use anyhow::Result;

use crate::models::{Prompt, ResponseEnvelope};

/// Trait for generative model backends (OpenRouter, test doubles, ...).
///
/// Failures carry a free-text message only; the pipeline classifies them.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    async fn invoke(&self, prompt: &Prompt, output_schema: &serde_json::Value) -> Result<ResponseEnvelope>;

    fn name(&self) -> &str {
        "provider"
    }
}
