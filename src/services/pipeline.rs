use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

use crate::capabilities::{Capability, CapabilityId};
use crate::models::ResponseEnvelope;

use super::classifier::classify_empty_output;
use super::errors::GenerationError;
use super::provider::ModelProvider;
use super::validation::FieldViolation;

/// Validate, prompt, invoke, classify. Holds no per-request state, so one
/// instance serves any number of concurrent calls.
pub struct GenerationPipeline {
    provider: Arc<dyn ModelProvider>,
}

impl GenerationPipeline {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    /// Run one capability. Returns the typed output or a classified error,
    /// never an empty success. No retries, no timeout.
    pub async fn execute<I, O>(&self, capability: &Capability<I, O>, raw_input: &Value) -> Result<O, GenerationError>
    where
        I: DeserializeOwned,
        O: DeserializeOwned,
    {
        let prompt = {
            let input = validate_input(capability, raw_input)?;
            capability.render_prompt(&input)
        };

        log::info!(
            "🤖 Invoking {} via {} ({} media attachment(s))",
            capability.id,
            self.provider.name(),
            prompt.media.len()
        );

        // Spawned so a panicking provider surfaces as a JoinError instead of
        // unwinding through the caller.
        let provider = Arc::clone(&self.provider);
        let output_schema = capability.output_schema.json_schema.clone();
        let call = tokio::spawn(async move { provider.invoke(&prompt, &output_schema).await });

        let envelope = match call.await {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(err)) => {
                log::error!("❌ Critical error during {} flow execution: {:#}", capability.id, err);
                return Err(wrap_provider_failure(capability.id, err));
            }
            Err(join_err) => {
                let payload = if join_err.is_panic() {
                    panic_message(join_err.into_panic())
                } else {
                    join_err.to_string()
                };
                log::error!("❌ {} provider call aborted: {}", capability.id, payload);
                return Err(GenerationError::unknown(format!(
                    "An unexpected error occurred in the {} flow: {}",
                    capability.id.flow_label(),
                    payload
                )));
            }
        };

        match typed_output(capability, &envelope) {
            Some(output) => {
                for warning in capability.output_warnings(&output) {
                    log::warn!("⚠️ {} output passed through with warning: {}", capability.id, warning);
                }
                log::info!("✅ {} generated", capability.id);
                Ok(output)
            }
            None => {
                match &envelope.usage {
                    Some(usage) => log::error!(
                        "❌ {} flow: LLM returned no output. Usage details: {}",
                        capability.id,
                        serde_json::to_string_pretty(usage).unwrap_or_else(|_| format!("{:?}", usage))
                    ),
                    None => log::error!(
                        "❌ {} flow: LLM returned no output, and no usage details were available.",
                        capability.id
                    ),
                }
                Err(classify_empty_output(capability.id, envelope.usage.as_ref()))
            }
        }
    }
}

fn validate_input<I, O>(capability: &Capability<I, O>, raw_input: &Value) -> Result<I, GenerationError>
where
    I: DeserializeOwned,
{
    let normalized = capability
        .input_schema
        .validate(raw_input)
        .map_err(|violations| validation_error(capability.id, &violations))?;

    serde_json::from_value(normalized).map_err(|e| {
        GenerationError::validation(format!("Invalid {} input: {}", capability.id.label().to_lowercase(), e))
    })
}

fn validation_error(id: CapabilityId, violations: &[FieldViolation]) -> GenerationError {
    let details = violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join("; ");
    log::warn!("⚠️ {} input rejected: {}", id, details);
    GenerationError::validation(format!("Invalid {} input: {}", id.label().to_lowercase(), details))
}

/// Output that is present and deserializes into `O`; anything else counts as no usable payload.
fn typed_output<I, O>(capability: &Capability<I, O>, envelope: &ResponseEnvelope) -> Option<O>
where
    O: DeserializeOwned,
{
    let mut raw = match &envelope.output {
        Some(Value::Null) | None => return None,
        Some(raw) => raw.clone(),
    };
    capability.output_schema.apply_defaults(&mut raw);

    match serde_json::from_value(raw) {
        Ok(output) => Some(output),
        Err(e) => {
            log::error!("❌ {} output did not match the expected shape: {}", capability.id, e);
            None
        }
    }
}

fn wrap_provider_failure(id: CapabilityId, err: anyhow::Error) -> GenerationError {
    if let Some(classified) = err.downcast_ref::<GenerationError>() {
        return classified.clone();
    }

    let message = format!("{:#}", err);
    if id.recognizes(&message) {
        GenerationError::provider(message)
    } else {
        GenerationError::provider(format!("{} flow encountered an error: {}", id.flow_label(), message))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
