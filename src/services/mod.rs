pub mod classifier;
pub mod errors;
pub mod openrouter; // OpenRouter AI service
pub mod pipeline;
pub mod provider;
pub mod validation;

pub use errors::{ErrorKind, GenerationError};
pub use openrouter::OpenRouterProvider;
pub use pipeline::GenerationPipeline;
pub use provider::ModelProvider;
