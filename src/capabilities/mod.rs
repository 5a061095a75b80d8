//! Per-capability declarations: input schema, output shape, prompt template
//! and the heading vocabulary used to render prose answers.

pub mod body_scan;
pub mod chat_coach;
pub mod diet_plan;
pub mod food_image;
pub mod workout;

use serde_json::Value;
use std::fmt;

use crate::models::Prompt;
use crate::render::{DocumentRenderer, HeadingRule};
use crate::services::validation::InputSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityId {
    DietPlan,
    WorkoutSchedule,
    ChatCoach,
    FoodImage,
    BodyScan,
}

impl CapabilityId {
    /// Short name used in the generic empty-output message.
    pub fn label(&self) -> &'static str {
        match self {
            CapabilityId::DietPlan => "Diet plan",
            CapabilityId::WorkoutSchedule => "Workout schedule",
            CapabilityId::ChatCoach => "AI coach",
            CapabilityId::FoodImage => "Food analysis",
            CapabilityId::BodyScan => "Body scan analysis",
        }
    }

    /// Phrase that opens finish-reason messages ("<subject> failed. Reason: ...").
    pub fn subject(&self) -> &'static str {
        match self {
            CapabilityId::DietPlan => "Diet plan generation",
            CapabilityId::WorkoutSchedule => "Workout generation",
            CapabilityId::ChatCoach => "AI coach response generation",
            CapabilityId::FoodImage => "Food analysis",
            CapabilityId::BodyScan => "Body scan analysis",
        }
    }

    /// Name used when wrapping foreign provider errors.
    pub fn flow_label(&self) -> &'static str {
        match self {
            CapabilityId::DietPlan => "Diet Plan",
            CapabilityId::WorkoutSchedule => "Workout",
            CapabilityId::ChatCoach => "AI Chat Coach",
            CapabilityId::FoodImage => "Food analysis",
            CapabilityId::BodyScan => "Body scan",
        }
    }

    /// Message prefixes that mark an error as already specific to this capability.
    pub fn error_prefixes(&self) -> &'static [&'static str] {
        match self {
            CapabilityId::DietPlan => &["Diet plan", "AI model"],
            CapabilityId::WorkoutSchedule => &["Workout generation", "AI model"],
            CapabilityId::ChatCoach => &["AI coach", "LLM"],
            CapabilityId::FoodImage => &["Food analysis", "AI model"],
            CapabilityId::BodyScan => &["Body scan", "AI model"],
        }
    }

    /// Whether a provider message already reads as a domain error and must not be re-wrapped.
    pub fn recognizes(&self, message: &str) -> bool {
        self.error_prefixes().iter().any(|p| message.starts_with(p))
            || message.contains("API key")
            || message.contains("helper")
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapabilityId::DietPlan => "diet-plan",
            CapabilityId::WorkoutSchedule => "workout-schedule",
            CapabilityId::ChatCoach => "chat-coach",
            CapabilityId::FoodImage => "food-image",
            CapabilityId::BodyScan => "body-scan",
        };
        write!(f, "{}", s)
    }
}

/// Expected output shape, handed to the provider, plus literal defaults
/// filled in when the model leaves a field out.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub json_schema: Value,
    pub defaults: Vec<(&'static str, Value)>,
}

impl OutputSchema {
    pub fn new(json_schema: Value) -> Self {
        Self {
            json_schema,
            defaults: Vec::new(),
        }
    }

    pub fn with_default(mut self, field: &'static str, value: Value) -> Self {
        self.defaults.push((field, value));
        self
    }

    pub fn apply_defaults(&self, output: &mut Value) {
        let Some(object) = output.as_object_mut() else {
            return;
        };
        for (field, value) in &self.defaults {
            let missing = matches!(object.get(*field), None | Some(Value::Null));
            if missing {
                object.insert(field.to_string(), value.clone());
            }
        }
    }
}

/// Everything the pipeline needs to run one capability. Built once at startup.
pub struct Capability<I, O> {
    pub id: CapabilityId,
    pub input_schema: InputSchema,
    pub output_schema: OutputSchema,
    pub prompt_template: fn(&I) -> Prompt,
    /// Section-level headings, most specific first
    pub heading_rules: Vec<HeadingRule>,
    /// Sub-headings recognised inside a section body
    pub sub_heading_rules: Vec<HeadingRule>,
    /// Non-fatal shape checks; findings are logged and passed through
    pub output_check: Option<fn(&O) -> Vec<String>>,
}

impl<I, O> Capability<I, O> {
    pub fn render_prompt(&self, input: &I) -> Prompt {
        (self.prompt_template)(input)
    }

    pub fn output_warnings(&self, output: &O) -> Vec<String> {
        self.output_check.map(|check| check(output)).unwrap_or_default()
    }

    pub fn document_renderer(&self) -> DocumentRenderer {
        DocumentRenderer::new(self.heading_rules.clone(), self.sub_heading_rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recognizes_domain_messages() {
        let id = CapabilityId::DietPlan;
        assert!(id.recognizes("Diet plan generation failed. Reason: SAFETY."));
        assert!(id.recognizes("API key invalid"));
        assert!(id.recognizes("missing helper 'media'"));
        assert!(!id.recognizes("connection reset by peer"));
        assert!(!CapabilityId::ChatCoach.recognizes("Diet plan generation failed."));
    }

    #[test]
    fn test_apply_defaults_fills_missing_and_null_only() {
        let schema = OutputSchema::new(json!({}))
            .with_default("disclaimer", json!("Consult a professional."))
            .with_default("notes", json!(""));

        let mut output = json!({"disclaimer": null, "notes": "Keep your back straight."});
        schema.apply_defaults(&mut output);

        assert_eq!(output["disclaimer"], "Consult a professional.");
        assert_eq!(output["notes"], "Keep your back straight.");

        let mut not_object = json!("text");
        schema.apply_defaults(&mut not_object);
        assert_eq!(not_object, json!("text"));
    }
}
