use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::fs;

/// What a model provider hands back for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Structured output; `None` when the provider produced no usable payload
    pub output: Option<serde_json::Value>,
    pub usage: Option<Usage>,
}

impl ResponseEnvelope {
    #[cfg(test)]
    pub fn with_output(output: serde_json::Value) -> Self {
        Self {
            output: Some(output),
            usage: None,
        }
    }

    pub fn empty(usage: Option<Usage>) -> Self {
        Self {
            output: None,
            usage,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub finish_reason: Option<String>,
    pub finish_message: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Rendered prompt: instruction text plus any attached images as `data:` URIs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub text: String,
    pub media: Vec<String>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            media: Vec::new(),
        }
    }

    pub fn with_media(mut self, data_uri: impl Into<String>) -> Self {
        self.media.push(data_uri.into());
        self
    }
}

/// Read a local image and encode it as a `data:` URI.
pub fn image_file_to_data_uri(image_path: &str) -> Result<String> {
    let image_data = fs::read(image_path)
        .with_context(|| format!("failed to read image {}", image_path))?;
    let base64_image = general_purpose::STANDARD.encode(&image_data);

    log::debug!("📊 Image file size: {} bytes", image_data.len());

    let mime_type = if image_path.ends_with(".png") {
        "image/png"
    } else if image_path.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    };

    Ok(format!("data:{};base64,{}", mime_type, base64_image))
}

// ---- Diet plan ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanInput {
    pub weight_kg: f64,
    pub height_ft: f64,
    pub age: f64,
    pub gender: String,
    pub fitness_goals: String,
    pub dietary_preferences: Option<String>,
    pub activity_level: String,
    pub plan_detail_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanOutput {
    pub diet_plan: String,
}

// ---- Workout schedule ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutInput {
    pub body_part: String,
    pub time_available: f64,
    pub fitness_level: String,
    pub workout_location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub name: String,
    pub sets: String,
    pub reps: String,
    pub rest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutOutput {
    pub workout_title: String,
    pub exercises: Vec<WorkoutExercise>,
    pub notes: Option<String>,
    pub disclaimer: String,
}

// ---- Chat coach ----

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub message: String,
    #[serde(default)]
    pub chat_history: Option<Vec<ChatTurn>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutput {
    pub response: String,
}

// ---- Food image ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodImageInput {
    pub photo_data_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub name: String,
    pub portion_size: String,
    pub calories: f64,
    pub protein: f64,
    pub fats: f64,
    pub carbohydrates: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodImageOutput {
    pub food_items: Vec<FoodItem>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_fats: f64,
    pub total_carbohydrates: f64,
    pub fitness_summary: String,
}

// ---- Body scan ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyScanInput {
    pub photo_data_uri: String,
    pub height_ft: f64,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MuscleDefinition {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyScanOutput {
    pub body_shape: String,
    pub estimated_bmi: f64,
    pub estimated_body_fat_percentage: f64,
    pub muscle_definition: MuscleDefinition,
    pub fitness_category: String,
    pub physique_analysis: String,
    pub improvement_plan: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_deserializes_camel_case() {
        let json = r#"{"finishReason": "SAFETY", "finishMessage": "blocked"}"#;
        let usage: Usage = serde_json::from_str(json).unwrap();

        assert_eq!(usage.finish_reason.as_deref(), Some("SAFETY"));
        assert_eq!(usage.finish_message.as_deref(), Some("blocked"));
        assert_eq!(usage.total_tokens, None);
    }

    #[test]
    fn test_body_scan_output_rejects_unknown_muscle_definition() {
        let json = serde_json::json!({
            "bodyShape": "Mesomorph",
            "estimatedBmi": 23.1,
            "estimatedBodyFatPercentage": 15.0,
            "muscleDefinition": "extreme",
            "fitnessCategory": "Athletic",
            "physiqueAnalysis": "Strong base.",
            "improvementPlan": []
        });

        assert!(serde_json::from_value::<BodyScanOutput>(json).is_err());
    }

    #[test]
    fn test_image_file_to_data_uri_missing_file() {
        let err = image_file_to_data_uri("/nonexistent/meal.png").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/meal.png"));
    }
}
