use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::capabilities::{body_scan, chat_coach, diet_plan, food_image, workout, Capability};
use crate::models::{
    BodyScanInput, BodyScanOutput, ChatInput, ChatOutput, DietPlanInput, DietPlanOutput, FoodImageInput,
    FoodImageOutput, WorkoutInput, WorkoutOutput,
};
use crate::render::{DocumentRenderer, RenderedDocument};
use crate::services::{GenerationError, GenerationPipeline, ModelProvider};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanView {
    pub diet_plan: String,
    pub document: RenderedDocument,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatView {
    pub response: String,
    pub document: RenderedDocument,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutView {
    #[serde(flatten)]
    pub workout: WorkoutOutput,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Wires raw user input to the pipeline and turns prose answers into
/// display structure. Errors are surfaced with their message untouched.
pub struct CoachHandler {
    pipeline: GenerationPipeline,
    diet_plan: Capability<DietPlanInput, DietPlanOutput>,
    diet_plan_renderer: DocumentRenderer,
    workout: Capability<WorkoutInput, WorkoutOutput>,
    chat: Capability<ChatInput, ChatOutput>,
    chat_renderer: DocumentRenderer,
    food_image: Capability<FoodImageInput, FoodImageOutput>,
    body_scan: Capability<BodyScanInput, BodyScanOutput>,
}

impl CoachHandler {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Result<Self> {
        let diet_plan = diet_plan::capability()?;
        let chat = chat_coach::capability()?;

        Ok(Self {
            pipeline: GenerationPipeline::new(provider),
            diet_plan_renderer: diet_plan.document_renderer(),
            diet_plan,
            workout: workout::capability()?,
            chat_renderer: chat.document_renderer(),
            chat,
            food_image: food_image::capability()?,
            body_scan: body_scan::capability()?,
        })
    }

    pub async fn diet_plan(&self, raw: &Value) -> Result<DietPlanView, GenerationError> {
        let output = self.pipeline.execute(&self.diet_plan, raw).await?;
        let document = self.diet_plan_renderer.render(&output.diet_plan);
        log::debug!("🍽️ Diet plan rendered into {} section(s)", document.sections.len());

        Ok(DietPlanView {
            diet_plan: output.diet_plan,
            document,
        })
    }

    pub async fn workout(&self, raw: &Value) -> Result<WorkoutView, GenerationError> {
        let workout = self.pipeline.execute(&self.workout, raw).await?;
        let warnings = self.workout.output_warnings(&workout);
        Ok(WorkoutView { workout, warnings })
    }

    pub async fn chat(&self, raw: &Value) -> Result<ChatView, GenerationError> {
        let output = self.pipeline.execute(&self.chat, raw).await?;
        let document = self.chat_renderer.render(&output.response);
        Ok(ChatView {
            response: output.response,
            document,
        })
    }

    pub async fn food_image(&self, raw: &Value) -> Result<FoodImageOutput, GenerationError> {
        self.pipeline.execute(&self.food_image, raw).await
    }

    pub async fn body_scan(&self, raw: &Value) -> Result<BodyScanOutput, GenerationError> {
        self.pipeline.execute(&self.body_scan, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResponseEnvelope, Usage};
    use crate::render::ContentNode;
    use crate::services::provider::mock::{MockProvider, Scripted};
    use serde_json::json;

    fn handler(script: Vec<Scripted>) -> CoachHandler {
        CoachHandler::new(Arc::new(MockProvider::new(script))).unwrap()
    }

    #[tokio::test]
    async fn test_diet_plan_is_rendered_into_sections() {
        let plan = "**Breakfast:**\n* Oats: 50g with milk\n*Approximate Nutritional Information: 300 kcal*\n\n**Lunch:**\n* Chicken and rice";
        let handler = handler(vec![Scripted::Envelope(ResponseEnvelope::with_output(json!({ "dietPlan": plan })))]);

        let view = handler
            .diet_plan(&json!({
                "weightKg": 60, "heightFt": 5.4, "age": 35, "gender": "female",
                "fitnessGoals": "weight loss", "activityLevel": "lightly active"
            }))
            .await
            .unwrap();

        assert_eq!(view.diet_plan, plan);
        assert_eq!(view.document.sections.len(), 2);
        assert_eq!(view.document.sections[0].title, "Breakfast");
        assert_eq!(
            view.document.sections[1].nodes,
            vec![ContentNode::ListItem { indent_level: 0, text: "Chicken and rice".into() }]
        );
    }

    #[tokio::test]
    async fn test_error_message_surfaces_verbatim() {
        let handler = handler(vec![Scripted::Envelope(ResponseEnvelope::empty(Some(Usage {
            finish_reason: Some("SAFETY".into()),
            ..Default::default()
        })))]);

        let err = handler.chat(&json!({"message": "hello"})).await.unwrap_err();

        assert!(err.to_string().starts_with("AI coach response generation failed. Reason: SAFETY."));
    }

    #[tokio::test]
    async fn test_workout_view_carries_warnings() {
        let handler = handler(vec![Scripted::Envelope(ResponseEnvelope::with_output(json!({
            "workoutTitle": "Core Blast",
            "exercises": [{"name": "Plank", "sets": "3", "reps": "45s", "rest": "30s"}],
            "notes": "Brace your core."
        })))]);

        let view = handler
            .workout(&json!({
                "bodyPart": "abs", "timeAvailable": 15,
                "fitnessLevel": "intermediate", "workoutLocation": "gym"
            }))
            .await
            .unwrap();

        assert_eq!(view.warnings.len(), 1);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["workoutTitle"], "Core Blast");
        assert_eq!(json["disclaimer"], workout::DEFAULT_DISCLAIMER);
    }

    #[tokio::test]
    async fn test_food_image_rejects_missing_photo_without_calling_provider() {
        let provider = Arc::new(MockProvider::new(Vec::new()));
        let handler = CoachHandler::new(provider.clone()).unwrap();

        let err = handler.food_image(&json!({})).await.unwrap_err();

        assert_eq!(err.message, "Invalid food analysis input: photoDataUri is required");
        assert_eq!(provider.calls(), 0);
    }
}
