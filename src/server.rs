use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::handlers::coach::{ChatView, DietPlanView, WorkoutView};
use crate::handlers::CoachHandler;
use crate::models::{BodyScanOutput, FoodImageOutput};
use crate::services::{ErrorKind, GenerationError};

/// JSON error body carrying the generation error message verbatim.
pub struct ApiError(GenerationError);

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Provider => StatusCode::BAD_GATEWAY,
            ErrorKind::EmptyOutput | ErrorKind::SafetyRefusal | ErrorKind::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        log::warn!("⚠️ Responding {} ({}): {}", status, self.0.kind, self.0.message);
        (status, Json(json!({ "error": self.0.message }))).into_response()
    }
}

pub fn create_router(handler: Arc<CoachHandler>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/diet-plan", post(diet_plan))
        .route("/api/workout", post(workout))
        .route("/api/chat", post(chat))
        .route("/api/food-analysis", post(food_analysis))
        .route("/api/body-scan", post(body_scan))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(handler)
}

async fn diet_plan(
    State(handler): State<Arc<CoachHandler>>,
    Json(raw): Json<Value>,
) -> Result<Json<DietPlanView>, ApiError> {
    log::info!("🍽️ Diet plan requested");
    Ok(Json(handler.diet_plan(&raw).await?))
}

async fn workout(
    State(handler): State<Arc<CoachHandler>>,
    Json(raw): Json<Value>,
) -> Result<Json<WorkoutView>, ApiError> {
    log::info!("🏋️ Workout requested");
    Ok(Json(handler.workout(&raw).await?))
}

async fn chat(
    State(handler): State<Arc<CoachHandler>>,
    Json(raw): Json<Value>,
) -> Result<Json<ChatView>, ApiError> {
    log::info!("💬 Coach message received");
    Ok(Json(handler.chat(&raw).await?))
}

async fn food_analysis(
    State(handler): State<Arc<CoachHandler>>,
    Json(raw): Json<Value>,
) -> Result<Json<FoodImageOutput>, ApiError> {
    log::info!("📸 Food image analysis requested");
    Ok(Json(handler.food_image(&raw).await?))
}

async fn body_scan(
    State(handler): State<Arc<CoachHandler>>,
    Json(raw): Json<Value>,
) -> Result<Json<BodyScanOutput>, ApiError> {
    log::info!("🧍 Body scan requested");
    Ok(Json(handler.body_scan(&raw).await?))
}

async fn root_handler() -> &'static str {
    "Cortex Fit API - POST /api/diet-plan, /api/workout, /api/chat, /api/food-analysis, /api/body-scan"
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResponseEnvelope;
    use crate::services::provider::mock::{MockProvider, Scripted};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn router(script: Vec<Scripted>) -> Router {
        let handler = CoachHandler::new(Arc::new(MockProvider::new(script))).unwrap();
        create_router(Arc::new(handler))
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_chat_returns_rendered_document() {
        let router = router(vec![Scripted::Envelope(ResponseEnvelope::with_output(
            json!({"response": "Key Points:\n* Sleep: 8 hours"}),
        ))]);

        let (status, body) = post_json(router, "/api/chat", json!({"message": "recovery tips?"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document"]["sections"][0]["title"], "Key Points");
        assert_eq!(body["document"]["sections"][0]["nodes"][0]["type"], "titledListItem");
    }

    #[tokio::test]
    async fn test_validation_error_is_422_with_message() {
        let router = router(Vec::new());

        let (status, body) = post_json(router, "/api/workout", json!({"bodyPart": "neck"})).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("bodyPart must be one of"));
    }

    #[tokio::test]
    async fn test_provider_error_is_502_verbatim() {
        let router = router(vec![Scripted::Fail(anyhow::anyhow!("API key invalid"))]);

        let (status, body) = post_json(
            router,
            "/api/body-scan",
            json!({"photoDataUri": "data:image/png;base64,AAAA", "heightFt": 5.9}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "API key invalid");
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(Vec::new())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
