mod capabilities;
mod config;
mod handlers;
mod models;
mod render;
#[cfg(feature = "http-server")]
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use serde_json::json;
use std::env;
use std::sync::Arc;

use config::AiConfig;
use handlers::CoachHandler;
use models::image_file_to_data_uri;
use services::{ModelProvider, OpenRouterProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Cortex Fit...");

    let config = AiConfig::from_env()?;

    let provider: Arc<dyn ModelProvider> = Arc::new(OpenRouterProvider::new(&config));
    log::info!("✅ OpenRouter provider initialized with model: {}", config.model);

    let handler = Arc::new(CoachHandler::new(provider)?);
    log::info!("✅ Capabilities loaded");

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("food") => analyze_food_file(&handler, &args[1..]).await,
        Some("body-scan") => analyze_body_file(&handler, &args[1..]).await,
        Some("serve") | None => serve(handler, &config).await,
        Some(other) => {
            anyhow::bail!(
                "unknown command '{}'. Usage: cortex-fit [serve | food <image> | body-scan <image> <heightFt> [weightKg]]",
                other
            )
        }
    }
}

async fn analyze_food_file(handler: &CoachHandler, args: &[String]) -> Result<()> {
    let path = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("usage: cortex-fit food <image>"))?;
    log::debug!("📸 Starting food image analysis for: {}", path);

    let raw = json!({ "photoDataUri": image_file_to_data_uri(path)? });
    let analysis = handler.food_image(&raw).await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

async fn analyze_body_file(handler: &CoachHandler, args: &[String]) -> Result<()> {
    let (path, height) = match args {
        [path, height, ..] => (path, height),
        _ => anyhow::bail!("usage: cortex-fit body-scan <image> <heightFt> [weightKg]"),
    };

    let raw = json!({
        "photoDataUri": image_file_to_data_uri(path)?,
        "heightFt": height,
        "weightKg": args.get(2),
    });
    let analysis = handler.body_scan(&raw).await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

#[cfg(feature = "http-server")]
async fn serve(handler: Arc<CoachHandler>, config: &AiConfig) -> Result<()> {
    let app = server::create_router(handler);
    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;

    log::info!("🌐 HTTP server listening on {}", config.server_addr);
    println!("\n🏋️ Cortex Fit is running on http://{}", config.server_addr);
    println!("🛑 Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}

#[cfg(not(feature = "http-server"))]
async fn serve(_handler: Arc<CoachHandler>, _config: &AiConfig) -> Result<()> {
    anyhow::bail!("built without the http-server feature; use the food or body-scan commands")
}
