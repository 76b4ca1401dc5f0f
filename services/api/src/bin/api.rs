//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        GeminiAnalysisAdapter, GeminiClient, GeminiImageAdapter, GeminiQaAdapter,
        GeminiStudyAdapter, OpenAiQaAdapter,
    },
    config::{Config, QaProvider},
    error::ApiError,
    web::{build_router, AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use std::{sync::Arc, time::Duration};
use studymate_core::{QuestionAnsweringService, Studio, StudioServices, StudioSettings};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()?;
    let gemini = GeminiClient::new(
        http,
        config.gemini_base_url.clone(),
        config.gemini_api_key.clone(),
    );

    let analyzer = Arc::new(GeminiAnalysisAdapter::new(
        gemini.clone(),
        config.analysis_model.clone(),
        config.response_language.clone(),
    ));
    let images = Arc::new(GeminiImageAdapter::new(
        gemini.clone(),
        config.image_model.clone(),
    ));
    let materials = Arc::new(GeminiStudyAdapter::new(
        gemini.clone(),
        config.analysis_model.clone(),
        config.presentation_model.clone(),
        config.response_language.clone(),
    ));

    let qa: Arc<dyn QuestionAnsweringService> = match config.qa_provider {
        QaProvider::Gemini => Arc::new(GeminiQaAdapter::new(
            gemini.clone(),
            config.qa_model.clone(),
            config.response_language.clone(),
        )),
        QaProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?;
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
            Arc::new(OpenAiQaAdapter::new(
                openai_client,
                config.qa_model.clone(),
                config.response_language.clone(),
            ))
        }
    };
    info!("Question answering uses {:?} ({})", config.qa_provider, config.qa_model);

    // --- 3. Build the Studio & Shared AppState ---
    let studio = Arc::new(Studio::new(
        StudioServices {
            analyzer,
            images: images.clone(),
            image_editor: images,
            materials,
            qa,
        },
        StudioSettings {
            trigger_keywords: config.trigger_keywords.clone(),
        },
    ));
    let app_state = Arc::new(AppState {
        studio,
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let app = build_router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
