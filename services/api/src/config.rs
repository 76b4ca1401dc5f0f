//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which backend answers free-text chat questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QaProvider {
    Gemini,
    OpenAi,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub openai_api_key: Option<String>,
    pub analysis_model: String,
    pub presentation_model: String,
    pub image_model: String,
    pub qa_provider: QaProvider,
    pub qa_model: String,
    pub trigger_keywords: Vec<String>,
    pub response_language: String,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let max_upload_str = var_or("MAX_UPLOAD_BYTES", "20971520");
        let max_upload_bytes = max_upload_str.parse::<usize>().map_err(|e| {
            ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
        })?;

        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");

        // --- API Keys ---
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());

        // --- Backend Settings ---
        let gemini_base_url = var_or(
            "GEMINI_BASE_URL",
            "https://generativelanguage.googleapis.com/v1beta",
        )
        .trim_end_matches('/')
        .to_string();
        let analysis_model = var_or("ANALYSIS_MODEL", "gemini-3-flash-preview");
        let presentation_model = var_or("PRESENTATION_MODEL", "gemini-3-pro-preview");
        let image_model = var_or("IMAGE_MODEL", "gemini-2.5-flash-image");

        let qa_provider = match var_or("QA_PROVIDER", "gemini").to_lowercase().as_str() {
            "gemini" => QaProvider::Gemini,
            "openai" => QaProvider::OpenAi,
            other => {
                return Err(ConfigError::InvalidValue(
                    "QA_PROVIDER".to_string(),
                    format!("'{}' is not one of gemini, openai", other),
                ))
            }
        };
        if qa_provider == QaProvider::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()));
        }
        let default_qa_model = match qa_provider {
            QaProvider::Gemini => "gemini-3-flash-preview",
            QaProvider::OpenAi => "gpt-4o",
        };
        let qa_model = var_or("QA_MODEL", default_qa_model);

        // --- Studio Settings ---
        let trigger_keywords: Vec<String> = var_or("CHAT_TRIGGER_KEYWORDS", "poster,infografika,yarat,chiz")
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if trigger_keywords.is_empty() {
            return Err(ConfigError::InvalidValue(
                "CHAT_TRIGGER_KEYWORDS".to_string(),
                "at least one keyword is required".to_string(),
            ));
        }
        let response_language = var_or("RESPONSE_LANGUAGE", "Uzbek (Latin script)");

        Ok(Self {
            bind_address,
            log_level,
            gemini_api_key,
            gemini_base_url,
            openai_api_key,
            analysis_model,
            presentation_model,
            image_model,
            qa_provider,
            qa_model,
            trigger_keywords,
            response_language,
            max_upload_bytes,
            cors_origin,
        })
    }
}
