//! Environment-driven API configuration.

/// Environment variable naming the backend base URL.
pub const API_URL_VAR: &str = "EXPEDIENT_API_URL";

/// Environment variable naming the deployment schema JSON file.
pub const SCHEMA_PATH_VAR: &str = "EXPEDIENT_SCHEMA";

/// Default backend base URL when [`API_URL_VAR`] is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Connection settings for the backend API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Path to the deployment schema file, when configured.
    pub schema_path: Option<String>,
}

impl ApiConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_VAR)
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let schema_path = std::env::var(SCHEMA_PATH_VAR).ok();
        Self {
            base_url,
            schema_path,
        }
    }

    /// Build a configuration pointing at an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            schema_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
