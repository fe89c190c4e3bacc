//! HTTP client modules for the Amadeus travel APIs.

pub mod airlines;
pub mod auth;
pub mod schedule;

use crate::config::AppConfig;

/// Errors from the Amadeus API layer
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Token exchange failed (non-2xx or malformed body)
    #[error("Token exchange failed: {0}")]
    Auth(String),

    /// Airline reference list fetch failed (non-fatal, directory stays empty)
    #[error("Airline list fetch failed: {0}")]
    Fetch(String),

    /// A required query field is missing or malformed (checked pre-network)
    #[error("{0}")]
    Validation(String),

    /// Transport failure or a non-JSON body
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response JSON lacks the expected structure
    #[error("Unexpected response shape: {0}")]
    DataShape(String),
}

/// Shared HTTP client for the Amadeus API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new client from loaded configuration
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn credentials(&self) -> (&str, &str) {
        (&self.client_id, &self.client_secret)
    }
}
