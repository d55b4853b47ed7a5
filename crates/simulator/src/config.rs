//! Simulator configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CARTLAB_API_BASE_URL` - Base URL of the settlement service API
//!   (e.g. `http://localhost:8000/api`)
//!
//! ## Optional
//! - `CARTLAB_HOST` - Bind address (default: 127.0.0.1)
//! - `CARTLAB_PORT` - Listen port (default: 3000)
//! - `CARTLAB_RECOMMENDATION_MODE` - `ranked` (scoring endpoint, default)
//!   or `best-pick` (before/after comparison endpoint)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which recommendation collaborator variant an orchestration cycle invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecommendationMode {
    /// `POST /simulate_addon`: ranked candidate list.
    #[default]
    Ranked,
    /// `POST /recommend_addon`: single best pick with before/after
    /// settlement comparison.
    BestPick,
}

impl RecommendationMode {
    /// Parse the environment representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ranked" => Some(Self::Ranked),
            "best-pick" | "best_pick" => Some(Self::BestPick),
            _ => None,
        }
    }
}

/// Simulator application configuration.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Settlement service API configuration
    pub api: ApiConfig,
    /// Recommendation endpoint variant used by orchestration cycles
    pub recommendation_mode: RecommendationMode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Settlement service API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL endpoint paths are joined onto. Always ends with `/` so
    /// relative joins land underneath it.
    pub base_url: Url,
}

impl SimulatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("CARTLAB_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("CARTLAB_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("CARTLAB_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("CARTLAB_PORT".to_string(), e.to_string()))?;

        let api = ApiConfig::from_env()?;

        let recommendation_mode = match get_optional_env("CARTLAB_RECOMMENDATION_MODE") {
            Some(value) => RecommendationMode::parse(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "CARTLAB_RECOMMENDATION_MODE".to_string(),
                    format!("expected 'ranked' or 'best-pick', got '{value}'"),
                )
            })?,
            None => RecommendationMode::default(),
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            api,
            recommendation_mode,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("CARTLAB_API_BASE_URL")?;
        Self::new(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("CARTLAB_API_BASE_URL".to_string(), e.to_string()))
    }

    /// Parse a base URL, normalizing it to end with a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(raw: &str) -> Result<Self, url::ParseError> {
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        Ok(Self {
            base_url: Url::parse(&normalized)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
