//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`; server-side error classes
//! are captured to Sentry before the response is built. Collaborator
//! failures inside an orchestration cycle never reach this type - they are
//! recorded in the simulation snapshot at the call site that issued them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cart::UnknownProduct;
use crate::settlement::SettlementError;
use crate::simulation::SaveError;

/// Application-level error type for the simulator.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settlement service call failed.
    #[error("Settlement service error: {0}")]
    Settlement(#[from] SettlementError),

    /// A cart line references a product missing from the catalog. The
    /// catalog loads before any mutation is possible, so this is a
    /// cart/catalog desync and is reported, never silently ignored.
    #[error(transparent)]
    UnknownProduct(#[from] UnknownProduct),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<SaveError> for AppError {
    fn from(error: SaveError) -> Self {
        match error {
            SaveError::UnknownProduct(e) => Self::UnknownProduct(e),
            SaveError::Settlement(e) => Self::Settlement(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Settlement(_) | Self::UnknownProduct(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Settlement(_) => StatusCode::BAD_GATEWAY,
            Self::UnknownProduct(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Settlement(_) => "External service error".to_string(),
            Self::UnknownProduct(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
