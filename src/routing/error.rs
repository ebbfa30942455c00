//! Per-request resolution errors.

use axum::http::StatusCode;
use thiserror::Error;

/// Why a request could not be resolved. Never retried, never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed host: {0}")]
    Malformed(String),

    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl ResolutionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolutionError::NotFound(_) => StatusCode::NOT_FOUND,
            ResolutionError::Malformed(_) => StatusCode::BAD_REQUEST,
            ResolutionError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Stable label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionError::NotFound(_) => "not_found",
            ResolutionError::Malformed(_) => "malformed",
            ResolutionError::Forbidden(_) => "forbidden",
        }
    }
}
