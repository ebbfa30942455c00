//! Response mapping.
//!
//! # Responsibilities
//! - Map resolution outcomes to HTTP responses
//! - Describe a resolution as JSON when no content backend is configured
//!
//! # Design Decisions
//! - Redirects are 302 with `Location` and a reason header
//! - Errors carry a short plain-text body, never internal details beyond
//!   the resolution error itself

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::routing::{Outcome, ResolutionResult};

pub const X_DOCS_REDIRECT_REASON: &str = "x-docs-redirect-reason";

pub fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Redirect(redirect) => (
            redirect.status(),
            [
                (header::LOCATION.as_str(), redirect.location),
                (X_DOCS_REDIRECT_REASON, redirect.reason.as_str().to_string()),
            ],
        )
            .into_response(),
        Outcome::Error(e) => (e.status_code(), e.to_string()).into_response(),
        Outcome::Proceed(result) => resolution_json(result),
    }
}

pub fn resolution_json(result: ResolutionResult) -> Response {
    (StatusCode::OK, Json(result)).into_response()
}
