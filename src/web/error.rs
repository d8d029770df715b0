use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::ids::is_valid_id;
use crate::validation::ValidationError;

pub const POST_NOT_FOUND: &str = "Post not found";
pub const COMMENT_NOT_FOUND: &str = "Comment not found";

/// Errors returned by request handlers. Every variant renders as
/// `{"message": ...}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0:#}")]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Store(e) = &self {
            tracing::error!("Store error: {e:#}");
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Unwrap a partial-update body, treating a request without a JSON content
/// type as an empty update.
pub fn update_body<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(update)) => Ok(update),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Accept a path segment as a document id, or fail with `not_found`.
///
/// A malformed id can never match a stored document, so it is reported the
/// same way as an unknown one.
pub fn require_id<'a>(raw: &'a str, not_found: &'static str) -> Result<&'a str, ApiError> {
    if is_valid_id(raw) {
        Ok(raw)
    } else {
        Err(ApiError::NotFound(not_found))
    }
}
