use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::model::ValidationError;
use crate::store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Email already exists")]
    EmailExists,

    #[error("Contact not found")]
    ContactNotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Storage-layer failure; the backend message is passed through.
    #[error("{0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::EmailExists | ServerError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::ContactNotFound | ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Storage(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ServerError::EmailExists,
            StoreError::Backend(message) => ServerError::Storage(message),
        }
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ServerError::from(ValidationError::MissingField).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServerError::EmailExists.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::ContactNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::Storage("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_conflict_maps_to_email_exists() {
        let err = ServerError::from(StoreError::DuplicateEmail);
        assert_eq!(err.to_string(), "Email already exists");
    }
}
