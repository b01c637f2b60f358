// File: src/response.rs
// Purpose: JSON responses for validation endpoints

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rhtmx_metadata::{MetadataError, ValidationResult};
use serde::Serialize;

/// Validation outcome as sent to the client: always 200, `{}` when valid.
#[derive(Debug)]
pub struct ValidationResponse(pub ValidationResult);

impl IntoResponse for ValidationResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}

/// Server-side failure; the site has no client-caused error responses.
#[derive(Debug)]
pub struct ErrorResponse {
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

// Missing metadata is a server defect, never the client's fault
impl From<MetadataError> for ErrorResponse {
    fn from(err: MetadataError) -> Self {
        ErrorResponse {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_error_is_internal() {
        let err = ErrorResponse::from(MetadataError::UnknownType("Hardware".into()));
        assert_eq!(err.message, "no metadata registered for type `Hardware`");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_response_is_ok() {
        let response = ValidationResponse(ValidationResult::success()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
