// File: src/app.rs
// Purpose: Router and handlers for the ModelMetadataTypeValidation endpoints

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Router,
};
use rhtmx_metadata::{MetadataRegistry, ValidationContext, Validator, Value};
use serde_json::Value as JsonValue;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::models::{PRODUCT, SOFTWARE};
use crate::response::{ErrorResponse, ValidationResponse};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MetadataRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<MetadataRegistry>) -> Self {
        Self { registry }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/ModelMetadataTypeValidation/ValidateProductViewModelInclMetadata",
            post(validate_product),
        )
        .route(
            "/ModelMetadataTypeValidation/ValidateSoftwareViewModelInclMetadata",
            post(validate_software),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn validate_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ValidationResponse, ErrorResponse> {
    validate_body(&state, "product", PRODUCT, &headers, &body)
}

async fn validate_software(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ValidationResponse, ErrorResponse> {
    validate_body(&state, "software", SOFTWARE, &headers, &body)
}

fn validate_body(
    state: &AppState,
    model_name: &str,
    type_name: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<ValidationResponse, ErrorResponse> {
    let target = bind_body(body);
    let ctx = context_from_headers(headers);

    let result = Validator::new(&state.registry)
        .validate(model_name, type_name, &target, &ctx)
        .map_err(|e| {
            error!(model = model_name, type_name, "metadata resolution failed: {}", e);
            ErrorResponse::from(e)
        })?;

    Ok(ValidationResponse(result))
}

/// Bodies that are not JSON bind as `null`, i.e. an empty model.
fn bind_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    match serde_json::from_slice::<JsonValue>(body) {
        Ok(json) => Value::from(json),
        Err(e) => {
            debug!("request body is not JSON, validating as empty model: {}", e);
            Value::Null
        }
    }
}

fn context_from_headers(headers: &HeaderMap) -> ValidationContext {
    ValidationContext::from_headers(
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v.to_string()))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_body() {
        assert_eq!(bind_body(b""), Value::Null);
        assert_eq!(bind_body(b"not json"), Value::Null);
        assert_eq!(
            bind_body(br#"{"Name":"MVC"}"#).str_field("Name"),
            Some("MVC")
        );
    }

    #[test]
    fn test_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("version", "2.2".parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());

        let ctx = context_from_headers(&headers);
        assert_eq!(ctx.header("Version"), Some("2.2"));
        assert_eq!(ctx.header("content-type"), Some("application/json"));
    }
}
