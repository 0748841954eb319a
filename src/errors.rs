use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error; // Use thiserror for cleaner error definitions

// --- Domain/Infrastructure Errors ---

/// Failure of one of the upstream HTTP collaborators. `Display` surfaces
/// the upstream's own message so the caller sees what the remote said.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The upstream answered but reported failure (e.g. `success: false`).
    #[error("{0}")]
    Api(String),

    /// The upstream was unreachable or returned an unreadable response.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(#[from] anyhow::Error), // Wrap opaque errors from durable backings
}

// --- Web Layer Error ---

/// A single field-level validation failure, serialized into 400 bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // Request shape violations (400)
    #[error("Invalid request data")]
    Validation(Vec<FieldError>),

    // Lookup misses (404); the string is the full client-facing message
    #[error("{0}")]
    NotFound(String),

    // Upstream / store failures (500); `context` is the route-specific
    // generic message, the source text rides along as detail
    #[error("{context}")]
    Upstream {
        context: &'static str,
        #[source]
        source: UpstreamError,
    },
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn upstream(context: &'static str, source: UpstreamError) -> Self {
        AppError::Upstream { context, source }
    }

    pub fn store(context: &'static str, source: StoreError) -> Self {
        AppError::Store { context, source }
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "message": "Invalid request data", "errors": errors }),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "message": message }),
            ),
            AppError::Upstream { context, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": context, "error": source.to_string() }),
            ),
            AppError::Store { context, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "message": context, "error": source.to_string() }),
            ),
        };

        // Log the specific error variant and message
        tracing::error!(error.detail = %self, error.status = %status, "Responding with error");

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_maps_to_400_with_field_detail() {
        let err = AppError::Validation(vec![FieldError::new("templateId", "Required")]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid request data");
        assert_eq!(body["errors"][0]["field"], "templateId");
        assert_eq!(body["errors"][0]["message"], "Required");
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let response = AppError::NotFound("Meme not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Meme not found");
    }

    #[tokio::test]
    async fn upstream_maps_to_500_passing_message_through() {
        let err = AppError::upstream(
            "Failed to generate meme",
            UpstreamError::Api("template_id is invalid".to_string()),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to generate meme");
        assert_eq!(body["error"], "template_id is invalid");
    }

    #[tokio::test]
    async fn store_maps_to_500() {
        let err = AppError::store(
            "Failed to clear cache",
            StoreError::Backend(anyhow::anyhow!("backend down")),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to clear cache");
    }
}
