use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFields(_)
            | AppError::Validation(_)
            | AppError::Format(_)
            | AppError::Configuration(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Dispatch(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Builds the uniform `{status: "error", error, timestamp}` body.
pub fn error_envelope(message: impl Into<String>) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("status".to_string(), json!("error"));
    body.insert("error".to_string(), json!(message.into()));
    body.insert("timestamp".to_string(), json!(chrono::Utc::now().to_rfc3339()));
    body
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::MissingFields(fields) => {
                let mut body = error_envelope("Missing required fields");
                body.insert("missing".to_string(), json!(fields));
                body
            }
            AppError::Validation(msg)
            | AppError::Format(msg)
            | AppError::Configuration(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg) => error_envelope(msg.clone()),
            AppError::Dispatch(msg) => {
                tracing::error!("Dispatch error: {msg}");
                error_envelope(msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                error_envelope("An internal server error occurred")
            }
        };

        (status, Json(Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_fields_lists_each_field() {
        let (status, body) = body_json(AppError::MissingFields(vec![
            "company_name".to_string(),
            "candidate_last_name".to_string(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(body["missing"][1], "candidate_last_name");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_dispatch_error_carries_provider_message_verbatim() {
        let (status, body) =
            body_json(AppError::Dispatch("Phone number not verified".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Phone number not verified");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (status, body) =
            body_json(AppError::Internal(anyhow::anyhow!("secret stack detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "An internal server error occurred");
        assert!(!body.to_string().contains("secret stack detail"));
    }

    #[test]
    fn test_configuration_error_is_bad_request() {
        let error = AppError::Configuration("no routing id".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Unauthorized("Invalid API key".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
