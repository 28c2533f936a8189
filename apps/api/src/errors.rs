use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::error::{FailureKind, FailureRecord};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Superseded by a newer request")]
    Superseded,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generation failed: {0}")]
    Generation(FailureRecord),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FailureRecord> for AppError {
    fn from(record: FailureRecord) -> Self {
        AppError::Generation(record)
    }
}

fn generation_status(kind: FailureKind) -> (StatusCode, &'static str) {
    match kind {
        FailureKind::ValidationFailed => (StatusCode::UNPROCESSABLE_ENTITY, "GENERATION_INCOMPLETE"),
        FailureKind::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
        FailureKind::Unauthorized => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAUTHORIZED"),
        FailureKind::Transport => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
        FailureKind::Malformed => (StatusCode::BAD_GATEWAY, "UPSTREAM_MALFORMED"),
        FailureKind::Exhausted => (StatusCode::SERVICE_UNAVAILABLE, "GENERATION_EXHAUSTED"),
        FailureKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, attempts) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
            AppError::Superseded => (
                StatusCode::CONFLICT,
                "SUPERSEDED",
                "A newer request for this tool replaced this one".to_string(),
                None,
            ),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    format!("The service is not configured correctly: {msg}"),
                    None,
                )
            }
            AppError::Generation(record) => {
                let (status, code) = generation_status(record.kind);
                (status, code, record.message.clone(), Some(record.attempts))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(attempts) = attempts {
            error["attempts"] = json!(attempts);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn record(kind: FailureKind) -> AppError {
        AppError::Generation(FailureRecord {
            kind,
            message: "something went wrong".into(),
            attempts: 3,
        })
    }

    #[tokio::test]
    async fn test_generation_failures_map_to_statuses() {
        let cases = [
            (FailureKind::ValidationFailed, StatusCode::UNPROCESSABLE_ENTITY),
            (FailureKind::Configuration, StatusCode::INTERNAL_SERVER_ERROR),
            (FailureKind::Unauthorized, StatusCode::BAD_GATEWAY),
            (FailureKind::Transport, StatusCode::BAD_GATEWAY),
            (FailureKind::Malformed, StatusCode::BAD_GATEWAY),
            (FailureKind::Exhausted, StatusCode::SERVICE_UNAVAILABLE),
            (FailureKind::Timeout, StatusCode::GATEWAY_TIMEOUT),
        ];
        for (kind, expected) in cases {
            let (status, _) = render(record(kind)).await;
            assert_eq!(status, expected, "{kind:?}");
        }
    }

    #[tokio::test]
    async fn test_generation_body_carries_attempts() {
        let (_, body) = render(record(FailureKind::Exhausted)).await;
        assert_eq!(body["error"]["code"], "GENERATION_EXHAUSTED");
        assert_eq!(body["error"]["attempts"], 3);
        assert_eq!(body["error"]["message"], "something went wrong");
    }

    #[tokio::test]
    async fn test_request_errors_have_no_attempts() {
        let (status, body) = render(AppError::Validation("count must be 1-10".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].get("attempts").is_none());

        let (status, _) = render(AppError::Superseded).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_internal_details_are_not_leaked() {
        let (status, body) = render(AppError::Internal(anyhow::anyhow!("pool at 0xdeadbeef"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("deadbeef"));
    }
}
