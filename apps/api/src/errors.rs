use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::session::state::NoticeKind;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("AI service credentials are not configured")]
    MissingCredentials,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::BulletNotFound { .. } => AppError::NotFound(err.to_string()),
            _ => AppError::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::MissingCredentials => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MISSING_CREDENTIALS",
                "Missing API Key: set GEMINI_API_KEY to enable resume analysis".to_string(),
            ),
            AppError::Gateway(e) => {
                tracing::error!("Gateway error: {e}");
                let (code, notice) = match e {
                    GatewayError::Parse(_) => ("PARSE_ERROR", NoticeKind::ParseFailed),
                    GatewayError::Analysis(_) => ("ANALYSIS_ERROR", NoticeKind::AnalysisFailed),
                    GatewayError::Rewrite(_) => ("REWRITE_ERROR", NoticeKind::RewriteFailed),
                };
                let message = notice.message();
                (StatusCode::BAD_GATEWAY, code, message.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_map_to_conflict_or_not_found() {
        assert!(matches!(
            AppError::from(SessionError::Busy),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(SessionError::BulletNotFound {
                experience_id: "e".to_string(),
                index: 3
            }),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::MissingCredentials, StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::UnsupportedMediaType("image/png".to_string()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::Gateway(GatewayError::Parse("bad".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::Conflict("busy".to_string()), StatusCode::CONFLICT),
            (
                AppError::PayloadTooLarge("too big".to_string()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                AppError::from(SessionError::RewritesInFlight(2)),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
