use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyloError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Premium subscription required for this feature")]
    PremiumRequired,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("CLI execution error: {0}")]
    CliExecution(String),

    #[error("Image rejected: {0}")]
    InvalidImage(String),

    #[error(transparent)]
    Domain(#[from] stylo_ai_common::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StyloError {
    pub fn status(&self) -> StatusCode {
        use stylo_ai_common::Error as Domain;

        match self {
            StyloError::Validation(_) | StyloError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            StyloError::Unauthorized(_) | StyloError::Token(_) => StatusCode::UNAUTHORIZED,
            StyloError::PremiumRequired => StatusCode::FORBIDDEN,
            StyloError::NotFound(_) => StatusCode::NOT_FOUND,
            StyloError::Conflict(_) => StatusCode::CONFLICT,
            StyloError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            StyloError::Upstream(_) | StyloError::Http(_) | StyloError::CliExecution(_) => StatusCode::BAD_GATEWAY,
            StyloError::Domain(Domain::Json(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            StyloError::Domain(_) => StatusCode::BAD_REQUEST,
            StyloError::Config(_) | StyloError::Json(_) | StyloError::Io(_) | StyloError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for StyloError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = match self {
            StyloError::PremiumRequired => json!({
                "success": false,
                "message": self.to_string(),
                "isPremium": false,
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StyloError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StyloError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(StyloError::PremiumRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(StyloError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            StyloError::NotConfigured("PhonePe".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            StyloError::from(stylo_ai_common::Error::EmptyWardrobe).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_domain_message_passthrough() {
        let err = StyloError::from(stylo_ai_common::Error::EmptyWardrobe);
        assert_eq!(err.to_string(), "No items in wardrobe");
    }

    #[test]
    fn test_not_configured_message() {
        let err = StyloError::NotConfigured("Google Calendar".into());
        assert_eq!(err.to_string(), "Google Calendar is not configured");
    }
}
