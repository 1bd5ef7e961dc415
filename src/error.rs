use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

/// Failure taxonomy for the API. Validation and business-rule conflicts
/// are caught before or during persistence and rendered as 4xx bodies;
/// anything from the database layer rolls back its transaction and
/// surfaces as a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{message}")]
    Conflict { kind: &'static str, message: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn conflict(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            message: message.into(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => json!({
                "success": false,
                "message": "Validation failed",
                "errors": errors,
            }),
            ApiError::NotFound(entity) => json!({
                "success": false,
                "message": format!("{entity} not found"),
            }),
            ApiError::Conflict { kind, message } => json!({
                "success": false,
                "message": message,
                "type": kind,
            }),
            ApiError::Database(err) => {
                log::error!("Database error: {err}");
                json!({
                    "success": false,
                    "message": "Internal server error",
                })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
