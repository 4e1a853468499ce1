use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use validator::ValidationErrors;

use crate::admin::report::ReportError;
use crate::auth::TokenError;

const UNEXPECTED: &str = "An unexpected exception occurred!";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid inputs: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Internal(_)
            | AppError::Json(_)
            | AppError::Report(_)
            | AppError::Token(_)
            | AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// One message per invalid field, keyed by field name.
fn field_messages(errors: &ValidationErrors) -> Map<String, Value> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            let first = errs.first()?;
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid {}", field));
            Some((field.to_string(), Value::String(message)))
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, mut details) = match &self {
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => (msg.clone(), Map::new()),
            AppError::Validation(errors) => ("Invalid Inputs".to_string(), field_messages(errors)),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (UNEXPECTED.to_string(), Map::new())
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (UNEXPECTED.to_string(), Map::new())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (UNEXPECTED.to_string(), Map::new())
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (UNEXPECTED.to_string(), Map::new())
            }
            AppError::Report(e) => {
                tracing::error!("Report error: {}", e);
                (UNEXPECTED.to_string(), Map::new())
            }
            AppError::Token(e) => {
                tracing::error!("Token error: {}", e);
                (UNEXPECTED.to_string(), Map::new())
            }
            AppError::Hash(e) => {
                tracing::error!("Password hashing error: {}", e);
                (UNEXPECTED.to_string(), Map::new())
            }
        };

        details.insert("message".to_string(), Value::String(message.clone()));
        let body = json!({ "message": message, "error": details });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
