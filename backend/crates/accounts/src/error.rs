//! Accounts Error Types
//!
//! Form failures (validation, bad credentials, taken names) render the
//! `{ success, message, errors }` body the login and signup forms expect;
//! everything else goes through `kernel::error::AppError`.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::validation::FieldErrors;
use thiserror::Error;

pub type AccountsResult<T> = Result<T, AccountsError>;

pub const CHECK_INPUT_MESSAGE: &str = "Please check input.";
pub const CREDENTIALS_MISMATCH_MESSAGE: &str = "Username and password does not match.";

#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("{CHECK_INPUT_MESSAGE} {0}")]
    Validation(FieldErrors),

    #[error("{CREDENTIALS_MISMATCH_MESSAGE}")]
    InvalidCredentials,

    #[error("This username has been occupied.")]
    UsernameTaken,

    #[error("This email address has been occupied.")]
    EmailTaken,

    /// Anonymous caller on an endpoint that needs a user
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("User not found")]
    UserNotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Request was throttled. Expected available in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountsError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountsError::Validation(_)
            | AccountsError::InvalidCredentials
            | AccountsError::UsernameTaken
            | AccountsError::EmailTaken => ErrorKind::BadRequest,
            AccountsError::NotAuthenticated | AccountsError::PermissionDenied => {
                ErrorKind::Forbidden
            }
            AccountsError::UserNotFound | AccountsError::ProfileNotFound => ErrorKind::NotFound,
            AccountsError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AccountsError::Database(_) | AccountsError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Field errors carried by form failures.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            AccountsError::Validation(errors) => Some(errors.clone()),
            AccountsError::UsernameTaken => Some(FieldErrors::single("username", self.to_string())),
            AccountsError::EmailTaken => Some(FieldErrors::single("email", self.to_string())),
            _ => None,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            // Never leak driver messages to clients
            AccountsError::Database(_) | AccountsError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            AccountsError::Database(e) => {
                tracing::error!(error = %e, "Accounts database error");
            }
            AccountsError::Internal(msg) => {
                tracing::error!(message = %msg, "Accounts internal error");
            }
            AccountsError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AccountsError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Accounts request throttled");
            }
            AccountsError::PermissionDenied => {
                tracing::info!("Accounts permission denied");
            }
            _ => {
                tracing::debug!(error = %self, "Accounts error");
            }
        }
    }
}

impl IntoResponse for AccountsError {
    fn into_response(self) -> Response {
        self.log();

        if let Some(errors) = self.field_errors() {
            let body = serde_json::json!({
                "success": false,
                "message": CHECK_INPUT_MESSAGE,
                "errors": errors,
            });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }

        if let AccountsError::InvalidCredentials = self {
            let body = serde_json::json!({
                "success": false,
                "message": CREDENTIALS_MISMATCH_MESSAGE,
            });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }

        let retry_after = match &self {
            AccountsError::RateLimited { retry_after_secs } => {
                HeaderValue::from_str(&retry_after_secs.to_string()).ok()
            }
            _ => None,
        };

        let mut response = self.to_app_error().into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

impl From<FieldErrors> for AccountsError {
    fn from(errors: FieldErrors) -> Self {
        AccountsError::Validation(errors)
    }
}

impl From<AppError> for AccountsError {
    fn from(err: AppError) -> Self {
        AccountsError::Internal(err.to_string())
    }
}
