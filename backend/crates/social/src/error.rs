//! Social Error Types

use accounts::AccountsError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::validation::FieldErrors;
use platform::column_store::ColumnStoreError;
use thiserror::Error;

pub type SocialResult<T> = Result<T, SocialError>;

pub const CHECK_INPUT_MESSAGE: &str = "Please check input.";

#[derive(Debug, Error)]
pub enum SocialError {
    #[error("{CHECK_INPUT_MESSAGE} {0}")]
    Validation(FieldErrors),

    #[error("missing {0}")]
    MissingParameter(&'static str),

    #[error("You cannot follow yourself.")]
    FollowSelf,

    #[error("You cannot unfollow yourself.")]
    UnfollowSelf,

    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("User not found")]
    UserNotFound,

    #[error("Tweet not found")]
    TweetNotFound,

    #[error("Column store error: {0}")]
    ColumnStore(#[from] ColumnStoreError),

    #[error(transparent)]
    Accounts(#[from] AccountsError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SocialError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SocialError::Accounts(e) => e.status_code(),
            _ => StatusCode::from_u16(self.kind().status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SocialError::Validation(_)
            | SocialError::MissingParameter(_)
            | SocialError::FollowSelf
            | SocialError::UnfollowSelf => ErrorKind::BadRequest,
            SocialError::NotAuthenticated => ErrorKind::Forbidden,
            SocialError::UserNotFound | SocialError::TweetNotFound => ErrorKind::NotFound,
            SocialError::Accounts(e) => e.kind(),
            SocialError::ColumnStore(_) | SocialError::Database(_) | SocialError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            SocialError::Accounts(e) => e.to_app_error(),
            SocialError::ColumnStore(_) | SocialError::Database(_) | SocialError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            SocialError::ColumnStore(e) => {
                tracing::error!(error = %e, "Column store error");
            }
            SocialError::Database(e) => {
                tracing::error!(error = %e, "Social database error");
            }
            SocialError::Internal(msg) => {
                tracing::error!(message = %msg, "Social internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Social error");
            }
        }
    }
}

impl IntoResponse for SocialError {
    fn into_response(self) -> Response {
        let body = match &self {
            SocialError::Accounts(_) => None,
            SocialError::Validation(errors) => Some(serde_json::json!({
                "success": false,
                "message": CHECK_INPUT_MESSAGE,
                "errors": errors,
            })),
            SocialError::MissingParameter(_) | SocialError::FollowSelf | SocialError::UnfollowSelf => {
                Some(serde_json::json!({
                    "success": false,
                    "message": self.to_string(),
                }))
            }
            _ => None,
        };

        match (self, body) {
            (SocialError::Accounts(e), _) => e.into_response(),
            (err, Some(body)) => {
                err.log();
                (err.status_code(), Json(body)).into_response()
            }
            (err, None) => {
                err.log();
                err.to_app_error().into_response()
            }
        }
    }
}

impl From<FieldErrors> for SocialError {
    fn from(errors: FieldErrors) -> Self {
        SocialError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SocialError::FollowSelf.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            SocialError::MissingParameter("user_id").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SocialError::NotAuthenticated.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(SocialError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            SocialError::ColumnStore(ColumnStoreError::TableNotFound("newsfeeds".into()))
                .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            SocialError::Accounts(AccountsError::PermissionDenied).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_missing_parameter_message() {
        assert_eq!(
            SocialError::MissingParameter("user_id").to_string(),
            "missing user_id"
        );
    }
}
