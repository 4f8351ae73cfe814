use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use validator::ValidationErrors;

/// Underlying cause carried by [`UserError::Conflict`] and [`UserError::NotFound`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("User with email '{email}' already exists")]
    Conflict { email: String, source: BoxError },

    #[error("No active user with email '{email}'")]
    NotFound { email: String, source: BoxError },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome category of a [`UserError`], for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    Conflict,
    NotFound,
    Internal,
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn conflict(email: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        UserError::Conflict {
            email: email.into(),
            source: cause.into(),
        }
    }

    pub fn not_found(email: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        UserError::NotFound {
            email: email.into(),
            source: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UserError::Validation(_) | UserError::InvalidFilter(_) => ErrorKind::BadInput,
            UserError::Conflict { .. } => ErrorKind::Conflict,
            UserError::NotFound { .. } => ErrorKind::NotFound,
            UserError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        UserError::Validation(errors.to_string())
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => AppError::Validation(msg),
            UserError::InvalidFilter(msg) => AppError::InvalidQuery(msg),
            UserError::Conflict { email, source } => {
                tracing::debug!(%email, cause = %source, "Create rejected");
                AppError::Conflict(format!("User with email '{}' already exists", email))
            }
            UserError::NotFound { email, .. } => {
                AppError::NotFound(format!("User {} not found", email))
            }
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
