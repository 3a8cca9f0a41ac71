use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::{token_service::TokenServiceError, user_service::UserServiceError};

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Transport-agnostic outcome kinds shared by every domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input
    Invalid,
    /// Uniqueness violation
    Conflict,
    /// No matching record
    NotFound,
    /// Credential or login not recognized
    Unauthorized,
    /// Storage or signing backend failure
    Unavailable,
}

/// Errors that reach the HTTP boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request could not be decoded (bad JSON, bad path parameter)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or rejected bearer token
    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    User(#[from] UserServiceError),

    #[error(transparent)]
    Token(#[from] TokenServiceError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BadRequest(_) => ErrorKind::Invalid,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::User(e) => e.kind(),
            AppError::Token(e) => e.kind(),
        }
    }
}

/// The only place where outcome kinds become HTTP statuses.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        let message = if kind == ErrorKind::Unavailable {
            // Backend details stay in the log
            tracing::error!(error = %self, "request failed on backend");
            "Service unavailable".to_string()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::RepositoryError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Invalid), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(ErrorKind::Unavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_user_errors_map_through_kind() {
        let err: AppError = UserServiceError::LoginTaken.into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let err: AppError = UserServiceError::UserNotFound.into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err: AppError = UserServiceError::EmptyLogin.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err: AppError = UserServiceError::Repository(RepositoryError::NotPersisted).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_token_errors_map_through_kind() {
        let err: AppError = TokenServiceError::InvalidCredentials.into();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);

        let err: AppError = TokenServiceError::Signing("bad key".to_string()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_request_errors() {
        let err = AppError::BadRequest("invalid id".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = AppError::Unauthorized("missing token".to_string());
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
