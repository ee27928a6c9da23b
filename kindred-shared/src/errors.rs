use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: Profile, feed and like errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    BadRequest,
    Conflict,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    UsernameTaken,
    MissingSessionToken,

    // Profiles & likes (E2xxx)
    ProfileNotFound,
    CannotActOnSelf,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::BadRequest => "E0008",
            Self::Conflict => "E0010",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::UsernameTaken => "E1003",
            Self::MissingSessionToken => "E1004",

            // Profiles & likes
            Self::ProfileNotFound => "E2001",
            Self::CannotActOnSelf => "E2002",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::MissingSessionToken
            | Self::CannotActOnSelf => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Conflict | Self::EmailAlreadyExists | Self::UsernameTaken => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Stable code this error is reported under.
    ///
    /// Unique violations that slipped past the pre-checks surface as `Conflict`;
    /// every other storage failure is `InternalError`.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            AppError::Database(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => ErrorCode::Conflict,
            AppError::Database(_) => ErrorCode::InternalError,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let error_response = match &self {
            AppError::Known { code, message, details } => {
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                resp
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                ApiErrorResponse::new(code.code(), "internal server error")
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                let message = match code {
                    ErrorCode::NotFound => "resource not found",
                    ErrorCode::Conflict => "resource already exists",
                    _ => "database error",
                };
                ApiErrorResponse::new(code.code(), message)
            }
            AppError::Validation(msg) => ApiErrorResponse::new(code.code(), msg),
        };

        (code.status_code(), Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = AppError::Database(diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("UNIQUE constraint failed: likes.liker_id, likes.target_id".to_string()),
        ));
        assert_eq!(err.error_code(), ErrorCode::Conflict);
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_database_failure_is_internal() {
        let err = AppError::Database(diesel::result::Error::RollbackTransaction);
        assert_eq!(err.error_code(), ErrorCode::InternalError);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn known_codes_keep_their_status() {
        let err = AppError::new(ErrorCode::CannotActOnSelf, "cannot act on self");
        assert_eq!(err.error_code().code(), "E2002");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = AppError::new(ErrorCode::ProfileNotFound, "target profile not found or inactive");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
