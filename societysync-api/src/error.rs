/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers should return `Result<T, ApiError>` which automatically
/// converts to appropriate HTTP status codes.
///
/// # Example
///
/// ```ignore
/// use societysync_api::error::ApiResult;
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let data = fetch_data().await?;
///     Ok(Json(json!({ "data": data })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate vote, already paid bill
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Builds a validation error from `validator` field errors
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Maps a recognized constraint violation to an API error
///
/// Constraint names are matched to pick a message but never echoed to the
/// client. Returns `None` for anything that isn't a violation, which the
/// `From<sqlx::Error>` impl treats as internal.
fn violation_error(kind: sqlx::error::ErrorKind, constraint: Option<&str>) -> Option<ApiError> {
    use sqlx::error::ErrorKind;

    match kind {
        ErrorKind::UniqueViolation => {
            if constraint.map_or(false, |c| c.contains("username")) {
                Some(ApiError::Conflict("Username already exists".to_string()))
            } else {
                Some(ApiError::Conflict("Resource already exists".to_string()))
            }
        }
        ErrorKind::ForeignKeyViolation => Some(ApiError::BadRequest(
            "Referenced record does not exist".to_string(),
        )),
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            Some(ApiError::BadRequest("Invalid field value".to_string()))
        }
        _ => None,
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(api_err) = violation_error(db_err.kind(), db_err.constraint()) {
                    return api_err;
                }

                // Other database errors are internal
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth errors to API errors
impl From<societysync_shared::auth::middleware::AuthError> for ApiError {
    fn from(err: societysync_shared::auth::middleware::AuthError) -> Self {
        use societysync_shared::auth::middleware::AuthError;

        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
            AuthError::RoleRequired { required } => {
                ApiError::Forbidden(format!("Requires {} role", required))
            }
        }
    }
}

/// Convert user errors to API errors
impl From<societysync_shared::models::user::UserError> for ApiError {
    fn from(err: societysync_shared::models::user::UserError) -> Self {
        use societysync_shared::models::user::UserError;

        match err {
            UserError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            UserError::Database(e) => ApiError::from(e),
        }
    }
}

/// Convert poll errors to API errors
impl From<societysync_shared::models::poll::PollError> for ApiError {
    fn from(err: societysync_shared::models::poll::PollError) -> Self {
        use societysync_shared::models::poll::PollError;

        match err {
            PollError::NotEnoughOptions => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "options".to_string(),
                message: err.to_string(),
            }]),
            PollError::PollNotFound => ApiError::NotFound("Poll not found".to_string()),
            PollError::PollClosed => ApiError::Conflict("Poll is closed".to_string()),
            PollError::AlreadyVoted => {
                ApiError::Conflict("You have already voted in this poll".to_string())
            }
            PollError::OptionMismatch => {
                ApiError::BadRequest("Option does not belong to this poll".to_string())
            }
            PollError::Database(e) => ApiError::from(e),
        }
    }
}

/// Convert catalog errors to API errors
impl From<societysync_shared::db::catalog::CatalogError> for ApiError {
    fn from(err: societysync_shared::db::catalog::CatalogError) -> Self {
        use societysync_shared::db::catalog::CatalogError;

        match err {
            CatalogError::UnknownTable(name) => {
                ApiError::NotFound(format!("Unknown table: {}", name))
            }
            CatalogError::Database(e) => ApiError::from(e),
        }
    }
}

/// Convert password errors to API errors
impl From<societysync_shared::auth::password::PasswordError> for ApiError {
    fn from(err: societysync_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<societysync_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: societysync_shared::auth::jwt::JwtError) -> Self {
        use societysync_shared::auth::jwt::JwtError;

        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use societysync_shared::models::poll::PollError;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Bill not found".to_string());
        assert_eq!(err.to_string(), "Not found: Bill not found");
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            },
            ValidationErrorDetail {
                field: "amount".to_string(),
                message: "Amount must be positive".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_double_vote_maps_to_conflict() {
        let err = ApiError::from(PollError::AlreadyVoted);
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_username_collision_maps_to_conflict() {
        use sqlx::error::ErrorKind;

        let err = violation_error(ErrorKind::UniqueViolation, Some("users_username_key"));
        assert!(matches!(err, Some(ApiError::Conflict(msg)) if msg == "Username already exists"));
    }

    #[test]
    fn test_foreign_key_violation_is_bad_request() {
        use sqlx::error::ErrorKind;

        let err = violation_error(ErrorKind::ForeignKeyViolation, Some("votes_option_id_fkey"));
        match err {
            Some(ApiError::BadRequest(msg)) => {
                // Constraint names stay out of client-facing messages
                assert!(!msg.contains("fkey"));
                assert!(!msg.contains("votes_option_id"));
            }
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_kind_falls_through() {
        use sqlx::error::ErrorKind;

        assert!(violation_error(ErrorKind::Other, None).is_none());
    }
}
