use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use buildtrack_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `buildtrack_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request (unparseable body, bad multipart stream).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(fields) => {
                    let body = json!({
                        "error": fields.to_string(),
                        "code": "VALIDATION_ERROR",
                        "fields": fields,
                    });
                    return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Integrity(msg) => {
                    (StatusCode::CONFLICT, "INTEGRITY_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Map a sqlx error to status, code and client-facing message.
///
/// Unique violations on a named `uq_*` constraint are plain conflicts.
/// Other foreign-key, unique and check violations are integrity errors.
/// A value outside its column's numeric range is a 422. Anything else is
/// logged and reported as a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        other => {
            tracing::error!(error = %other, "Database error");
            return internal();
        }
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match classify_db_code(db_err.code().as_deref(), constraint) {
        Some(classified) => classified,
        None => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}

/// Status, code and message for a Postgres SQLSTATE, or `None` when the
/// error is not the client's to fix.
fn classify_db_code(
    code: Option<&str>,
    constraint: &str,
) -> Option<(StatusCode, &'static str, String)> {
    let classified = match code {
        Some("22003") => {
            tracing::warn!(code = "22003", "Numeric value out of range");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                "A numeric value is out of range.".to_string(),
            )
        }
        Some("23505") if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            integrity_message("23505", constraint),
        ),
        Some(code @ ("23503" | "23505" | "23514")) => {
            tracing::warn!(code, constraint, "Integrity violation");
            (
                StatusCode::CONFLICT,
                "INTEGRITY_ERROR",
                integrity_message(code, constraint),
            )
        }
        _ => return None,
    };
    Some(classified)
}

/// Readable message for a violated constraint, with a generic fallback
/// naming the constraint.
fn integrity_message(code: &str, constraint: &str) -> String {
    let known = match constraint {
        "uq_roles_name" => Some("A role with this name already exists."),
        "uq_users_email" => Some("A user with this email already exists."),
        "users_role_id_fkey" => Some("The role is still assigned to users."),
        c if c.ends_with("created_by_fkey")
            || c.ends_with("uploaded_by_fkey")
            || c.ends_with("generated_by_fkey") =>
        {
            Some("The user does not exist or is still referenced by project records.")
        }
        _ => None,
    };
    if let Some(message) = known {
        return message.to_string();
    }

    match code {
        "23503" => format!("Referenced record is missing or still in use: {constraint}"),
        "23505" => format!("Duplicate value violates unique constraint: {constraint}"),
        _ => format!("Value violates check constraint: {constraint}"),
    }
}
