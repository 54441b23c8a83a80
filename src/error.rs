use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Domain error taxonomy. Every handler returns this; the
/// `IntoResponse` impl is the single place status codes are decided.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Covers both true absence and records owned by another user, so
    /// callers cannot probe for other users' data.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(String),

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            error!(error = %e, "internal error");
        }
        (self.status(), self.to_string()).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            // Pre-checks give the friendly message; the constraint is the
            // source of truth under concurrent writers.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("Resource already exists".into())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::Conflict("Resource is referenced by other records".into())
            }
            _ => ApiError::Internal(e.into()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("Meal").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Auth("nope".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(ApiError::not_found("Food entry").to_string(), "Food entry not found");
    }

    #[test]
    fn internal_error_hides_the_cause() {
        let e = ApiError::Internal(anyhow::anyhow!("connection refused"));
        assert_eq!(e.to_string(), "Internal server error");
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let e: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(e.status(), StatusCode::NOT_FOUND);
    }
}
