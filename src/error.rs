// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use heck::ToLowerCamelCase;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::{ValidationError, ValidationErrors};

// endregion: --- Imports

// region:    --- App Error
/// A single rejected request field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation Error")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Server error")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A single failed check attributed to one body field.
    pub fn field(field: &str, err: ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{field} is invalid ({})", err.code));
        Self::Validation(vec![FieldError {
            field: field.to_string(),
            message,
        }])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unique violations surface as `Conflict` only where the caller maps them.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::not_found("Not found"),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = json_field_name(&field);
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid ({})", e.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(fields)
    }
}

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request bodies are camelCase; struct-level checks report against the body.
fn json_field_name(field: &str) -> String {
    if field == "__all__" {
        return "body".to_string();
    }
    field.to_lower_camel_case()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Validation(errors) => serde_json::json!({
                "message": self.to_string(),
                "errors": errors,
            }),
            AppError::Internal(detail) => {
                error!("{:<12} --> internal error: {}", "Error", detail);
                serde_json::json!({ "message": self.to_string() })
            }
            _ => serde_json::json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
// endregion: --- App Error

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
        rating: i32,
        #[validate(length(min = 1))]
        review: String,
    }

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = AppError::internal("connection refused on 10.0.0.3");
        assert_eq!(err.to_string(), "Server error");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn blank_strings_fail_non_blank() {
        assert!(non_blank("Logo").is_ok());
        assert!(non_blank("  x ").is_ok());
        assert!(non_blank("").is_err());
        assert!(non_blank(" \n\t ").is_err());
    }

    #[test]
    fn field_names_are_camel_cased() {
        assert_eq!(json_field_name("budget_min"), "budgetMin");
        assert_eq!(json_field_name("rating"), "rating");
        assert_eq!(json_field_name("__all__"), "body");
    }

    #[test]
    fn validation_errors_are_listed_per_field() {
        let sample = Sample {
            rating: 9,
            review: String::new(),
        };
        let err: AppError = sample.validate().unwrap_err().into();

        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "rating");
        assert_eq!(fields[0].message, "rating must be between 1 and 5");
        assert_eq!(fields[1].field, "review");
    }
}
