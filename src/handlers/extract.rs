// region:    --- Imports
use crate::error::{AppError, FieldError};
use async_trait::async_trait;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

// endregion: --- Imports

/// JSON body that has passed its `validator` rules.
///
/// Malformed JSON or a wrong content type is a plain 400. A body that parses
/// but does not fit `T` is reported per field, like any other validation error.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::bad_request(rejection.body_text()))?;

        let value = deserialize_fields::<T>(raw)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Deserialize `raw`, naming the offending field on failure.
pub fn deserialize_fields<T: DeserializeOwned>(raw: Value) -> Result<T, AppError> {
    serde_path_to_error::deserialize(raw).map_err(|err| {
        let path = err.path().to_string();
        let message = err.inner().to_string();
        let field = if path == "." {
            missing_field(&message).unwrap_or("body").to_string()
        } else {
            path
        };
        AppError::Validation(vec![FieldError { field, message }])
    })
}

/// serde reports an absent field at the root as "missing field `name`".
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

/// Path parameters; a malformed id is a 400 rather than axum's plain-text rejection.
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| AppError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}
