// region:    --- Imports
use super::jwt::TokenIssuer;
use super::model::Role;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Auth Context
/// The authenticated caller, handed explicitly to every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

/// Validate the raw `Authorization` value and check the caller's role.
///
/// The token is expected bare; a `Bearer ` prefix is accepted as well.
/// An empty `allowed` set admits every role.
pub fn authenticate(
    tokens: &TokenIssuer,
    header: Option<&str>,
    allowed: &[Role],
) -> AppResult<AuthContext> {
    let raw = header
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Unauthenticated".to_string()))?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

    let claims = tokens.verify(token)?;

    if !allowed.is_empty() && !allowed.contains(&claims.role) {
        return Err(AppError::forbidden("Forbidden"));
    }

    Ok(AuthContext {
        user_id: claims.user_id,
        role: claims.role,
    })
}

fn authenticate_parts(parts: &Parts, state: &AppState, allowed: &[Role]) -> AppResult<AuthContext> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    authenticate(&state.tokens, header, allowed)
}
// endregion: --- Auth Context

// region:    --- Extractors
/// Any signed-in user.
pub struct AnyUser(pub AuthContext);

/// A signed-in buyer.
pub struct Buyer(pub AuthContext);

/// A signed-in seller.
pub struct Seller(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for AnyUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, &[Role::Buyer, Role::Seller]).map(AnyUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Buyer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, &[Role::Buyer]).map(Buyer)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Seller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, &[Role::Seller]).map(Seller)
    }
}
// endregion: --- Extractors
