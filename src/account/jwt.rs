use super::model::Role;
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

/// Longest token lifetime accepted from configuration.
pub const MAX_TOKEN_DAYS: i64 = 365;

/// Signs and verifies HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, expires_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in: Duration::days(expires_days.clamp(-MAX_TOKEN_DAYS, MAX_TOKEN_DAYS)),
        }
    }

    pub fn sign(&self, user_id: Uuid, role: Role) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.expires_in)
            .ok_or_else(|| AppError::internal("failed to calculate token expiration"))?;

        let claims = Claims {
            user_id,
            role,
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthenticated("Invalid token".to_string()))
    }
}
