use crate::error::{AppError, AppResult};
use bcrypt::{hash, verify, DEFAULT_COST};
use tokio::task;

/// Hash on the blocking pool.
pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_owned();
    task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::internal(format!("hash task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("failed to hash password: {e}")))
}

pub async fn verify_password(password: &str, hashed: &str) -> AppResult<bool> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    task::spawn_blocking(move || verify(password, &hashed))
        .await
        .map_err(|e| AppError::internal(format!("verify task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("failed to verify password: {e}")))
}
