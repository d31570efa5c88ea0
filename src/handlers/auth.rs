// region:    --- Imports
use super::extract::ValidatedJson;
use crate::account::commands::{self, CurrentUser};
use crate::account::model::{AuthResponse, LoginRequest, RegisterRequest};
use crate::account::AnyUser;
use crate::error::AppResult;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

// endregion: --- Imports

pub async fn handle_register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    info!("{:<12} --> register", "HandlerAuth");
    let response = commands::register(&state.db, &state.tokens, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn handle_login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    info!("{:<12} --> login", "HandlerAuth");
    Ok(Json(commands::login(&state.db, &state.tokens, req).await?))
}

pub async fn handle_current_user(
    State(state): State<AppState>,
    AnyUser(ctx): AnyUser,
) -> AppResult<Json<CurrentUser>> {
    Ok(Json(commands::current_user(&state.db, ctx).await?))
}
