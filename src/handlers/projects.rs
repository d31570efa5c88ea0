// region:    --- Imports
use super::extract::{ApiPath, ValidatedJson};
use crate::account::Buyer;
use crate::error::{AppError, AppResult};
use crate::project::commands;
use crate::project::model::{CreateProject, Project, ProjectDetail, ProjectWithBids, UpdateProject, UpdateStatus};
use crate::query::handlers;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Command Handlers

pub async fn handle_create_project(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
    ValidatedJson(req): ValidatedJson<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    info!("{:<12} --> create project {:?}", "HandlerProj", req.title);
    let project = commands::create_project(&state.db, ctx, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn handle_update_project(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateProject>,
) -> AppResult<Json<Project>> {
    Ok(Json(commands::update_project(&state.db, ctx, id, req).await?))
}

pub async fn handle_update_status(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateStatus>,
) -> AppResult<Json<Project>> {
    let project = commands::update_status(&state.db, state.notifier.clone(), ctx, id, req.status).await?;
    Ok(Json(project))
}

pub async fn handle_mark_complete(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Project>> {
    let project = commands::mark_complete(&state.db, state.notifier.clone(), ctx, id).await?;
    Ok(Json(project))
}

pub async fn handle_select_seller(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
    ApiPath((id, bid_id)): ApiPath<(Uuid, Uuid)>,
) -> AppResult<Json<ProjectDetail>> {
    info!("{:<12} --> select bid {} on {}", "HandlerProj", bid_id, id);
    let detail = commands::select_seller(&state.db, state.notifier.clone(), ctx, id, bid_id).await?;
    Ok(Json(detail))
}

pub async fn handle_delete_project(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Project>> {
    Ok(Json(commands::delete_project(&state.db, ctx, id).await?))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

pub async fn handle_get_buyer_projects(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
) -> AppResult<Json<Vec<ProjectWithBids>>> {
    let projects = handlers::get_buyer_projects_with_bids(&state.db, ctx.user_id).await?;
    Ok(Json(projects))
}

pub async fn handle_get_open_projects(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(handlers::get_open_projects(&state.db).await?))
}

pub async fn handle_get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ProjectDetail>> {
    handlers::get_project_detail(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Project not found"))
}

// endregion: --- Query Handlers
