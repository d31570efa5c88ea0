// region:    --- Imports
use super::extract::{ApiPath, ValidatedJson};
use crate::account::Seller;
use crate::bidding::commands;
use crate::bidding::model::{Bid, BidWithProject, CreateBid, UpdateBid};
use crate::error::AppResult;
use crate::query::handlers;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

pub async fn handle_create_bid(
    State(state): State<AppState>,
    Seller(ctx): Seller,
    ValidatedJson(req): ValidatedJson<CreateBid>,
) -> AppResult<(StatusCode, Json<Bid>)> {
    info!("{:<12} --> bid on project {}", "HandlerBid", req.project_id);
    let bid = commands::create_bid(&state.db, ctx, req).await?;
    Ok((StatusCode::CREATED, Json(bid)))
}

pub async fn handle_update_bid(
    State(state): State<AppState>,
    Seller(ctx): Seller,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateBid>,
) -> AppResult<Json<Bid>> {
    Ok(Json(commands::update_bid(&state.db, ctx, id, req).await?))
}

pub async fn handle_withdraw_bid(
    State(state): State<AppState>,
    Seller(ctx): Seller,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Bid>> {
    Ok(Json(commands::withdraw_bid(&state.db, ctx, id).await?))
}

pub async fn handle_get_bid(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<Bid>> {
    Ok(Json(commands::get_bid(&state.db, id).await?))
}

pub async fn handle_get_project_bids(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> AppResult<Json<Vec<Bid>>> {
    Ok(Json(handlers::get_project_bids(&state.db, project_id).await?))
}

pub async fn handle_get_my_bids(
    State(state): State<AppState>,
    Seller(ctx): Seller,
) -> AppResult<Json<Vec<BidWithProject>>> {
    Ok(Json(handlers::get_seller_bids(&state.db, ctx.user_id).await?))
}
