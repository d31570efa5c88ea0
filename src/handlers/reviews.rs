use super::extract::{ApiPath, ValidatedJson};
use crate::account::Buyer;
use crate::error::AppResult;
use crate::review::commands;
use crate::review::model::{Review, ReviewWithProject, SubmitReview};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

pub async fn handle_submit_review(
    State(state): State<AppState>,
    Buyer(ctx): Buyer,
    ApiPath(project_id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<SubmitReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = commands::submit_review(&state.db, ctx, project_id, req).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn handle_get_seller_reviews(
    State(state): State<AppState>,
    ApiPath(seller_id): ApiPath<Uuid>,
) -> AppResult<Json<Vec<ReviewWithProject>>> {
    Ok(Json(commands::list_seller_reviews(&state.db, seller_id).await?))
}
