// region:    --- Imports
use super::model::{Review, ReviewWithProject, SubmitReview};
use crate::account::AuthContext;
use crate::database::DatabaseManager;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::project::commands::ensure_owner;
use crate::project::model::ProjectStatus;
use crate::query::handlers;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

/// Buyer rates the seller of a completed project, once.
pub async fn submit_review(
    db_manager: &DatabaseManager,
    ctx: AuthContext,
    project_id: Uuid,
    req: SubmitReview,
) -> AppResult<Review> {
    info!(
        "{:<12} --> review {} for project {}",
        "Command", req.rating, project_id
    );

    let project = handlers::get_project(db_manager, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;
    ensure_owner(&project, &ctx)?;
    if project.status != ProjectStatus::Completed {
        return Err(AppError::bad_request("Project is not completed"));
    }

    sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (id, project_id, rating, review)
         VALUES ($1, $2, $3, $4)
         RETURNING id, project_id, rating, review, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(project.id)
    .bind(req.rating)
    .bind(req.review.trim())
    .fetch_one(db_manager.pool())
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict("Project already reviewed")
        } else {
            e.into()
        }
    })
}

pub async fn list_seller_reviews(
    db_manager: &DatabaseManager,
    seller_id: Uuid,
) -> AppResult<Vec<ReviewWithProject>> {
    Ok(handlers::get_seller_reviews(db_manager, seller_id).await?)
}
