/// Project lifecycle commands
/// 1. create / update / delete
/// 2. seller selection
/// 3. completion
// region:    --- Imports
use super::events::ProjectEvent;
use super::model::{check_budget, CreateProject, Project, ProjectDetail, ProjectStatus, UpdateProject};
use crate::account::AuthContext;
use crate::bidding::model::{Bid, BidStatus};
use crate::database::DatabaseManager;
use crate::error::{AppError, AppResult};
use crate::message_broker::{notify_in_background, Notifier};
use crate::query::{handlers, queries};
use chrono::Utc;
use sqlx::PgConnection;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Shared Steps
/// Lock a project row for the rest of the transaction.
pub(crate) async fn lock_project(conn: &mut PgConnection, project_id: Uuid) -> AppResult<Option<Project>> {
    Ok(sqlx::query_as::<_, Project>(queries::GET_PROJECT_FOR_UPDATE)
        .bind(project_id)
        .fetch_optional(conn)
        .await?)
}

pub(crate) fn ensure_owner(project: &Project, ctx: &AuthContext) -> AppResult<()> {
    if project.buyer_id != ctx.user_id {
        return Err(AppError::forbidden("Not your project"));
    }
    Ok(())
}

async fn lock_owned_project(conn: &mut PgConnection, ctx: &AuthContext, project_id: Uuid) -> AppResult<Project> {
    let project = lock_project(conn, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;
    ensure_owner(&project, ctx)?;
    Ok(project)
}

/// Mark an in-progress project and its selected bid completed.
pub(crate) async fn complete_project(conn: &mut PgConnection, project: &Project) -> AppResult<Project> {
    let completed = sqlx::query_as::<_, Project>(
        "UPDATE projects SET status = $1, updated_at = NOW() WHERE id = $2
         RETURNING id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at",
    )
    .bind(ProjectStatus::Completed)
    .bind(project.id)
    .fetch_one(&mut *conn)
    .await?;

    if let Some(bid_id) = project.selected_bid_id {
        sqlx::query("UPDATE bids SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(BidStatus::Completed)
            .bind(bid_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(completed)
}

/// Seller of the selected bid, for notifications.
async fn selected_seller(db_manager: &DatabaseManager, project: &Project) -> AppResult<Option<Uuid>> {
    let Some(bid_id) = project.selected_bid_id else {
        return Ok(None);
    };
    Ok(handlers::get_bid(db_manager, bid_id).await?.map(|b| b.seller_id))
}

pub(crate) fn completed_event(project: &Project, seller_id: Option<Uuid>) -> ProjectEvent {
    ProjectEvent::ProjectCompleted {
        project_id: project.id,
        buyer_id: project.buyer_id,
        seller_id,
        timestamp: Utc::now(),
    }
}
// endregion: --- Shared Steps

// region:    --- Commands
pub async fn create_project(db_manager: &DatabaseManager, ctx: AuthContext, req: CreateProject) -> AppResult<Project> {
    info!("{:<12} --> create project for buyer {}", "Command", ctx.user_id);

    let project = sqlx::query_as::<_, Project>(
        "INSERT INTO projects (id, title, description, budget_min, budget_max, deadline, status, buyer_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.budget_min)
    .bind(req.budget_max)
    .bind(req.deadline)
    .bind(ProjectStatus::Pending)
    .bind(ctx.user_id)
    .fetch_one(db_manager.pool())
    .await?;

    Ok(project)
}

pub async fn update_project(
    db_manager: &DatabaseManager,
    ctx: AuthContext,
    project_id: Uuid,
    update: UpdateProject,
) -> AppResult<Project> {
    info!("{:<12} --> update project {}", "Command", project_id);
    if update.is_empty() {
        return Err(AppError::bad_request("No fields provided to update"));
    }

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let mut project = lock_owned_project(&mut **tx, &ctx, project_id).await?;
                update.apply_to(&mut project);
                check_budget(project.budget_min, project.budget_max)
                    .map_err(|e| AppError::field("budgetMax", e))?;

                let updated = sqlx::query_as::<_, Project>(
                    "UPDATE projects
                     SET title = $1, description = $2, budget_min = $3, budget_max = $4, deadline = $5, updated_at = NOW()
                     WHERE id = $6
                     RETURNING id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at",
                )
                .bind(&project.title)
                .bind(&project.description)
                .bind(project.budget_min)
                .bind(project.budget_max)
                .bind(project.deadline)
                .bind(project.id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(updated)
            })
        })
        .await
}

/// Status writes follow the lifecycle. Re-setting the current status is a no-op.
pub async fn update_status(
    db_manager: &DatabaseManager,
    notifier: Arc<dyn Notifier>,
    ctx: AuthContext,
    project_id: Uuid,
    status: ProjectStatus,
) -> AppResult<Project> {
    info!("{:<12} --> set project {} to {:?}", "Command", project_id, status);

    let project = handlers::get_project(db_manager, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;
    ensure_owner(&project, &ctx)?;

    if project.status == status {
        return Ok(project);
    }

    // selection is the only way into IN_PROGRESS
    match status {
        ProjectStatus::Completed if project.status.can_transition_to(status) => {
            mark_complete(db_manager, notifier, ctx, project_id).await
        }
        _ => Err(AppError::bad_request("Invalid status transition")),
    }
}

/// Buyer closes an in-progress project without a deliverable upload.
pub async fn mark_complete(
    db_manager: &DatabaseManager,
    notifier: Arc<dyn Notifier>,
    ctx: AuthContext,
    project_id: Uuid,
) -> AppResult<Project> {
    info!("{:<12} --> complete project {}", "Command", project_id);

    let completed = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let project = lock_owned_project(&mut **tx, &ctx, project_id).await?;
                if project.status != ProjectStatus::InProgress {
                    return Err(AppError::bad_request("Project not in progress"));
                }
                complete_project(&mut **tx, &project).await
            })
        })
        .await?;

    let seller_id = selected_seller(db_manager, &completed).await?;
    notify_in_background(notifier, completed_event(&completed, seller_id));

    Ok(completed)
}

/// Bind one bid to a pending project and start work.
pub async fn select_seller(
    db_manager: &DatabaseManager,
    notifier: Arc<dyn Notifier>,
    ctx: AuthContext,
    project_id: Uuid,
    bid_id: Uuid,
) -> AppResult<ProjectDetail> {
    info!(
        "{:<12} --> select bid {} for project {}",
        "Command", bid_id, project_id
    );

    let (project, bid) = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let project = lock_owned_project(&mut **tx, &ctx, project_id).await?;
                if project.status != ProjectStatus::Pending {
                    return Err(AppError::bad_request("Project is not open for selection"));
                }

                let bid = sqlx::query_as::<_, Bid>(
                    "SELECT id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at
                     FROM bids WHERE id = $1 AND project_id = $2 FOR UPDATE",
                )
                .bind(bid_id)
                .bind(project_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(|| AppError::not_found("Bid not found for this project"))?;

                if bid.status != BidStatus::Pending {
                    return Err(AppError::bad_request("Bid is no longer pending"));
                }

                sqlx::query(
                    "UPDATE projects SET selected_bid_id = $1, status = $2, updated_at = NOW() WHERE id = $3",
                )
                .bind(bid.id)
                .bind(ProjectStatus::InProgress)
                .bind(project.id)
                .execute(&mut **tx)
                .await?;

                sqlx::query("UPDATE bids SET status = $1, updated_at = NOW() WHERE id = $2")
                    .bind(BidStatus::InProgress)
                    .bind(bid.id)
                    .execute(&mut **tx)
                    .await?;

                let cancelled = sqlx::query(
                    "UPDATE bids SET status = $1, updated_at = NOW()
                     WHERE project_id = $2 AND id <> $3 AND status = $4",
                )
                .bind(BidStatus::Cancelled)
                .bind(project.id)
                .bind(bid.id)
                .bind(BidStatus::Pending)
                .execute(&mut **tx)
                .await?;
                info!(
                    "{:<12} --> cancelled {} competing bids",
                    "Command",
                    cancelled.rows_affected()
                );

                Ok::<_, AppError>((project, bid))
            })
        })
        .await?;

    notify_in_background(
        notifier,
        ProjectEvent::SellerSelected {
            project_id: project.id,
            bid_id: bid.id,
            buyer_id: project.buyer_id,
            seller_id: bid.seller_id,
            timestamp: Utc::now(),
        },
    );

    handlers::get_project_detail(db_manager, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))
}

/// Hard delete; bids, deliverable and review go with it.
pub async fn delete_project(db_manager: &DatabaseManager, ctx: AuthContext, project_id: Uuid) -> AppResult<Project> {
    info!("{:<12} --> delete project {}", "Command", project_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let project = lock_owned_project(&mut **tx, &ctx, project_id).await?;
                sqlx::query("DELETE FROM projects WHERE id = $1")
                    .bind(project.id)
                    .execute(&mut **tx)
                    .await?;
                Ok(project)
            })
        })
        .await
}
// endregion: --- Commands
