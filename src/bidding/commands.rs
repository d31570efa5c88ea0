/// Bid commands
/// 1. submit
/// 2. revise
/// 3. withdraw
// region:    --- Imports
use super::model::{Bid, BidStatus, CreateBid, UpdateBid};
use crate::account::AuthContext;
use crate::database::DatabaseManager;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::project::model::{Project, ProjectStatus};
use crate::query::{handlers, queries};
use sqlx::PgConnection;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

/// Load a bid the caller may still change: it must exist, be theirs, and be pending.
async fn lock_own_pending_bid(conn: &mut PgConnection, ctx: &AuthContext, bid_id: Uuid) -> AppResult<Bid> {
    let bid = sqlx::query_as::<_, Bid>(
        "SELECT id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at
         FROM bids WHERE id = $1 FOR UPDATE",
    )
    .bind(bid_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::not_found("Bid not found"))?;

    if bid.seller_id != ctx.user_id {
        warn!(
            "{:<12} --> seller {} touched bid {} of another seller",
            "Command", ctx.user_id, bid_id
        );
        return Err(AppError::forbidden("Not your bid"));
    }
    if bid.status != BidStatus::Pending {
        return Err(AppError::bad_request("Bid can no longer be changed"));
    }
    Ok(bid)
}

/// 1. Submit a bid on an open project. One bid per seller per project.
pub async fn create_bid(db_manager: &DatabaseManager, ctx: AuthContext, req: CreateBid) -> AppResult<Bid> {
    info!(
        "{:<12} --> bid {} on project {} by {}",
        "Command", req.amount, req.project_id, ctx.user_id
    );

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // selection holds FOR UPDATE on the project row
                let project = sqlx::query_as::<_, Project>(queries::GET_PROJECT_FOR_SHARE)
                    .bind(req.project_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or_else(|| AppError::not_found("Project not found"))?;
                if project.status != ProjectStatus::Pending {
                    return Err(AppError::bad_request("Project is not open for bids"));
                }

                sqlx::query_as::<_, Bid>(
                    "INSERT INTO bids (id, project_id, seller_id, amount, estimated_time, message, status)
                     VALUES ($1, $2, $3, $4, $5, $6, $7)
                     RETURNING id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at",
                )
                .bind(Uuid::new_v4())
                .bind(project.id)
                .bind(ctx.user_id)
                .bind(req.amount)
                .bind(req.estimated_time.trim())
                .bind(&req.message)
                .bind(BidStatus::Pending)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::conflict("You have already bid on this project")
                    } else {
                        e.into()
                    }
                })
            })
        })
        .await
}

/// 2. Revise a pending bid; absent fields keep their value.
pub async fn update_bid(
    db_manager: &DatabaseManager,
    ctx: AuthContext,
    bid_id: Uuid,
    update: UpdateBid,
) -> AppResult<Bid> {
    info!("{:<12} --> update bid {}", "Command", bid_id);
    if update.is_empty() {
        return Err(AppError::bad_request("No fields provided to update"));
    }

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let bid = lock_own_pending_bid(&mut **tx, &ctx, bid_id).await?;

                let updated = sqlx::query_as::<_, Bid>(
                    "UPDATE bids SET amount = $1, estimated_time = $2, message = $3, updated_at = NOW()
                     WHERE id = $4
                     RETURNING id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at",
                )
                .bind(update.amount.unwrap_or(bid.amount))
                .bind(
                    update
                        .estimated_time
                        .map(|t| t.trim().to_string())
                        .unwrap_or(bid.estimated_time),
                )
                .bind(update.message.unwrap_or(bid.message))
                .bind(bid.id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(updated)
            })
        })
        .await
}

/// 3. Withdraw (delete) a pending bid, returning it.
pub async fn withdraw_bid(db_manager: &DatabaseManager, ctx: AuthContext, bid_id: Uuid) -> AppResult<Bid> {
    info!("{:<12} --> withdraw bid {}", "Command", bid_id);

    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let bid = lock_own_pending_bid(&mut **tx, &ctx, bid_id).await?;
                sqlx::query("DELETE FROM bids WHERE id = $1")
                    .bind(bid.id)
                    .execute(&mut **tx)
                    .await?;
                Ok(bid)
            })
        })
        .await
}

/// Public lookup of a single bid.
pub async fn get_bid(db_manager: &DatabaseManager, bid_id: Uuid) -> AppResult<Bid> {
    handlers::get_bid(db_manager, bid_id)
        .await?
        .ok_or_else(|| AppError::not_found("Bid not found"))
}
