/// Deliverable upload and lookup.
/// An accepted upload completes the project.
// region:    --- Imports
use super::model::Deliverable;
use super::upload::{object_name, DELIVERABLE_FOLDER};
use crate::account::AuthContext;
use crate::bidding::model::Bid;
use crate::database::DatabaseManager;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::message_broker::{notify_in_background, Notifier};
use crate::project::commands::{complete_project, completed_event, lock_project};
use crate::project::model::{Project, ProjectStatus};
use crate::query::handlers;
use crate::storage::{FileStorage, UploadedFile};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

const NOT_IN_PROGRESS: &str = "Project not in progress";
const NOT_YOUR_PROJECT: &str = "Not your project";

/// The project must be in progress and the caller must be its selected seller.
fn ensure_deliverable_allowed(project: Option<&Project>, bid: Option<&Bid>, ctx: &AuthContext) -> AppResult<()> {
    let Some(project) = project else {
        return Err(AppError::bad_request(NOT_IN_PROGRESS));
    };
    if project.status != ProjectStatus::InProgress {
        return Err(AppError::bad_request(NOT_IN_PROGRESS));
    }
    let Some(bid) = bid else {
        return Err(AppError::bad_request(NOT_IN_PROGRESS));
    };
    if bid.seller_id != ctx.user_id {
        return Err(AppError::forbidden(NOT_YOUR_PROJECT));
    }
    Ok(())
}

/// Store the archive, then record it and complete the project atomically.
pub async fn upload_deliverable(
    db_manager: &DatabaseManager,
    storage: &dyn FileStorage,
    notifier: Arc<dyn Notifier>,
    ctx: AuthContext,
    project_id: Uuid,
    file: UploadedFile,
) -> AppResult<Deliverable> {
    info!(
        "{:<12} --> deliverable for project {} ({} bytes)",
        "Command",
        project_id,
        file.bytes.len()
    );

    // cheap check before spending time on the upload
    let project = handlers::get_project(db_manager, project_id).await?;
    let bid = match project.as_ref().and_then(|p| p.selected_bid_id) {
        Some(bid_id) => handlers::get_bid(db_manager, bid_id).await?,
        None => None,
    };
    ensure_deliverable_allowed(project.as_ref(), bid.as_ref(), &ctx)?;

    let name = object_name(project_id, &file.file_name, Utc::now().timestamp_millis());
    let file_url = storage.store(DELIVERABLE_FOLDER, &name, file).await?;

    let url = file_url.clone();
    let recorded = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // state may have moved while the file was uploading
                let project = lock_project(&mut **tx, project_id).await?;
                let bid = match project.as_ref().and_then(|p| p.selected_bid_id) {
                    Some(bid_id) => {
                        sqlx::query_as::<_, Bid>(
                            "SELECT id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at
                             FROM bids WHERE id = $1",
                        )
                        .bind(bid_id)
                        .fetch_optional(&mut **tx)
                        .await?
                    }
                    None => None,
                };
                ensure_deliverable_allowed(project.as_ref(), bid.as_ref(), &ctx)?;
                let Some(project) = project else {
                    return Err(AppError::bad_request(NOT_IN_PROGRESS));
                };

                let deliverable = sqlx::query_as::<_, Deliverable>(
                    "INSERT INTO deliverables (id, project_id, file_url)
                     VALUES ($1, $2, $3)
                     RETURNING id, project_id, file_url, created_at",
                )
                .bind(Uuid::new_v4())
                .bind(project.id)
                .bind(&url)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::conflict("Deliverable already uploaded")
                    } else {
                        e.into()
                    }
                })?;

                let completed = complete_project(&mut **tx, &project).await?;
                Ok::<_, AppError>((deliverable, completed, bid.map(|b| b.seller_id)))
            })
        })
        .await;

    let (deliverable, completed, seller_id) = match recorded {
        Ok(recorded) => recorded,
        Err(e) => {
            if let Err(remove_err) = storage.remove(&file_url).await {
                warn!(
                    "{:<12} --> could not remove {} after failed upload: {}",
                    "Command", file_url, remove_err
                );
            }
            return Err(e);
        }
    };

    notify_in_background(notifier, completed_event(&completed, seller_id));
    info!(
        "{:<12} --> project {} completed by delivery",
        "Command", completed.id
    );

    Ok(deliverable)
}

/// The deliverable is visible to the owning buyer and the selected seller.
pub async fn get_deliverable(
    db_manager: &DatabaseManager,
    ctx: AuthContext,
    project_id: Uuid,
) -> AppResult<Deliverable> {
    let project = handlers::get_project(db_manager, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    let is_buyer = project.buyer_id == ctx.user_id;
    let is_seller = match project.selected_bid_id {
        Some(bid_id) => handlers::get_bid(db_manager, bid_id)
            .await?
            .is_some_and(|b| b.seller_id == ctx.user_id),
        None => false,
    };
    if !is_buyer && !is_seller {
        return Err(AppError::forbidden(NOT_YOUR_PROJECT));
    }

    handlers::get_project_deliverable(db_manager, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("No deliverable for this project"))
}
