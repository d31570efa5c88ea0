// region:    --- Imports
use super::queries;
use crate::account::model::{User, UserProfile};
use crate::bidding::model::{Bid, BidWithProject, BidWithSeller};
use crate::database::DatabaseManager;
use crate::delivery::model::Deliverable;
use crate::project::model::{Project, ProjectDetail, ProjectWithBids};
use crate::review::model::{Review, ReviewWithProject};
use sqlx::Error as SqlxError;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Users

pub async fn get_user(db_manager: &DatabaseManager, user_id: Uuid) -> Result<Option<User>, SqlxError> {
    info!("{:<12} --> user id: {}", "Query", user_id);
    sqlx::query_as::<_, User>(queries::GET_USER_BY_ID)
        .bind(user_id)
        .fetch_optional(db_manager.pool())
        .await
}

pub async fn get_user_by_email(
    db_manager: &DatabaseManager,
    email: &str,
) -> Result<Option<User>, SqlxError> {
    info!("{:<12} --> user by email", "Query");
    sqlx::query_as::<_, User>(queries::GET_USER_BY_EMAIL)
        .bind(email)
        .fetch_optional(db_manager.pool())
        .await
}

pub async fn email_exists(db_manager: &DatabaseManager, email: &str) -> Result<bool, SqlxError> {
    sqlx::query_scalar::<_, bool>(queries::USER_EMAIL_EXISTS)
        .bind(email)
        .fetch_one(db_manager.pool())
        .await
}

async fn get_profiles(
    db_manager: &DatabaseManager,
    user_ids: &[Uuid],
) -> Result<HashMap<Uuid, UserProfile>, SqlxError> {
    let profiles = sqlx::query_as::<_, UserProfile>(queries::GET_PROFILES)
        .bind(user_ids)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
}

// endregion: --- Users

// region:    --- Projects

pub async fn get_project(
    db_manager: &DatabaseManager,
    project_id: Uuid,
) -> Result<Option<Project>, SqlxError> {
    info!("{:<12} --> project id: {}", "Query", project_id);
    sqlx::query_as::<_, Project>(queries::GET_PROJECT)
        .bind(project_id)
        .fetch_optional(db_manager.pool())
        .await
}

/// Pending projects, open to bids.
pub async fn get_open_projects(db_manager: &DatabaseManager) -> Result<Vec<Project>, SqlxError> {
    info!("{:<12} --> open projects", "Query");
    sqlx::query_as::<_, Project>(queries::GET_OPEN_PROJECTS)
        .fetch_all(db_manager.pool())
        .await
}

pub async fn get_buyer_projects(
    db_manager: &DatabaseManager,
    buyer_id: Uuid,
) -> Result<Vec<Project>, SqlxError> {
    info!("{:<12} --> projects of buyer: {}", "Query", buyer_id);
    sqlx::query_as::<_, Project>(queries::GET_BUYER_PROJECTS)
        .bind(buyer_id)
        .fetch_all(db_manager.pool())
        .await
}

/// Buyer dashboard: every owned project with its bids.
pub async fn get_buyer_projects_with_bids(
    db_manager: &DatabaseManager,
    buyer_id: Uuid,
) -> Result<Vec<ProjectWithBids>, SqlxError> {
    let projects = get_buyer_projects(db_manager, buyer_id).await?;
    let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();

    let mut bids_by_project: HashMap<Uuid, Vec<Bid>> = HashMap::new();
    for bid in sqlx::query_as::<_, Bid>(queries::GET_BIDS_FOR_PROJECTS)
        .bind(&ids)
        .fetch_all(db_manager.pool())
        .await?
    {
        bids_by_project.entry(bid.project_id).or_default().push(bid);
    }

    Ok(projects
        .into_iter()
        .map(|project| {
            let bids = bids_by_project.remove(&project.id).unwrap_or_default();
            ProjectWithBids { project, bids }
        })
        .collect())
}

/// Project detail with bids and their sellers.
pub async fn get_project_detail(
    db_manager: &DatabaseManager,
    project_id: Uuid,
) -> Result<Option<ProjectDetail>, SqlxError> {
    let Some(project) = get_project(db_manager, project_id).await? else {
        return Ok(None);
    };

    let bids = get_project_bids(db_manager, project_id).await?;
    let seller_ids: Vec<Uuid> = bids.iter().map(|b| b.seller_id).collect();
    let profiles = get_profiles(db_manager, &seller_ids).await?;

    let bids = bids
        .into_iter()
        .filter_map(|bid| {
            let seller = profiles.get(&bid.seller_id)?.clone();
            Some(BidWithSeller { bid, seller })
        })
        .collect();

    Ok(Some(ProjectDetail { project, bids }))
}

// endregion: --- Projects

// region:    --- Bids

pub async fn get_bid(db_manager: &DatabaseManager, bid_id: Uuid) -> Result<Option<Bid>, SqlxError> {
    info!("{:<12} --> bid id: {}", "Query", bid_id);
    sqlx::query_as::<_, Bid>(queries::GET_BID)
        .bind(bid_id)
        .fetch_optional(db_manager.pool())
        .await
}

pub async fn get_project_bids(
    db_manager: &DatabaseManager,
    project_id: Uuid,
) -> Result<Vec<Bid>, SqlxError> {
    info!("{:<12} --> bids of project: {}", "Query", project_id);
    sqlx::query_as::<_, Bid>(queries::GET_PROJECT_BIDS)
        .bind(project_id)
        .fetch_all(db_manager.pool())
        .await
}

/// Seller dashboard: every bid with the project it targets.
pub async fn get_seller_bids(
    db_manager: &DatabaseManager,
    seller_id: Uuid,
) -> Result<Vec<BidWithProject>, SqlxError> {
    info!("{:<12} --> bids of seller: {}", "Query", seller_id);
    let bids = sqlx::query_as::<_, Bid>(queries::GET_SELLER_BIDS)
        .bind(seller_id)
        .fetch_all(db_manager.pool())
        .await?;

    let project_ids: Vec<Uuid> = bids.iter().map(|b| b.project_id).collect();
    let projects = get_projects_by_ids(db_manager, &project_ids).await?;

    Ok(bids
        .into_iter()
        .filter_map(|bid| {
            let project = projects.get(&bid.project_id)?.clone();
            Some(BidWithProject { bid, project })
        })
        .collect())
}

async fn get_projects_by_ids(
    db_manager: &DatabaseManager,
    project_ids: &[Uuid],
) -> Result<HashMap<Uuid, Project>, SqlxError> {
    let projects = sqlx::query_as::<_, Project>(queries::GET_PROJECTS_BY_IDS)
        .bind(project_ids)
        .fetch_all(db_manager.pool())
        .await?;
    Ok(projects.into_iter().map(|p| (p.id, p)).collect())
}

// endregion: --- Bids

// region:    --- Deliverables & Reviews

pub async fn get_project_deliverable(
    db_manager: &DatabaseManager,
    project_id: Uuid,
) -> Result<Option<Deliverable>, SqlxError> {
    info!("{:<12} --> deliverable of project: {}", "Query", project_id);
    sqlx::query_as::<_, Deliverable>(queries::GET_PROJECT_DELIVERABLE)
        .bind(project_id)
        .fetch_optional(db_manager.pool())
        .await
}

pub async fn count_project_deliverables(
    db_manager: &DatabaseManager,
    project_id: Uuid,
) -> Result<i64, SqlxError> {
    sqlx::query_scalar::<_, i64>(queries::COUNT_PROJECT_DELIVERABLES)
        .bind(project_id)
        .fetch_one(db_manager.pool())
        .await
}

/// Reviews left on projects this seller delivered.
pub async fn get_seller_reviews(
    db_manager: &DatabaseManager,
    seller_id: Uuid,
) -> Result<Vec<ReviewWithProject>, SqlxError> {
    info!("{:<12} --> reviews of seller: {}", "Query", seller_id);
    let reviews = sqlx::query_as::<_, Review>(queries::GET_SELLER_REVIEWS)
        .bind(seller_id)
        .fetch_all(db_manager.pool())
        .await?;

    let project_ids: Vec<Uuid> = reviews.iter().map(|r| r.project_id).collect();
    let projects = get_projects_by_ids(db_manager, &project_ids).await?;

    Ok(reviews
        .into_iter()
        .filter_map(|review| {
            let project = projects.get(&review.project_id)?.clone();
            Some(ReviewWithProject { review, project })
        })
        .collect())
}

// endregion: --- Deliverables & Reviews
