use crate::account::model::UserProfile;
use crate::error::non_blank;
use crate::project::model::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: Uuid,
    pub project_id: Uuid,
    pub seller_id: Uuid,
    pub amount: i64,
    pub estimated_time: String,
    pub message: String,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidWithSeller {
    #[serde(flatten)]
    pub bid: Bid,
    pub seller: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidWithProject {
    #[serde(flatten)]
    pub bid: Bid,
    pub project: Project,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBid {
    pub project_id: Uuid,
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
    #[validate(custom(function = "non_blank", message = "estimatedTime is required"))]
    pub estimated_time: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBid {
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: Option<i64>,
    #[validate(custom(function = "non_blank", message = "estimatedTime must not be empty"))]
    pub estimated_time: Option<String>,
    pub message: Option<String>,
}

impl UpdateBid {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.estimated_time.is_none() && self.message.is_none()
    }
}
