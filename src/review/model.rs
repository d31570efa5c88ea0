use crate::error::non_blank;
use crate::project::model::Project;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub project_id: Uuid,
    pub rating: i32,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithProject {
    #[serde(flatten)]
    pub review: Review,
    pub project: Project,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitReview {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(custom(function = "non_blank", message = "review is required"))]
    pub review: String,
}
