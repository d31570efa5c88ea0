use crate::bidding::model::{Bid, BidWithSeller};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::non_blank;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Pending,
    InProgress,
    Completed,
}

impl ProjectStatus {
    /// Forward-only lifecycle: PENDING -> IN_PROGRESS -> COMPLETED.
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        matches!(
            (self, next),
            (ProjectStatus::Pending, ProjectStatus::InProgress)
                | (ProjectStatus::InProgress, ProjectStatus::Completed)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub budget_min: i64,
    pub budget_max: i64,
    pub deadline: DateTime<Utc>,
    pub status: ProjectStatus,
    pub buyer_id: Uuid,
    pub selected_bid_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project with its bids, as listed on the buyer dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithBids {
    #[serde(flatten)]
    pub project: Project,
    pub bids: Vec<Bid>,
}

/// Project detail page: bids carry their seller's profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub bids: Vec<BidWithSeller>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_new_budget"))]
pub struct CreateProject {
    #[validate(custom(function = "non_blank", message = "title is required"))]
    pub title: String,
    pub description: String,
    #[validate(range(min = 0, message = "budgetMin must be non-negative"))]
    pub budget_min: i64,
    #[validate(range(min = 0, message = "budgetMax must be non-negative"))]
    pub budget_max: i64,
    pub deadline: DateTime<Utc>,
}

fn validate_new_budget(project: &CreateProject) -> Result<(), ValidationError> {
    check_budget(project.budget_min, project.budget_max)
}

pub fn check_budget(min: i64, max: i64) -> Result<(), ValidationError> {
    if min > max {
        let mut err = ValidationError::new("budget_range");
        err.message = Some("budgetMax must be greater than or equal to budgetMin".into());
        return Err(err);
    }
    Ok(())
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[validate(custom(function = "non_blank", message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "budgetMin must be non-negative"))]
    pub budget_min: Option<i64>,
    #[validate(range(min = 0, message = "budgetMax must be non-negative"))]
    pub budget_max: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.budget_min.is_none()
            && self.budget_max.is_none()
            && self.deadline.is_none()
    }

    /// Overlay the provided fields onto `project`.
    pub fn apply_to(self, project: &mut Project) {
        if let Some(title) = self.title {
            project.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(budget_min) = self.budget_min {
            project.budget_min = budget_min;
        }
        if let Some(budget_max) = self.budget_max {
            project.budget_max = budget_max;
        }
        if let Some(deadline) = self.deadline {
            project.deadline = deadline;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatus {
    pub status: ProjectStatus,
}
