use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Final work for a project; one per project.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub id: Uuid,
    pub project_id: Uuid,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}
