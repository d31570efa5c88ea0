use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project lifecycle notifications.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectEvent {
    #[serde(rename_all = "camelCase")]
    SellerSelected {
        project_id: Uuid,
        bid_id: Uuid,
        buyer_id: Uuid,
        seller_id: Uuid,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ProjectCompleted {
        project_id: Uuid,
        buyer_id: Uuid,
        seller_id: Option<Uuid>,
        timestamp: DateTime<Utc>,
    },
}

impl ProjectEvent {
    pub fn project_id(&self) -> Uuid {
        match self {
            ProjectEvent::SellerSelected { project_id, .. }
            | ProjectEvent::ProjectCompleted { project_id, .. } => *project_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProjectEvent::SellerSelected { .. } => "SellerSelected",
            ProjectEvent::ProjectCompleted { .. } => "ProjectCompleted",
        }
    }
}
