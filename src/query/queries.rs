// region:    --- Users
pub const GET_USER_BY_ID: &str = "SELECT id, email, password, role, name, created_at, updated_at FROM users WHERE id = $1";

pub const GET_USER_BY_EMAIL: &str = "SELECT id, email, password, role, name, created_at, updated_at FROM users WHERE email = $1";

pub const USER_EMAIL_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)";

pub const GET_PROFILES: &str = "SELECT id, email, role, name FROM users WHERE id = ANY($1)";
// endregion: --- Users

// region:    --- Projects
pub const GET_PROJECT: &str = "SELECT id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at FROM projects WHERE id = $1";

/// Row lock for lifecycle transitions.
pub const GET_PROJECT_FOR_UPDATE: &str = "SELECT id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at FROM projects WHERE id = $1 FOR UPDATE";

/// Shared lock: bids may land together but never alongside a selection.
pub const GET_PROJECT_FOR_SHARE: &str = "SELECT id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at FROM projects WHERE id = $1 FOR SHARE";

pub const GET_OPEN_PROJECTS: &str = "SELECT id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at FROM projects WHERE status = 'PENDING' ORDER BY created_at DESC";

pub const GET_BUYER_PROJECTS: &str = "SELECT id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at FROM projects WHERE buyer_id = $1 ORDER BY created_at DESC";

pub const GET_PROJECTS_BY_IDS: &str = "SELECT id, title, description, budget_min, budget_max, deadline, status, buyer_id, selected_bid_id, created_at, updated_at FROM projects WHERE id = ANY($1)";
// endregion: --- Projects

// region:    --- Bids
pub const GET_BID: &str = "SELECT id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at FROM bids WHERE id = $1";

pub const GET_PROJECT_BIDS: &str = "SELECT id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at FROM bids WHERE project_id = $1 ORDER BY created_at DESC";

pub const GET_BIDS_FOR_PROJECTS: &str = "SELECT id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at FROM bids WHERE project_id = ANY($1) ORDER BY created_at DESC";

pub const GET_SELLER_BIDS: &str = "SELECT id, project_id, seller_id, amount, estimated_time, message, status, created_at, updated_at FROM bids WHERE seller_id = $1 ORDER BY created_at DESC";
// endregion: --- Bids

// region:    --- Deliverables & Reviews
pub const GET_PROJECT_DELIVERABLE: &str = "SELECT id, project_id, file_url, created_at FROM deliverables WHERE project_id = $1";

pub const COUNT_PROJECT_DELIVERABLES: &str = "SELECT COUNT(*) FROM deliverables WHERE project_id = $1";

pub const GET_SELLER_REVIEWS: &str = r#"
    SELECT r.id, r.project_id, r.rating, r.review, r.created_at
    FROM reviews r
    JOIN projects p ON p.id = r.project_id
    JOIN bids b ON b.id = p.selected_bid_id
    WHERE b.seller_id = $1
    ORDER BY r.created_at DESC
"#;
// endregion: --- Deliverables & Reviews
