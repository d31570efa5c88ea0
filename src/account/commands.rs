/// Registration, login and the current-user lookup.
// region:    --- Imports
use super::extract::AuthContext;
use super::jwt::TokenIssuer;
use super::model::{AuthResponse, LoginRequest, RegisterRequest, Role, User};
use super::password::{hash_password, verify_password};
use crate::bidding::model::Bid;
use crate::database::DatabaseManager;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::project::model::Project;
use crate::query::handlers;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "Email already taken";

/// The caller's account with what they own on the marketplace.
#[derive(Debug, Serialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: User,
    pub projects: Vec<Project>,
    pub bids: Vec<Bid>,
}

pub async fn register(
    db_manager: &DatabaseManager,
    tokens: &TokenIssuer,
    req: RegisterRequest,
) -> AppResult<AuthResponse> {
    info!("{:<12} --> register {:?}", "Command", req.role);

    let email = req.email.trim().to_lowercase();
    if handlers::email_exists(db_manager, &email).await? {
        return Err(AppError::conflict(EMAIL_TAKEN));
    }

    let hashed = hash_password(&req.password).await?;
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password, role, name)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, email, password, role, name, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&hashed)
    .bind(req.role)
    .bind(&req.name)
    .fetch_one(db_manager.pool())
    .await
    .map_err(|e| {
        // lost a race with a concurrent registration
        if is_unique_violation(&e) {
            AppError::conflict(EMAIL_TAKEN)
        } else {
            e.into()
        }
    })?;

    let token = tokens.sign(user.id, user.role)?;
    info!("{:<12} --> registered user {}", "Command", user.id);
    Ok(AuthResponse { token, user })
}

pub async fn login(
    db_manager: &DatabaseManager,
    tokens: &TokenIssuer,
    req: LoginRequest,
) -> AppResult<AuthResponse> {
    let email = req.email.trim().to_lowercase();

    let Some(user) = handlers::get_user_by_email(db_manager, &email).await? else {
        warn!("{:<12} --> login for unknown email", "Command");
        return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(&req.password, &user.password).await? {
        warn!("{:<12} --> password mismatch for {}", "Command", user.id);
        return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    }

    let token = tokens.sign(user.id, user.role)?;
    Ok(AuthResponse { token, user })
}

pub async fn current_user(db_manager: &DatabaseManager, ctx: AuthContext) -> AppResult<CurrentUser> {
    let user = handlers::get_user(db_manager, ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let (projects, bids) = match user.role {
        Role::Buyer => (handlers::get_buyer_projects(db_manager, user.id).await?, Vec::new()),
        Role::Seller => (
            Vec::new(),
            handlers::get_seller_bids(db_manager, user.id)
                .await?
                .into_iter()
                .map(|b| b.bid)
                .collect(),
        ),
    };

    Ok(CurrentUser { user, projects, bids })
}
