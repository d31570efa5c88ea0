// region:    --- Imports
use crate::delivery::upload::MAX_UPLOAD_BYTES;
use crate::handlers::{auth, bids, deliverables, projects, reviews};
use crate::handlers::{handle_health, handle_not_found};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

// endregion: --- Imports

/// Room for multipart boundaries and headers on top of the archive itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(e) => {
            warn!("{:<12} --> ignoring CORS_ORIGIN {:?}: {}", "Router", origin, e);
            cors
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    let api = Router::new()
        .route("/health", get(handle_health))
        // Auth
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/getCurrentUser", post(auth::handle_current_user))
        // Projects
        .route(
            "/projects",
            post(projects::handle_create_project).get(projects::handle_get_buyer_projects),
        )
        .route("/projects/open", get(projects::handle_get_open_projects))
        .route(
            "/projects/:id",
            get(projects::handle_get_project)
                .put(projects::handle_update_project)
                .delete(projects::handle_delete_project),
        )
        .route(
            "/projects/:id/status",
            patch(projects::handle_update_status),
        )
        .route(
            "/projects/:id/complete",
            patch(projects::handle_mark_complete),
        )
        .route(
            "/projects/:id/select/:bid_id",
            post(projects::handle_select_seller),
        )
        // Bids
        .route("/bids", post(bids::handle_create_bid))
        .route("/bids/mine", get(bids::handle_get_my_bids))
        .route(
            "/bids/project/:project_id",
            get(bids::handle_get_project_bids),
        )
        .route(
            "/bids/:id",
            get(bids::handle_get_bid)
                .put(bids::handle_update_bid)
                .delete(bids::handle_withdraw_bid),
        )
        // Deliverables
        .route(
            "/deliverables/:project_id",
            post(deliverables::handle_upload_deliverable)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD))
                .get(deliverables::handle_get_deliverable),
        )
        // Reviews
        .route("/reviews/:project_id", post(reviews::handle_submit_review))
        .route(
            "/reviews/seller/:seller_id",
            get(reviews::handle_get_seller_reviews),
        );

    Router::new()
        .nest("/api", api)
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
