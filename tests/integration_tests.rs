//! End-to-end API tests. They need a reachable Postgres in `DATABASE_URL`:
//! `cargo test -- --ignored`
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use bidconnect::app::router;
use bidconnect::config::Config;
use bidconnect::database::DatabaseManager;
use bidconnect::message_broker::LogNotifier;
use bidconnect::query::handlers;
use bidconnect::state::AppState;
use bidconnect::storage::LocalStorage;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

static SCHEMA: OnceCell<()> = OnceCell::const_new();

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

struct TestApp {
    router: Router,
    db: Arc<DatabaseManager>,
    _uploads: TempDir,
}

async fn setup() -> TestApp {
    init_tracing();
    let uploads = tempfile::tempdir().expect("temp upload dir");
    let upload_dir = uploads.path().to_string_lossy().into_owned();

    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => std::env::var("DATABASE_URL").ok(),
        "JWT_SECRET" => Some("integration-secret".to_string()),
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        _ => None,
    })
    .expect("test config");

    let db_manager = Arc::new(DatabaseManager::new(&config).await.expect("database connection"));
    SCHEMA
        .get_or_init(|| async {
            db_manager
                .initialize_database(false)
                .await
                .expect("schema creation");
        })
        .await;

    let storage = Arc::new(LocalStorage::new(uploads.path()));
    let state = AppState::new(Arc::clone(&db_manager), config, storage, Arc::new(LogNotifier));

    TestApp {
        router: router(state),
        db: db_manager,
        _uploads: uploads,
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bid_body(project_id: &str) -> Value {
    json!({
        "projectId": project_id,
        "amount": 150,
        "estimatedTime": "3 days",
        "message": "...",
    })
}

impl TestApp {
    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(self.router.clone(), request).await
    }

    async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(json_request(method, uri, token, body)).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        self.call(builder.body(Body::empty()).unwrap()).await
    }

    async fn upload_zip(&self, project_id: &str, token: &str, file_name: &str) -> (StatusCode, Value) {
        self.upload(
            project_id,
            token,
            file_name,
            "application/zip",
            b"PK\x05\x06\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0",
        )
        .await
    }

    async fn upload(
        &self,
        project_id: &str,
        token: &str,
        file_name: &str,
        content_type: &str,
        contents: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "----bidconnect-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/deliverables/{project_id}"))
            .header(header::AUTHORIZATION, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.call(request).await
    }

    /// Register a fresh account and return `(token, user id)`.
    async fn register(&self, prefix: &str, role: &str) -> (String, String) {
        let email = format!("{prefix}+{}@example.com", Uuid::new_v4());
        let (status, body) = self
            .json(
                Method::POST,
                "/api/auth/register",
                None,
                json!({ "email": email, "password": "secret123", "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn create_project(&self, buyer: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/projects",
                Some(buyer),
                json!({
                    "title": "Logo",
                    "description": "A logo for a bakery",
                    "budgetMin": 100,
                    "budgetMax": 200,
                    "deadline": (Utc::now() + Duration::days(14)).to_rfc3339(),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["status"], "PENDING");
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_bid(&self, seller: &str, project_id: &str) -> String {
        let (status, body) = self
            .json(Method::POST, "/api/bids", Some(seller), bid_body(project_id))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_full_project_lifecycle() {
    let app = setup().await;
    let (buyer, _) = app.register("buyer", "BUYER").await;
    let (seller, seller_id) = app.register("seller", "SELLER").await;

    let project_id = app.create_project(&buyer).await;
    let bid_id = app.create_bid(&seller, &project_id).await;

    let (status, detail) = app
        .json(
            Method::POST,
            &format!("/api/projects/{project_id}/select/{bid_id}"),
            Some(&buyer),
            Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{detail}");
    assert_eq!(detail["status"], "IN_PROGRESS");
    assert_eq!(detail["selectedBidId"], bid_id.as_str());
    assert_eq!(detail["bids"][0]["status"], "IN_PROGRESS");

    let (status, deliverable) = app.upload_zip(&project_id, &seller, "logo.zip").await;
    assert_eq!(status, StatusCode::CREATED, "{deliverable}");
    assert_eq!(deliverable["projectId"], project_id.as_str());

    let (_, project) = app.get(&format!("/api/projects/{project_id}"), None).await;
    assert_eq!(project["status"], "COMPLETED");
    assert_eq!(project["bids"][0]["status"], "COMPLETED");
    let id = Uuid::parse_str(&project_id).unwrap();
    assert_eq!(handlers::count_project_deliverables(&app.db, id).await.unwrap(), 1);

    let (status, err) = app.upload_zip(&project_id, &seller, "again.zip").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Project not in progress");

    let (status, _) = app.get(&format!("/api/deliverables/{project_id}"), Some(&buyer)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, review) = app
        .json(
            Method::POST,
            &format!("/api/reviews/{project_id}"),
            Some(&buyer),
            json!({ "rating": 5, "review": "Great work, highly recommend" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{review}");

    let (status, reviews) = app.get(&format!("/api/reviews/seller/{seller_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = reviews.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 5);
    assert_eq!(reviews[0]["project"]["id"], project_id.as_str());
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_duplicate_email_and_wrong_password() {
    let app = setup().await;
    let email = format!("dup+{}@example.com", Uuid::new_v4());
    let body = json!({ "email": email, "password": "secret123", "role": "BUYER" });

    let (status, _) = app.json(Method::POST, "/api/auth/register", None, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = app.json(Method::POST, "/api/auth/register", None, body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Email already taken");

    let (status, err) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["message"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_buyer_lists_only_own_projects() {
    let app = setup().await;
    let (alice, _) = app.register("alice", "BUYER").await;
    let (bob, _) = app.register("bob", "BUYER").await;

    let alice_project = app.create_project(&alice).await;

    let (status, projects) = app.get("/api/projects", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(projects
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["id"] != alice_project.as_str()));

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/projects/{alice_project}"),
            Some(&bob),
            json!({ "title": "Hijacked" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_select_bid_from_other_project_is_rejected() {
    let app = setup().await;
    let (buyer, _) = app.register("buyer", "BUYER").await;
    let (seller, _) = app.register("seller", "SELLER").await;

    let first = app.create_project(&buyer).await;
    let second = app.create_project(&buyer).await;
    let foreign_bid = app.create_bid(&seller, &second).await;

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/projects/{first}/select/{foreign_bid}"),
            Some(&buyer),
            Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, project) = app.get(&format!("/api/projects/{first}"), None).await;
    assert_eq!(project["status"], "PENDING");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_seller_cannot_touch_another_sellers_bid() {
    let app = setup().await;
    let (buyer, _) = app.register("buyer", "BUYER").await;
    let (owner, _) = app.register("seller", "SELLER").await;
    let (intruder, _) = app.register("intruder", "SELLER").await;

    let project_id = app.create_project(&buyer).await;
    let bid_id = app.create_bid(&owner, &project_id).await;

    let (status, _) = app
        .json(
            Method::PUT,
            &format!("/api/bids/{bid_id}"),
            Some(&intruder),
            json!({ "amount": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/bids/{bid_id}"), Some(&intruder), Value::Null)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, err) = app
        .json(
            Method::POST,
            "/api/bids",
            Some(&owner),
            json!({ "projectId": project_id, "amount": 120, "estimatedTime": "2 days", "message": "again" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["message"], "You have already bid on this project");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_review_requires_completed_project() {
    let app = setup().await;
    let (buyer, _) = app.register("buyer", "BUYER").await;
    let project_id = app.create_project(&buyer).await;

    let (status, err) = app
        .json(
            Method::POST,
            &format!("/api/reviews/{project_id}"),
            Some(&buyer),
            json!({ "rating": 4, "review": "Too early" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Project is not completed");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_unknown_route_and_missing_token() {
    let app = setup().await;

    let (status, body) = app.get("/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");

    let (status, _) = app.get("/api/projects", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, health) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
}

/// Buyer, seller and a project already moved to IN_PROGRESS.
async fn project_in_progress(app: &TestApp) -> (String, String, String, String) {
    let (buyer, _) = app.register("buyer", "BUYER").await;
    let (seller, _) = app.register("seller", "SELLER").await;
    let project_id = app.create_project(&buyer).await;
    let bid_id = app.create_bid(&seller, &project_id).await;

    let (status, body) = app
        .json(
            Method::POST,
            &format!("/api/projects/{project_id}/select/{bid_id}"),
            Some(&buyer),
            Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (buyer, seller, project_id, bid_id)
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_status_follows_lifecycle_and_complete_closes_bid() {
    let app = setup().await;
    let (buyer, _, project_id, _) = project_in_progress(&app).await;
    let status_uri = format!("/api/projects/{project_id}/status");

    let (status, err) = app
        .json(Method::PATCH, &status_uri, Some(&buyer), json!({ "status": "PENDING" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Invalid status transition");

    let (status, same) = app
        .json(Method::PATCH, &status_uri, Some(&buyer), json!({ "status": "IN_PROGRESS" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same["status"], "IN_PROGRESS");

    let (status, err) = app
        .json(
            Method::POST,
            &format!("/api/reviews/{project_id}"),
            Some(&buyer),
            json!({ "rating": 3, "review": "Still going" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Project is not completed");

    let complete_uri = format!("/api/projects/{project_id}/complete");
    let (status, done) = app.json(Method::PATCH, &complete_uri, Some(&buyer), Value::Null).await;
    assert_eq!(status, StatusCode::OK, "{done}");
    assert_eq!(done["status"], "COMPLETED");

    let (_, project) = app.get(&format!("/api/projects/{project_id}"), None).await;
    assert_eq!(project["bids"][0]["status"], "COMPLETED");

    let (status, err) = app.json(Method::PATCH, &complete_uri, Some(&buyer), Value::Null).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Project not in progress");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_pending_project_cannot_be_completed_by_status() {
    let app = setup().await;
    let (buyer, _) = app.register("buyer", "BUYER").await;
    let project_id = app.create_project(&buyer).await;

    let (status, err) = app
        .json(
            Method::PATCH,
            &format!("/api/projects/{project_id}/status"),
            Some(&buyer),
            json!({ "status": "COMPLETED" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Invalid status transition");

    let (status, err) = app
        .json(
            Method::PATCH,
            &format!("/api/projects/{project_id}/status"),
            Some(&buyer),
            json!({ "status": "ARCHIVED" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["errors"][0]["field"], "status");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_upload_rejections() {
    let app = setup().await;
    let (_, seller, project_id, _) = project_in_progress(&app).await;
    let (outsider, _) = app.register("outsider", "SELLER").await;

    let (status, err) = app
        .upload(&project_id, &seller, "report.pdf", "application/pdf", b"%PDF-1.4")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Only zip archives are accepted");

    let (status, err) = app.upload_zip(&project_id, &outsider, "logo.zip").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["message"], "Not your project");

    let oversized = vec![0u8; 101 * 1024 * 1024 + 1];
    let (status, _) = app
        .upload(&project_id, &seller, "huge.zip", "application/zip", &oversized)
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, project) = app.get(&format!("/api/projects/{project_id}"), None).await;
    assert_eq!(project["status"], "IN_PROGRESS");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_bids_are_frozen_after_selection() {
    let app = setup().await;
    let (buyer, _) = app.register("buyer", "BUYER").await;
    let (winner, _) = app.register("winner", "SELLER").await;
    let (loser, _) = app.register("loser", "SELLER").await;

    let project_id = app.create_project(&buyer).await;
    let winning_bid = app.create_bid(&winner, &project_id).await;
    let losing_bid = app.create_bid(&loser, &project_id).await;

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/projects/{project_id}/select/{winning_bid}"),
            Some(&buyer),
            Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, cancelled) = app.get(&format!("/api/bids/{losing_bid}"), None).await;
    assert_eq!(cancelled["status"], "CANCELLED");

    for (token, bid_id) in [(&winner, &winning_bid), (&loser, &losing_bid)] {
        let (status, _) = app
            .json(
                Method::PUT,
                &format!("/api/bids/{bid_id}"),
                Some(token),
                json!({ "amount": 99 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .json(Method::DELETE, &format!("/api/bids/{bid_id}"), Some(token), Value::Null)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (late, _) = app.register("late", "SELLER").await;
    let (status, err) = app
        .json(Method::POST, "/api/bids", Some(&late), bid_body(&project_id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Project is not open for bids");
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn test_blank_and_missing_fields_are_field_errors() {
    let app = setup().await;
    let (buyer, _) = app.register("buyer", "BUYER").await;

    let (status, err) = app
        .json(
            Method::POST,
            "/api/projects",
            Some(&buyer),
            json!({
                "title": "   ",
                "description": "A logo",
                "budgetMin": 100,
                "budgetMax": 200,
                "deadline": (Utc::now() + Duration::days(3)).to_rfc3339(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["errors"][0]["field"], "title");

    let (status, err) = app
        .json(
            Method::POST,
            "/api/projects",
            Some(&buyer),
            json!({
                "description": "A logo",
                "budgetMin": 100,
                "budgetMax": 200,
                "deadline": (Utc::now() + Duration::days(3)).to_rfc3339(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["errors"][0]["field"], "title");

    let (owner, seller, project_id, _) = project_in_progress(&app).await;
    let (status, _) = app.upload_zip(&project_id, &seller, "logo.zip").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = app
        .json(
            Method::POST,
            &format!("/api/reviews/{project_id}"),
            Some(&owner),
            json!({ "rating": 5, "review": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["errors"][0]["field"], "review");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs DATABASE_URL"]
async fn test_bids_racing_selection_never_stay_pending() {
    let app = setup().await;
    let mut sellers = Vec::new();
    for _ in 0..12 {
        sellers.push(app.register("racer", "SELLER").await.0);
    }

    for _ in 0..5 {
        let (buyer, _) = app.register("buyer", "BUYER").await;
        let (first, _) = app.register("first", "SELLER").await;
        let project_id = app.create_project(&buyer).await;
        let bid_id = app.create_bid(&first, &project_id).await;

        let mut tasks = tokio::task::JoinSet::new();
        for seller in &sellers {
            let request = json_request(Method::POST, "/api/bids", Some(seller), bid_body(&project_id));
            tasks.spawn(send(app.router.clone(), request));
        }
        let select = json_request(
            Method::POST,
            &format!("/api/projects/{project_id}/select/{bid_id}"),
            Some(&buyer),
            Value::Null,
        );
        tasks.spawn(send(app.router.clone(), select));

        while let Some(joined) = tasks.join_next().await {
            let (status, body) = joined.expect("request task");
            assert!(
                status == StatusCode::OK
                    || status == StatusCode::CREATED
                    || status == StatusCode::BAD_REQUEST,
                "{status} {body}"
            );
        }

        let id = Uuid::parse_str(&project_id).unwrap();
        let stray: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bids WHERE project_id = $1 AND status = 'PENDING'",
        )
        .bind(id)
        .fetch_one(app.db.pool())
        .await
        .unwrap();
        assert_eq!(stray, 0, "bids left pending on project {project_id}");

        let (_, project) = app.get(&format!("/api/projects/{project_id}"), None).await;
        assert_eq!(project["status"], "IN_PROGRESS");
    }
}
