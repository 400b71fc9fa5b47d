/// Integration tests driving the full router over in-memory SQLite
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use reviewroster_api::{AppState, router};
use reviewroster_core::{CandidatePicker, OperationScope, ReviewService};
use reviewroster_db::{SqlStore, create_pool, run_migrations};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

async fn setup_test_state(scope: OperationScope) -> AppState {
    let pool = create_pool("sqlite::memory:", 1)
        .await
        .expect("Failed to create test database pool");

    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let store = Arc::new(SqlStore::new(pool.clone()));
    let service = ReviewService::new(store, Arc::new(CandidatePicker::seeded(7)));

    AppState::new(pool, service, scope)
}

async fn create_app() -> Router {
    let scope = OperationScope::new(CancellationToken::new(), Some(Duration::from_secs(5)));
    router(setup_test_state(scope).await)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn seed_core_team(app: &Router) {
    let (status, body) = post_json(
        app,
        "/team/add",
        json!({
            "team_name": "core",
            "members": [
                {"user_id": "a", "username": "alice", "is_active": true},
                {"user_id": "b", "username": "bob", "is_active": true},
                {"user_id": "c", "username": "carol", "is_active": true},
                {"user_id": "d", "username": "dave", "is_active": true}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["team"]["team_name"], "core");
    assert_eq!(body["team"]["members"].as_array().unwrap().len(), 4);
}

fn reviewers(pr: &Value) -> Vec<String> {
    pr["assigned_reviewers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_app().await;

    let (status, body) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["connected"], true);
}

#[tokio::test]
async fn test_team_add_and_get() {
    let app = create_app().await;
    seed_core_team(&app).await;

    let (status, body) = get(&app, "/team/get?team_name=core").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "core");
    assert_eq!(body["members"][0]["user_id"], "a");

    let (status, body) = get(&app, "/team/get?team_name=missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_team_is_rejected() {
    let app = create_app().await;
    seed_core_team(&app).await;

    let (status, body) = post_json(
        &app,
        "/team/add",
        json!({"team_name": "core", "members": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "TEAM_EXISTS");
}

#[tokio::test]
async fn test_pull_request_lifecycle() {
    let app = create_app().await;
    seed_core_team(&app).await;

    let (status, body) = post_json(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "Add cache", "author_id": "a"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pr"]["status"], "OPEN");
    let assigned = reviewers(&body["pr"]);
    assert_eq!(assigned.len(), 2);
    assert!(!assigned.contains(&"a".to_string()));

    let old = assigned[0].clone();
    let remaining: Vec<&str> = ["b", "c", "d"]
        .into_iter()
        .filter(|id| !assigned.iter().any(|r| r == id))
        .collect();

    let (status, body) = post_json(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": old}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], remaining[0]);
    let after = reviewers(&body["pr"]);
    assert_eq!(after.len(), 2);
    assert!(!after.contains(&old));

    let (status, body) = get(&app, &format!("/users/getReview?user_id={}", remaining[0])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pull_requests"][0]["pull_request_id"], "pr-1");

    let (status, first) =
        post_json(&app, "/pullRequest/merge", json!({"pull_request_id": "pr-1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["pr"]["status"], "MERGED");

    let (status, second) =
        post_json(&app, "/pullRequest/merge", json!({"pull_request_id": "pr-1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["pr"]["merged_at"], first["pr"]["merged_at"]);

    let (status, body) = post_json(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": after[0]}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_MERGED");
}

#[tokio::test]
async fn test_create_conflicts_and_unknown_author() {
    let app = create_app().await;
    seed_core_team(&app).await;

    let create = json!({"pull_request_id": "pr-1", "pull_request_name": "Fix", "author_id": "a"});
    let (status, _) = post_json(&app, "/pullRequest/create", create.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(&app, "/pullRequest/create", create).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "PR_EXISTS");

    let (status, body) = post_json(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-2", "pull_request_name": "Fix", "author_id": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_reassign_errors() {
    let app = create_app().await;
    seed_core_team(&app).await;

    let (status, body) = post_json(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "missing", "old_user_id": "b"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    post_json(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "Fix", "author_id": "a"}),
    )
    .await;

    // The author is never a reviewer
    let (status, body) = post_json(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "a"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NOT_ASSIGNED");
}

#[tokio::test]
async fn test_no_candidate_on_small_team() {
    let app = create_app().await;
    post_json(
        &app,
        "/team/add",
        json!({
            "team_name": "pair",
            "members": [
                {"user_id": "x", "username": "xena", "is_active": true},
                {"user_id": "y", "username": "yuri", "is_active": true}
            ]
        }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": "pr-1", "pull_request_name": "Fix", "author_id": "x"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reviewers(&body["pr"]), vec!["y".to_string()]);

    let (status, body) = post_json(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "y"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NO_CANDIDATE");
}

#[tokio::test]
async fn test_set_is_active() {
    let app = create_app().await;
    seed_core_team(&app).await;

    let (status, body) = post_json(
        &app,
        "/users/setIsActive",
        json!({"user_id": "b", "is_active": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["user_id"], "b");
    assert_eq!(body["user"]["is_active"], false);

    let (status, body) = post_json(
        &app,
        "/users/setIsActive",
        json!({"user_id": "ghost", "is_active": false}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_review_for_unknown_user_is_empty() {
    let app = create_app().await;

    let (status, body) = get(&app, "/users/getReview?user_id=nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "nobody");
    assert!(body["pull_requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_requests() {
    let app = create_app().await;

    let (status, body) = get(&app, "/team/get").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/pullRequest/merge")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = post_json(
        &app,
        "/pullRequest/create",
        json!({"pull_request_id": " ", "pull_request_name": "Fix", "author_id": "a"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cancelled_scope_returns_timeout() {
    let token = CancellationToken::new();
    token.cancel();
    let state = setup_test_state(OperationScope::new(token, None)).await;
    let app = router(state.clone());

    let (status, body) = post_json(
        &app,
        "/team/add",
        json!({"team_name": "core", "members": []}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "TIMEOUT");

    // Nothing was written
    assert!(state.service.get_team("core").await.is_err());
}
