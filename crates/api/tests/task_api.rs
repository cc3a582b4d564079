//! HTTP-level tests for tasks: board ordering, kanban status moves,
//! assignee validation and deletion.

mod common;

use axum::http::StatusCode;
use buildtrack_core::roles::ROLE_MEMBER;
use common::{
    body_json, delete_auth, get_auth, patch_json_auth, post_json_auth, put_json_auth, seed_user,
    TestApp,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_project(app: &TestApp, token: &str) -> i64 {
    let response = post_json_auth(app, "/api/v1/projects", token, json!({ "name": "Shed" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_task(app: &TestApp, token: &str, project_id: i64, body: Value) -> Value {
    let response = post_json_auth(
        app,
        &format!("/api/v1/projects/{project_id}/tasks"),
        token,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn titles(json: &Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Tasks without an explicit order are appended: 1, 2, 3.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tasks_are_appended_in_order(pool: PgPool) {
    let (user, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(&app, &token).await;

    let first = create_task(&app, &token, project_id, json!({ "title": "Survey" })).await;
    let second = create_task(&app, &token, project_id, json!({ "title": "Dig" })).await;

    assert_eq!(first["order"], 1);
    assert_eq!(second["order"], 2);
    assert_eq!(first["status"], "todo");
    assert_eq!(first["project_id"], project_id);
    assert_eq!(first["created_by"], user.id);
    assert_eq!(first["project"]["id"], project_id);
    assert_eq!(first["creator"]["id"], user.id);
    assert!(first["assignee"].is_null());

    // Appending follows the highest order, not the task count.
    create_task(&app, &token, project_id, json!({ "title": "Pour", "order": 10 })).await;
    let next = create_task(&app, &token, project_id, json!({ "title": "Cure" })).await;
    assert_eq!(next["order"], 11);
}

/// Explicit orders are capped so appends stay inside the column range.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_above_cap_is_rejected(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(&app, &token).await;
    let uri = format!("/api/v1/projects/{project_id}/tasks");

    let response = post_json_auth(
        &app,
        &uri,
        &token,
        json!({ "title": "Far away", "order": 2_147_483_647_i64 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["fields"]["order"][0],
        "The order may not be greater than 1000000."
    );

    create_task(&app, &token, project_id, json!({ "title": "Edge", "order": 1_000_000 })).await;
    let next = create_task(&app, &token, project_id, json!({ "title": "After" })).await;
    assert_eq!(next["order"], 1_000_001);

    let task_id = next["id"].as_i64().unwrap();
    let response = put_json_auth(
        &app,
        &format!("/api/v1/tasks/{task_id}"),
        &token,
        json!({ "order": 1_000_001 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Order sequences are per project.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_is_per_project(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let a = create_project(&app, &token).await;
    let b = create_project(&app, &token).await;

    create_task(&app, &token, a, json!({ "title": "A1" })).await;
    create_task(&app, &token, a, json!({ "title": "A2" })).await;
    let b1 = create_task(&app, &token, b, json!({ "title": "B1" })).await;
    assert_eq!(b1["order"], 1);
}

/// The list is sorted by order, ties broken by creation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_tasks_sorted_and_filtered(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(&app, &token).await;

    create_task(&app, &token, project_id, json!({ "title": "C", "order": 3 })).await;
    create_task(&app, &token, project_id, json!({ "title": "A", "order": 1 })).await;
    create_task(
        &app,
        &token,
        project_id,
        json!({ "title": "B", "order": 1, "status": "done" }),
    )
    .await;

    let uri = format!("/api/v1/projects/{project_id}/tasks");
    let json = body_json(get_auth(&app, &uri, &token).await).await;
    assert_eq!(titles(&json), ["A", "B", "C"]);

    let json = body_json(get_auth(&app, &format!("{uri}?status=done"), &token).await).await;
    assert_eq!(titles(&json), ["B"]);

    let response = get_auth(&app, &format!("{uri}?status=blocked"), &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Status moves and updates
// ---------------------------------------------------------------------------

/// A kanban move changes the status and keeps the order.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_move_keeps_order(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(&app, &token).await;
    create_task(&app, &token, project_id, json!({ "title": "Survey" })).await;
    let task = create_task(&app, &token, project_id, json!({ "title": "Dig" })).await;
    let id = task["id"].as_i64().unwrap();

    let response = patch_json_auth(
        &app,
        &format!("/api/v1/tasks/{id}/status"),
        &token,
        json!({ "status": "in_progress" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "in_progress");
    assert_eq!(json["data"]["order"], 2);
    assert_eq!(json["data"]["title"], "Dig");
}

/// Invalid or missing status on a move is a 422.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_move_validation(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(&app, &token).await;
    let task = create_task(&app, &token, project_id, json!({ "title": "Dig" })).await;
    let uri = format!("/api/v1/tasks/{}/status", task["id"]);

    let response = patch_json_auth(&app, &uri, &token, json!({ "status": "blocked" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["fields"]["status"][0],
        "The selected status is invalid."
    );

    let response = patch_json_auth(&app, &uri, &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["fields"]["status"][0],
        "The status field is required."
    );

    let response = patch_json_auth(
        &app,
        "/api/v1/tasks/999999/status",
        &token,
        json!({ "status": "done" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Assignees must exist.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_assignee_is_rejected(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(&app, &token).await;

    let response = post_json_auth(
        &app,
        &format!("/api/v1/projects/{project_id}/tasks"),
        &token,
        json!({ "title": "Dig", "assigned_to": 999999 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["fields"]["assigned_to"][0],
        "The selected assigned to is invalid."
    );
}

/// Update can assign, reorder and clear fields.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_task(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let (rui, _) = seed_user(&pool, "Rui", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);
    let project_id = create_project(&app, &token).await;
    let task = create_task(
        &app,
        &token,
        project_id,
        json!({ "title": "Dig", "due_date": "2026-07-01" }),
    )
    .await;
    let uri = format!("/api/v1/tasks/{}", task["id"]);

    let response = put_json_auth(
        &app,
        &uri,
        &token,
        json!({ "assigned_to": rui.id, "order": 7, "due_date": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["assignee"]["name"], "Rui");
    assert_eq!(json["data"]["order"], 7);
    assert!(json["data"]["due_date"].is_null());

    let response = put_json_auth(&app, &uri, &token, json!({ "order": -1 })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["fields"]["order"][0],
        "The order must be at least 0."
    );
}

/// Tasks cannot be added to a missing project.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_task_in_missing_project(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        &app,
        "/api/v1/projects/999999/tasks",
        &token,
        json!({ "title": "Dig" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Deleting a task removes its schedules with it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_task_cascades_to_schedules(pool: PgPool) {
    let (_, token) = seed_user(&pool, "Dana", ROLE_MEMBER).await;
    let app = common::build_test_app(pool.clone());
    let project_id = create_project(&app, &token).await;
    let task = create_task(&app, &token, project_id, json!({ "title": "Dig" })).await;
    let task_id = task["id"].as_i64().unwrap();

    let response = post_json_auth(
        &app,
        "/api/v1/schedules",
        &token,
        json!({
            "task_id": task_id,
            "scheduled_start": "2026-05-01T08:00:00Z",
            "scheduled_end": "2026-05-01T16:00:00Z"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = delete_auth(&app, &format!("/api/v1/tasks/{task_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(&app, &format!("/api/v1/tasks/{task_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let schedules: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedules")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(schedules, 0);
}
