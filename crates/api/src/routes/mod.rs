pub mod auth;
pub mod dashboard;
pub mod health;
pub mod project;
pub mod report;
pub mod role;
pub mod schedule;
pub mod task;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/me                                         current user
///
/// /roles                                           list, create (admin)
/// /roles/{id}                                      get, update, delete (admin)
///
/// /projects                                        list (?status, limit, offset), create
/// /projects/{id}                                   get, update, soft delete
/// /projects/{id}/restore                           restore (POST)
/// /projects/{id}/purge                             hard delete (DELETE, admin)
/// /projects/{project_id}/tasks                     list (?status), create
/// /projects/{project_id}/documents                 list (?category), upload
/// /projects/{project_id}/documents/{id}            get, update, delete
/// /projects/{project_id}/expenses                  list (?category), create
/// /projects/{project_id}/expenses/{id}             get, update, delete
/// /projects/{project_id}/contracts                 list (?status), create
/// /projects/{project_id}/contracts/{id}            get, update, delete
///
/// /tasks/{id}                                      get, update, delete
/// /tasks/{id}/status                               kanban move (PATCH)
///
/// /schedules                                       list (?task_id, assigned_to, status, from, to), create
/// /schedules/{id}                                  get, update, delete
///
/// /reports                                         list (?project_id, type), create
/// /reports/generate                                build from project state (POST)
/// /reports/{id}                                    get, update, delete
///
/// /dashboard                                       portfolio summary
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/roles", role::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/schedules", schedule::router())
        .nest("/reports", report::router())
        .nest("/dashboard", dashboard::router())
}
