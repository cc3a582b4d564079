//! Route definitions for the `/projects` resource.
//!
//! Also nests the project-scoped task, document, expense and contract
//! routes under `/projects/{project_id}/...`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{contract, document, expense, project, task};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> index
/// POST   /                                  -> store
/// GET    /{project_id}                      -> show
/// PUT    /{project_id}                      -> update
/// DELETE /{project_id}                      -> destroy (soft delete, manager)
/// POST   /{project_id}/restore              -> restore (manager)
/// DELETE /{project_id}/purge                -> purge (admin)
///
/// GET    /{project_id}/tasks                -> task::index
/// POST   /{project_id}/tasks                -> task::store
///
/// GET    /{project_id}/documents            -> document::index
/// POST   /{project_id}/documents            -> document::store (multipart)
/// GET    /{project_id}/documents/{id}       -> document::show
/// PUT    /{project_id}/documents/{id}       -> document::update
/// DELETE /{project_id}/documents/{id}       -> document::destroy
///
/// GET    /{project_id}/expenses             -> expense::index
/// POST   /{project_id}/expenses             -> expense::store (multipart)
/// GET    /{project_id}/expenses/{id}        -> expense::show
/// PUT    /{project_id}/expenses/{id}        -> expense::update
/// DELETE /{project_id}/expenses/{id}        -> expense::destroy
///
/// GET    /{project_id}/contracts            -> contract::index
/// POST   /{project_id}/contracts            -> contract::store (multipart)
/// GET    /{project_id}/contracts/{id}       -> contract::show
/// PUT    /{project_id}/contracts/{id}       -> contract::update
/// DELETE /{project_id}/contracts/{id}       -> contract::destroy
/// ```
pub fn router() -> Router<AppState> {
    let task_routes = Router::new().route("/", get(task::index).post(task::store));

    let document_routes = Router::new()
        .route("/", get(document::index).post(document::store))
        .route(
            "/{id}",
            get(document::show)
                .put(document::update)
                .delete(document::destroy),
        );

    let expense_routes = Router::new()
        .route("/", get(expense::index).post(expense::store))
        .route(
            "/{id}",
            get(expense::show)
                .put(expense::update)
                .delete(expense::destroy),
        );

    let contract_routes = Router::new()
        .route("/", get(contract::index).post(contract::store))
        .route(
            "/{id}",
            get(contract::show)
                .put(contract::update)
                .delete(contract::destroy),
        );

    Router::new()
        .route("/", get(project::index).post(project::store))
        .route(
            "/{project_id}",
            get(project::show)
                .put(project::update)
                .delete(project::destroy),
        )
        .route("/{project_id}/restore", post(project::restore))
        .route("/{project_id}/purge", delete(project::purge))
        .nest("/{project_id}/tasks", task_routes)
        .nest("/{project_id}/documents", document_routes)
        .nest("/{project_id}/expenses", expense_routes)
        .nest("/{project_id}/contracts", contract_routes)
}
