use axum::routing::{get, post};
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /            -> index
/// POST   /            -> store
/// POST   /generate    -> generate
/// GET    /{id}        -> show
/// PUT    /{id}        -> update
/// DELETE /{id}        -> destroy
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(report::index).post(report::store))
        .route("/generate", post(report::generate))
        .route(
            "/{id}",
            get(report::show).put(report::update).delete(report::destroy),
        )
}
