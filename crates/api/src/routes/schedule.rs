use axum::routing::get;
use axum::Router;

use crate::handlers::schedule;
use crate::state::AppState;

/// Routes mounted at `/schedules`.
///
/// ```text
/// GET    /        -> index
/// POST   /        -> store
/// GET    /{id}    -> show
/// PUT    /{id}    -> update
/// DELETE /{id}    -> destroy
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(schedule::index).post(schedule::store))
        .route(
            "/{id}",
            get(schedule::show)
                .put(schedule::update)
                .delete(schedule::destroy),
        )
}
