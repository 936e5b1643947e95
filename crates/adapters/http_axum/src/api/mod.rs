//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod device;
#[allow(clippy::missing_errors_doc)]
pub mod entities;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use airmon_app::ports::Integration;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<I>() -> Router<AppState<I>>
where
    I: Integration + 'static,
{
    Router::new()
        .route("/device", get(device::get::<I>))
        .route("/entities", get(entities::list::<I>))
        .route("/entities/{id}", get(entities::get::<I>))
        .route(
            "/entities/{id}/services/{service}",
            post(entities::call_service::<I>),
        )
        .route("/events/stream", get(sse::stream::<I>))
}
