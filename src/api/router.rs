//! API router. Returns a composable `Router` that can be mounted on any
//! axum server.

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/events", post(endpoints::events::receive))
        .route("/intake", post(endpoints::intake::save))
        .with_state(ctx)
}
