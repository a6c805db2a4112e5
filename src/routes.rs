// src/routes.rs
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::poll::PollService;

pub fn create_routes(service: PollService) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/poll", post(handlers::create_poll).get(handlers::list_polls))
        .route("/poll/{id}/choice", get(handlers::list_choices))
        .route("/poll/{id}/result", get(handlers::get_result))
        .route("/choice", post(handlers::create_choice))
        .route("/choice/{id}/vote", post(handlers::cast_vote))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}
