use axum::{routing::IntoMakeService, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub mod available;
pub mod health;
pub mod mods;
pub mod queue_status;
pub mod repos;

pub fn router(state: AppState) -> IntoMakeService<Router> {
    let api_routes = Router::new()
        .route("/health", axum::routing::get(health::health_check))
        .merge(repos::router())
        .merge(mods::router())
        .merge(queue_status::router())
        .merge(available::router())
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .into_make_service()
}
