use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;
use telemedicine_cell::router::telemedicine_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Telemedicine API is running!" }))
        .nest("/consultations", telemedicine_routes(state.clone()))
}
