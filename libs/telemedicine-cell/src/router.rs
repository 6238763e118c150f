// libs/telemedicine-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers::*;

/// Creates the telemedicine consultation routes
pub fn telemedicine_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/health", get(consultation_health_check))
        // Session lifecycle
        .route("/appointments/{appointment_id}/start", post(start_consultation))
        .route("/appointments/{appointment_id}/join", post(join_consultation))
        .route("/sessions/{session_id}/end", post(end_consultation))
        .route("/sessions/{session_id}/cancel", post(cancel_consultation))
        .route("/sessions/{session_id}/status", get(get_consultation_status))
        // History
        .route(
            "/practitioners/{practitioner_id}/sessions",
            get(list_practitioner_consultations),
        )
        .route("/patients/{patient_id}/sessions", get(list_patient_consultations))
        // Admin
        .route("/admin/reap-no-shows", post(reap_no_shows))
        .with_state(state)
}
