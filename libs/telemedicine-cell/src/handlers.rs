// libs/telemedicine-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    CancelSessionRequest, EndSessionRequest, JoinSessionRequest, PageQuery, ReapNoShowsRequest,
    StartSessionRequest, TelemedicineError,
};
use crate::services::SessionLifecycleService;

fn lifecycle_service(config: &AppConfig) -> Result<SessionLifecycleService, AppError> {
    SessionLifecycleService::new(config).map_err(|e| AppError::Internal(e.to_string()))
}

// ==============================================================================
// SESSION LIFECYCLE HANDLERS
// ==============================================================================

/// Start (or idempotently re-enter) the consultation for an appointment.
#[axum::debug_handler]
pub async fn start_consultation(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;

    let summary = service
        .start(appointment_id, &request.practitioner_id, auth.token())
        .await
        .map_err(|e| match e {
            TelemedicineError::AppointmentNotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            TelemedicineError::PractitionerNotFound => {
                AppError::NotFound("Practitioner not found".to_string())
            }
            TelemedicineError::NotAppointmentPractitioner => {
                AppError::Forbidden("You are not authorized to start this consultation".to_string())
            }
            TelemedicineError::NotRemoteAppointment => AppError::BadRequest(
                "This appointment is not scheduled for a remote consultation".to_string(),
            ),
            TelemedicineError::RoomProvisioningFailed { .. } => {
                AppError::BadRequest("Failed to create video consultation room".to_string())
            }
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "session": summary,
        "message": "Consultation started"
    })))
}

/// Patient join for an active consultation.
#[axum::debug_handler]
pub async fn join_consultation(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<JoinSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;

    let summary = service
        .join(appointment_id, request.patient_id, auth.token())
        .await
        .map_err(|e| match e {
            TelemedicineError::SessionNotFound => AppError::NotFound(
                "No active consultation found for this appointment".to_string(),
            ),
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "session": summary,
        "message": "Joined consultation"
    })))
}

/// Finalize a consultation with a computed duration.
#[axum::debug_handler]
pub async fn end_consultation(
    State(state): State<Arc<AppConfig>>,
    Path(session_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<EndSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;

    let result = service
        .end(
            session_id,
            request.practitioner_id,
            request.ended_by,
            auth.token(),
        )
        .await
        .map_err(|e| match e {
            TelemedicineError::SessionNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            TelemedicineError::AlreadyEnded => {
                AppError::BadRequest("Consultation already ended".to_string())
            }
            TelemedicineError::SessionFinished { .. } => AppError::BadRequest(e.to_string()),
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "result": result,
        "message": "Consultation ended"
    })))
}

/// Cancel a consultation from an external trigger.
#[axum::debug_handler]
pub async fn cancel_consultation(
    State(state): State<Arc<AppConfig>>,
    Path(session_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CancelSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;

    service
        .cancel(session_id, &request.reason, auth.token())
        .await
        .map_err(|e| match e {
            TelemedicineError::SessionNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            TelemedicineError::SessionFinished { .. } => AppError::BadRequest(e.to_string()),
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Consultation cancelled"
    })))
}

/// Read-only status snapshot for a session.
#[axum::debug_handler]
pub async fn get_consultation_status(
    State(state): State<Arc<AppConfig>>,
    Path(session_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;

    let snapshot = service
        .get_status(session_id, auth.token())
        .await
        .map_err(|e| match e {
            TelemedicineError::SessionNotFound => {
                AppError::NotFound("Consultation not found".to_string())
            }
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!(snapshot)))
}

// ==============================================================================
// HISTORY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_practitioner_consultations(
    State(state): State<Arc<AppConfig>>,
    Path(practitioner_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;

    let page = service
        .list_for_practitioner(practitioner_id, query.page, query.page_size, auth.token())
        .await
        .map_err(|e| match e {
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!(page)))
}

#[axum::debug_handler]
pub async fn list_patient_consultations(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;

    let page = service
        .list_for_patient(patient_id, query.page, query.page_size, auth.token())
        .await
        .map_err(|e| match e {
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!(page)))
}

// ==============================================================================
// SYSTEM ADMINISTRATION HANDLERS
// ==============================================================================

/// Sweep stale unattended sessions into NO_SHOW.
#[axum::debug_handler]
pub async fn reap_no_shows(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<ReapNoShowsRequest>,
) -> Result<Json<Value>, AppError> {
    let service = lifecycle_service(&state)?;
    let grace_minutes = request
        .grace_minutes
        .unwrap_or(state.no_show_grace_minutes)
        .max(1);

    let reaped = service
        .reap_no_shows(grace_minutes, auth.token())
        .await
        .map_err(|e| match e {
            TelemedicineError::DatabaseError { message } => AppError::Database(message),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "reaped_sessions": reaped,
        "grace_minutes": grace_minutes,
        "message": format!("Marked {} stale sessions as no-show", reaped)
    })))
}

/// Health check for the telemedicine cell.
#[axum::debug_handler]
pub async fn consultation_health_check(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let room_provider_configured = state.is_room_provider_configured();

    Ok(Json(json!({
        "status": if room_provider_configured { "healthy" } else { "not_configured" },
        "room_provider_configured": room_provider_configured,
        "message": if room_provider_configured {
            "Telemedicine system is operational"
        } else {
            "Room provider not configured"
        }
    })))
}
