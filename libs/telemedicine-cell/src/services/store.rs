// libs/telemedicine-cell/src/services/store.rs
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::{SupabaseClient, SupabaseError};

use crate::models::{ConsultationSession, EndedBy, SessionStatus, TelemedicineError};

const SESSIONS_TABLE: &str = "/rest/v1/video_sessions";

// PostgREST filter for the two non-terminal statuses.
const ACTIVE_FILTER: &str = "status=in.(SCHEDULED,IN_PROGRESS)";

/// Durable collection of consultation sessions over PostgREST.
///
/// The table carries a partial unique index on `appointment_id` restricted to
/// active statuses, so at most one active session can exist per appointment no
/// matter how many writers race. All writes come through the lifecycle
/// manager.
pub struct SessionStore {
    supabase: Arc<SupabaseClient>,
}

impl SessionStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Insert a new session row. Returns `false` when the active-session
    /// uniqueness index rejected the row, meaning a concurrent start already
    /// created one for the same appointment.
    pub async fn insert(
        &self,
        session: &ConsultationSession,
        auth_token: &str,
    ) -> Result<bool, TelemedicineError> {
        debug!("Inserting session {} for appointment {}", session.id, session.appointment_id);

        let body = serde_json::to_value(session).map_err(|e| TelemedicineError::DatabaseError {
            message: format!("Failed to serialize session: {}", e),
        })?;

        match self
            .supabase
            .request::<Vec<Value>>(Method::POST, SESSIONS_TABLE, Some(auth_token), Some(body))
            .await
        {
            Ok(_) => Ok(true),
            Err(SupabaseError::Conflict(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_active_by_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<ConsultationSession>, TelemedicineError> {
        let path = format!(
            "{}?appointment_id=eq.{}&{}",
            SESSIONS_TABLE, appointment_id, ACTIVE_FILTER
        );
        self.find_one(&path, auth_token).await
    }

    pub async fn find_active_for_patient(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<ConsultationSession>, TelemedicineError> {
        let path = format!(
            "{}?appointment_id=eq.{}&patient_id=eq.{}&{}",
            SESSIONS_TABLE, appointment_id, patient_id, ACTIVE_FILTER
        );
        self.find_one(&path, auth_token).await
    }

    pub async fn find_by_id(
        &self,
        session_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<ConsultationSession>, TelemedicineError> {
        let path = format!("{}?id=eq.{}", SESSIONS_TABLE, session_id);
        self.find_one(&path, auth_token).await
    }

    /// Lookup scoped to the owning practitioner. A missing row covers both
    /// "no such session" and "not yours" without leaking which one it was.
    pub async fn find_owned(
        &self,
        session_id: Uuid,
        practitioner_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<ConsultationSession>, TelemedicineError> {
        let path = format!(
            "{}?id=eq.{}&practitioner_id=eq.{}",
            SESSIONS_TABLE, session_id, practitioner_id
        );
        self.find_one(&path, auth_token).await
    }

    pub async fn mark_patient_joined(
        &self,
        session_id: Uuid,
        joined_at: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<(), TelemedicineError> {
        let body = json!({
            "patient_joined_at": joined_at,
            "updated_at": joined_at,
        });
        self.patch_by_id(session_id, body, auth_token).await
    }

    pub async fn finalize(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        end_time: DateTime<Utc>,
        duration_minutes: i64,
        ended_by: EndedBy,
        auth_token: &str,
    ) -> Result<(), TelemedicineError> {
        let body = json!({
            "status": status,
            "end_time": end_time,
            "duration_minutes": duration_minutes,
            "ended_by": ended_by,
            "updated_at": end_time,
        });
        self.patch_by_id(session_id, body, auth_token).await
    }

    pub async fn cancel(
        &self,
        session_id: Uuid,
        reason: &str,
        cancelled_at: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<(), TelemedicineError> {
        let body = json!({
            "status": SessionStatus::Cancelled,
            "cancellation_reason": reason,
            "end_time": cancelled_at,
            "updated_at": cancelled_at,
        });
        self.patch_by_id(session_id, body, auth_token).await
    }

    /// In-progress sessions whose patient never joined and that started
    /// before the cutoff. Candidates for the no-show sweep.
    pub async fn find_unattended_before(
        &self,
        cutoff: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Vec<ConsultationSession>, TelemedicineError> {
        let path = format!(
            "{}?status=eq.IN_PROGRESS&patient_joined_at=is.null&actual_start_time=lt.{}",
            SESSIONS_TABLE,
            cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let rows: Vec<ConsultationSession> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(rows)
    }

    pub async fn page_for_practitioner(
        &self,
        practitioner_id: Uuid,
        page: i64,
        page_size: i64,
        auth_token: &str,
    ) -> Result<(Vec<ConsultationSession>, i64), TelemedicineError> {
        let path = format!(
            "{}?practitioner_id=eq.{}&order=created_at.desc&limit={}&offset={}",
            SESSIONS_TABLE,
            practitioner_id,
            page_size,
            page_offset(page, page_size)
        );
        Ok(self.supabase.select_counted(&path, Some(auth_token)).await?)
    }

    pub async fn page_for_patient(
        &self,
        patient_id: Uuid,
        page: i64,
        page_size: i64,
        auth_token: &str,
    ) -> Result<(Vec<ConsultationSession>, i64), TelemedicineError> {
        let path = format!(
            "{}?patient_id=eq.{}&order=created_at.desc&limit={}&offset={}",
            SESSIONS_TABLE,
            patient_id,
            page_size,
            page_offset(page, page_size)
        );
        Ok(self.supabase.select_counted(&path, Some(auth_token)).await?)
    }

    async fn find_one(
        &self,
        path: &str,
        auth_token: &str,
    ) -> Result<Option<ConsultationSession>, TelemedicineError> {
        let rows: Vec<ConsultationSession> = self
            .supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn patch_by_id(
        &self,
        session_id: Uuid,
        body: Value,
        auth_token: &str,
    ) -> Result<(), TelemedicineError> {
        let path = format!("{}?id=eq.{}", SESSIONS_TABLE, session_id);
        let _: Vec<Value> = self
            .supabase
            .request(Method::PATCH, &path, Some(auth_token), Some(body))
            .await?;
        Ok(())
    }
}

// Saturating so an absurd page number yields a past-the-end offset instead of
// overflowing.
fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1).saturating_mul(page_size)
}
