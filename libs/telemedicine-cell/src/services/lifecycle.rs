// libs/telemedicine-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    ConsultationMode, ConsultationSession, EndResult, EndedBy, SessionPage, SessionStatus,
    SessionSummary, StatusSnapshot, TelemedicineError,
};
use crate::services::appointments::AppointmentRegistry;
use crate::services::directory::PractitionerDirectory;
use crate::services::rooms::RoomProviderClient;
use crate::services::store::SessionStore;

const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Session Lifecycle Manager.
///
/// The sole writer of session rows: turns a scheduled appointment into a live
/// two-party session, provisions the external room exactly once per session,
/// records join timestamps and finalizes the encounter with a computed
/// duration.
pub struct SessionLifecycleService {
    registry: AppointmentRegistry,
    directory: PractitionerDirectory,
    store: SessionStore,
    rooms: RoomProviderClient,
}

impl SessionLifecycleService {
    pub fn new(config: &AppConfig) -> Result<Self, TelemedicineError> {
        let supabase = Arc::new(SupabaseClient::new(config));

        Ok(Self {
            registry: AppointmentRegistry::new(supabase.clone()),
            directory: PractitionerDirectory::new(supabase.clone()),
            store: SessionStore::new(supabase),
            rooms: RoomProviderClient::new(config)?,
        })
    }

    /// Start a consultation for an appointment, or return the one already
    /// running. Safe to call repeatedly: client retries and page reloads
    /// converge on a single active session per appointment.
    pub async fn start(
        &self,
        appointment_id: Uuid,
        practitioner_code: &str,
        auth_token: &str,
    ) -> Result<SessionSummary, TelemedicineError> {
        info!(
            "Starting consultation for appointment {} by practitioner {}",
            appointment_id, practitioner_code
        );

        let appointment = self.registry.get_by_id(appointment_id, auth_token).await?;

        // The appointment stores the external, human-readable code; compare in
        // that form before touching the directory.
        if appointment.practitioner_code != practitioner_code {
            return Err(TelemedicineError::NotAppointmentPractitioner);
        }

        let practitioner_id = self
            .directory
            .resolve_internal_ref(practitioner_code, auth_token)
            .await?;

        if appointment.consultation_mode != ConsultationMode::Remote {
            return Err(TelemedicineError::NotRemoteAppointment);
        }

        if let Some(existing) = self
            .store
            .find_active_by_appointment(appointment_id, auth_token)
            .await?
        {
            info!(
                "Active session {} already exists for appointment {}",
                existing.id, appointment_id
            );
            return Ok(SessionSummary::from(&existing));
        }

        let session_id = Uuid::new_v4();
        let room_name = format!(
            "consult-{}-{}",
            appointment_id,
            &session_id.simple().to_string()[..8]
        );

        // Provision before persisting: a failed start must leave no session
        // row behind.
        let room = self.rooms.provision(&room_name).await?;

        let now = Utc::now();
        let session = ConsultationSession {
            id: session_id,
            appointment_id,
            practitioner_id,
            practitioner_name: appointment.practitioner_name.clone(),
            patient_id: appointment.patient_id,
            patient_name: appointment.patient_name.clone(),
            room_id: Uuid::new_v4().to_string(),
            room_name: room.name,
            room_url: room.url,
            status: SessionStatus::InProgress,
            scheduled_start_time: appointment.appointment_date,
            actual_start_time: Some(now),
            end_time: None,
            duration_minutes: None,
            practitioner_joined_at: Some(now),
            patient_joined_at: None,
            ended_by: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(&session, auth_token).await?;
        let session = if created {
            session
        } else {
            // Lost the check-then-act race: the uniqueness index kept the
            // winning row, so re-read it once and converge on it.
            self.store
                .find_active_by_appointment(appointment_id, auth_token)
                .await?
                .ok_or(TelemedicineError::SessionNotFound)?
        };

        if created {
            // Best-effort: the session row is the source of truth for
            // consultation state, a failed registry update never rolls it back.
            if let Err(e) = self
                .registry
                .mark_in_progress(appointment_id, auth_token)
                .await
            {
                warn!(
                    "Failed to mark appointment {} in progress: {}",
                    appointment_id, e
                );
            }

            info!(
                "Created session {} for appointment {}",
                session.id, appointment_id
            );
        }

        Ok(SessionSummary::from(&session))
    }

    /// Record the patient joining the active session for an appointment. The
    /// join timestamp is written on first join only; later calls are no-ops
    /// on that field.
    pub async fn join(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<SessionSummary, TelemedicineError> {
        // One query covers "never started" and "wrong patient" alike.
        let session = self
            .store
            .find_active_for_patient(appointment_id, patient_id, auth_token)
            .await?
            .ok_or(TelemedicineError::SessionNotFound)?;

        if session.patient_joined_at.is_none() {
            self.store
                .mark_patient_joined(session.id, Utc::now(), auth_token)
                .await?;
            info!("Patient joined session {}", session.id);
        }

        Ok(SessionSummary::from(&session))
    }

    /// Finalize a session. Deliberately not idempotent: the duration is
    /// computed exactly once, so a second end on the same session is an
    /// invalid-state error.
    pub async fn end(
        &self,
        session_id: Uuid,
        practitioner_id: Uuid,
        ended_by: Option<EndedBy>,
        auth_token: &str,
    ) -> Result<EndResult, TelemedicineError> {
        let session = self
            .store
            .find_owned(session_id, practitioner_id, auth_token)
            .await?
            .ok_or(TelemedicineError::SessionNotFound)?;

        match session.status {
            SessionStatus::Completed => return Err(TelemedicineError::AlreadyEnded),
            status if status.is_terminal() => {
                return Err(TelemedicineError::SessionFinished {
                    status: status.as_str(),
                })
            }
            _ => {}
        }

        let end_time = Utc::now();
        let duration_minutes = session
            .actual_start_time
            .map(|start| end_time.signed_duration_since(start).num_minutes())
            .unwrap_or(0);
        let ended_by = ended_by.unwrap_or(EndedBy::Practitioner);

        self.store
            .finalize(
                session.id,
                SessionStatus::Completed,
                end_time,
                duration_minutes,
                ended_by,
                auth_token,
            )
            .await?;

        // The owning appointment is left untouched: a practitioner may start
        // a fresh session against the same appointment after this one ends.

        info!(
            "Ended session {} after {} minutes",
            session.id, duration_minutes
        );

        Ok(EndResult {
            session_id: session.id,
            duration_minutes,
            appointment_id: session.appointment_id,
            status: SessionStatus::Completed,
        })
    }

    pub async fn get_status(
        &self,
        session_id: Uuid,
        auth_token: &str,
    ) -> Result<StatusSnapshot, TelemedicineError> {
        let session = self
            .store
            .find_by_id(session_id, auth_token)
            .await?
            .ok_or(TelemedicineError::SessionNotFound)?;

        let duration_minutes = match session.status {
            SessionStatus::InProgress => session
                .actual_start_time
                .map(|start| Utc::now().signed_duration_since(start).num_minutes())
                .unwrap_or(0),
            _ => session.duration_minutes.unwrap_or(0),
        };

        Ok(StatusSnapshot {
            session_id: session.id,
            status: session.status,
            practitioner_joined: session.practitioner_joined_at.is_some(),
            patient_joined: session.patient_joined_at.is_some(),
            started_at: session.actual_start_time,
            duration_minutes,
            room_url: session.room_url,
        })
    }

    pub async fn list_for_practitioner(
        &self,
        practitioner_id: Uuid,
        page: Option<i64>,
        page_size: Option<i64>,
        auth_token: &str,
    ) -> Result<SessionPage, TelemedicineError> {
        let (page, page_size) = clamp_page(page, page_size);
        let (sessions, total) = self
            .store
            .page_for_practitioner(practitioner_id, page, page_size, auth_token)
            .await?;
        Ok(build_page(sessions, total, page, page_size))
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        page: Option<i64>,
        page_size: Option<i64>,
        auth_token: &str,
    ) -> Result<SessionPage, TelemedicineError> {
        let (page, page_size) = clamp_page(page, page_size);
        let (sessions, total) = self
            .store
            .page_for_patient(patient_id, page, page_size, auth_token)
            .await?;
        Ok(build_page(sessions, total, page, page_size))
    }

    /// Cancel a session from an external trigger. Terminal sessions reject
    /// the transition.
    pub async fn cancel(
        &self,
        session_id: Uuid,
        reason: &str,
        auth_token: &str,
    ) -> Result<(), TelemedicineError> {
        let session = self
            .store
            .find_by_id(session_id, auth_token)
            .await?
            .ok_or(TelemedicineError::SessionNotFound)?;

        if session.status.is_terminal() {
            return Err(TelemedicineError::SessionFinished {
                status: session.status.as_str(),
            });
        }

        self.store
            .cancel(session.id, reason, Utc::now(), auth_token)
            .await?;

        info!("Cancelled session {}: {}", session.id, reason);
        Ok(())
    }

    /// Sweep in-progress sessions whose patient never joined within the grace
    /// period and mark them NO_SHOW. Returns how many were transitioned.
    pub async fn reap_no_shows(
        &self,
        grace_minutes: i64,
        auth_token: &str,
    ) -> Result<usize, TelemedicineError> {
        let cutoff = Utc::now() - Duration::minutes(grace_minutes);
        let stale = self
            .store
            .find_unattended_before(cutoff, auth_token)
            .await?;

        let mut reaped = 0;
        for session in stale {
            self.store
                .finalize(
                    session.id,
                    SessionStatus::NoShow,
                    Utc::now(),
                    0,
                    EndedBy::System,
                    auth_token,
                )
                .await?;
            info!("Marked session {} as no-show", session.id);
            reaped += 1;
        }

        Ok(reaped)
    }
}

fn clamp_page(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, page_size)
}

fn build_page(
    sessions: Vec<ConsultationSession>,
    total: i64,
    page: i64,
    page_size: i64,
) -> SessionPage {
    SessionPage {
        sessions,
        total,
        page,
        total_pages: (total + page_size - 1) / page_size,
    }
}
