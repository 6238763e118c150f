// libs/telemedicine-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// TELEMEDICINE DOMAIN MODELS
// ==============================================================================

/// One video-consultation encounter. One-to-one with an external room
/// allocation, many-to-one with an appointment over time (restarting after an
/// ended session creates a fresh row). Rows are audit records of clinical
/// encounters and are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationSession {
    pub id: Uuid,
    pub appointment_id: Uuid,

    // Ownership references resolved at creation time plus denormalized
    // display names, captured once so history survives later renames.
    pub practitioner_id: Uuid,
    pub practitioner_name: String,
    pub patient_id: Uuid,
    pub patient_name: String,

    // Provisioned room, set exactly once at creation.
    pub room_id: String,
    pub room_name: String,
    pub room_url: String,

    pub status: SessionStatus,
    pub scheduled_start_time: DateTime<Utc>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,

    // Each join timestamp is written at most once.
    pub practitioner_joined_at: Option<DateTime<Utc>>,
    pub patient_joined_at: Option<DateTime<Utc>>,

    pub ended_by: Option<EndedBy>,
    pub cancellation_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    #[serde(rename = "SCHEDULED")]
    Scheduled,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    #[serde(rename = "NO_SHOW")]
    NoShow,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "SCHEDULED",
            SessionStatus::InProgress => "IN_PROGRESS",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Cancelled => "CANCELLED",
            SessionStatus::NoShow => "NO_SHOW",
        }
    }

    /// Terminal sessions accept no further transitions or field mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::NoShow
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EndedBy {
    #[serde(rename = "PRACTITIONER")]
    Practitioner,
    #[serde(rename = "PATIENT")]
    Patient,
    #[serde(rename = "SYSTEM")]
    System,
}

// ==============================================================================
// APPOINTMENT REGISTRY BOUNDARY
// ==============================================================================

/// Appointment record as the registry stores it. The practitioner is kept as
/// the human-assigned external code (e.g. `DOC001`); the patient as the
/// internal reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: Uuid,
    pub practitioner_code: String,
    pub practitioner_name: String,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub appointment_date: DateTime<Utc>,
    pub consultation_mode: ConsultationMode,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsultationMode {
    #[serde(rename = "REMOTE")]
    Remote,
    #[serde(rename = "IN_PERSON")]
    InPerson,
}

// ==============================================================================
// ROOM PROVIDER API MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RoomProvisionRequest {
    pub name: String,
    pub privacy: String,
    pub properties: RoomProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomProperties {
    pub max_participants: i32,
    pub enable_screenshare: bool,
    pub enable_chat: bool,
    pub enable_recording: String,
    pub geo: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionedRoom {
    pub url: String,
    pub name: String,
}

// ==============================================================================
// API REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// External practitioner identifier, as recorded on the appointment.
    pub practitioner_id: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinSessionRequest {
    pub patient_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    pub practitioner_id: Uuid,
    pub ended_by: Option<EndedBy>,
}

#[derive(Debug, Deserialize)]
pub struct CancelSessionRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ReapNoShowsRequest {
    pub grace_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub room_name: String,
    pub room_url: String,
    pub practitioner_name: String,
    pub patient_name: String,
    pub status: SessionStatus,
}

impl From<&ConsultationSession> for SessionSummary {
    fn from(session: &ConsultationSession) -> Self {
        Self {
            session_id: session.id,
            room_name: session.room_name.clone(),
            room_url: session.room_url.clone(),
            practitioner_name: session.practitioner_name.clone(),
            patient_name: session.patient_name.clone(),
            status: session.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EndResult {
    pub session_id: Uuid,
    pub duration_minutes: i64,
    pub appointment_id: Uuid,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub practitioner_joined: bool,
    pub patient_joined: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub room_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionPage {
    pub sessions: Vec<ConsultationSession>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

// ==============================================================================
// ERROR HANDLING
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TelemedicineError {
    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Practitioner not found")]
    PractitionerNotFound,

    #[error("Consultation session not found")]
    SessionNotFound,

    #[error("You are not authorized to start this consultation")]
    NotAppointmentPractitioner,

    #[error("This appointment is not scheduled for a remote consultation")]
    NotRemoteAppointment,

    #[error("Consultation already ended")]
    AlreadyEnded,

    #[error("Consultation session is already {status}")]
    SessionFinished { status: &'static str },

    #[error("Room provisioning failed: {message}")]
    RoomProvisioningFailed { message: String },

    #[error("Video consultations not configured")]
    NotConfigured,

    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

impl From<shared_database::SupabaseError> for TelemedicineError {
    fn from(err: shared_database::SupabaseError) -> Self {
        TelemedicineError::DatabaseError {
            message: err.to_string(),
        }
    }
}
