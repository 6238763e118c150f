// libs/telemedicine-cell/src/lib.rs
//! # Telemedicine Cell
//!
//! This cell orchestrates live video consultations: it turns a scheduled
//! appointment into a two-party session, provisions an external video room
//! exactly once per session, tracks participant joins and finalizes the
//! encounter with a computed duration and outcome.
//!
//! ## Architecture
//!
//! The cell follows the established cell architecture pattern:
//!
//! ```text
//! +-----------------------------------------------------+
//! |                Telemedicine Cell                    |
//! +-----------------------------------------------------+
//! |  handlers.rs     |  HTTP endpoint handlers          |
//! |  router.rs       |  Route definitions               |
//! |  models.rs       |  Session entity, DTOs, errors    |
//! |  services/       |  Business logic layer            |
//! |    lifecycle.rs  |  Session lifecycle manager       |
//! |    store.rs      |  Session store (PostgREST)       |
//! |    rooms.rs      |  Room provider client            |
//! |    directory.rs  |  Practitioner identity resolver  |
//! |    appointments.rs| Appointment registry boundary   |
//! +-----------------------------------------------------+
//! ```
//!
//! ## Session state machine
//!
//! `SCHEDULED -> IN_PROGRESS` on start; `IN_PROGRESS -> COMPLETED` on end;
//! either active state may move to `CANCELLED` or `NO_SHOW`. Completed,
//! cancelled and no-show sessions are terminal. Start is idempotent (one
//! active session per appointment, enforced by a store-level uniqueness
//! constraint); end is deliberately not, so a duration is never recomputed.
//!
//! ## API Endpoints
//!
//! - `POST /appointments/{id}/start` - Start or re-enter a consultation
//! - `POST /appointments/{id}/join` - Patient join
//! - `POST /sessions/{id}/end` - Finalize with duration
//! - `POST /sessions/{id}/cancel` - Cancel with reason
//! - `GET /sessions/{id}/status` - Status snapshot
//! - `GET /practitioners/{id}/sessions` - Practitioner history (paginated)
//! - `GET /patients/{id}/sessions` - Patient history (paginated)
//! - `POST /admin/reap-no-shows` - No-show sweep
//! - `GET /health` - Health check
//!
//! ## Configuration
//!
//! Required environment variables:
//! - `ROOM_PROVIDER_BASE_URL` - Room provider API base URL
//! - `ROOM_PROVIDER_API_KEY` - Room provider API token
//! - `ROOM_PROVIDER_REGION` - Geographic region for room placement (optional)
//! - `NO_SHOW_GRACE_MINUTES` - Grace period for the no-show sweep (optional)

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export commonly used types
pub use models::{
    ConsultationMode, ConsultationSession, EndResult, EndedBy, SessionPage, SessionStatus,
    SessionSummary, StatusSnapshot, TelemedicineError,
};

pub use services::{
    AppointmentRegistry, PractitionerDirectory, RoomProviderClient, SessionLifecycleService,
    SessionStore,
};

pub use router::telemedicine_routes;
