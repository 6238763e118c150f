// libs/telemedicine-cell/src/services/appointments.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{AppointmentRecord, TelemedicineError};

/// Read/update boundary into the Appointment Registry. The orchestrator never
/// owns appointment rows; it reads them and posts a best-effort status update
/// when a consultation goes live.
pub struct AppointmentRegistry {
    supabase: Arc<SupabaseClient>,
}

impl AppointmentRegistry {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn get_by_id(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<AppointmentRecord, TelemedicineError> {
        debug!("Fetching appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<AppointmentRecord> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or(TelemedicineError::AppointmentNotFound)
    }

    pub async fn mark_in_progress(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), TelemedicineError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let body = json!({
            "status": "IN_CONSULTATION",
            "consultation_started_at": Utc::now(),
        });

        let _: Vec<Value> = self
            .supabase
            .request(Method::PATCH, &path, Some(auth_token), Some(body))
            .await?;

        Ok(())
    }
}
