// libs/telemedicine-cell/src/services/directory.rs
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::TelemedicineError;

/// Identity Resolver over the practitioner directory.
///
/// Appointments record practitioners by their stable human-assigned code
/// (`DOC001`); session ownership uses the directory's internal reference. The
/// two identifier spaces are reconciled here, exactly once, at session
/// creation.
pub struct PractitionerDirectory {
    supabase: Arc<SupabaseClient>,
}

impl PractitionerDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn resolve_internal_ref(
        &self,
        practitioner_code: &str,
        auth_token: &str,
    ) -> Result<Uuid, TelemedicineError> {
        debug!("Resolving practitioner code {}", practitioner_code);

        let path = format!(
            "/rest/v1/practitioners?practitioner_code=eq.{}&select=id",
            practitioner_code
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        result
            .into_iter()
            .next()
            .and_then(|row| row["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()))
            .ok_or(TelemedicineError::PractitionerNotFound)
    }
}
