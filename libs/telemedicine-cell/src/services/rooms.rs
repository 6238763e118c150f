// libs/telemedicine-cell/src/services/rooms.rs
use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{ProvisionedRoom, RoomProperties, RoomProvisionRequest, TelemedicineError};

/// Thin client around the external Room Provider.
///
/// One operation: allocate a private two-party room for a logical name. The
/// provider's request/response shapes stay inside this module; only the room
/// url and name reach the session record.
pub struct RoomProviderClient {
    client: Client,
    base_url: String,
    api_key: String,
    region: String,
}

impl RoomProviderClient {
    pub fn new(config: &AppConfig) -> Result<Self, TelemedicineError> {
        if !config.is_room_provider_configured() {
            return Err(TelemedicineError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.room_provider_base_url.clone(),
            api_key: config.room_provider_api_key.clone(),
            region: config.room_provider_region.clone(),
        })
    }

    /// Allocate a room via `POST /rooms`.
    ///
    /// Any transport error or non-2xx response is a hard failure; no retry is
    /// attempted here, the caller decides whether starting over is safe.
    pub async fn provision(&self, room_name: &str) -> Result<ProvisionedRoom, TelemedicineError> {
        info!("Provisioning video room: {}", room_name);

        let url = format!("{}/rooms", self.base_url);

        let request_body = RoomProvisionRequest {
            name: room_name.to_string(),
            privacy: "private".to_string(),
            properties: RoomProperties {
                max_participants: 2,
                enable_screenshare: true,
                enable_chat: true,
                enable_recording: "cloud".to_string(),
                geo: self.region.clone(),
            },
        };

        debug!("Sending room provisioning request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| TelemedicineError::RoomProvisioningFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        let response_text =
            response
                .text()
                .await
                .map_err(|e| TelemedicineError::RoomProvisioningFailed {
                    message: e.to_string(),
                })?;

        if !status.is_success() {
            error!("Room provisioning failed: {} - {}", status, response_text);
            return Err(TelemedicineError::RoomProvisioningFailed {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        let room: ProvisionedRoom = serde_json::from_str(&response_text).map_err(|e| {
            TelemedicineError::RoomProvisioningFailed {
                message: format!("Failed to parse room response: {}", e),
            }
        })?;

        info!("Successfully provisioned room {} at {}", room.name, room.url);
        Ok(room)
    }
}
