use std::sync::Arc;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub room_provider_base_url: String,
    pub room_provider_api_key: String,
    pub room_provider_region: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            room_provider_base_url: "http://localhost:54400".to_string(),
            room_provider_api_key: "test-room-provider-key".to_string(),
            room_provider_region: "ap-south-1".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            room_provider_base_url: self.room_provider_base_url.clone(),
            room_provider_api_key: self.room_provider_api_key.clone(),
            room_provider_region: self.room_provider_region.clone(),
            no_show_grace_minutes: 15,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}
