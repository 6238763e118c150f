use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub room_provider_base_url: String,
    pub room_provider_api_key: String,
    pub room_provider_region: String,
    pub no_show_grace_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            room_provider_base_url: env::var("ROOM_PROVIDER_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("ROOM_PROVIDER_BASE_URL not set, using empty value");
                    String::new()
                }),
            room_provider_api_key: env::var("ROOM_PROVIDER_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("ROOM_PROVIDER_API_KEY not set, using empty value");
                    String::new()
                }),
            room_provider_region: env::var("ROOM_PROVIDER_REGION")
                .unwrap_or_else(|_| "ap-south-1".to_string()),
            no_show_grace_minutes: env::var("NO_SHOW_GRACE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_room_provider_configured(&self) -> bool {
        !self.room_provider_base_url.is_empty() && !self.room_provider_api_key.is_empty()
    }
}
