//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers and workers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// SQLite database holding the legacy TBS tables.
    pub legacy_database_url: String,
    pub zmq_notifications_pub: String,
    pub secret: String,
    #[serde(default = "default_reminder_interval_secs")]
    pub reminder_interval_secs: u64,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: i64,
    /// Hub that receives records imported from TBS.
    pub migration_hub_id: i32,
}

fn default_reminder_interval_secs() -> u64 {
    3600
}

fn default_retry_delay_secs() -> u64 {
    300
}

fn default_reminder_window_hours() -> i64 {
    24
}

#[cfg(feature = "server")]
impl ServerConfig {
    /// Reads `config/default.yaml`, then `config/{APP_ENV}.yaml` if present
    /// (`APP_ENV` defaults to `local`), then `APP_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}
