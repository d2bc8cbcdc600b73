use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Store-locator page whose embedded JSON lists every location.
    pub locations_url: String,
    /// JSON file tracking when each store last changed status category.
    pub status_history_path: PathBuf,
    pub nws_base_url: String,
    /// NHC map-server query returning forecast cones as GeoJSON.
    pub hurricane_cones_url: String,
    /// RainViewer index of available radar frames.
    pub radar_maps_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub proximity_radius_miles: f64,
    pub freshness_window_hours: i64,
    pub batch_size: usize,
    /// Six-field cron expression (seconds first) for the periodic refresh.
    pub refresh_cron: String,
}
