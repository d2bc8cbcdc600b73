use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config. Tests drive this with a `HashMap` lookup instead of `set_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        or_default(var, default)
            .parse::<i64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("STORMWATCH_ENV", "development"))?;
    let bind_addr = parse_addr("STORMWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STORMWATCH_LOG_LEVEL", "info");

    let locations_url = or_default(
        "STORMWATCH_LOCATIONS_URL",
        "https://locations.wafflehouse.com/",
    );
    let status_history_path = PathBuf::from(or_default(
        "STORMWATCH_STATUS_HISTORY_PATH",
        "./data/sensor-status.json",
    ));
    let nws_base_url = or_default("STORMWATCH_NWS_BASE_URL", "https://api.weather.gov");
    let hurricane_cones_url = or_default(
        "STORMWATCH_HURRICANE_CONES_URL",
        "https://mapservices.weather.noaa.gov/tropical/rest/services/tropical/NHC_tropical_weather_summary/MapServer/7/query?where=1%3D1&outFields=*&f=geojson",
    );
    let radar_maps_url = or_default(
        "STORMWATCH_RADAR_MAPS_URL",
        "https://api.rainviewer.com/public/weather-maps.json",
    );
    let user_agent = or_default(
        "STORMWATCH_USER_AGENT",
        "stormwatch/0.1 (storm-closure-tracking)",
    );

    let request_timeout_secs = parse_u64("STORMWATCH_REQUEST_TIMEOUT_SECS", "15")?;
    let max_retries = parse_u32("STORMWATCH_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("STORMWATCH_RETRY_BACKOFF_BASE_MS", "500")?;

    let proximity_radius_miles = parse_f64("STORMWATCH_PROXIMITY_RADIUS_MILES", "1.0")?;
    if !proximity_radius_miles.is_finite() || proximity_radius_miles <= 0.0 {
        return Err(invalid(
            "STORMWATCH_PROXIMITY_RADIUS_MILES",
            format!("radius must be a positive number of miles, got {proximity_radius_miles}"),
        ));
    }

    let freshness_window_hours = parse_i64("STORMWATCH_FRESHNESS_WINDOW_HOURS", "24")?;
    if freshness_window_hours < 0 {
        return Err(invalid(
            "STORMWATCH_FRESHNESS_WINDOW_HOURS",
            format!("window must not be negative, got {freshness_window_hours}"),
        ));
    }
    if chrono::TimeDelta::try_hours(freshness_window_hours).is_none() {
        return Err(invalid(
            "STORMWATCH_FRESHNESS_WINDOW_HOURS",
            format!("window of {freshness_window_hours} hours is too large"),
        ));
    }

    let batch_size = parse_usize("STORMWATCH_BATCH_SIZE", "50")?;
    if batch_size == 0 {
        return Err(invalid(
            "STORMWATCH_BATCH_SIZE",
            "batch size must be at least 1".to_string(),
        ));
    }

    let refresh_cron = or_default("STORMWATCH_REFRESH_CRON", "0 */5 * * * *");
    // Same parser settings the scheduler applies when the job is registered.
    croner::Cron::new(&refresh_cron)
        .with_seconds_required()
        .with_dom_and_dow()
        .parse()
        .map_err(|e| invalid("STORMWATCH_REFRESH_CRON", e.to_string()))?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        locations_url,
        status_history_path,
        nws_base_url,
        hurricane_cones_url,
        radar_maps_url,
        user_agent,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        proximity_radius_miles,
        freshness_window_hours,
        batch_size,
        refresh_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STORMWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
