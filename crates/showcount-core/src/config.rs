use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::str::FromStr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank secrets are treated the same as unset ones.
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SHOWCOUNT_ENV", "development"));

    let bind_addr: SocketAddr = parse_as(
        "SHOWCOUNT_BIND_ADDR",
        &or_default("SHOWCOUNT_BIND_ADDR", "0.0.0.0:8000"),
    )?;
    let log_level = or_default("SHOWCOUNT_LOG_LEVEL", "info");

    let anthropic_api_key = optional("ANTHROPIC_API_KEY");
    let anthropic_base_url = or_default("ANTHROPIC_BASE_URL", "https://api.anthropic.com");
    let extraction_model = or_default("SHOWCOUNT_EXTRACTION_MODEL", "claude-sonnet-4-20250514");
    let date_model = or_default("SHOWCOUNT_DATE_MODEL", "claude-haiku-4-5-20251001");
    let llm_timeout_secs: u64 = parse_as(
        "SHOWCOUNT_LLM_TIMEOUT_SECS",
        &or_default("SHOWCOUNT_LLM_TIMEOUT_SECS", "180"),
    )?;
    let llm_max_retries: u32 = parse_as(
        "SHOWCOUNT_LLM_MAX_RETRIES",
        &or_default("SHOWCOUNT_LLM_MAX_RETRIES", "2"),
    )?;
    let llm_retry_backoff_base_ms: u64 = parse_as(
        "SHOWCOUNT_LLM_RETRY_BACKOFF_BASE_MS",
        &or_default("SHOWCOUNT_LLM_RETRY_BACKOFF_BASE_MS", "1000"),
    )?;

    let google_maps_api_key = optional("GOOGLE_MAPS_API_KEY");
    let geocode_timeout_secs: u64 = parse_as(
        "SHOWCOUNT_GEOCODE_TIMEOUT_SECS",
        &or_default("SHOWCOUNT_GEOCODE_TIMEOUT_SECS", "10"),
    )?;
    let store_timeout_secs: u64 = parse_as(
        "SHOWCOUNT_STORE_TIMEOUT_SECS",
        &or_default("SHOWCOUNT_STORE_TIMEOUT_SECS", "10"),
    )?;

    let batch_size: usize = parse_as(
        "SHOWCOUNT_BATCH_SIZE",
        &or_default("SHOWCOUNT_BATCH_SIZE", "10"),
    )?;
    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOWCOUNT_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let max_upload_bytes: usize = parse_as(
        "SHOWCOUNT_MAX_UPLOAD_BYTES",
        &or_default("SHOWCOUNT_MAX_UPLOAD_BYTES", "10485760"),
    )?;

    let db_max_connections: u32 = parse_as(
        "SHOWCOUNT_DB_MAX_CONNECTIONS",
        &or_default("SHOWCOUNT_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "SHOWCOUNT_DB_MIN_CONNECTIONS",
        &or_default("SHOWCOUNT_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "SHOWCOUNT_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("SHOWCOUNT_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        anthropic_api_key,
        anthropic_base_url,
        extraction_model,
        date_model,
        llm_timeout_secs,
        llm_max_retries,
        llm_retry_backoff_base_ms,
        google_maps_api_key,
        geocode_timeout_secs,
        store_timeout_secs,
        batch_size,
        max_upload_bytes,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
