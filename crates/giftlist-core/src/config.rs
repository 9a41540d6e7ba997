use crate::app_config::{AppConfig, Environment};
use crate::error::ConfigError;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let scraper_api_key = require("GIFTLIST_SCRAPER_API_KEY")?;

    let env = parse_environment(&or_default("GIFTLIST_ENV", "development"));

    let bind_addr = parse_addr("GIFTLIST_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("GIFTLIST_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("GIFTLIST_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("GIFTLIST_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("GIFTLIST_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_proxy_base_url = or_default(
        "GIFTLIST_SCRAPER_PROXY_BASE_URL",
        "https://proxy.scrapeops.io/v1/",
    );
    let scraper_country = or_default("GIFTLIST_SCRAPER_COUNTRY", "gh");
    let scraper_source_base_url =
        or_default("GIFTLIST_SCRAPER_SOURCE_BASE_URL", "https://melcom.com");
    // The proxy renders JS server-side, so a single page fetch can take a
    // while; the original tolerated 60s.
    let scraper_request_timeout_secs = parse_u64("GIFTLIST_SCRAPER_REQUEST_TIMEOUT_SECS", "60")?;
    let scraper_max_pages_per_category = parse_u32("GIFTLIST_SCRAPER_MAX_PAGES_PER_CATEGORY", "3")?;
    let scraper_inter_request_delay_ms =
        parse_u64("GIFTLIST_SCRAPER_INTER_REQUEST_DELAY_MS", "250")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_proxy_base_url,
        scraper_api_key,
        scraper_country,
        scraper_source_base_url,
        scraper_request_timeout_secs,
        scraper_max_pages_per_category,
        scraper_inter_request_delay_ms,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
