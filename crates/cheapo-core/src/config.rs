use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Largest page size whose row labels fit in a single upper-case letter.
const MAX_PAGE_SIZE: usize = 26;

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
/// Parsing and validation are decoupled from the real environment so tests can
/// drive them with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let telegram_bot_token = require("TELEGRAM_BOT_TOKEN")?;
    let search_url = require("CHEAPO_SEARCH_URL")?;

    let env = parse_environment(&or_default("CHEAPO_ENV", "development"))?;

    let bind_addr = parse_addr("CHEAPO_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CHEAPO_LOG_LEVEL", "info");
    let approved_users = parse_user_ids(&or_default("CHEAPO_APPROVED_USERS", ""))
        .map_err(|reason| invalid("CHEAPO_APPROVED_USERS", reason))?;
    let bot_user_id = match lookup("CHEAPO_BOT_USER_ID") {
        Ok(raw) => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|e| invalid("CHEAPO_BOT_USER_ID", e.to_string()))?,
        ),
        Err(_) => None,
    };
    let webhook_secret = lookup("CHEAPO_WEBHOOK_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let telegram_api_url = or_default("CHEAPO_TELEGRAM_API_URL", "https://api.telegram.org");
    let catalog_path = lookup("CHEAPO_CATALOG_PATH").ok().map(PathBuf::from);

    let page_size = parse_usize("CHEAPO_PAGE_SIZE", "20")?;
    let radius_step = parse_u32("CHEAPO_RADIUS_STEP", "250")?;
    let min_radius = parse_u32("CHEAPO_MIN_RADIUS", "250")?;
    let max_radius = parse_u32("CHEAPO_MAX_RADIUS", "5000")?;
    let offer_summary_max_chars = parse_usize("CHEAPO_OFFER_SUMMARY_MAX_CHARS", "100")?;

    let http_timeout_secs = parse_u64("CHEAPO_HTTP_TIMEOUT_SECS", "30")?;
    let search_max_retries = parse_u32("CHEAPO_SEARCH_MAX_RETRIES", "2")?;
    let search_retry_backoff_ms = parse_u64("CHEAPO_SEARCH_RETRY_BACKOFF_MS", "500")?;

    let db_max_connections = parse_u32("CHEAPO_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CHEAPO_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CHEAPO_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(invalid(
            "CHEAPO_PAGE_SIZE",
            format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
        ));
    }
    if radius_step == 0 {
        return Err(invalid("CHEAPO_RADIUS_STEP", "must be positive".to_string()));
    }
    if min_radius < radius_step {
        return Err(invalid(
            "CHEAPO_MIN_RADIUS",
            format!("must be at least the radius step ({radius_step}), got {min_radius}"),
        ));
    }
    if max_radius < min_radius {
        return Err(invalid(
            "CHEAPO_MAX_RADIUS",
            format!("must be at least the minimum radius ({min_radius}), got {max_radius}"),
        ));
    }
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "CHEAPO_DB_MIN_CONNECTIONS",
            format!("must not exceed CHEAPO_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }
    if env == Environment::Production && webhook_secret.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "CHEAPO_WEBHOOK_SECRET".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        telegram_bot_token,
        search_url,
        env,
        bind_addr,
        log_level,
        approved_users,
        bot_user_id,
        webhook_secret,
        telegram_api_url,
        catalog_path,
        page_size,
        radius_step,
        min_radius,
        max_radius,
        offer_summary_max_chars,
        http_timeout_secs,
        search_max_retries,
        search_retry_backoff_ms,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CHEAPO_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a comma-separated list of Telegram user ids. Blank entries are skipped.
fn parse_user_ids(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| format!("'{s}' is not a user id: {e}"))
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
