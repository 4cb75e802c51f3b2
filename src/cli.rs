//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::jwt::{DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL};
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Environment variable holding the access token lifetime (e.g. "15m").
pub const ACCESS_TTL_ENV: &str = "JWT_ACCESS_TOKEN_EXPIRY";

/// Environment variable holding the refresh token lifetime (e.g. "7d").
pub const REFRESH_TTL_ENV: &str = "JWT_REFRESH_TOKEN_EXPIRY";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Authgate",
    about = "User accounts with JWT access/refresh sessions"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "authgate.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Parse a lifetime like "900", "900s", "15m", "12h", or "7d" into a duration.
pub fn parse_ttl(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Empty duration".to_string());
    }

    let (digits, unit_secs) = match value.as_bytes()[value.len() - 1] {
        b's' => (&value[..value.len() - 1], 1),
        b'm' => (&value[..value.len() - 1], 60),
        b'h' => (&value[..value.len() - 1], 60 * 60),
        b'd' => (&value[..value.len() - 1], 24 * 60 * 60),
        b'0'..=b'9' => (value, 1),
        _ => return Err(format!("Unknown duration unit in '{}'", value)),
    };

    let count: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid duration '{}'", value))?;
    if count == 0 {
        return Err(format!("Duration '{}' must be positive", value));
    }

    Ok(Duration::from_secs(count * unit_secs))
}

fn load_ttl_env(name: &str, default: Duration) -> Option<Duration> {
    match std::env::var(name) {
        Ok(value) => match parse_ttl(&value) {
            Ok(ttl) => Some(ttl),
            Err(e) => {
                error!(var = %name, value = %value, "Invalid token lifetime: {}", e);
                None
            }
        },
        Err(_) => Some(default),
    }
}

/// Load the access and refresh token lifetimes from the environment,
/// falling back to the 15m/7d defaults.
/// Returns None and logs an error if a configured value does not parse.
pub fn load_token_ttls() -> Option<(Duration, Duration)> {
    let access_ttl = load_ttl_env(ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL)?;
    let refresh_ttl = load_ttl_env(REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL)?;
    Some((access_ttl, refresh_ttl))
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        access_ttl,
        refresh_ttl,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ttl_units() {
        assert_eq!(parse_ttl("900"), Ok(Duration::from_secs(900)));
        assert_eq!(parse_ttl("900s"), Ok(Duration::from_secs(900)));
        assert_eq!(parse_ttl("15m"), Ok(Duration::from_secs(15 * 60)));
        assert_eq!(parse_ttl("12h"), Ok(Duration::from_secs(12 * 60 * 60)));
        assert_eq!(parse_ttl("7d"), Ok(Duration::from_secs(7 * 24 * 60 * 60)));
    }

    #[test]
    fn test_parse_ttl_rejects_garbage() {
        assert!(parse_ttl("").is_err());
        assert!(parse_ttl("15x").is_err());
        assert!(parse_ttl("m").is_err());
        assert!(parse_ttl("-5m").is_err());
        assert!(parse_ttl("0m").is_err());
        assert!(parse_ttl("1.5h").is_err());
    }

    #[test]
    fn test_parse_ttl_trims_whitespace() {
        assert_eq!(parse_ttl(" 15m "), Ok(Duration::from_secs(15 * 60)));
    }
}
