use std::collections::HashSet;
use std::time::Duration;

use serde_json::json;

use crate::errors::AppError;

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_PORT: u16 = 8080;

/// Deployment mode. Decides whether diagnostic context reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

/// Application configuration loaded from environment variables.
/// Built once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub allowed_origins: HashSet<String>,
    pub model_name: String,
    pub model_base_url: String,
    /// Upper bound on the model round trip. `None` leaves it unbounded.
    pub model_timeout: Option<Duration>,
    pub environment: Environment,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::configuration(
                    "Required environment variable 'GEMINI_API_KEY' is not set",
                    json!({ "variable": "GEMINI_API_KEY" }),
                )
            })?;

        Ok(Config {
            api_key,
            allowed_origins: parse_allowed_origins(lookup("ALLOWED_ORIGINS").as_deref()),
            model_name: non_blank(lookup("GEMINI_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_base_url: non_blank(lookup("GEMINI_API_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
            model_timeout: parse_timeout(lookup("MODEL_TIMEOUT_SECS"))?,
            environment: Environment::from_flag(lookup("APP_ENV").as_deref()),
            port: parse_port(lookup("PORT"))?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Splits a comma-separated origin list, dropping empty tokens. Falls back to
/// the built-in defaults when nothing usable is left.
pub fn parse_allowed_origins(raw: Option<&str>) -> HashSet<String> {
    let origins: HashSet<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() {
        DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|o| o.to_string())
            .collect()
    } else {
        origins
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_port(value: Option<String>) -> Result<u16, AppError> {
    match non_blank(value) {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw.parse::<u16>().map_err(|_| {
            AppError::configuration(
                "PORT must be a valid port number",
                json!({ "variable": "PORT", "value": raw }),
            )
        }),
    }
}

fn parse_timeout(value: Option<String>) -> Result<Option<Duration>, AppError> {
    let Some(raw) = non_blank(value) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(AppError::configuration(
            "MODEL_TIMEOUT_SECS must be a positive number of seconds",
            json!({ "variable": "MODEL_TIMEOUT_SECS", "value": raw }),
        )),
    }
}
