use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub google_api_key: String,
    pub gemini_base_url: String,
    pub jwt_secret: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    /// Public origin of the dashboard; verification and reset links point here.
    pub app_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Ceiling for a whole request, streamed bodies included.
    pub request_timeout: Duration,
    /// Pause between smoothed chunks on the analysis and chat streams.
    pub smooth_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            google_api_key: require_env("GOOGLE_GENERATIVE_AI_API_KEY")?,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            jwt_secret: require_env("JWT_SECRET")?,
            mail_api_url: require_env("MAIL_API_URL")?,
            mail_api_key: require_env("MAIL_API_KEY")?,
            mail_from: require_env("MAIL_FROM")?,
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout: Duration::from_secs(
                optional_number("REQUEST_TIMEOUT_SECS", 60)
                    .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            smooth_delay: Duration::from_millis(
                optional_number("SMOOTH_STREAM_DELAY_MS", 10)
                    .context("SMOOTH_STREAM_DELAY_MS must be a whole number of milliseconds")?,
            ),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_number(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<u64>()?),
        Err(_) => Ok(default),
    }
}
