use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Row limit applied when collecting conversations for insights.
    pub analysis_conversation_limit: i64,
    /// Row limit applied when collecting check-ins for insights.
    pub analysis_checkin_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analysis_conversation_limit: optional_limit("ANALYSIS_CONVERSATION_LIMIT", 50)?,
            analysis_checkin_limit: optional_limit("ANALYSIS_CHECKIN_LIMIT", 30)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_limit(key: &str, default: i64) -> Result<i64> {
    match std::env::var(key) {
        Ok(raw) => {
            let value = raw
                .parse::<i64>()
                .with_context(|| format!("{key} must be a positive integer"))?;
            anyhow::ensure!(value > 0, "{key} must be a positive integer");
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}
