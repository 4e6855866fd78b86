//! Configuration loading from environment.

use std::env;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rate_limit_per_minute: u32,
    /// Behind a proxy that sets `X-Forwarded-For`
    pub trust_proxy_headers: bool,
    /// Single allowed browser origin; any origin when unset
    pub cors_allowed_origin: Option<String>,
    /// OTLP collector; trace export is off when unset
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3201".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let rate_limit_per_minute = env::var("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()?;

        let trust_proxy_headers = non_empty_var("TRUST_PROXY_HEADERS")
            .map(|v| v.parse::<bool>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("TRUST_PROXY_HEADERS must be true or false: {}", e))?
            .unwrap_or(false);

        Ok(Self {
            port,
            database_url,
            rate_limit_per_minute,
            trust_proxy_headers,
            cors_allowed_origin: non_empty_var("CORS_ALLOWED_ORIGIN"),
            otlp_endpoint: non_empty_var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
