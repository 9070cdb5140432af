use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub request_timeout_secs: u64,
    pub docs_dir: String,
    pub token: TokenConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let token = TokenConfig {
            secret: std::env::var("SECRET").context("SECRET is not set")?,
            ttl_hours: env_or("TOKEN_TTL_HOURS", 60_000),
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 8080),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            docs_dir: std::env::var("DOCS_DIR").unwrap_or_else(|_| "docs".into()),
            token,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
