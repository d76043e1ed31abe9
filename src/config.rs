use std::net::SocketAddr;

use anyhow::Context;
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub database_path: String,
    pub database_max_connections: u32,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_var("APP_PORT", 8080)?;
        let addr = format!("{host}:{port}")
            .parse()
            .context("APP_HOST/APP_PORT")?;

        let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./data.db".into());
        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;

        let secret = match std::env::var("SESSION_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
                random_secret()
            }
        };
        let session = SessionConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "filmreviews".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "filmreviews-users".into()),
            ttl_hours: check_ttl_hours(parse_var("SESSION_TTL_HOURS", 24)?)?,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
        };

        Ok(Self {
            addr,
            database_path,
            database_max_connections,
            session,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().with_context(|| format!("invalid {name}")),
        Err(_) => Ok(default),
    }
}

/// Session lifetime must be positive and at most a year.
fn check_ttl_hours(hours: i64) -> anyhow::Result<i64> {
    anyhow::ensure!(
        hours > 0 && hours <= MAX_TTL_HOURS,
        "invalid SESSION_TTL_HOURS {hours}: expected 1..={MAX_TTL_HOURS}"
    );
    Ok(hours)
}

const MAX_TTL_HOURS: i64 = 24 * 365;

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
