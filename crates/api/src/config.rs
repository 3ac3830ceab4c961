//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {name}: {reason}")]
pub struct ApiConfigError {
    pub name: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// JSON role table; the built-in table is used when unset.
    pub role_table_path: Option<PathBuf>,
    /// JSON membership seed for the in-memory store.
    pub membership_seed_path: Option<PathBuf>,
    /// Wrap the resolver in a TTL cache when set.
    pub membership_cache_ttl: Option<Duration>,
    /// Panic on guard ordering mistakes instead of answering 500.
    pub strict_guards: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BARO_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ApiConfigError {
                name: "BARO_BIND_ADDR",
                reason: e.to_string(),
            })?;

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let membership_cache_ttl = match lookup("BARO_MEMBERSHIP_CACHE_TTL_SECS") {
            None => None,
            Some(raw) => {
                let secs = raw.trim().parse::<i64>().map_err(|e| ApiConfigError {
                    name: "BARO_MEMBERSHIP_CACHE_TTL_SECS",
                    reason: e.to_string(),
                })?;
                (secs > 0).then(|| Duration::seconds(secs))
            }
        };

        let strict_guards = match lookup("BARO_STRICT_GUARDS") {
            None => cfg!(debug_assertions),
            Some(raw) => parse_bool(&raw).ok_or_else(|| ApiConfigError {
                name: "BARO_STRICT_GUARDS",
                reason: format!("expected true/false, got '{raw}'"),
            })?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            role_table_path: lookup("BARO_ROLE_TABLE").map(PathBuf::from),
            membership_seed_path: lookup("BARO_MEMBERSHIP_SEED").map(PathBuf::from),
            membership_cache_ttl,
            strict_guards,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
