use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Default request body limit: 25 MiB, enough for the largest upload policy
/// plus multipart overhead.
const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// Every field has a default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on closing the pool after the listener stops.
    pub shutdown_timeout_secs: u64,
    /// Directory uploaded files are written under.
    pub storage_root: PathBuf,
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `STORAGE_ROOT`          | `storage`               |
    /// | `MAX_BODY_BYTES`        | `26214400`              |
    ///
    /// Panics on a value that does not parse, so misconfiguration stops
    /// startup.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            storage_root: env_or("STORAGE_ROOT", PathBuf::from("storage")),
            max_body_bytes: env_or("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Read and parse `key`, falling back to `default` when it is unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value {raw:?}: {e:?}")),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
