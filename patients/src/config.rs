use std::path::PathBuf;

use actix_web::cookie::Key;
use chrono::Duration;
use common::{
    env::{env_var, env_var_or},
    error::{KlError, KlResult},
};
use log::warn;

/// Default lifetime of a login session, in days
pub const DEFAULT_SESSION_DAYS: i64 = 14;
/// Minimum length of the secret used to sign session cookies
pub const SECRET_KEY_MIN_BYTES: usize = 64;

/// Backing implementation used for patients, users and sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageKind {
    type Err = KlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Expected 'postgres' or 'memory' but got '{value}'").into()),
        }
    }
}

/// Attributes shared by the session and CSRF cookies
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Lifetime of a session and its cookie
    pub session_ttl: Duration,
    /// Only send the cookies over HTTPS
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::days(DEFAULT_SESSION_DAYS),
            secure: false,
        }
    }
}

/// Location of the built single page application
#[derive(Debug, Clone)]
pub struct SpaConfig {
    pub dir: PathBuf,
}

impl SpaConfig {
    pub fn index_path(&self) -> PathBuf {
        self.dir.join("index.html")
    }
}

/// Runtime options of the API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` the server listens on
    pub bind: String,
    pub storage: StorageKind,
    pub cookies: CookieConfig,
    pub spa: SpaConfig,
    /// Secret signing the session cookie. Empty when not configured.
    pub secret_key: String,
}

impl ServerConfig {
    /// Read the server options from the `KLINIKA_*` environment variables, using defaults for
    /// anything not set
    /// # Errors
    /// This function will return an error if a variable is set to a value that cannot be parsed
    pub fn from_env() -> KlResult<Self> {
        let session_days: i64 = env_var_or("KLINIKA_SESSION_DAYS", DEFAULT_SESSION_DAYS)?;
        Ok(Self {
            bind: env_var_or("KLINIKA_BIND", "127.0.0.1:8000".to_owned())?,
            storage: env_var_or("KLINIKA_STORAGE", StorageKind::Postgres)?,
            cookies: CookieConfig {
                session_ttl: Duration::days(session_days),
                secure: env_var_or("KLINIKA_SECURE_COOKIES", false)?,
            },
            spa: SpaConfig {
                dir: PathBuf::from(env_var_or("KLINIKA_SPA_DIR", "static/spa".to_owned())?),
            },
            secret_key: env_var_or("KLINIKA_SECRET_KEY", String::new())?,
        })
    }

    /// Key signing the session cookie. Without a configured secret a random key is generated,
    /// so sessions do not survive a restart.
    /// # Errors
    /// This function will return an error if the configured secret is shorter than
    /// [SECRET_KEY_MIN_BYTES]
    pub fn session_key(&self) -> KlResult<Key> {
        if self.secret_key.is_empty() {
            warn!("KLINIKA_SECRET_KEY is not set. Sessions will not survive a restart");
            return Ok(Key::generate());
        }
        if self.secret_key.len() < SECRET_KEY_MIN_BYTES {
            return Err(format!(
                "KLINIKA_SECRET_KEY must be at least {SECRET_KEY_MIN_BYTES} bytes but got {}",
                self.secret_key.len()
            )
            .into());
        }
        Ok(Key::from(self.secret_key.as_bytes()))
    }
}

/// Credentials of the single user available when running with [StorageKind::Memory]
/// # Errors
/// This function will return an error if `KLINIKA_DEMO_USERNAME` or `KLINIKA_DEMO_PASSWORD` is
/// not set
pub fn demo_credentials() -> KlResult<(String, String)> {
    Ok((
        env_var("KLINIKA_DEMO_USERNAME")?,
        env_var("KLINIKA_DEMO_PASSWORD")?,
    ))
}
