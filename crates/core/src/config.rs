use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;

use crate::auth::{AdminCredentials, DEFAULT_SESSION_TTL_HOURS, MAX_SESSION_TTL_HOURS};

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug)]
pub struct Settings {
    pub waitlist_env: String,
    pub api_bind: String,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub session_ttl_hours: i64,
    pub store_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let waitlist_env = lookup("WAITLIST_ENV").unwrap_or_else(|| "development".to_string());

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let api_bind = lookup("WAITLIST_API_BIND").unwrap_or_else(|| format!("0.0.0.0:{}", port));

        let admin_username = lookup("WAITLIST_ADMIN_USERNAME")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("WAITLIST_ADMIN_USERNAME"))?;
        let admin_password = lookup("WAITLIST_ADMIN_PASSWORD")
            .filter(|v| !v.is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("WAITLIST_ADMIN_PASSWORD"))?;

        let session_ttl_hours = match lookup("WAITLIST_SESSION_TTL_HOURS") {
            Some(value) => match value.parse::<i64>() {
                Ok(hours) if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "WAITLIST_SESSION_TTL_HOURS",
                        value,
                    })
                }
            },
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let store_dir = lookup("WAITLIST_STORE_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            waitlist_env,
            api_bind,
            admin_username,
            admin_password,
            session_ttl_hours,
            store_dir,
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours)
    }

    pub fn admin_credentials(&self) -> AdminCredentials {
        AdminCredentials::new(
            self.admin_username.clone(),
            SecretString::from(self.admin_password.expose_secret().to_string()),
        )
    }
}
