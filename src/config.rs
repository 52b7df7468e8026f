//! Process configuration, read once at startup.
//!
//! Values come from the environment (optionally populated from `.env` by
//! `dotenvy`). Parsing goes through a lookup function so tests never touch the
//! real process environment.

use crate::crypto::SessionKey;

pub const APP_NAME: &str = "NabhaArogya";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the managed backend, without a trailing slash.
    pub supabase_url: String,
    /// Public API key sent with every request to the backend.
    pub supabase_anon_key: String,
    pub session_key: SessionKey,
    pub bind_addr: String,
    pub port: u16,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let supabase_url = required("SUPABASE_URL")?;
        if !(supabase_url.starts_with("http://") || supabase_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "SUPABASE_URL",
                reason: "must start with http:// or https://".into(),
            });
        }
        let supabase_url = supabase_url.trim_end_matches('/').to_string();

        let supabase_anon_key = required("SUPABASE_ANON_KEY")?;

        let session_key = SessionKey::from_base64(&required("SESSION_KEY")?).map_err(|e| {
            ConfigError::Invalid {
                key: "SESSION_KEY",
                reason: e.to_string(),
            }
        })?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let secure_cookies = match lookup("SESSION_COOKIE_SECURE").as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "SESSION_COOKIE_SECURE",
                    reason: format!("expected true/false, got {other:?}"),
                });
            }
        };

        Ok(AppConfig {
            supabase_url,
            supabase_anon_key,
            session_key,
            bind_addr,
            port,
            secure_cookies,
        })
    }
}
