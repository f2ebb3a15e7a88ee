//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file is honored (loaded by the binary before this runs).
//!
//! | Variable                    | Default          |
//! |-----------------------------|------------------|
//! | `STOCKBOOK_HOST`            | `0.0.0.0`        |
//! | `STOCKBOOK_PORT`            | `3001`           |
//! | `STOCKBOOK_DATABASE_PATH`   | `./stockbook.db` |
//! | `STOCKBOOK_ALLOWED_ORIGINS` | (none)           |
//! | `STOCKBOOK_OTP_TTL_SECS`    | `300`            |
//! | `STOCKBOOK_LOG_JSON`        | `false`          |
//! | `SMTP_HOST`                 | (unset)          |
//! | `SMTP_PORT`                 | `587`            |
//! | `SMTP_USERNAME`             | (unset)          |
//! | `SMTP_PASSWORD`             | (unset)          |
//! | `EMAIL_FROM`                | (unset)          |
//!
//! The four SMTP values without defaults are all-or-nothing. With none of
//! them set, OTP emails are not delivered (development mode).

use std::env;
use std::net::SocketAddr;

use secrecy::SecretString;
use stockbook_core::DEFAULT_OTP_TTL_SECS;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Origins allowed to call the API with credentials
    pub allowed_origins: Vec<String>,

    /// Lifetime of a login OTP in seconds
    pub otp_ttl_secs: i64,

    /// Emit JSON logs instead of human-readable text
    pub log_json: bool,

    /// SMTP delivery for OTP emails (None = log-only)
    pub smtp: Option<SmtpConfig>,
}

/// SMTP settings for OTP delivery.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port (STARTTLS)
    pub port: u16,
    /// SMTP authentication username
    pub username: String,
    /// SMTP authentication password
    pub password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_path: "./stockbook.db".to_string(),
            allowed_origins: Vec::new(),
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
            log_json: false,
            smtp: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("STOCKBOOK_PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKBOOK_PORT".to_string()))?,
            None => defaults.port,
        };

        let otp_ttl_secs = match var("STOCKBOOK_OTP_TTL_SECS") {
            Some(v) => v
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidValue("STOCKBOOK_OTP_TTL_SECS".to_string()))?,
            None => defaults.otp_ttl_secs,
        };

        let log_json = match var("STOCKBOOK_LOG_JSON") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOCKBOOK_LOG_JSON".to_string()))?,
            None => defaults.log_json,
        };

        let allowed_origins = var("STOCKBOOK_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let smtp = Self::smtp_from(&var)?;

        Ok(ApiConfig {
            host: var("STOCKBOOK_HOST").unwrap_or(defaults.host),
            port,
            database_path: var("STOCKBOOK_DATABASE_PATH").unwrap_or(defaults.database_path),
            allowed_origins,
            otp_ttl_secs,
            log_json,
            smtp,
        })
    }

    fn smtp_from<F>(var: &F) -> Result<Option<SmtpConfig>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const REQUIRED: [&str; 4] = ["SMTP_HOST", "SMTP_USERNAME", "SMTP_PASSWORD", "EMAIL_FROM"];

        let values: Vec<Option<String>> = REQUIRED.iter().map(|&k| var(k)).collect();
        if values.iter().all(Option::is_none) {
            return Ok(None);
        }
        if let Some(missing) = REQUIRED
            .iter()
            .zip(&values)
            .find_map(|(key, value)| value.is_none().then_some(*key))
        {
            return Err(ConfigError::MissingRequired(missing.to_string()));
        }

        let port = match var("SMTP_PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?,
            None => 587,
        };

        let mut values = values.into_iter().flatten();
        let (Some(host), Some(username), Some(password), Some(from_address)) =
            (values.next(), values.next(), values.next(), values.next())
        else {
            return Err(ConfigError::MissingRequired("SMTP".to_string()));
        };

        Ok(Some(SmtpConfig {
            host,
            port,
            username,
            password: SecretString::from(password),
            from_address,
        }))
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOCKBOOK_HOST".to_string()))
    }

    /// OTP lifetime as a chrono duration.
    pub fn otp_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.otp_ttl_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
