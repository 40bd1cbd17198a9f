//! Environment-driven application configuration.
//!
//! | Variable              | Default                       | Meaning                              |
//! |-----------------------|-------------------------------|--------------------------------------|
//! | `DATABASE_URL`        | required                      | PostgreSQL connection string         |
//! | `BIND_ADDR`           | `0.0.0.0:8080`                | HTTP listen address                  |
//! | `JWT_SECRET_FILE`     | `/var/run/secrets/jwt_secret` | File holding the token-signing secret|
//! | `JWT_ALLOW_EPHEMERAL` | unset                         | `1` permits a generated dev secret   |
//! | `APP_URL`             | `http://localhost:8080`       | Public base URL for stored images    |
//! | `UPLOAD_DIR`          | `./uploads`                   | Directory for stored profile images  |
//! | `DB_POOL_MAX_SIZE`    | `10`                          | Connection pool upper bound          |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;
use uuid::Uuid;

/// Errors raised while assembling the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `DATABASE_URL` is not set.
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// `BIND_ADDR` is not a valid socket address.
    #[error("BIND_ADDR is not a valid socket address: {value}")]
    InvalidBindAddr {
        /// The rejected value.
        value: String,
    },
    /// `DB_POOL_MAX_SIZE` is not a positive integer.
    #[error("DB_POOL_MAX_SIZE is not a positive integer: {value}")]
    InvalidPoolSize {
        /// The rejected value.
        value: String,
    },
    /// The token-signing secret could not be read and an ephemeral one is
    /// not permitted in this build.
    #[error("failed to read token secret at {path}: {message}")]
    MissingTokenSecret {
        /// Path that was tried.
        path: String,
        /// Read error.
        message: String,
    },
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Token-signing secret.
    pub jwt_secret: Vec<u8>,
    /// Public base URL prefixed onto stored image paths.
    pub app_url: String,
    /// Directory profile images are written into.
    pub upload_dir: PathBuf,
    /// Connection pool upper bound.
    pub pool_max_size: u32,
}

impl AppConfig {
    /// Assemble the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is missing or a
    /// supplied value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr { value: bind_raw })?;

        let pool_raw = env::var("DB_POOL_MAX_SIZE").unwrap_or_else(|_| "10".to_owned());
        let pool_max_size = pool_raw
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ConfigError::InvalidPoolSize { value: pool_raw })?;

        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret: load_jwt_secret()?,
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned()),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_owned()),
            ),
            pool_max_size,
        })
    }
}

/// Read the token-signing secret from `JWT_SECRET_FILE`.
///
/// Development builds (and processes opting in via `JWT_ALLOW_EPHEMERAL=1`)
/// fall back to a generated secret so the server can start without a
/// provisioned file; tokens then die with the process.
fn load_jwt_secret() -> Result<Vec<u8>, ConfigError> {
    let path =
        env::var("JWT_SECRET_FILE").unwrap_or_else(|_| "/var/run/secrets/jwt_secret".to_owned());
    match std::fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %path, error = %err, "using ephemeral token secret (dev only)");
                Ok(Uuid::new_v4().as_bytes().to_vec())
            } else {
                Err(ConfigError::MissingTokenSecret {
                    path,
                    message: err.to_string(),
                })
            }
        }
    }
}
