//! Environment-driven configuration for the host server and generator.
//!
//! Values come from environment variables, usually after `dotenvy` has loaded
//! a `.env` file. Tests build configurations through
//! [`ProxyConfig::from_lookup`] so they never touch the process environment.
//!
//! # Examples
//!
//! ```
//! use apiproxy_core::{DeploymentEnv, ProxyConfig};
//! use std::collections::HashMap;
//!
//! let vars = HashMap::from([("PORT", "9000"), ("USE_AUTH", "true")]);
//! let config = ProxyConfig::from_lookup(|key| vars.get(key).map(ToString::to_string)).unwrap();
//!
//! assert_eq!(config.port, 9000);
//! assert!(config.use_auth);
//! assert_eq!(config.environment, DeploymentEnv::Development);
//! ```

use crate::{Error, Result};
use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;

/// Default server port.
pub const DEFAULT_PORT: u16 = 8893;

/// Default HMAC secret used when `JWT_SECRET` is unset.
pub const DEFAULT_JWT_SECRET: &str = "default-secret";

/// Default artifact directory.
pub const DEFAULT_OUTPUT_DIR: &str = "public/ajax";

/// Default static file root.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeploymentEnv {
    /// Local development (default).
    #[default]
    Development,
    /// Automated test runs.
    Test,
    /// Production; disables start-up generation.
    Production,
}

impl DeploymentEnv {
    /// Parses an environment name, case-insensitively.
    ///
    /// Unknown names fall back to [`DeploymentEnv::Development`].
    #[must_use]
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Returns `true` for production.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Lower-case name of the environment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for DeploymentEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration of the host server.
///
/// `Debug` output never contains the JWT secret.
#[derive(Debug)]
pub struct ProxyConfig {
    /// Listening port (`PORT`).
    pub port: u16,
    /// Protect the echo and reverse routes (`USE_AUTH`).
    pub use_auth: bool,
    /// HMAC secret for token signing (`JWT_SECRET`).
    pub jwt_secret: SecretString,
    /// Deployment environment (`APIPROXY_ENV`).
    pub environment: DeploymentEnv,
    /// Skip start-up generation (`APIPROXY_SKIP_GENERATE`).
    pub skip_generate: bool,
    /// Where generated artifacts are written (`APIPROXY_OUTPUT_DIR`).
    pub output_dir: PathBuf,
    /// Static file root (`APIPROXY_PUBLIC_DIR`).
    pub public_dir: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            use_auth: false,
            jwt_secret: SecretString::from(DEFAULT_JWT_SECRET.to_string()),
            environment: DeploymentEnv::default(),
            skip_generate: false,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
        }
    }
}

impl ProxyConfig {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `PORT` is not a valid port number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `PORT` is not a valid port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| Error::ConfigError {
                message: format!("PORT must be a number between 0 and 65535, got '{raw}'"),
            })?,
            None => defaults.port,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .map_or(defaults.jwt_secret, SecretString::from);

        if lookup("JWT_SECRET").is_none() {
            tracing::debug!("JWT_SECRET not set, using the built-in default secret");
        }

        Ok(Self {
            port,
            // Only the exact string "true" enables auth.
            use_auth: lookup("USE_AUTH").is_some_and(|v| v.trim() == "true"),
            jwt_secret,
            environment: lookup("APIPROXY_ENV")
                .map_or(defaults.environment, |v| DeploymentEnv::parse_lossy(&v)),
            skip_generate: lookup("APIPROXY_SKIP_GENERATE").is_some_and(|v| is_truthy(&v)),
            output_dir: lookup("APIPROXY_OUTPUT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.output_dir, PathBuf::from),
            public_dir: lookup("APIPROXY_PUBLIC_DIR")
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.public_dir, PathBuf::from),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
