//! Error types for the API proxy pipeline.
//!
//! A single error hierarchy is shared by the route table, the generator and
//! the server start-up code. Each variant carries enough context to be shown
//! to a human without further lookups.
//!
//! # Examples
//!
//! ```
//! use apiproxy_core::{Error, Result};
//!
//! fn check_port(port: u16) -> Result<u16> {
//!     if port == 0 {
//!         return Err(Error::ConfigError {
//!             message: "port cannot be zero".to_string(),
//!         });
//!     }
//!     Ok(port)
//! }
//!
//! let err = check_port(0).unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the API proxy pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    ///
    /// Raised when an environment variable or CLI value is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// A route cannot be turned into a callable.
    ///
    /// Raised when no callable name can be derived, when a parameter name is
    /// not a usable identifier, or when a `:segment` is not filled by the
    /// route's parameter.
    #[error("Invalid route '{path}': {reason}")]
    InvalidRoute {
        /// Path template of the offending route
        path: String,
        /// Why the route was rejected
        reason: String,
    },

    /// Two routes derive the same callable name.
    ///
    /// The generated aggregate is keyed by callable name, so a collision
    /// would silently shadow one of the routes.
    #[error("Duplicate callable '{name}': '{first}' and '{second}' derive the same name")]
    DuplicateCallable {
        /// The colliding callable name
        name: String,
        /// Path of the route registered first
        first: String,
        /// Path of the route registered second
        second: String,
    },

    /// Template registration or rendering failed.
    #[error("Template error: {message}")]
    TemplateError {
        /// Description of the template failure
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Filesystem error while writing or reading an artifact.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error for domain types.
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },
}

impl Error {
    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiproxy_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "Invalid port".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a duplicate callable error.
    ///
    /// # Examples
    ///
    /// ```
    /// use apiproxy_core::Error;
    ///
    /// let err = Error::DuplicateCallable {
    ///     name: "fetch".to_string(),
    ///     first: "/api/todos/fetch".to_string(),
    ///     second: "/api/users/fetch".to_string(),
    /// };
    /// assert!(err.is_duplicate_callable());
    /// ```
    #[must_use]
    pub const fn is_duplicate_callable(&self) -> bool {
        matches!(self, Self::DuplicateCallable { .. })
    }

    /// Returns `true` if this is an invalid route error.
    #[must_use]
    pub const fn is_invalid_route(&self) -> bool {
        matches!(self, Self::InvalidRoute { .. })
    }

    /// Returns `true` if this is an I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_callable_display() {
        let err = Error::DuplicateCallable {
            name: "fetch".to_string(),
            first: "/api/todos/fetch".to_string(),
            second: "/api/users/fetch".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("fetch"));
        assert!(display.contains("/api/todos/fetch"));
        assert!(display.contains("/api/users/fetch"));
        assert!(err.is_duplicate_callable());
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = Error::Io {
            path: PathBuf::from("/readonly/apiProxy.js"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_io_error());
        assert!(err.to_string().contains("/readonly/apiProxy.js"));
    }

    #[test]
    fn test_invalid_route_detection() {
        let err = Error::InvalidRoute {
            path: "/:id".to_string(),
            reason: "no static segment".to_string(),
        };
        assert!(err.is_invalid_route());
        assert!(!err.is_io_error());
    }
}
