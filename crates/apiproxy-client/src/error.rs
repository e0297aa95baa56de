//! Error types for dispatch and proxy invocation.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A non-2xx response.
///
/// `data` is the response body parsed as JSON, or the raw text when it is
/// not JSON, or `null` when the body is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase for the status
    pub status_text: String,
    /// Structured error payload
    pub data: Value,
}

impl ApiError {
    /// Returns the `message` field of a structured payload, if present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.status_text)?;
        if let Some(message) = self.message() {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Errors from [`Dispatcher::send`](crate::Dispatcher::send).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The server answered with a non-2xx status.
    #[error("request failed with status {0}")]
    Api(ApiError),

    /// No response was received.
    #[error("network request failed: {source}")]
    Network {
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The path could not be resolved against the base URL.
    #[error("invalid request path '{path}': {source}")]
    InvalidUrl {
        /// Path as given
        path: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// A response declared as JSON did not parse.
    #[error("response from {path} is not valid JSON: {source}")]
    Decode {
        /// Requested path
        path: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// Returns `true` for a non-2xx response.
    #[must_use]
    pub const fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Returns `true` if no response was received.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns the response error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the HTTP status of a non-2xx response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status),
            _ => None,
        }
    }
}

/// Errors from [`ProxyModule::invoke`](crate::ProxyModule::invoke).
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No callable with this name in the manifest.
    #[error("unknown callable '{name}'")]
    UnknownCallable {
        /// Requested name
        name: String,
    },

    /// More arguments than the callable declares.
    #[error("'{name}' takes {expected} argument(s), {given} given")]
    TooManyArguments {
        /// Callable name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Arguments supplied
        given: usize,
    },

    /// A path parameter was not supplied.
    #[error("'{name}' needs a value for path parameter '{param}'")]
    MissingArgument {
        /// Callable name
        name: String,
        /// Parameter name
        param: String,
    },

    /// A token-issuing call returned no `token` string.
    #[error("'{name}' response did not include a token")]
    MissingToken {
        /// Callable name
        name: String,
    },

    /// The manifest could not be loaded.
    #[error("failed to load proxy manifest: {0}")]
    Manifest(#[from] apiproxy_core::Error),

    /// The request itself failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl InvokeError {
    /// Returns the underlying dispatch error, if any.
    #[must_use]
    pub const fn dispatch_error(&self) -> Option<&DispatchError> {
        match self {
            Self::Dispatch(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` if the failure happened before any request was sent.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::UnknownCallable { .. }
                | Self::TooManyArguments { .. }
                | Self::MissingArgument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_error_display_includes_message() {
        let err = ApiError {
            status: 401,
            status_text: "Unauthorized".to_string(),
            data: json!({"message": "Access token is missing", "reason": "missing_token"}),
        };
        assert_eq!(err.to_string(), "401 Unauthorized: Access token is missing");

        let dispatch = DispatchError::Api(err);
        assert!(dispatch.is_api_error());
        assert_eq!(dispatch.status(), Some(401));
    }

    #[test]
    fn test_api_error_serializes_camel_case() {
        let err = ApiError {
            status: 404,
            status_text: "Not Found".to_string(),
            data: Value::Null,
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["statusText"], "Not Found");
        assert!(value["data"].is_null());
    }

    #[test]
    fn test_invoke_error_locality() {
        let err = InvokeError::UnknownCallable {
            name: "nope".to_string(),
        };
        assert!(err.is_local());
        assert!(err.dispatch_error().is_none());
        assert_eq!(err.to_string(), "unknown callable 'nope'");
    }
}
