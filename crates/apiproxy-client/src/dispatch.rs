//! HTTP request dispatch.

use crate::error::{ApiError, DispatchError};
use crate::token::Session;
use apiproxy_core::HttpMethod;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(Value),
    /// Sent untouched. No JSON content type is added.
    Raw {
        /// Payload bytes
        bytes: Vec<u8>,
        /// Content type to send, if any
        content_type: Option<String>,
    },
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Parsed body of an `application/json` response.
    Json(Value),
    /// Any other body, as text.
    Text(String),
}

impl ResponsePayload {
    /// Returns the JSON value, if the response was JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    /// Converts into a JSON value; text becomes a JSON string.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(v) => v,
            Self::Text(t) => Value::String(t),
        }
    }
}

impl fmt::Display for ResponsePayload {
    /// Pretty-printed JSON or the raw text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(pretty) => f.write_str(&pretty),
                Err(_) => write!(f, "{v}"),
            },
            Self::Text(t) => f.write_str(t),
        }
    }
}

/// Sends requests relative to a base URL, attaching the session token.
///
/// Cloning is cheap; clones share the HTTP connection pool and the session.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl Dispatcher {
    /// Creates a dispatcher with a default HTTP client.
    #[must_use]
    pub fn new(base_url: Url, session: Arc<Session>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Creates a dispatcher with a preconfigured HTTP client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, base_url: Url, session: Arc<Session>) -> Self {
        Self {
            client,
            base_url,
            session,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the session whose token is attached to requests.
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sends one request.
    ///
    /// `path` is resolved against the base URL. Query values that are
    /// `null` are skipped, structured values are JSON-encoded and scalars
    /// are sent as their string form. The bearer token is attached only
    /// when the session holds one.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Api`] for any non-2xx status
    /// - [`DispatchError::Network`] if no response was received
    /// - [`DispatchError::InvalidUrl`] if `path` does not resolve
    /// - [`DispatchError::Decode`] if a JSON response does not parse
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        query: Option<&Map<String, Value>>,
    ) -> Result<ResponsePayload, DispatchError> {
        let url = self.build_url(path, query)?;
        tracing::debug!(%method, %url, "dispatching request");

        let mut request = self
            .client
            .request(to_reqwest_method(method), url)
            .header(ACCEPT, "application/json");

        if let Some(token) = self.session.auth_token() {
            request = request.header(AUTHORIZATION, token);
        }

        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Raw {
                bytes,
                content_type,
            }) => {
                let request = match content_type {
                    Some(ct) => request.header(CONTENT_TYPE, ct),
                    None => request,
                };
                request.body(bytes)
            }
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|source| DispatchError::Network { source })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response
            .text()
            .await
            .map_err(|source| DispatchError::Network { source })?;

        if !status.is_success() {
            let data = if text.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            };
            tracing::debug!(status = status.as_u16(), %method, path, "request rejected");
            return Err(DispatchError::Api(ApiError {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                data,
            }));
        }

        if content_type.contains("application/json") {
            if text.is_empty() {
                return Ok(ResponsePayload::Json(Value::Null));
            }
            return serde_json::from_str(&text)
                .map(ResponsePayload::Json)
                .map_err(|source| DispatchError::Decode {
                    path: path.to_string(),
                    source,
                });
        }
        Ok(ResponsePayload::Text(text))
    }

    fn build_url(
        &self,
        path: &str,
        query: Option<&Map<String, Value>>,
    ) -> Result<Url, DispatchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|source| DispatchError::InvalidUrl {
                path: path.to_string(),
                source,
            })?;

        if let Some(query) = query {
            let pairs: Vec<(&String, String)> = query
                .iter()
                .filter_map(|(key, value)| query_value(value).map(|v| (key, v)))
                .collect();
            if !pairs.is_empty() {
                let mut serializer = url.query_pairs_mut();
                for (key, value) in pairs {
                    serializer.append_pair(key, &value);
                }
            }
        }
        Ok(url)
    }
}

/// String form of a value as sent in a query string or path segment.
///
/// `None` for `null`.
pub(crate) fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

const fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
