//! Manifest-driven proxy calls.
//!
//! [`ProxyModule`] is the Rust counterpart of the generated JavaScript
//! module: each manifest entry becomes a callable that builds its request
//! the same way the generated `name: async (param) => { ... }` body does.

use crate::dispatch::{Dispatcher, RequestBody, ResponsePayload, query_value};
use crate::error::InvokeError;
use crate::token::Session;
use apiproxy_core::{HttpMethod, ManifestEntry, ParamType, ProxyManifest};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Path of the generated module under the server's static root.
pub const MODULE_PATH: &str = "/ajax/apiProxy.js";

/// Path of the sidecar manifest under the server's static root.
pub const MANIFEST_PATH: &str = "/ajax/apiProxy.manifest.json";

/// Executable proxy built from a manifest.
///
/// # Examples
///
/// ```no_run
/// use apiproxy_client::{Dispatcher, ProxyModule, Session};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), apiproxy_client::InvokeError> {
/// let base = url::Url::parse("http://localhost:8893/").unwrap();
/// let dispatcher = Dispatcher::new(base, Arc::new(Session::new()));
/// let proxy = ProxyModule::connect(dispatcher).await?;
///
/// proxy
///     .invoke("login", vec![json!({"username": "testuser", "password": "password123"})])
///     .await?;
/// let echoed = proxy.invoke("echomsg", vec![json!("hi")]).await?;
/// println!("{echoed}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProxyModule {
    dispatcher: Dispatcher,
    manifest: Arc<ProxyManifest>,
}

impl ProxyModule {
    /// Builds a proxy from an already loaded manifest.
    #[must_use]
    pub fn from_manifest(manifest: ProxyManifest, dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            manifest: Arc::new(manifest),
        }
    }

    /// Fetches the manifest from the server and builds a proxy.
    ///
    /// # Errors
    ///
    /// Returns error if the manifest cannot be fetched or parsed.
    pub async fn connect(dispatcher: Dispatcher) -> Result<Self, InvokeError> {
        let payload = dispatcher
            .send(HttpMethod::Get, MANIFEST_PATH, None, None)
            .await?;
        let manifest = match payload {
            ResponsePayload::Json(value) => serde_json::from_value(value).map_err(|e| {
                apiproxy_core::Error::SerializationError {
                    message: "manifest does not match the expected shape".to_string(),
                    source: Some(e),
                }
            })?,
            ResponsePayload::Text(text) => ProxyManifest::from_json(&text)?,
        };
        Ok(Self::from_manifest(manifest, dispatcher))
    }

    /// Returns the manifest.
    #[must_use]
    pub fn manifest(&self) -> &ProxyManifest {
        &self.manifest
    }

    /// Returns the session shared with the dispatcher.
    #[must_use]
    pub fn session(&self) -> &Session {
        self.dispatcher.session()
    }

    /// Returns callable names in manifest order.
    pub fn callables(&self) -> impl Iterator<Item = &str> {
        self.manifest.names()
    }

    /// Calls a callable by name with positional arguments.
    ///
    /// Missing trailing arguments behave like JavaScript `undefined`: an
    /// absent body argument sends `{}` and an absent query argument sends
    /// no query string. A path parameter must be supplied.
    ///
    /// # Errors
    ///
    /// - [`InvokeError::UnknownCallable`] / [`InvokeError::TooManyArguments`]
    ///   / [`InvokeError::MissingArgument`] before anything is sent
    /// - [`InvokeError::Dispatch`] if the request fails
    /// - [`InvokeError::MissingToken`] if a token-issuing call returns no
    ///   token
    pub async fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<ResponsePayload, InvokeError> {
        let entry = self
            .manifest
            .get(name)
            .ok_or_else(|| InvokeError::UnknownCallable {
                name: name.to_string(),
            })?;

        let expected = usize::from(entry.route.param.is_some());
        if args.len() > expected {
            return Err(InvokeError::TooManyArguments {
                name: name.to_string(),
                expected,
                given: args.len(),
            });
        }

        let arg = args.into_iter().next();
        let result = self.dispatch(entry, arg).await?;

        if entry.route.issues_token {
            let token = result
                .as_json()
                .and_then(|v| v.get("token"))
                .and_then(Value::as_str)
                .ok_or_else(|| InvokeError::MissingToken {
                    name: name.to_string(),
                })?;
            self.session().set_auth_token(format!("Bearer {token}"));
            tracing::info!(callable = name, "session token stored");
        }

        Ok(result)
    }

    async fn dispatch(
        &self,
        entry: &ManifestEntry,
        arg: Option<Value>,
    ) -> Result<ResponsePayload, InvokeError> {
        let route = &entry.route;
        let method = route.method;

        let Some(param) = &route.param else {
            return Ok(self.dispatcher.send(method, &route.path, None, None).await?);
        };

        match param.kind {
            ParamType::Query => {
                let mut query = Map::new();
                if let Some(value) = arg {
                    query.insert(param.name.clone(), value);
                }
                Ok(self
                    .dispatcher
                    .send(method, &route.path, None, Some(&query))
                    .await?)
            }
            ParamType::Path => {
                let value = arg
                    .as_ref()
                    .and_then(query_value)
                    .ok_or_else(|| InvokeError::MissingArgument {
                        name: entry.name.to_string(),
                        param: param.name.clone(),
                    })?;
                let path = fill_path(&route.path, &param.name, &value);
                Ok(self.dispatcher.send(method, &path, None, None).await?)
            }
            ParamType::Body => {
                let payload = match arg {
                    Some(value) if value.is_object() || value.is_array() => value,
                    Some(value) => {
                        let mut wrapped = Map::new();
                        wrapped.insert(param.name.clone(), value);
                        Value::Object(wrapped)
                    }
                    None => Value::Object(Map::new()),
                };
                Ok(self
                    .dispatcher
                    .send(method, &route.path, Some(RequestBody::Json(payload)), None)
                    .await?)
            }
        }
    }
}

/// Replaces the `:param` segment with the percent-encoded value.
fn fill_path(path: &str, param: &str, value: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if name == param => urlencoding::encode(value).into_owned(),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
