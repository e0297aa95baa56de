//! Helpers shared by the commands that talk to a running server.

use anyhow::{Context, Result};
use apiproxy_client::{
    Dispatcher, FileTokenPersistence, MODULE_PATH, ProxyModule, Session, TokenPersistence,
};
use apiproxy_core::HttpMethod;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Default server address.
pub const DEFAULT_URL: &str = "http://localhost:8893";

/// Opens the token storage, in `token_dir` when given, otherwise in the
/// user data directory.
///
/// # Errors
///
/// Returns an error if no `token_dir` is given and the platform has no data
/// directory.
pub fn token_storage(token_dir: Option<&Path>) -> Result<FileTokenPersistence> {
    match token_dir {
        Some(dir) => Ok(FileTokenPersistence::in_dir(dir)),
        None => FileTokenPersistence::default_location()
            .context("no data directory on this platform; pass --token-dir"),
    }
}

/// Creates a session backed by file storage and restores any saved token.
pub fn open_session(token_dir: Option<&Path>) -> Result<Arc<Session>> {
    let storage: Arc<dyn TokenPersistence> = Arc::new(token_storage(token_dir)?);
    let session = Arc::new(Session::with_persistence(storage));
    if session.restore() {
        tracing::debug!("using saved session");
    }
    Ok(session)
}

/// Builds a dispatcher for `url`.
pub fn dispatcher(url: &str, session: Arc<Session>) -> Result<Dispatcher> {
    let base_url = Url::parse(url).with_context(|| format!("invalid server URL '{url}'"))?;
    Ok(Dispatcher::new(base_url, session))
}

/// Fetches the manifest and builds the callable module.
pub async fn connect(url: &str, token_dir: Option<&Path>) -> Result<ProxyModule> {
    let dispatcher = dispatcher(url, open_session(token_dir)?)?;
    ProxyModule::connect(dispatcher)
        .await
        .with_context(|| format!("failed to load the API proxy manifest from {url}"))
}

/// Downloads the served module source.
pub async fn fetch_module_source(dispatcher: &Dispatcher) -> Result<String> {
    let payload = dispatcher
        .send(HttpMethod::Get, MODULE_PATH, None, None)
        .await
        .context("failed to download the API proxy module")?;
    Ok(payload.to_string())
}

/// Reads a command-line argument as JSON when it parses, otherwise as a
/// plain string.
///
/// # Examples
///
/// ```
/// use apiproxy_cli::commands::common::parse_arg;
/// use serde_json::json;
///
/// assert_eq!(parse_arg(r#"{"text": "x"}"#), json!({"text": "x"}));
/// assert_eq!(parse_arg("42"), json!(42));
/// assert_eq!(parse_arg("hello"), json!("hello"));
/// ```
#[must_use]
pub fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
