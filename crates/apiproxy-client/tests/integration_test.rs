//! Integration tests for apiproxy-client
//!
//! Each test starts a small axum app on a loopback port and drives it
//! through the dispatcher or a manifest-built proxy.

use apiproxy_client::{
    DispatchError, Dispatcher, InvokeError, MemoryPersistence, ProxyModule, RequestBody,
    ResponsePayload, Session,
};
use apiproxy_core::{
    CallableName, HttpMethod, ManifestEntry, ParamType, ProxyManifest, RouteDescriptor,
    RouteParam,
};
use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

fn app() -> Router {
    Router::new()
        .route(
            "/api/echomsg/{msg}",
            get(|Path(msg): Path<String>| async move { Json(json!({"received": msg, "echoed": msg})) }),
        )
        .route(
            "/api/reversemsg",
            post(|Json(body): Json<Value>| async move {
                let original = body["message"].as_str().unwrap_or_default().to_string();
                let reversed: String = original.chars().rev().collect();
                Json(json!({"original": original, "reversed": reversed}))
            }),
        )
        .route(
            "/api/inspect",
            post(|headers: HeaderMap, body: Bytes| async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string);
                Json(json!({
                    "contentType": content_type,
                    "body": String::from_utf8_lossy(&body),
                }))
            }),
        )
        .route(
            "/api/login",
            post(|Json(body): Json<Value>| async move {
                if body["username"] == "testuser" {
                    (StatusCode::OK, Json(json!({"token": "abc.def.ghi"}))).into_response()
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"message": "Invalid credentials"})),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/api/tokenless",
            post(|| async { Json(json!({"ok": true})) }),
        )
        .route(
            "/api/secret",
            get(|headers: HeaderMap| async move {
                match headers.get(header::AUTHORIZATION) {
                    Some(value) => (
                        StatusCode::OK,
                        Json(json!({"auth": value.to_str().unwrap_or_default()})),
                    )
                        .into_response(),
                    None => (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"message": "Access token is missing", "reason": "missing_token"})),
                    )
                        .into_response(),
                }
            }),
        )
        .route(
            "/api/search",
            get(|Query(query): Query<HashMap<String, String>>| async move { Json(json!(query)) }),
        )
        .route("/api/plain", get(|| async { "plain text" }))
        .route(
            "/api/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database on fire") }),
        )
        .route("/api/gone", get(|| async { StatusCode::NOT_FOUND }))
}

async fn spawn_app() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

async fn dispatcher() -> Dispatcher {
    Dispatcher::new(spawn_app().await, Arc::new(Session::new()))
}

fn entry(name: &str, route: RouteDescriptor) -> ManifestEntry {
    ManifestEntry::new(CallableName::new(name).unwrap(), route)
}

fn manifest() -> ProxyManifest {
    ProxyManifest::new(vec![
        entry(
            "login",
            RouteDescriptor::new(HttpMethod::Post, "/api/login")
                .with_param(RouteParam::new("credentials", ParamType::Body))
                .issuing_token(),
        ),
        entry(
            "tokenless",
            RouteDescriptor::new(HttpMethod::Post, "/api/tokenless")
                .with_param(RouteParam::new("credentials", ParamType::Body))
                .issuing_token(),
        ),
        entry(
            "echomsg",
            RouteDescriptor::new(HttpMethod::Get, "/api/echomsg/:msg")
                .with_param(RouteParam::new("msg", ParamType::Path)),
        ),
        entry(
            "reversemsg",
            RouteDescriptor::new(HttpMethod::Post, "/api/reversemsg")
                .with_param(RouteParam::new("message", ParamType::Body)),
        ),
        entry(
            "inspect",
            RouteDescriptor::new(HttpMethod::Post, "/api/inspect")
                .with_param(RouteParam::new("data", ParamType::Body)),
        ),
        entry(
            "search",
            RouteDescriptor::new(HttpMethod::Get, "/api/search")
                .with_param(RouteParam::new("q", ParamType::Query)),
        ),
        entry("secret", RouteDescriptor::new(HttpMethod::Get, "/api/secret")),
    ])
}

async fn proxy() -> ProxyModule {
    ProxyModule::from_manifest(manifest(), dispatcher().await)
}

/// Tests that JSON responses are parsed
#[tokio::test]
async fn test_json_response() {
    let d = dispatcher().await;
    let payload = d
        .send(HttpMethod::Get, "/api/echomsg/hi", None, None)
        .await
        .unwrap();
    assert_eq!(payload, ResponsePayload::Json(json!({"received": "hi", "echoed": "hi"})));
}

/// Tests that non-JSON responses come back as text
#[tokio::test]
async fn test_text_response() {
    let d = dispatcher().await;
    let payload = d.send(HttpMethod::Get, "/api/plain", None, None).await.unwrap();
    assert_eq!(payload, ResponsePayload::Text("plain text".to_string()));
}

/// Tests that JSON bodies carry the JSON content type
#[tokio::test]
async fn test_json_body_content_type() {
    let d = dispatcher().await;
    let payload = d
        .send(
            HttpMethod::Post,
            "/api/inspect",
            Some(RequestBody::Json(json!({"a": 1}))),
            None,
        )
        .await
        .unwrap()
        .into_json();
    assert_eq!(payload["contentType"], "application/json");
    assert_eq!(payload["body"], r#"{"a":1}"#);
}

/// Tests that raw bodies are sent untouched without a JSON content type
#[tokio::test]
async fn test_raw_body_untouched() {
    let d = dispatcher().await;
    let payload = d
        .send(
            HttpMethod::Post,
            "/api/inspect",
            Some(RequestBody::Raw {
                bytes: b"a=1&b=2".to_vec(),
                content_type: Some("application/x-www-form-urlencoded".to_string()),
            }),
            None,
        )
        .await
        .unwrap()
        .into_json();
    assert_eq!(payload["contentType"], "application/x-www-form-urlencoded");
    assert_eq!(payload["body"], "a=1&b=2");

    let payload = d
        .send(
            HttpMethod::Post,
            "/api/inspect",
            Some(RequestBody::Raw {
                bytes: b"{not json".to_vec(),
                content_type: None,
            }),
            None,
        )
        .await
        .unwrap()
        .into_json();
    assert!(payload["contentType"].is_null());
    assert_eq!(payload["body"], "{not json");
}

/// Tests that the token is attached only when present
#[tokio::test]
async fn test_authorization_header() {
    let d = dispatcher().await;

    let err = d
        .send(HttpMethod::Get, "/api/secret", None, None)
        .await
        .unwrap_err();
    let api = err.api_error().unwrap();
    assert_eq!(api.status, 401);
    assert_eq!(api.status_text, "Unauthorized");
    assert_eq!(api.data["reason"], "missing_token");

    d.session().set_auth_token("Bearer abc");
    let payload = d
        .send(HttpMethod::Get, "/api/secret", None, None)
        .await
        .unwrap()
        .into_json();
    assert_eq!(payload["auth"], "Bearer abc");
}

/// Tests error payload fallbacks: text body and empty body
#[tokio::test]
async fn test_error_payload_fallbacks() {
    let d = dispatcher().await;

    let err = d.send(HttpMethod::Get, "/api/broken", None, None).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.api_error().unwrap().data, json!("database on fire"));

    let err = d.send(HttpMethod::Get, "/api/gone", None, None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.api_error().unwrap().data.is_null());
}

/// Tests that an unreachable server is a network error without status
#[tokio::test]
async fn test_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let d = Dispatcher::new(
        Url::parse(&format!("http://{addr}/")).unwrap(),
        Arc::new(Session::new()),
    );
    let err = d.send(HttpMethod::Get, "/api/plain", None, None).await.unwrap_err();
    assert!(err.is_network_error());
    assert_eq!(err.status(), None);
    assert!(matches!(err, DispatchError::Network { .. }));
}

/// Tests path parameter substitution through the proxy
#[tokio::test]
async fn test_proxy_path_param() {
    let proxy = proxy().await;
    let payload = proxy.invoke("echomsg", vec![json!("hi there")]).await.unwrap();
    assert_eq!(payload.into_json()["echoed"], "hi there");
}

/// Tests that scalar body arguments are wrapped under the parameter name
#[tokio::test]
async fn test_proxy_wraps_scalar_body() {
    let proxy = proxy().await;
    let payload = proxy.invoke("reversemsg", vec![json!("abc")]).await.unwrap();
    assert_eq!(
        payload.into_json(),
        json!({"original": "abc", "reversed": "cba"})
    );
}

/// Tests that structured body arguments are sent as-is
#[tokio::test]
async fn test_proxy_sends_structured_body_as_is() {
    let proxy = proxy().await;

    let payload = proxy
        .invoke("inspect", vec![json!({"text": "x"})])
        .await
        .unwrap()
        .into_json();
    assert_eq!(payload["body"], r#"{"text":"x"}"#);

    let payload = proxy
        .invoke("inspect", vec![json!([1, 2])])
        .await
        .unwrap()
        .into_json();
    assert_eq!(payload["body"], "[1,2]");

    let payload = proxy.invoke("inspect", vec![]).await.unwrap().into_json();
    assert_eq!(payload["body"], "{}");
}

/// Tests that query arguments land in the query string
#[tokio::test]
async fn test_proxy_query_param() {
    let proxy = proxy().await;

    let payload = proxy.invoke("search", vec![json!("milk")]).await.unwrap();
    assert_eq!(payload.into_json(), json!({"q": "milk"}));

    let payload = proxy.invoke("search", vec![]).await.unwrap();
    assert_eq!(payload.into_json(), json!({}));
}

/// Tests that a token-issuing call stores the prefixed token
#[tokio::test]
async fn test_proxy_login_stores_token() {
    let proxy = proxy().await;
    assert!(!proxy.session().is_authenticated());

    proxy
        .invoke("login", vec![json!({"username": "testuser", "password": "password123"})])
        .await
        .unwrap();
    assert_eq!(proxy.session().auth_token().as_deref(), Some("Bearer abc.def.ghi"));

    let payload = proxy.invoke("secret", vec![]).await.unwrap().into_json();
    assert_eq!(payload["auth"], "Bearer abc.def.ghi");
}

/// Tests that a failed login leaves the session untouched
#[tokio::test]
async fn test_proxy_failed_login() {
    let proxy = proxy().await;
    let err = proxy
        .invoke("login", vec![json!({"username": "nobody"})])
        .await
        .unwrap_err();

    assert_eq!(err.dispatch_error().and_then(DispatchError::status), Some(401));
    assert!(!proxy.session().is_authenticated());
}

/// Tests that a token-issuing call without a token is an error
#[tokio::test]
async fn test_proxy_missing_token() {
    let proxy = proxy().await;
    let err = proxy
        .invoke("tokenless", vec![json!({})])
        .await
        .unwrap_err();

    assert!(matches!(err, InvokeError::MissingToken { .. }));
    assert!(!proxy.session().is_authenticated());
}

/// Tests local argument errors
#[tokio::test]
async fn test_proxy_local_errors() {
    let proxy = proxy().await;

    let err = proxy.invoke("nope", vec![]).await.unwrap_err();
    assert!(matches!(err, InvokeError::UnknownCallable { .. }));

    let err = proxy
        .invoke("secret", vec![json!(1)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvokeError::TooManyArguments {
            expected: 0,
            given: 1,
            ..
        }
    ));

    let err = proxy.invoke("echomsg", vec![]).await.unwrap_err();
    assert!(matches!(err, InvokeError::MissingArgument { .. }));
    assert!(err.is_local());
}

/// Tests that a restored session authenticates requests
#[tokio::test]
async fn test_restored_session_sends_token() {
    let storage = Arc::new(MemoryPersistence::new());
    Session::with_persistence(storage.clone()).set_auth_token("Bearer saved");

    let session = Arc::new(Session::with_persistence(storage));
    assert!(session.restore());

    let d = Dispatcher::new(spawn_app().await, session);
    let payload = d
        .send(HttpMethod::Get, "/api/secret", None, None)
        .await
        .unwrap()
        .into_json();
    assert_eq!(payload["auth"], "Bearer saved");
}
