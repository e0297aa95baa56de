//! Demo host application for the API proxy.
//!
//! Serves a small API (login, echo, reverse, todos) through axum, and on
//! start-up introspects its own route table to regenerate
//! `public/ajax/apiProxy.js` and its manifest. The public directory is
//! served as static files, so the generated module is reachable at
//! `/ajax/apiProxy.js`.
//!
//! # Examples
//!
//! ```no_run
//! use apiproxy_core::ProxyConfig;
//! use apiproxy_server::{ApiRegistry, AppState, build_app, generate_proxy};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ProxyConfig::from_env()?;
//! let registry = ApiRegistry::demo();
//! generate_proxy(&config, &registry)?;
//!
//! let app = build_app(registry, AppState::from_config(&config), &config.public_dir);
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod auth;
pub mod generate;
pub mod registry;
pub mod routes;
pub mod state;
pub mod todos;

pub use auth::{AuthError, Claims, CurrentUser, TokenIssuer, require_auth};
pub use generate::{GenerationOutcome, generate_proxy};
pub use registry::ApiRegistry;
pub use state::AppState;
pub use todos::{Todo, TodoStore, TodoUpdate};

use axum::Router;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Assembles the full application: API routes, static files from
/// `public_dir` as fallback, request tracing and permissive CORS.
pub fn build_app(registry: ApiRegistry, state: AppState, public_dir: &Path) -> Router {
    registry
        .into_router(state)
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
