//! The route registry.
//!
//! Every route is registered once, together with its descriptor, so the
//! same table both builds the axum router and feeds the proxy generator.

use crate::auth::require_auth;
use crate::routes;
use crate::state::AppState;
use apiproxy_core::{FieldDoc, HttpMethod};
use apiproxy_introspector::{RouteEntry, RouteSource};
use axum::Router;
use axum::handler::Handler;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodFilter, MethodRouter, on};
use std::fmt;

struct Registration {
    entry: RouteEntry,
    handler: MethodRouter<AppState>,
}

/// Ordered table of routes and their handlers.
#[derive(Default)]
pub struct ApiRegistry {
    routes: Vec<Registration>,
}

impl fmt::Debug for ApiRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|r| (r.entry.method, &r.entry.path)))
            .finish()
    }
}

const fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Converts `:name` segments to axum's `{name}` captures.
///
/// # Examples
///
/// ```
/// use apiproxy_server::registry::axum_path;
///
/// assert_eq!(axum_path("/api/echomsg/:msg"), "/api/echomsg/{msg}");
/// assert_eq!(axum_path("/api/todos/fetch"), "/api/todos/fetch");
/// ```
#[must_use]
pub fn axum_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            segment
                .strip_prefix(':')
                .map_or_else(|| segment.to_string(), |name| format!("{{{name}}}"))
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl ApiRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route. The handler is mounted for the entry's method only.
    #[must_use]
    pub fn route<H, T>(mut self, entry: RouteEntry, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        let handler = on(method_filter(entry.method), handler);
        self.routes.push(Registration { entry, handler });
        self
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The demo API: login, echo, reverse and the todo CRUD routes.
    #[must_use]
    pub fn demo() -> Self {
        Self::new()
            .route(
                RouteEntry::post("/api/login")
                    .body("credentials")
                    .issues_token()
                    .summary("Log in with a username and password.")
                    .field(FieldDoc::required("username", "string", "Account name."))
                    .field(FieldDoc::required("password", "string", "Account password.")),
                routes::login,
            )
            .route(
                RouteEntry::get("/api/echomsg/:msg")
                    .protected()
                    .summary("Echo the message taken from the URL path."),
                routes::echo_message,
            )
            .route(
                RouteEntry::post("/api/reversemsg")
                    .body("message")
                    .protected()
                    .summary("Reverse the message carried in a JSON body.")
                    .field(FieldDoc::required("message", "string", "Text to reverse.")),
                routes::reverse_message,
            )
            .route(
                RouteEntry::get("/api/todos/fetch").summary("List all todos."),
                routes::fetch_todos,
            )
            .route(
                RouteEntry::post("/api/todos/create")
                    .body("data")
                    .summary("Create a todo.")
                    .field(FieldDoc::required("text", "string", "Todo text.")),
                routes::create_todo,
            )
            .route(
                RouteEntry::post("/api/todos/update")
                    .body("data")
                    .summary("Update an existing todo.")
                    .field(FieldDoc::required("id", "number", "Todo id."))
                    .field(FieldDoc::optional("text", "string", "New text."))
                    .field(FieldDoc::optional("completed", "boolean", "New completion state.")),
                routes::update_todo,
            )
            .route(
                RouteEntry::post("/api/todos/delete")
                    .body("data")
                    .summary("Delete a todo.")
                    .field(FieldDoc::required("id", "number", "Todo id.")),
                routes::delete_todo,
            )
    }

    /// Builds the router. Protected routes get the auth middleware when
    /// `state.use_auth` is on.
    pub fn into_router(self, state: AppState) -> Router {
        let mut router = Router::new();
        for Registration { entry, handler } in self.routes {
            let handler = if entry.protected && state.use_auth {
                handler.route_layer(from_fn_with_state(state.tokens.clone(), require_auth))
            } else {
                handler
            };
            tracing::debug!(method = %entry.method, path = %entry.path, "mounted route");
            router = router.route(&axum_path(&entry.path), handler);
        }
        router.with_state(state)
    }
}

impl RouteSource for ApiRegistry {
    fn routes(&self) -> Vec<RouteEntry> {
        self.routes.iter().map(|r| r.entry.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiproxy_introspector::Introspector;

    #[test]
    fn test_demo_surface() {
        let surface = Introspector::new(true).describe(&ApiRegistry::demo()).unwrap();
        let names: Vec<_> = surface.names().collect();
        assert_eq!(
            names,
            vec!["login", "echomsg", "reversemsg", "fetch", "create", "update", "delete"]
        );
        assert!(surface.get("echomsg").unwrap().route.requires_auth);
        assert!(!surface.get("fetch").unwrap().route.requires_auth);
        assert!(surface.get("login").unwrap().route.issues_token);
        assert_eq!(surface.get("echomsg").unwrap().route.param_names(), vec!["msg"]);
        assert!(surface.get("fetch").unwrap().route.param_names().is_empty());
    }

    #[test]
    fn test_axum_path_multiple_params() {
        assert_eq!(axum_path("/a/:x/b/:y"), "/a/{x}/b/{y}");
        assert_eq!(axum_path("/"), "/");
    }
}
