//! Descriptor derivation from a live route table.

use crate::naming::derive_callable_name;
use crate::source::{RouteEntry, RouteSource};
use apiproxy_core::{
    CallableName, Error, ManifestEntry, ParamType, ProxyManifest, Result, RouteDescriptor,
    RouteParam, is_binding_name,
};
use std::collections::HashMap;
use tracing::{debug, info};

/// Converts registered routes into callable descriptors.
///
/// `auth_enabled` mirrors the server's `USE_AUTH` switch: a protected route
/// only requires a token in the generated module when auth is on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Introspector {
    auth_enabled: bool,
}

impl Introspector {
    /// Creates an introspector for the given auth mode.
    #[must_use]
    pub const fn new(auth_enabled: bool) -> Self {
        Self { auth_enabled }
    }

    /// Returns whether protected routes are marked as requiring auth.
    #[must_use]
    pub const fn auth_enabled(&self) -> bool {
        self.auth_enabled
    }

    /// Describes every route of `source`, in registration order.
    ///
    /// An empty route table yields an empty surface.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRoute`] if a path yields no callable name, declares
    ///   an invalid parameter name, declares a path parameter that does not
    ///   appear in the template, or has a `:segment` the callable's argument
    ///   does not fill
    /// - [`Error::DuplicateCallable`] if two routes derive the same name
    pub fn describe<S: RouteSource + ?Sized>(&self, source: &S) -> Result<ApiSurface> {
        let routes = source.routes();
        let mut seen: HashMap<CallableName, String> = HashMap::with_capacity(routes.len());
        let mut entries = Vec::with_capacity(routes.len());

        for entry in routes {
            let name = derive_callable_name(&entry.path)?;
            if let Some(first) = seen.get(&name) {
                return Err(Error::DuplicateCallable {
                    name: name.into_inner(),
                    first: first.clone(),
                    second: entry.path,
                });
            }
            seen.insert(name.clone(), entry.path.clone());

            let route = self.describe_entry(entry)?;
            debug!(
                callable = %name,
                method = %route.method,
                path = %route.path,
                requires_auth = route.requires_auth,
                "described route"
            );
            entries.push(ManifestEntry::new(name, route));
        }

        info!(routes = entries.len(), auth = self.auth_enabled, "route table introspected");
        Ok(ApiSurface { entries })
    }

    fn describe_entry(&self, entry: RouteEntry) -> Result<RouteDescriptor> {
        let RouteEntry {
            method,
            path,
            param,
            protected,
            issues_token,
            doc,
        } = entry;

        let path_params: Vec<String> = path
            .split('/')
            .filter_map(|s| s.strip_prefix(':'))
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();

        let param = match param {
            Some(param) => {
                validate_param_name(&path, &param.name)?;
                if param.kind == ParamType::Path && !path_params.contains(&param.name) {
                    return Err(Error::InvalidRoute {
                        path,
                        reason: format!("path parameter '{}' is not in the template", param.name),
                    });
                }
                Some(param)
            }
            None if path_params.len() == 1 => {
                validate_param_name(&path, &path_params[0])?;
                Some(RouteParam::new(path_params[0].clone(), ParamType::Path))
            }
            None => None,
        };

        let filled = param
            .as_ref()
            .filter(|p| p.kind == ParamType::Path)
            .map(|p| p.name.as_str());
        if let Some(unfilled) = path_params.iter().find(|s| Some(s.as_str()) != filled) {
            return Err(Error::InvalidRoute {
                reason: format!("path segment ':{unfilled}' is not filled by any parameter"),
                path,
            });
        }

        Ok(RouteDescriptor {
            method,
            path,
            param,
            requires_auth: protected && self.auth_enabled,
            issues_token,
            doc,
        })
    }
}

fn validate_param_name(path: &str, name: &str) -> Result<()> {
    if is_binding_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidRoute {
            path: path.to_string(),
            reason: format!("parameter name '{name}' is not a valid identifier"),
        })
    }
}

/// The described API surface: one entry per route, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiSurface {
    entries: Vec<ManifestEntry>,
}

impl ApiSurface {
    /// Builds a surface from already-described entries.
    #[must_use]
    pub const fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    /// All entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Looks up an entry by callable name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name.as_str() == name)
    }

    /// Callable names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no routes were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the sidecar manifest for this surface.
    #[must_use]
    pub fn to_manifest(&self) -> ProxyManifest {
        ProxyManifest::new(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiproxy_core::HttpMethod;

    #[test]
    fn test_infers_single_path_param() {
        let routes = vec![RouteEntry::get("/api/echomsg/:msg")];
        let surface = Introspector::new(false).describe(&routes).unwrap();
        let route = &surface.get("echomsg").unwrap().route;

        assert_eq!(route.param, Some(RouteParam::new("msg", ParamType::Path)));
    }

    #[test]
    fn test_two_path_params_are_rejected() {
        let routes = vec![RouteEntry::get("/api/a/:x/b/:y")];
        let err = Introspector::new(false).describe(&routes).unwrap_err();
        assert!(err.is_invalid_route());
        assert!(err.to_string().contains("segment ':x'"), "{err}");
    }

    #[test]
    fn test_path_segment_beside_body_param_is_rejected() {
        let routes = vec![RouteEntry::post("/api/items/:id").body("data")];
        let err = Introspector::new(false).describe(&routes).unwrap_err();
        assert!(err.is_invalid_route());
        assert!(err.to_string().contains("segment ':id'"), "{err}");
    }

    #[test]
    fn test_path_segment_beside_query_param_is_rejected() {
        let routes = vec![RouteEntry::get("/api/items/:id").query("q")];
        assert!(Introspector::new(false).describe(&routes).unwrap_err().is_invalid_route());
    }

    #[test]
    fn test_declared_path_param_fills_its_segment() {
        let routes = vec![RouteEntry::get("/api/items/:id").path_param("id")];
        let surface = Introspector::new(false).describe(&routes).unwrap();
        assert_eq!(
            surface.entries()[0].route.param,
            Some(RouteParam::new("id", ParamType::Path))
        );
    }

    #[test]
    fn test_requires_auth_only_when_enabled() {
        let routes = vec![RouteEntry::post("/api/reversemsg").body("message").protected()];

        let off = Introspector::new(false).describe(&routes).unwrap();
        assert!(!off.entries()[0].route.requires_auth);

        let on = Introspector::new(true).describe(&routes).unwrap();
        assert!(on.entries()[0].route.requires_auth);
    }

    #[test]
    fn test_unprotected_route_never_requires_auth() {
        let routes = vec![RouteEntry::get("/api/todos/fetch")];
        let surface = Introspector::new(true).describe(&routes).unwrap();
        assert!(!surface.entries()[0].route.requires_auth);
    }

    #[test]
    fn test_duplicate_names_report_both_paths() {
        let routes = vec![
            RouteEntry::get("/api/todos/fetch"),
            RouteEntry::get("/api/users/fetch"),
        ];
        let err = Introspector::new(false).describe(&routes).unwrap_err();

        match err {
            Error::DuplicateCallable {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "fetch");
                assert_eq!(first, "/api/todos/fetch");
                assert_eq!(second, "/api/users/fetch");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_declared_path_param_must_exist() {
        let routes = vec![RouteEntry::get("/api/items/list").path_param("id")];
        let err = Introspector::new(false).describe(&routes).unwrap_err();
        assert!(err.is_invalid_route());
    }

    #[test]
    fn test_invalid_param_name_rejected() {
        let routes = vec![RouteEntry::post("/api/items/create").body("bad-name")];
        let err = Introspector::new(false).describe(&routes).unwrap_err();
        assert!(err.is_invalid_route());
    }

    #[test]
    fn test_reserved_word_param_rejected() {
        for routes in [
            vec![RouteEntry::post("/api/items/create").body("class")],
            vec![RouteEntry::get("/api/items/:delete")],
        ] {
            let err = Introspector::new(false).describe(&routes).unwrap_err();
            assert!(err.is_invalid_route(), "{err}");
        }
    }

    #[test]
    fn test_surface_to_manifest_keeps_order() {
        let routes = vec![
            RouteEntry::post("/api/login").body("credentials").issues_token(),
            RouteEntry::new(HttpMethod::Delete, "/api/todos/delete").body("data"),
        ];
        let manifest = Introspector::new(false)
            .describe(&routes)
            .unwrap()
            .to_manifest();

        assert_eq!(manifest.names().collect::<Vec<_>>(), vec!["login", "delete"]);
        assert!(manifest.entries[0].route.issues_token);
    }
}
