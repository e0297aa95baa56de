//! Route table introspection.
//!
//! Turns the routes registered on a live server into the
//! [`RouteDescriptor`](apiproxy_core::RouteDescriptor) set that drives code
//! generation. The server exposes its routes through the [`RouteSource`]
//! trait; the [`Introspector`] derives a callable name for each one and
//! rejects tables whose names collide.
//!
//! # Examples
//!
//! ```
//! use apiproxy_introspector::{Introspector, RouteEntry};
//!
//! let routes = vec![
//!     RouteEntry::get("/api/echomsg/:msg").protected(),
//!     RouteEntry::get("/api/todos/fetch"),
//! ];
//!
//! let surface = Introspector::new(true).describe(&routes).unwrap();
//! let names: Vec<_> = surface.names().collect();
//! assert_eq!(names, vec!["echomsg", "fetch"]);
//!
//! let echo = surface.get("echomsg").unwrap();
//! assert!(echo.route.requires_auth);
//! assert_eq!(echo.route.param_names(), vec!["msg".to_string()]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod discovery;
pub mod naming;
pub mod source;

pub use discovery::{ApiSurface, Introspector};
pub use naming::{derive_callable_name, to_camel_case};
pub use source::{RouteEntry, RouteSource};
