//! JavaScript API proxy generation.
//!
//! Renders an [`ApiSurface`](apiproxy_introspector::ApiSurface) into a single
//! ES module exposing one documented callable per route, and writes it to
//! disk together with a JSON manifest describing the same callables.
//!
//! # Architecture
//!
//! - [`template_engine`]: Handlebars wrapper with the built-in templates
//! - [`generator`]: surface to [`GeneratedCode`]
//! - [`writer`]: atomic artifact writes and the start-up [`GenerationGate`]
//!
//! # Examples
//!
//! ```
//! use apiproxy_codegen::ProxyGenerator;
//! use apiproxy_introspector::{Introspector, RouteEntry};
//!
//! let routes = vec![RouteEntry::get("/api/echomsg/:msg")];
//! let surface = Introspector::new(false).describe(&routes).unwrap();
//!
//! let code = ProxyGenerator::new().unwrap().generate(&surface).unwrap();
//! assert!(code.source.contains("export const apiProxy = {"));
//! assert!(code.source.contains("echomsg: async (msg) =>"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod doc;
pub mod generator;
pub mod template_engine;
pub mod types;
pub mod writer;

pub use generator::{MANIFEST_FILE_NAME, MODULE_FILE_NAME, ProxyGenerator};
pub use types::{GeneratedCode, GeneratedFile};
pub use writer::{GenerationGate, write_artifacts};
