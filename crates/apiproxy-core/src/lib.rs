//! Core types, errors and configuration for the API proxy pipeline.
//!
//! This crate provides the vocabulary shared by every stage of the
//! introspect → generate → re-parse → invoke loop.
//!
//! # Architecture
//!
//! The core consists of:
//! - Route descriptors (`RouteDescriptor`, `HttpMethod`, `ParamType`)
//! - Extracted callable metadata (`ProxyMethodDescriptor`, `ProxyMetadata`)
//! - The sidecar manifest emitted next to the generated module (`ProxyManifest`)
//! - Error hierarchy with contextual information
//! - Environment-driven configuration (`ProxyConfig`)
//! - CLI helper types (`OutputFormat`, `ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cli;
mod config;
mod error;
mod manifest;
mod metadata;
mod types;

pub use config::{
    DEFAULT_JWT_SECRET, DEFAULT_OUTPUT_DIR, DEFAULT_PORT, DEFAULT_PUBLIC_DIR, DeploymentEnv,
    ProxyConfig,
};
pub use error::{Error, Result};
pub use manifest::{MANIFEST_VERSION, ManifestEntry, ProxyManifest};
pub use metadata::{ProxyMetadata, ProxyMethodDescriptor};
pub use types::{
    CallableName, FieldDoc, HttpMethod, ParamType, RouteDescriptor, RouteDoc, RouteParam,
    is_binding_name,
};
