//! Dynamic test harness for generated API proxy modules.
//!
//! Reads the module's source text, builds one [`Section`] per callable with
//! one input [`Field`] per parameter, and submits through a
//! [`ProxyInvoker`]. Field kinds come from a [`FieldKindTable`].
//!
//! # Examples
//!
//! ```
//! use apiproxy_core::ProxyMethodDescriptor;
//! use apiproxy_harness::{FieldKind, FieldKindTable, Section};
//!
//! let descriptor = ProxyMethodDescriptor::new(
//!     "create",
//!     "@param {object} data - Request body.",
//!     vec!["data".to_string()],
//! );
//! let section = Section::new(&descriptor, &FieldKindTable::default());
//!
//! let field = section.field("data").unwrap();
//! assert_eq!(field.kind(), FieldKind::Structured);
//!
//! field.set_value("not-json-{");
//! assert!(section.collect_args().is_err());
//! assert_eq!(field.value(), "not-json-{");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod field;
mod harness;
mod input;
mod invoker;
pub mod render;
mod section;

pub use field::{FieldKind, FieldKindTable, FieldRule};
pub use harness::{AuthStatus, Harness};
pub use input::{FieldError, parse_field};
pub use invoker::ProxyInvoker;
pub use section::{Field, ResponseView, Section, SubmitOutcome};
