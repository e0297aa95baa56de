//! Request dispatch and session handling for API proxy consumers.
//!
//! Rust counterpart of the generated module's runtime:
//!
//! - [`Dispatcher`] sends requests with the session's bearer token
//! - [`Session`] owns the token slot and its durable storage
//! - [`ProxyModule`] turns manifest entries into named callables
//!
//! # Examples
//!
//! ```no_run
//! use apiproxy_client::{Dispatcher, ResponsePayload, Session};
//! use apiproxy_core::HttpMethod;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), apiproxy_client::DispatchError> {
//! let session = Arc::new(Session::new());
//! let dispatcher = Dispatcher::new(url::Url::parse("http://localhost:8893/").unwrap(), session);
//!
//! let todos = dispatcher
//!     .send(HttpMethod::Get, "/api/todos/fetch", None, None)
//!     .await?;
//! if let ResponsePayload::Json(list) = todos {
//!     println!("{list}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod dispatch;
mod error;
mod proxy;
mod token;

pub use dispatch::{Dispatcher, RequestBody, ResponsePayload};
pub use error::{ApiError, DispatchError, InvokeError};
pub use proxy::{MANIFEST_PATH, MODULE_PATH, ProxyModule};
pub use token::{
    AUTH_TOKEN_STORAGE_KEY, FileTokenPersistence, MemoryPersistence, Session, TokenPersistence,
    TokenStore,
};
