//! API proxy CLI library.
//!
//! Exposes the command implementations and output formatters so they can be
//! tested without spawning the binary.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_async)]

pub mod commands;
pub mod formatters;
