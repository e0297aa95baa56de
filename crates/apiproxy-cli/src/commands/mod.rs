//! Command implementations for the API proxy CLI.
//!
//! Each module runs one subcommand and formats its result according to the
//! requested output format.

pub mod auth;
pub mod call;
pub mod common;
pub mod completions;
pub mod extract;
pub mod generate;
pub mod harness;
pub mod verify;
