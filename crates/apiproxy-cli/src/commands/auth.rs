//! Login and logout commands.
//!
//! The token is saved in the same storage every other command restores
//! from, so a later `call` or `harness` run is authenticated.

use super::common::{connect, open_session};
use anyhow::{Context, Result};
use apiproxy_core::cli::{ExitCode, OutputFormat};
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Runs the login command. Prompts for the password when not given.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or the password
/// prompt fails.
pub async fn login(
    url: &str,
    token_dir: Option<&Path>,
    username: &str,
    password: Option<String>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .context("failed to read password")?,
    };

    let module = connect(url, token_dir).await?;
    let credentials = json!({ "username": username, "password": password });

    match module.invoke("login", vec![credentials]).await {
        Ok(payload) => {
            if output_format == OutputFormat::Pretty {
                println!("{} Logged in as {username}", "✓".green());
            } else {
                println!("{}", crate::formatters::format_payload(&payload, output_format)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} Login failed: {e}", "✗".red());
            Ok(super::call::exit_code_for(&e))
        }
    }
}

/// Runs the logout command. Only local state is cleared.
///
/// # Errors
///
/// Returns an error if the token storage location cannot be determined.
pub async fn logout(token_dir: Option<&Path>) -> Result<ExitCode> {
    let session = open_session(token_dir)?;
    session.logout();
    println!("Logged out");
    Ok(ExitCode::SUCCESS)
}
