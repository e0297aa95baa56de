//! Interactive harness command.
//!
//! Downloads the served module, builds one section per callable and lets
//! the user fill in fields and submit calls from the terminal.

use super::common::{dispatcher, fetch_module_source, open_session};
use anyhow::{Context, Result};
use apiproxy_client::ProxyModule;
use apiproxy_core::cli::ExitCode;
use apiproxy_harness::render::{render_auth_status, render_harness, render_section};
use apiproxy_harness::{FieldKindTable, Harness, Section, SubmitOutcome};
use dialoguer::{Input, Select};
use std::path::Path;

const QUIT: &str = "Quit";
const LOGOUT: &str = "Log out";

/// Loads the harness for the server at `url`.
///
/// A module that cannot be downloaded yields a harness with only an error
/// banner; a manifest that cannot be loaded is an error.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the manifest cannot be loaded.
pub async fn load(url: &str, token_dir: Option<&Path>) -> Result<Harness<ProxyModule>> {
    let dispatcher = dispatcher(url, open_session(token_dir)?)?;
    let source = fetch_module_source(&dispatcher).await;
    let module = ProxyModule::connect(dispatcher)
        .await
        .with_context(|| format!("failed to load the API proxy manifest from {url}"))?;

    Ok(match source {
        Ok(source) => Harness::load(&source, module, &FieldKindTable::default()),
        Err(e) => Harness::failed(module, format!("Failed to load the API proxy module: {e:#}")),
    })
}

/// Runs the interactive harness until the user quits.
///
/// # Errors
///
/// Returns an error if the harness cannot be loaded or terminal input
/// fails.
pub async fn run(url: &str, token_dir: Option<&Path>) -> Result<ExitCode> {
    let harness = load(url, token_dir).await?;
    println!("{}", render_harness(&harness));

    if harness.banner().is_some() {
        return Ok(ExitCode::ERROR);
    }

    loop {
        let mut items: Vec<&str> = harness.sections().iter().map(Section::name).collect();
        items.push(LOGOUT);
        items.push(QUIT);

        let choice = Select::new()
            .with_prompt(render_auth_status(harness.auth_status()))
            .items(&items)
            .default(0)
            .interact()
            .context("failed to read selection")?;

        match items[choice] {
            QUIT => break,
            LOGOUT => {
                harness.invoker().session().logout();
                harness.refresh_auth();
            }
            name => {
                let Some(section) = harness.section(name) else {
                    continue;
                };
                prompt_fields(section)?;
                if let Some(SubmitOutcome::Busy) = harness.submit(name).await {
                    eprintln!("A call from '{name}' is still running");
                }
                println!("{}", render_section(section));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn prompt_fields(section: &Section) -> Result<()> {
    for field in section.fields() {
        let value: String = Input::new()
            .with_prompt(field.name())
            .with_initial_text(field.value())
            .allow_empty(true)
            .interact_text()
            .context("failed to read field value")?;
        field.set_value(value);
    }
    Ok(())
}

