//! API proxy CLI.
//!
//! Command-line front end for the API proxy pipeline: generate the module
//! from the demo route table, extract and verify module files, call a
//! running server through its manifest, and drive the interactive harness.
//!
//! # Examples
//!
//! ```bash
//! # Write apiProxy.js and its manifest
//! apiproxy generate --output public/ajax
//!
//! # Check a module against its manifest
//! apiproxy verify public/ajax/apiProxy.js
//!
//! # Call a running server
//! apiproxy call echomsg hi
//! apiproxy login testuser --password password123
//! apiproxy call reversemsg '{"message": "abc"}'
//! ```

use anyhow::Result;
use apiproxy_cli::commands;
use apiproxy_core::DEFAULT_OUTPUT_DIR;
use apiproxy_core::cli::{ExitCode, OutputFormat};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Generate, check and exercise API proxy modules.
#[derive(Parser, Debug)]
#[command(name = "apiproxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,
}

/// Where the server is and where the session token is kept.
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Base URL of the server
    #[arg(long, env = "APIPROXY_URL", default_value = commands::common::DEFAULT_URL)]
    url: String,

    /// Directory holding the saved session token
    #[arg(long, env = "APIPROXY_TOKEN_DIR")]
    token_dir: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate apiProxy.js and its manifest from the demo routes.
    Generate {
        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Mark protected routes as requiring auth
        #[arg(long, env = "USE_AUTH")]
        use_auth: bool,
    },

    /// Print the callables found in a module file.
    Extract {
        /// Path to apiProxy.js
        file: PathBuf,
    },

    /// Check a module file against its manifest.
    Verify {
        /// Path to apiProxy.js
        module: PathBuf,

        /// Manifest path (defaults to the file next to the module)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Call one API through the served manifest.
    ///
    /// Arguments are parsed as JSON when possible, otherwise passed as
    /// strings.
    Call {
        #[command(flatten)]
        server: ServerArgs,

        /// Callable name
        name: String,

        /// Arguments in declaration order
        args: Vec<String>,
    },

    /// Open the interactive test harness.
    Harness {
        #[command(flatten)]
        server: ServerArgs,
    },

    /// Log in and save the session token.
    Login {
        #[command(flatten)]
        server: ServerArgs,

        /// Account name
        username: String,

        /// Account password (prompted when omitted)
        #[arg(long, env = "APIPROXY_PASSWORD")]
        password: Option<String>,
    },

    /// Forget the saved session token.
    Logout {
        /// Directory holding the saved session token
        #[arg(long, env = "APIPROXY_TOKEN_DIR")]
        token_dir: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let output_format = cli
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let exit_code = execute_command(cli.command, output_format).await?;

    std::process::exit(exit_code.as_i32());
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn execute_command(command: Commands, output_format: OutputFormat) -> Result<ExitCode> {
    match command {
        Commands::Generate { output, use_auth } => {
            commands::generate::run(&output, use_auth, output_format).await
        }
        Commands::Extract { file } => commands::extract::run(&file, output_format).await,
        Commands::Verify { module, manifest } => {
            commands::verify::run(&module, manifest.as_deref(), output_format).await
        }
        Commands::Call { server, name, args } => {
            commands::call::run(
                &server.url,
                server.token_dir.as_deref(),
                &name,
                &args,
                output_format,
            )
            .await
        }
        Commands::Harness { server } => {
            commands::harness::run(&server.url, server.token_dir.as_deref()).await
        }
        Commands::Login {
            server,
            username,
            password,
        } => {
            commands::auth::login(
                &server.url,
                server.token_dir.as_deref(),
                &username,
                password,
                output_format,
            )
            .await
        }
        Commands::Logout { token_dir } => commands::auth::logout(token_dir.as_deref()).await,
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd)
        }
    }
}
