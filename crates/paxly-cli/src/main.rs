//! # paxly
//!
//! Multi-language dependency manager CLI.
//!
//! Parses the command line, sets up logging and the panic hook, builds the
//! command context and dispatches to the command handlers. Failures are printed
//! with their cause chain and a suggestion, and the process exits non-zero.

use clap::{Parser, Subcommand};
use paxly_core::error::{PaxlyError, PaxlyResult};
use std::collections::HashMap;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Manage python, javascript, rust and go dependencies from one manifest
#[derive(Parser, Debug)]
#[command(name = "paxly", version, about = "Multi-language dependency manager")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Manifest file to use instead of the nearest paxly.yaml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub manifest: Option<String>,

    /// Per-lookup timeout in seconds (0 disables it)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create paxly.yaml in the current directory
    Init {
        #[arg(short, long)]
        name: String,
        #[arg(short = 'r', long, default_value = "0.1.0")]
        version: String,
        #[arg(short = 's', long)]
        description: Option<String>,
        /// Author as "Name <email>", repeatable
        #[arg(short, long = "authors")]
        authors: Vec<String>,
    },
    /// Declare a dependency
    Add {
        #[arg(short, long)]
        language: String,
        #[arg(short, long)]
        name: String,
        /// Caret constraint, e.g. ^2.28
        #[arg(short = 'r', long)]
        version: String,
        #[arg(short, long)]
        env: Option<String>,
    },
    /// Remove a declared dependency
    Remove {
        #[arg(short, long)]
        language: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        env: Option<String>,
    },
    /// Change the constraint of a declared dependency
    Update {
        #[arg(short, long)]
        language: String,
        #[arg(short, long)]
        name: String,
        #[arg(short = 'r', long)]
        version: String,
        #[arg(short, long)]
        env: Option<String>,
    },
    /// Resolve an environment and print the chosen versions
    Resolve {
        #[arg(short, long)]
        env: Option<String>,
        /// Print the resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve an environment, then install it with each language's tooling
    Install {
        #[arg(short, long)]
        env: Option<String>,
    },
    /// Show declared and installed dependencies
    List {
        #[arg(short, long)]
        env: Option<String>,
    },
    /// Validate the manifest
    Check,
    /// Show version information
    Version,
}

impl Cli {
    /// Flags that override settings
    fn settings_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(timeout) = self.timeout {
            overrides.insert("timeout".to_string(), timeout.to_string());
        }
        if let Some(manifest) = &self.manifest {
            overrides.insert("manifest".to_string(), manifest.clone());
        }
        overrides
    }
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.debug);
    setup_panic_handler();

    info!("Starting Paxly CLI v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run_cli(cli) {
        error!("{}", err);
        eprintln!("{}", ErrorFormatter::new().format_error(&err));
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> PaxlyResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| PaxlyError::io("Failed to create async runtime", e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(&cli.settings_overrides()).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn log_level(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    }
}

fn setup_logging(verbose: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose, debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Paxly encountered an unexpected error: {}", panic_info);
        eprintln!("Paxly crashed! This is a bug.");
        eprintln!("Please report this at: {}/issues", env!("CARGO_PKG_REPOSITORY"));
        eprintln!("Error: {}", panic_info);
    }));
}
