//! Clawgate CLI - inspect and exercise the authorization subsystem.
//!
//! Loads the layered configuration, builds a [`Gatekeeper`] with logging
//! collaborators, and answers one question per invocation: what would the
//! enforcer decide, what does a tenant's profile hold, does this text pass
//! the safety filter.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clawgate_config::{Config, ResolvedConfig};
use clawgate_core::{LoggingAgentNotifier, LoggingApprovalChannel};
use clawgate_gateway::{Collaborators, Gatekeeper, config_bridge};

mod commands;
mod theme;

use commands::{check, config, profile, scan};

/// Clawgate - tenant authorization and human approval
#[derive(Parser)]
#[command(name = "clawgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to an explicit configuration file
    #[arg(short, long, global = true, env = "CLAWGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Ask the enforcer for a decision without escalating
    Check {
        #[command(subcommand)]
        command: CheckCommands,
    },

    /// Inspect and edit tenant permission profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Run the safety filter over text
    Scan {
        #[command(subcommand)]
        command: ScanCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
        /// Show only a specific section (e.g. approval, policy, profiles)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Show config file paths being checked
    Paths,
}

#[derive(Subcommand)]
enum CheckCommands {
    /// Check a tool
    Tool {
        /// Tenant ID
        tenant: String,
        /// Tool name
        tool: String,
    },
    /// Check a data path
    Path {
        /// Tenant ID
        tenant: String,
        /// Filesystem path
        path: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show a tenant's effective profile
    Show {
        /// Tenant ID
        tenant: String,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a tool, data path, or API endpoint to a tenant's profile
    Grant {
        /// Tenant ID
        tenant: String,
        /// Resource type (tool, data_path, api_endpoint)
        resource_type: String,
        /// Tool name, path, or endpoint
        value: String,
    },
}

#[derive(Subcommand)]
enum ScanCommands {
    /// Check a session-memory summary for injection signatures
    Memory {
        /// File holding the summary
        file: PathBuf,
    },
    /// Apply the inbound message limits to a message
    Message {
        /// Message text
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let mut log_config = config_bridge::log_config(&resolved.config.logging)?;
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = clawgate_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match cli.command {
        Commands::Config { command } => handle_config(&resolved, command),
        Commands::Check { command } => {
            let gate = build_gatekeeper(&resolved.config)?;
            handle_check(&gate, &resolved.config, command)
        },
        Commands::Profile { command } => {
            let gate = build_gatekeeper(&resolved.config)?;
            handle_profile(&gate, command)
        },
        Commands::Scan { command } => {
            let gate = build_gatekeeper(&resolved.config)?;
            handle_scan(&gate, command)
        },
    }
}

/// Build a gatekeeper whose approval channel and notifier only log.
fn build_gatekeeper(config: &Config) -> Result<Gatekeeper> {
    let collaborators = Collaborators::new(
        Arc::new(LoggingApprovalChannel),
        Arc::new(LoggingAgentNotifier),
    );
    Gatekeeper::from_config(config, collaborators).context("failed to build gatekeeper")
}

fn handle_config(resolved: &ResolvedConfig, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { format, section } => {
            config::show_config(resolved, &format, section.as_deref())
        },
        ConfigCommands::Paths => {
            config::show_paths(resolved);
            Ok(())
        },
    }
}

fn handle_check(gate: &Gatekeeper, cfg: &Config, command: CheckCommands) -> Result<()> {
    let risk = config_bridge::risk_catalogue(&cfg.risk);
    match command {
        CheckCommands::Tool { tenant, tool } => check::check_tool(gate, &risk, &tenant, &tool),
        CheckCommands::Path { tenant, path } => check::check_path(gate, &risk, &tenant, &path),
    }
}

fn handle_profile(gate: &Gatekeeper, command: ProfileCommands) -> Result<()> {
    match command {
        ProfileCommands::Show { tenant, json } => profile::show_profile(gate, &tenant, json),
        ProfileCommands::Grant {
            tenant,
            resource_type,
            value,
        } => profile::grant(gate, &tenant, &resource_type, &value),
    }
}

fn handle_scan(gate: &Gatekeeper, command: ScanCommands) -> Result<()> {
    match command {
        ScanCommands::Memory { file } => scan::scan_memory(gate, &file),
        ScanCommands::Message { text } => {
            scan::scan_message(gate, &text);
            Ok(())
        },
    }
}
