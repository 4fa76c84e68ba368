//! Command-line interface.

pub mod completions;
pub mod groups;
pub mod login;
pub mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::LoginConfig;
use crate::core::constants;
use crate::error::Result;

/// kubegate - log in to groups of Kubernetes clusters.
#[derive(Parser)]
#[command(
    name = "kubegate",
    about = "Log in to groups of Kubernetes clusters and merge the credentials into kubeconfig",
    version
)]
pub struct Cli {
    /// Config file (default: ~/.kubegate/config.toml)
    #[arg(short, long, global = true, env = constants::ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Log in to every target of a group
    Login {
        /// Group to log in to (default: the configured default group)
        #[arg(short, long)]
        group: Option<String>,

        /// Set to false without a browser (tokens are pasted instead)
        #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
        interactive: bool,
    },

    /// List configured groups and their targets
    Groups,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Login { group, interactive } => {
            let config = load_config(cli.config.as_deref())?;
            login::execute(config, group.as_deref(), interactive)
        }
        Command::Groups => {
            let config = load_config(cli.config.as_deref())?;
            groups::execute(&config)
        }
        Command::Completions { shell } => completions::execute(shell),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<LoginConfig> {
    match path {
        Some(path) => LoginConfig::load(path),
        None => LoginConfig::load(&LoginConfig::default_path()?),
    }
}
