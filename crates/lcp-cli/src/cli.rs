//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// LDAP control panel - browse and inspect an LDAP directory.
#[derive(Debug, Parser)]
#[command(name = "lcp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file (default: ~/.config/lcp/settings.toml).
    #[arg(short, long, env = "LDAPCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server URI (overrides settings).
    #[arg(long, env = "LDAPCP_URI")]
    pub uri: Option<String>,

    /// Bind DN (overrides settings).
    #[arg(long, env = "LDAPCP_BIND_DN")]
    pub bind_dn: Option<String>,

    /// Bind password (overrides settings).
    #[arg(long, env = "LDAPCP_BIND_PASSWORD", hide_env_values = true)]
    pub bind_password: Option<String>,

    /// Base DN (overrides settings; empty to discover).
    #[arg(long, env = "LDAPCP_BASE_DN")]
    pub base_dn: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the directory tree below the base DN.
    Tree(TreeArgs),

    /// Show a single entry.
    Entry {
        /// Distinguished name of the entry.
        dn: String,
    },

    /// Print the base DN, discovering it if it is not configured.
    BaseDn,

    /// Run a saved view, or list the configured views.
    View(ViewArgs),
}

/// Options of the `view` command.
#[derive(Debug, Default, Args)]
pub struct ViewArgs {
    /// View entity; omit to list all views.
    pub entity: Option<String>,

    /// Profile of the entity; omit to list the entity's matching DNs.
    pub profile: Option<String>,
}

/// Options of the `tree` command.
#[derive(Debug, Default, Args)]
pub struct TreeArgs {
    /// Levels to load below the base DN.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Label style: "full" (RDN) or "simple" (display name).
    #[arg(long)]
    pub display_mode: Option<String>,

    /// Show containers before leaves.
    #[arg(long, value_name = "BOOL")]
    pub containers_first: Option<bool>,

    /// Print every loaded level instead of the first one only.
    #[arg(short, long)]
    pub expand: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Table,
    /// JSON output.
    Json,
}
