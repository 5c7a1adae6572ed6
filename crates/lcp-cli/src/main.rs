//! # lcp
//!
//! Browse and inspect an LDAP directory from the terminal.

#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use lcp_cli::{
    cli::{Cli, Command},
    commands::{run_base_dn, run_entry, run_tree, run_view},
    output::{error, hint},
    CliError, Settings,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error(&format!("{e:#}"));
        if let Some(message) = e.downcast_ref::<CliError>().and_then(CliError::hint) {
            hint(message);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    settings.apply_overrides(&cli);

    match cli.command {
        Command::Tree(args) => run_tree(&args, &settings, cli.output)?,
        Command::Entry { dn } => run_entry(&dn, &settings, cli.output)?,
        Command::BaseDn => run_base_dn(&settings, cli.output)?,
        Command::View(args) => run_view(&args, &settings, cli.output)?,
    }

    Ok(())
}

/// Logs go to stderr so command output stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
