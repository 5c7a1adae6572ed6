//! # lcp-cli
//!
//! Command-line front end for the LDAP control panel.
//!
//! This crate provides:
//! - `lcp tree`: print the directory tree below the base DN
//! - `lcp entry <DN>`: show one entry's attributes
//! - `lcp base-dn`: print the configured or discovered base DN
//! - `lcp view [ENTITY [PROFILE]]`: run a saved view, or list them

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::Settings;
pub use error::{CliError, CliResult};
