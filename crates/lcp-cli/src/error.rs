//! CLI error types.

use std::path::PathBuf;

use lcp_directory::LdapError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Settings file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Settings {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Settings file is not valid TOML.
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),

    /// Directory engine error.
    #[error(transparent)]
    Directory(#[from] LdapError),

    /// Entry lookup found nothing.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// No view with that entity or profile name is configured.
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// What the user should do about this error, if anything.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Directory(e) => e.hint(),
            Self::Config(_) | Self::Toml(_) => Some("fix the settings file and retry"),
            Self::Settings { .. } => Some("check the --config path"),
            Self::UnknownView(_) => Some("run `lcp view` to list the configured views"),
            Self::NotFound(_) | Self::Json(_) => None,
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
