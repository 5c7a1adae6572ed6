//! Settings file handling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use lcp_directory::view::DEFAULT_MISSING_VALUE;
use lcp_directory::{BrowseSettings, FilterConfig, LdapConfig, ViewEntity, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Settings file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server connection.
    #[serde(alias = "authldap")]
    pub ldap: LdapSection,

    /// Browsing preferences.
    pub browser: BrowserSection,

    /// Saved view preferences.
    pub viewer: ViewerSection,

    /// Saved views, by entity name.
    pub viewer_entities: IndexMap<String, ViewEntity>,
}

/// `[ldap]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdapSection {
    /// Server URI.
    pub uri: String,
    /// Bind DN, empty for anonymous.
    pub bind_dn: String,
    /// Bind password.
    #[serde(alias = "bind_pass", skip_serializing)]
    pub bind_password: String,
    /// Base DN, empty to discover it.
    pub base_dn: String,
    /// Connection timeout in seconds.
    pub connection_timeout_secs: u64,
}

impl Default for LdapSection {
    fn default() -> Self {
        Self {
            uri: "ldap://localhost:389".to_string(),
            bind_dn: String::new(),
            bind_password: String::new(),
            base_dn: String::new(),
            connection_timeout_secs: 5,
        }
    }
}

/// `[browser]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSection {
    /// Object classes hidden from entries.
    pub oc_silented: Vec<String>,
    /// Attributes hidden from entries.
    pub attr_silented: Vec<String>,
    /// `full` or `simple`.
    pub display_mode: String,
    /// Containers before leaves.
    pub containers_first: bool,
    /// Print the whole loaded tree.
    pub auto_expand: bool,
    /// Levels loaded below the base DN.
    pub max_depth: usize,
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            oc_silented: Vec::new(),
            attr_silented: Vec::new(),
            display_mode: "full".to_string(),
            containers_first: true,
            auto_expand: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// `[viewer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    /// Cell text for attributes an entry does not have.
    pub missing_value_placeholder: String,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            missing_value_placeholder: DEFAULT_MISSING_VALUE.to_string(),
        }
    }
}

impl BrowserSection {
    /// Entry filters.
    #[must_use]
    pub fn filters(&self) -> FilterConfig {
        FilterConfig::new()
            .hide_object_classes(self.oc_silented.iter().cloned())
            .hide_attributes(self.attr_silented.iter().cloned())
    }

    /// Browse settings for the engine.
    ///
    /// ## Errors
    ///
    /// Returns an error for an unknown display mode.
    pub fn browse(&self) -> CliResult<BrowseSettings> {
        Ok(BrowseSettings {
            max_depth: self.max_depth,
            display_mode: self.display_mode.parse()?,
            containers_first: self.containers_first,
            auto_expand: self.auto_expand,
        })
    }
}

impl Settings {
    /// Loads settings.
    ///
    /// An explicit `path` must exist. Without one the default path is used
    /// and a missing file yields defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&path).map_err(|source| CliError::Settings {
                path: path.clone(),
                source,
            })?;
        let settings: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Gets the default settings path.
    pub fn default_path() -> CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".config").join("lcp").join("settings.toml"))
    }

    /// Applies command-line and environment overrides.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        let ldap = &mut self.ldap;
        for (value, target) in [
            (&cli.uri, &mut ldap.uri),
            (&cli.bind_dn, &mut ldap.bind_dn),
            (&cli.bind_password, &mut ldap.bind_password),
            (&cli.base_dn, &mut ldap.base_dn),
        ] {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
    }

    /// Connection configuration for the engine.
    ///
    /// ## Errors
    ///
    /// Returns an error if the URI or timeout is invalid.
    pub fn ldap_config(&self) -> CliResult<LdapConfig> {
        Ok(LdapConfig::builder()
            .uri(&self.ldap.uri)
            .bind_dn(&self.ldap.bind_dn)
            .bind_password(&self.ldap.bind_password)
            .base_dn(&self.ldap.base_dn)
            .connection_timeout(Duration::from_secs(self.ldap.connection_timeout_secs))
            .build()?)
    }
}
