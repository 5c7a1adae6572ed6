//! Connection, filter and browse configuration.
//!
//! All of these are plain data handed in by the caller; nothing in this
//! crate reads files or the environment.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LdapError, LdapResult};

/// Filter matching every entry at the searched level.
pub const DEFAULT_FILTER: &str = "(objectClass=*)";

/// Attribute list entry requesting no attributes at all.
pub const NO_ATTRIBUTES: &str = "1.1";

/// Default traversal depth for tree building.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// URI schemes the transport understands.
const SUPPORTED_SCHEMES: [&str; 3] = ["ldap://", "ldaps://", "ldapi://"];

fn default_connection_timeout() -> Duration {
    Duration::from_secs(5)
}

// ============================================================================
// Connection Configuration
// ============================================================================

/// LDAP connection configuration.
///
/// An empty `base_dn` means the base DN is discovered from the server.
/// An empty `bind_dn` performs an anonymous simple bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Server URI (`ldap://`, `ldaps://` or `ldapi://`).
    pub uri: String,

    /// DN used for the simple bind.
    #[serde(default)]
    pub bind_dn: String,

    /// Password used for the simple bind.
    #[serde(default, skip_serializing)]
    pub bind_password: String,

    /// Root of the browsable tree; empty to discover it.
    #[serde(default)]
    pub base_dn: String,

    /// Timeout for establishing the connection.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: Duration,
}

impl LdapConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> LdapConfigBuilder {
        LdapConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> LdapResult<()> {
        let uri = self.uri.to_lowercase();
        let Some((scheme, rest)) = SUPPORTED_SCHEMES
            .iter()
            .find_map(|scheme| uri.strip_prefix(scheme).map(|rest| (*scheme, rest)))
        else {
            return Err(LdapError::config(format!(
                "unsupported URI '{}': expected ldap://, ldaps:// or ldapi://",
                self.uri
            )));
        };

        // ldapi:// without a path means the default socket
        if rest.is_empty() && scheme != "ldapi://" {
            return Err(LdapError::config(format!("URI '{}' has no host", self.uri)));
        }

        if self.connection_timeout.is_zero() {
            return Err(LdapError::config("connection_timeout must be non-zero"));
        }

        Ok(())
    }

    /// Whether the base DN has to be discovered from the server.
    #[must_use]
    pub fn discovers_base_dn(&self) -> bool {
        self.base_dn.is_empty()
    }
}

/// Builder for [`LdapConfig`].
#[derive(Debug)]
pub struct LdapConfigBuilder {
    uri: Option<String>,
    bind_dn: String,
    bind_password: String,
    base_dn: String,
    connection_timeout: Duration,
}

impl Default for LdapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LdapConfigBuilder {
    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uri: None,
            bind_dn: String::new(),
            bind_password: String::new(),
            base_dn: String::new(),
            connection_timeout: default_connection_timeout(),
        }
    }

    /// Sets the server URI.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Sets the bind DN.
    #[must_use]
    pub fn bind_dn(mut self, dn: impl Into<String>) -> Self {
        self.bind_dn = dn.into();
        self
    }

    /// Sets the bind password.
    #[must_use]
    pub fn bind_password(mut self, password: impl Into<String>) -> Self {
        self.bind_password = password.into();
        self
    }

    /// Sets a static base DN. Leave empty to discover it.
    #[must_use]
    pub fn base_dn(mut self, dn: impl Into<String>) -> Self {
        self.base_dn = dn.into();
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// ## Errors
    ///
    /// Returns an error if the URI is missing, uses an unknown scheme or
    /// has no host, or if the timeout is zero.
    pub fn build(self) -> LdapResult<LdapConfig> {
        let config = LdapConfig {
            uri: self
                .uri
                .ok_or_else(|| LdapError::config("uri is required"))?,
            bind_dn: self.bind_dn,
            bind_password: self.bind_password,
            base_dn: self.base_dn.trim().to_string(),
            connection_timeout: self.connection_timeout,
        };

        config.validate()?;

        Ok(config)
    }
}

/// LDAP search scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchScope {
    /// Only the named entry.
    Base,
    /// Immediate children of the named entry.
    #[default]
    OneLevel,
    /// The named entry and all of its descendants.
    Subtree,
}

impl SearchScope {
    /// Converts to ldap3 scope.
    #[must_use]
    pub const fn to_ldap3(self) -> ldap3::Scope {
        match self {
            Self::Base => ldap3::Scope::Base,
            Self::OneLevel => ldap3::Scope::OneLevel,
            Self::Subtree => ldap3::Scope::Subtree,
        }
    }
}

// ============================================================================
// Entry Filtering
// ============================================================================

/// Object classes and attributes hidden from displayed entries.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// `objectClass` values removed from entries.
    #[serde(default, alias = "oc_silented")]
    pub object_classes_to_hide: BTreeSet<String>,

    /// Attributes removed from entries entirely.
    #[serde(default, alias = "attr_silented")]
    pub attributes_to_hide: BTreeSet<String>,
}

impl FilterConfig {
    /// Creates an empty filter configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds object classes to hide.
    #[must_use]
    pub fn hide_object_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_classes_to_hide
            .extend(classes.into_iter().map(Into::into));
        self
    }

    /// Adds attributes to hide.
    #[must_use]
    pub fn hide_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_to_hide
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// True when neither list hides anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.object_classes_to_hide.is_empty() && self.attributes_to_hide.is_empty()
    }
}

// ============================================================================
// Browse Preferences
// ============================================================================

/// How tree node labels are composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Icon followed by the full RDN (`ou=people`).
    #[default]
    Full,
    /// Icon followed by the display name (`People`).
    Simple,
}

impl DisplayMode {
    /// Composes a node label.
    #[must_use]
    pub fn label(self, icon: &str, rdn: &str, display_name: &str) -> String {
        match self {
            Self::Full => format!("{icon} {rdn}"),
            Self::Simple => format!("{icon} {display_name}"),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = LdapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "simple" => Ok(Self::Simple),
            other => Err(LdapError::config(format!(
                "invalid display mode '{other}': expected \"full\" or \"simple\""
            ))),
        }
    }
}

/// Display preferences for a browse session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseSettings {
    /// How many levels below the base DN are loaded.
    pub max_depth: usize,

    /// Label composition.
    pub display_mode: DisplayMode,

    /// Show entries with children before leaves.
    pub containers_first: bool,

    /// Expand the whole loaded tree instead of only the first level.
    pub auto_expand: bool,
}

impl Default for BrowseSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            display_mode: DisplayMode::default(),
            containers_first: true,
            auto_expand: false,
        }
    }
}
