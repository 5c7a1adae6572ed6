//! Directory access error types.
//!
//! ## Security Note
//!
//! Error messages must not leak the bind password.

use thiserror::Error;

/// Result code returned when the search base does not exist (`noSuchObject`).
pub const NO_SUCH_OBJECT: u32 = 32;

/// Result code returned when the bind credentials are rejected.
pub const INVALID_CREDENTIALS: u32 = 49;

/// Errors raised by the directory-access engine.
#[derive(Debug, Error)]
pub enum LdapError {
    /// Invalid configuration.
    #[error("LDAP configuration error: {0}")]
    Configuration(String),

    /// The server could not be reached or the transport failed.
    #[error("LDAP connection failed: {0}")]
    Connection(String),

    /// The server rejected the simple bind.
    #[error("LDAP bind rejected: {message} (result code {code})")]
    Bind {
        /// LDAP result code.
        code: u32,
        /// Diagnostic message from the server.
        message: String,
    },

    /// An operation was issued without an open session.
    #[error("LDAP connection not established")]
    NotConnected,

    /// A single search failed.
    #[error("LDAP search failed: {message}")]
    Search {
        /// LDAP result code, when the server answered.
        code: Option<u32>,
        /// Diagnostic message.
        message: String,
    },

    /// Every base DN discovery strategy came up empty.
    #[error(
        "Could not determine base DN (tried: {}). Please specify it explicitly.",
        .attempted.join(", ")
    )]
    BaseDnNotFound {
        /// Names of the strategies that were tried, in order.
        attempted: Vec<&'static str>,
    },

    /// The server answered in a way the protocol does not allow.
    #[error("LDAP protocol violation: {0}")]
    ProtocolViolation(String),

    /// Underlying ldap3 error.
    #[error("LDAP error: {0}")]
    Ldap3(#[from] ldap3::LdapError),
}

impl LdapError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a search error.
    #[must_use]
    pub fn search(code: Option<u32>, msg: impl Into<String>) -> Self {
        Self::Search {
            code,
            message: msg.into(),
        }
    }

    /// Creates a "no such object" search error.
    #[must_use]
    pub fn no_such_object(dn: &str) -> Self {
        Self::search(Some(NO_SUCH_OBJECT), format!("No such object: {dn}"))
    }

    /// Checks if this is a connection-related error.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::NotConnected | Self::Ldap3(_))
    }

    /// Checks if the server rejected the bind.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }

    /// Checks if a search failed because its base entry does not exist.
    #[must_use]
    pub const fn is_no_such_object(&self) -> bool {
        matches!(
            self,
            Self::Search {
                code: Some(NO_SUCH_OBJECT),
                ..
            }
        )
    }

    /// What the user should do about this error, if anything.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Connection(_) | Self::NotConnected | Self::Ldap3(_) => {
                Some("check that the LDAP server is reachable and retry")
            }
            Self::Bind { .. } => Some("check the bind DN and password"),
            Self::BaseDnNotFound { .. } => {
                Some("set base_dn in the settings file or pass --base-dn")
            }
            Self::Configuration(_) => Some("fix the settings file and retry"),
            Self::Search { .. } | Self::ProtocolViolation(_) => None,
        }
    }
}

/// Result type for directory operations.
pub type LdapResult<T> = Result<T, LdapError>;
