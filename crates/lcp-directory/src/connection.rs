//! Connection lifecycle and searching.
//!
//! A [`ConnectionManager`] owns exactly one bound session. It is driven
//! through `&mut self`, so one logical browse session owns one connection
//! and no locking is involved.

use std::mem;
use std::sync::Arc;

use tracing::{debug, error, info, warn, Span};

use crate::config::{FilterConfig, LdapConfig, SearchScope, DEFAULT_FILTER};
use crate::discovery::BaseDnResolver;
use crate::entry::Entry;
use crate::error::{LdapError, LdapResult};
use crate::transport::{Connector, DirectorySession, Ldap3Connector};

/// Anything that can run directory searches and decode the results.
pub trait DirectorySearch {
    /// Runs a search, reporting failures.
    ///
    /// An empty `attributes` slice requests all user attributes.
    fn try_search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> LdapResult<Vec<Entry>>;

    /// Runs a search, degrading any failure to an empty result.
    ///
    /// Failures are logged. Use this where one failed search must not
    /// abort the surrounding operation.
    fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> Vec<Entry> {
        self.try_search(base_dn, scope, filter, attributes)
            .unwrap_or_else(|e| {
                error!(base_dn, ?scope, filter, error = %e, "LDAP search failed");
                Vec::new()
            })
    }
}

/// Lifecycle of a [`ConnectionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected.
    Unconnected,
    /// Holding a bound session.
    Connected,
    /// Disconnected after having been connected.
    Closed,
}

enum SessionState<S> {
    Unconnected,
    Connected(S),
    Closed,
}

/// Owns one bound directory session.
pub struct ConnectionManager<C: Connector = Ldap3Connector> {
    config: Arc<LdapConfig>,
    connector: C,
    state: SessionState<C::Session>,
    filters: FilterConfig,
    resolver: BaseDnResolver,
    base_dn_override: Option<String>,
    resolved_base_dn: Option<String>,
    auto_connect: bool,
    span: Span,
}

impl ConnectionManager<Ldap3Connector> {
    /// Creates a manager that talks to a real server.
    #[must_use]
    pub fn new(config: LdapConfig) -> Self {
        Self::with_connector(config, Ldap3Connector)
    }
}

impl<C: Connector> ConnectionManager<C> {
    /// Creates a manager using the given connector.
    #[must_use]
    pub fn with_connector(config: LdapConfig, connector: C) -> Self {
        let span = tracing::info_span!("ldap", uri = %config.uri);
        Self {
            config: Arc::new(config),
            connector,
            state: SessionState::Unconnected,
            filters: FilterConfig::default(),
            resolver: BaseDnResolver::new(),
            base_dn_override: None,
            resolved_base_dn: None,
            auto_connect: true,
            span,
        }
    }

    /// Sets the filters applied to looked-up entries.
    #[must_use]
    pub fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    /// Replaces the base DN resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: BaseDnResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Fixes the base DN, taking precedence over the configuration and
    /// discovery. A blank value is ignored.
    #[must_use]
    pub fn with_base_dn(mut self, base_dn: impl Into<String>) -> Self {
        let base_dn = base_dn.into();
        self.base_dn_override = Some(base_dn.trim().to_string()).filter(|dn| !dn.is_empty());
        self
    }

    /// Sets the span diagnostics are recorded under.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Whether operations needing a session connect on demand (default on).
    #[must_use]
    pub fn auto_connect(mut self, enabled: bool) -> Self {
        self.auto_connect = enabled;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    /// Returns the entry filters.
    #[must_use]
    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// Returns the connector.
    #[must_use]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match self.state {
            SessionState::Unconnected => ConnectionState::Unconnected,
            SessionState::Connected(_) => ConnectionState::Connected,
            SessionState::Closed => ConnectionState::Closed,
        }
    }

    /// Whether a bound session is held.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    /// Opens the session and performs the simple bind.
    ///
    /// An existing session is closed first.
    ///
    /// ## Errors
    ///
    /// [`LdapError::Connection`] if the server cannot be reached,
    /// [`LdapError::Bind`] if it rejects the credentials.
    pub fn connect(&mut self) -> LdapResult<()> {
        if self.is_connected() {
            self.disconnect();
        }
        self.config.validate()?;

        let bind_dn = if self.config.bind_dn.is_empty() {
            "<anonymous>"
        } else {
            self.config.bind_dn.as_str()
        };
        info!(parent: &self.span, bind_dn, "Connecting to LDAP server");

        match self.connector.connect(&self.config) {
            Ok(session) => {
                self.state = SessionState::Connected(session);
                info!(parent: &self.span, "LDAP bind succeeded");
                Ok(())
            }
            Err(e) => {
                error!(parent: &self.span, error = %e, "LDAP connection failed");
                Err(e)
            }
        }
    }

    /// Connects unless already connected.
    ///
    /// ## Errors
    ///
    /// [`LdapError::NotConnected`] when auto-connect is off, otherwise
    /// whatever [`connect`](Self::connect) returns.
    pub fn ensure_connected(&mut self) -> LdapResult<()> {
        if self.is_connected() {
            Ok(())
        } else if self.auto_connect {
            self.connect()
        } else {
            Err(LdapError::NotConnected)
        }
    }

    /// Unbinds and releases the session. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        self.resolved_base_dn = None;
        match mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Connected(mut session) => match session.unbind() {
                Ok(()) => info!(parent: &self.span, "Disconnected from LDAP server"),
                Err(e) => warn!(parent: &self.span, error = %e, "LDAP unbind failed"),
            },
            previous => self.state = previous,
        }
    }

    /// Looks up a single entry by DN, filtered and with sorted attribute names.
    ///
    /// Returns `Ok(None)` when nothing answers for `dn`.
    ///
    /// ## Errors
    ///
    /// [`LdapError::ProtocolViolation`] if the server returns more than one
    /// entry for the DN; connection errors when no session can be opened.
    pub fn get_entry(&mut self, dn: &str) -> LdapResult<Option<Entry>> {
        self.ensure_connected()?;

        let mut entries = self.search(dn, SearchScope::Base, DEFAULT_FILTER, &[]);
        if entries.len() > 1 {
            return Err(LdapError::ProtocolViolation(format!(
                "base lookup of '{dn}' returned {} entries",
                entries.len()
            )));
        }

        Ok(entries.pop().map(|entry| {
            let mut entry = self.filters.apply(&entry).into_owned();
            entry.sort_attributes();
            entry
        }))
    }

    /// Root of the browsable tree.
    ///
    /// A [`with_base_dn`](Self::with_base_dn) override wins, then the
    /// configured base DN. Otherwise it is discovered through the resolver
    /// and kept until the session is closed.
    ///
    /// ## Errors
    ///
    /// [`LdapError::BaseDnNotFound`] when discovery fails, connection
    /// errors when a session is needed but cannot be opened.
    pub fn base_dn(&mut self) -> LdapResult<String> {
        if let Some(dn) = &self.base_dn_override {
            return Ok(dn.clone());
        }
        if let Some(dn) = &self.resolved_base_dn {
            return Ok(dn.clone());
        }
        if self.config.discovers_base_dn() {
            self.ensure_connected()?;
        }

        let resolver = self.resolver.clone();
        let config = Arc::clone(&self.config);
        let dn = resolver.resolve(self, &config)?;

        self.resolved_base_dn = Some(dn.clone());
        Ok(dn)
    }
}

impl<C: Connector> DirectorySearch for ConnectionManager<C> {
    fn try_search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> LdapResult<Vec<Entry>> {
        debug!(parent: &self.span, base_dn, ?scope, filter, "LDAP search");
        let SessionState::Connected(session) = &mut self.state else {
            return Err(LdapError::NotConnected);
        };

        let raw = session.search(base_dn, scope, filter, attributes)?;

        Ok(raw.into_iter().map(Entry::from_raw).collect())
    }

    fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> Vec<Entry> {
        match self.try_search(base_dn, scope, filter, attributes) {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    parent: &self.span,
                    base_dn, ?scope, filter, error = %e,
                    "LDAP search failed"
                );
                Vec::new()
            }
        }
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
