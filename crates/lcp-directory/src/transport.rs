//! Wire sessions.
//!
//! [`Connector`] opens and binds a session, [`DirectorySession`] runs
//! searches on it. The engine only talks to these traits, so the network
//! transport (`ldap3`) and the in-memory directory are interchangeable.

use ldap3::asn1::{StructureTag, PL};
use ldap3::{LdapConn, LdapConnSettings};

use crate::config::{LdapConfig, SearchScope};
use crate::entry::RawEntry;
use crate::error::{LdapError, LdapResult};

/// Protocol tag of a SearchResultEntry. References use a different tag.
const SEARCH_RESULT_ENTRY: u64 = 4;

/// A bound session able to run searches.
pub trait DirectorySession {
    /// Runs a search and returns the undecoded entries.
    ///
    /// An empty `attributes` slice requests all user attributes.
    fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> LdapResult<Vec<RawEntry>>;

    /// Unbinds and closes the session.
    fn unbind(&mut self) -> LdapResult<()>;
}

/// Opens bound sessions.
pub trait Connector {
    /// Session type produced by this connector.
    type Session: DirectorySession;

    /// Connects to the server and performs a simple bind.
    ///
    /// ## Errors
    ///
    /// [`LdapError::Connection`] when the server cannot be reached,
    /// [`LdapError::Bind`] when it rejects the credentials.
    fn connect(&self, config: &LdapConfig) -> LdapResult<Self::Session>;
}

// ============================================================================
// ldap3 transport
// ============================================================================

/// Connector for real servers, backed by ldap3's blocking client.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ldap3Connector;

/// A bound ldap3 session.
pub struct Ldap3Session {
    ldap: LdapConn,
}

impl Connector for Ldap3Connector {
    type Session = Ldap3Session;

    fn connect(&self, config: &LdapConfig) -> LdapResult<Ldap3Session> {
        let settings = LdapConnSettings::new().set_conn_timeout(config.connection_timeout);

        let mut ldap = LdapConn::with_settings(settings, &config.uri)
            .map_err(|e| LdapError::connection(e.to_string()))?;

        let bind = ldap
            .simple_bind(&config.bind_dn, &config.bind_password)
            .map_err(|e| LdapError::connection(e.to_string()))?;

        match bind.success() {
            Ok(_) => Ok(Ldap3Session { ldap }),
            Err(ldap3::LdapError::LdapResult { result }) => Err(LdapError::Bind {
                code: result.rc,
                message: diagnostic(&result),
            }),
            Err(e) => Err(LdapError::connection(e.to_string())),
        }
    }
}

impl DirectorySession for Ldap3Session {
    fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> LdapResult<Vec<RawEntry>> {
        let (entries, _result) = self
            .ldap
            .search(base_dn, scope.to_ldap3(), filter, attributes.to_vec())
            .map_err(search_error)?
            .success()
            .map_err(search_error)?;

        Ok(entries
            .into_iter()
            .filter_map(|entry| raw_entry(entry.0))
            .collect())
    }

    fn unbind(&mut self) -> LdapResult<()> {
        self.ldap
            .unbind()
            .map_err(|e| LdapError::connection(e.to_string()))
    }
}

/// Server diagnostic text, or the result description when there is none.
fn diagnostic(result: &ldap3::LdapResult) -> String {
    if result.text.is_empty() {
        result.to_string()
    } else {
        result.text.clone()
    }
}

fn search_error(err: ldap3::LdapError) -> LdapError {
    match err {
        ldap3::LdapError::LdapResult { result } => {
            LdapError::search(Some(result.rc), diagnostic(&result))
        }
        other => LdapError::search(None, other.to_string()),
    }
}

/// Walks a SearchResultEntry without decoding any value.
///
/// ldap3's `SearchEntry::construct` decodes names eagerly and regroups
/// binary values, which loses value order; the raw tag keeps both.
fn raw_entry(tag: StructureTag) -> Option<RawEntry> {
    if tag.id != SEARCH_RESULT_ENTRY {
        return None;
    }

    let mut parts = constructed(tag)?.into_iter();
    let dn = String::from_utf8_lossy(&primitive(parts.next()?)?).into_owned();
    let attributes = match parts.next() {
        Some(list) => constructed(list)?
            .into_iter()
            .filter_map(partial_attribute)
            .collect(),
        None => Vec::new(),
    };

    Some(RawEntry { dn, attributes })
}

fn partial_attribute(tag: StructureTag) -> Option<(Vec<u8>, Vec<Vec<u8>>)> {
    let mut parts = constructed(tag)?.into_iter();
    let name = primitive(parts.next()?)?;
    let values = constructed(parts.next()?)?
        .into_iter()
        .filter_map(primitive)
        .collect();
    Some((name, values))
}

fn constructed(tag: StructureTag) -> Option<Vec<StructureTag>> {
    match tag.payload {
        PL::C(inner) => Some(inner),
        PL::P(_) => None,
    }
}

fn primitive(tag: StructureTag) -> Option<Vec<u8>> {
    match tag.payload {
        PL::P(bytes) => Some(bytes),
        PL::C(_) => None,
    }
}
