//! In-memory directory.
//!
//! Serves a fixed set of entries through the same [`Connector`] seam as the
//! network transport, with server-like scope semantics, "no such object"
//! answers and scripted failures. Every search is recorded so callers can
//! assert on the exact traffic a component produced.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{LdapConfig, SearchScope};
use crate::entry::{decode_name, RawEntry};
use crate::error::{LdapError, LdapResult};
use crate::transport::{Connector, DirectorySession};

/// Result code used for scripted search failures (`other`).
const SCRIPTED_FAILURE: u32 = 80;

/// One search as seen by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    /// Search base.
    pub base_dn: String,
    /// Search scope.
    pub scope: SearchScope,
    /// Filter expression.
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BindBehaviour {
    Accept,
    Reject { code: u32, message: String },
    Unreachable(String),
}

/// A scripted directory server.
#[derive(Debug, Clone)]
pub struct InMemoryDirectory {
    entries: Vec<RawEntry>,
    root_dse: Option<RawEntry>,
    empty_base_one_level: bool,
    empty_base_subtree: bool,
    failing_bases: BTreeSet<String>,
    duplicated: BTreeSet<String>,
    bind: BindBehaviour,
    calls: Arc<Mutex<Vec<SearchCall>>>,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory {
    /// Creates an empty directory that accepts any bind.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            root_dse: None,
            empty_base_one_level: false,
            empty_base_subtree: false,
            failing_bases: BTreeSet::new(),
            duplicated: BTreeSet::new(),
            bind: BindBehaviour::Accept,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds an entry. Entries are returned in insertion order.
    #[must_use]
    pub fn with_entry(mut self, entry: impl Into<RawEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }

    /// Publishes a root DSE with the given naming contexts.
    #[must_use]
    pub fn with_naming_contexts(self, contexts: &[&str]) -> Self {
        self.with_root_dse(
            RawEntry::new("")
                .with_attribute("objectClass", ["top"])
                .with_attribute("namingContexts", contexts.iter().copied()),
        )
    }

    /// Publishes an arbitrary root DSE.
    #[must_use]
    pub fn with_root_dse(mut self, root_dse: RawEntry) -> Self {
        self.root_dse = Some(root_dse);
        self
    }

    /// Allows one-level and subtree searches based at the empty DN.
    ///
    /// Disallowed by default: such searches answer "no such object", as
    /// most servers do. When allowed, a one-level search there returns the
    /// directory suffixes.
    #[must_use]
    pub fn allow_empty_base_searches(self, allowed: bool) -> Self {
        self.allow_empty_base_scope(SearchScope::OneLevel, allowed)
            .allow_empty_base_scope(SearchScope::Subtree, allowed)
    }

    /// Allows or refuses searches of one scope based at the empty DN.
    ///
    /// Base-scope searches there always read the root DSE.
    #[must_use]
    pub fn allow_empty_base_scope(mut self, scope: SearchScope, allowed: bool) -> Self {
        match scope {
            SearchScope::Base => {}
            SearchScope::OneLevel => self.empty_base_one_level = allowed,
            SearchScope::Subtree => self.empty_base_subtree = allowed,
        }
        self
    }

    /// Makes every search based at `dn` fail.
    #[must_use]
    pub fn fail_searches_at(mut self, dn: impl Into<String>) -> Self {
        self.failing_bases.insert(normalize_dn(&dn.into()));
        self
    }

    /// Makes base lookups of `dn` return the entry twice.
    #[must_use]
    pub fn duplicate_entry(mut self, dn: impl Into<String>) -> Self {
        self.duplicated.insert(normalize_dn(&dn.into()));
        self
    }

    /// Rejects every bind with the given result code.
    #[must_use]
    pub fn reject_bind(mut self, code: u32, message: impl Into<String>) -> Self {
        self.bind = BindBehaviour::Reject {
            code,
            message: message.into(),
        };
        self
    }

    /// Fails every connection attempt at the transport level.
    #[must_use]
    pub fn unreachable(mut self, message: impl Into<String>) -> Self {
        self.bind = BindBehaviour::Unreachable(message.into());
        self
    }

    /// Searches received so far, across all sessions.
    #[must_use]
    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of searches received so far.
    #[must_use]
    pub fn search_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forgets recorded searches.
    pub fn reset_calls(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, base_dn: &str, scope: SearchScope, filter: &str) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SearchCall {
                base_dn: base_dn.to_string(),
                scope,
                filter: filter.to_string(),
            });
    }

    fn find(&self, dn: &str) -> Option<&RawEntry> {
        let wanted = normalize_dn(dn);
        self.entries.iter().find(|e| normalize_dn(&e.dn) == wanted)
    }

    /// Whether `dn` (normalized) heads a subtree of its own: a naming
    /// context, or an entry whose parent is not held here.
    fn is_suffix(&self, dn: &str) -> bool {
        let parent = parent_dn(dn);
        parent.is_empty()
            || self.naming_contexts().any(|context| context == dn)
            || !self.entries.iter().any(|e| normalize_dn(&e.dn) == parent)
    }

    fn naming_contexts(&self) -> impl Iterator<Item = String> + '_ {
        self.root_dse
            .iter()
            .flat_map(|dse| values_of(dse, "namingContexts"))
            .map(|value| normalize_dn(&String::from_utf8_lossy(value)))
    }

    fn run_search(
        &self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
    ) -> LdapResult<Vec<RawEntry>> {
        let base = normalize_dn(base_dn);
        if self.failing_bases.contains(&base) {
            return Err(LdapError::search(
                Some(SCRIPTED_FAILURE),
                format!("scripted failure at '{base_dn}'"),
            ));
        }
        let matcher = FilterMatcher::parse(filter)?;

        let candidates: Vec<&RawEntry> = if base.is_empty() {
            match scope {
                SearchScope::Base => self.root_dse.iter().collect(),
                SearchScope::OneLevel if self.empty_base_one_level => self
                    .entries
                    .iter()
                    .filter(|e| self.is_suffix(&normalize_dn(&e.dn)))
                    .collect(),
                SearchScope::Subtree if self.empty_base_subtree => self.entries.iter().collect(),
                _ => return Err(LdapError::no_such_object(base_dn)),
            }
        } else {
            let base_entry = self
                .find(base_dn)
                .ok_or_else(|| LdapError::no_such_object(base_dn))?;
            match scope {
                SearchScope::Base if self.duplicated.contains(&base) => {
                    vec![base_entry, base_entry]
                }
                SearchScope::Base => vec![base_entry],
                SearchScope::OneLevel => self
                    .entries
                    .iter()
                    .filter(|e| parent_dn(&normalize_dn(&e.dn)) == base)
                    .collect(),
                SearchScope::Subtree => self
                    .entries
                    .iter()
                    .filter(|e| is_within(&normalize_dn(&e.dn), &base))
                    .collect(),
            }
        };

        Ok(candidates
            .into_iter()
            .filter(|e| matcher.matches(e))
            .cloned()
            .collect())
    }
}

impl Connector for InMemoryDirectory {
    type Session = InMemorySession;

    fn connect(&self, _config: &LdapConfig) -> LdapResult<InMemorySession> {
        match &self.bind {
            BindBehaviour::Accept => Ok(InMemorySession {
                directory: self.clone(),
                open: true,
            }),
            BindBehaviour::Reject { code, message } => Err(LdapError::Bind {
                code: *code,
                message: message.clone(),
            }),
            BindBehaviour::Unreachable(message) => Err(LdapError::connection(message.clone())),
        }
    }
}

/// A session on an [`InMemoryDirectory`].
#[derive(Debug)]
pub struct InMemorySession {
    directory: InMemoryDirectory,
    open: bool,
}

impl DirectorySession for InMemorySession {
    fn search(
        &mut self,
        base_dn: &str,
        scope: SearchScope,
        filter: &str,
        attributes: &[&str],
    ) -> LdapResult<Vec<RawEntry>> {
        if !self.open {
            return Err(LdapError::NotConnected);
        }
        self.directory.record(base_dn, scope, filter);
        let entries = self.directory.run_search(base_dn, scope, filter)?;
        Ok(entries
            .into_iter()
            .map(|entry| select_attributes(entry, attributes))
            .collect())
    }

    fn unbind(&mut self) -> LdapResult<()> {
        self.open = false;
        Ok(())
    }
}

/// Lower-cases a DN and drops blanks around separators.
fn normalize_dn(dn: &str) -> String {
    dn.split(',')
        .map(|part| part.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parent of a normalized DN; empty for top-level entries.
fn parent_dn(dn: &str) -> &str {
    dn.split_once(',').map_or("", |(_, parent)| parent)
}

fn is_within(dn: &str, base: &str) -> bool {
    dn == base || dn.ends_with(&format!(",{base}"))
}

/// Keeps the requested attributes. `*` or an empty list keep everything.
fn select_attributes(mut entry: RawEntry, attributes: &[&str]) -> RawEntry {
    if attributes.is_empty() || attributes.contains(&"*") {
        return entry;
    }
    entry.attributes.retain(|(name, _)| {
        let name = decode_name(name);
        attributes.iter().any(|wanted| wanted.eq_ignore_ascii_case(&name))
    });
    entry
}

/// The single-assertion subset of filter syntax: `(attr=*)` and `(attr=value)`.
enum FilterMatcher {
    Everything,
    Present(String),
    Equals(String, String),
}

impl FilterMatcher {
    fn parse(filter: &str) -> LdapResult<Self> {
        let (attribute, value) = filter
            .trim()
            .strip_prefix('(')
            .and_then(|f| f.strip_suffix(')'))
            .and_then(|f| f.split_once('='))
            .ok_or_else(|| LdapError::search(Some(87), format!("bad search filter '{filter}'")))?;

        Ok(match (attribute, value) {
            (a, "*") if a.eq_ignore_ascii_case("objectClass") => Self::Everything,
            (a, "*") => Self::Present(a.to_string()),
            (a, v) => Self::Equals(a.to_string(), v.to_string()),
        })
    }

    fn matches(&self, entry: &RawEntry) -> bool {
        match self {
            Self::Everything => true,
            Self::Present(attribute) => values_of(entry, attribute).next().is_some(),
            Self::Equals(attribute, expected) => values_of(entry, attribute)
                .any(|v| String::from_utf8_lossy(v).eq_ignore_ascii_case(expected)),
        }
    }
}

fn values_of<'a>(entry: &'a RawEntry, wanted: &'a str) -> impl Iterator<Item = &'a Vec<u8>> + 'a {
    entry
        .attributes
        .iter()
        .filter(move |(name, _)| decode_name(name).eq_ignore_ascii_case(wanted))
        .flat_map(|(_, values)| values.iter())
}
