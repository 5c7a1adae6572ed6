//! Saved views.
//!
//! A view entity groups named profiles. Each profile is an LDAP filter run
//! as a subtree search below the base DN, and a list of attribute columns
//! the results are projected onto, one row per entry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{SearchScope, NO_ATTRIBUTES};
use crate::connection::{ConnectionManager, DirectorySearch};
use crate::entry::Entry;
use crate::error::LdapResult;
use crate::transport::Connector;

/// Column showing the entry's DN instead of an attribute.
pub const DN_COLUMN: &str = "dn";

/// Cell text for attributes an entry does not have.
pub const DEFAULT_MISSING_VALUE: &str = "-";

/// Icon of entities that do not set one.
pub const DEFAULT_ENTITY_ICON: &str = "💾";

/// One saved query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewProfile {
    /// Filter run below the base DN. Without one nothing is searched.
    pub ldap_filter: Option<String>,
    /// Attribute columns, in display order.
    pub attr: Vec<String>,
}

impl ViewProfile {
    /// Creates a profile.
    #[must_use]
    pub fn new<I, S>(ldap_filter: impl Into<String>, attr: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ldap_filter: Some(ldap_filter.into()),
            attr: attr.into_iter().map(Into::into).collect(),
        }
    }

    /// Lower-cased column names; a lone `dn` column when none are set.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        if self.attr.is_empty() {
            return vec![DN_COLUMN.to_string()];
        }
        self.attr.iter().map(|name| name.to_lowercase()).collect()
    }

    fn filter(&self) -> Option<&str> {
        self.ldap_filter
            .as_deref()
            .map(str::trim)
            .filter(|filter| !filter.is_empty())
    }
}

/// A named group of profiles about one kind of entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewEntity {
    /// Icon shown next to the entity name.
    pub icon: Option<String>,
    /// Filter used when the entity itself is viewed.
    pub ldap_filter: Option<String>,
    /// Profiles, in configuration order.
    pub profiles: IndexMap<String, ViewProfile>,
}

impl ViewEntity {
    /// Configured icon, or [`DEFAULT_ENTITY_ICON`].
    #[must_use]
    pub fn icon(&self) -> &str {
        self.icon
            .as_deref()
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_ENTITY_ICON)
    }

    /// The entity's own query, listing matching DNs only.
    #[must_use]
    pub fn as_profile(&self) -> ViewProfile {
        ViewProfile {
            ldap_filter: self.ldap_filter.clone(),
            attr: Vec::new(),
        }
    }
}

/// Search results projected onto a profile's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewTable {
    /// Column names.
    pub columns: Vec<String>,
    /// One row per entry, one cell per column.
    pub rows: Vec<Vec<String>>,
}

impl ViewTable {
    /// Projects `entries` onto `columns`.
    ///
    /// Attribute names match case-insensitively and only the first value
    /// is shown. Missing or empty attributes show `missing`.
    #[must_use]
    pub fn project(entries: &[Entry], columns: Vec<String>, missing: &str) -> Self {
        let rows = entries
            .iter()
            .map(|entry| {
                columns
                    .iter()
                    .map(|column| cell(entry, column, missing))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Whether no entry matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell(entry: &Entry, column: &str, missing: &str) -> String {
    if column == DN_COLUMN {
        return entry.dn.clone();
    }
    entry
        .attributes
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(column))
        .and_then(|(_, values)| values.first())
        .map_or_else(|| missing.to_string(), Clone::clone)
}

/// Runs `profile` as a subtree search below the base DN.
///
/// Only the column attributes are requested. A failed search yields an
/// empty table, like any other best-effort search.
///
/// ## Errors
///
/// Connection errors, and [`crate::LdapError::BaseDnNotFound`] when the
/// base DN has to be discovered and cannot be.
pub fn run_view<C: Connector>(
    conn: &mut ConnectionManager<C>,
    profile: &ViewProfile,
    missing: &str,
) -> LdapResult<ViewTable> {
    let columns = profile.columns();
    let Some(filter) = profile.filter() else {
        info!("View has no LDAP filter, nothing to search");
        return Ok(ViewTable::project(&[], columns, missing));
    };

    conn.ensure_connected()?;
    let base_dn = conn.base_dn()?;

    let mut attributes: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|column| *column != DN_COLUMN)
        .collect();
    if attributes.is_empty() {
        attributes.push(NO_ATTRIBUTES);
    }

    let entries = conn.search(&base_dn, SearchScope::Subtree, filter, &attributes);
    debug!(base_dn = %base_dn, filter, count = entries.len(), "View search finished");

    Ok(ViewTable::project(&entries, columns, missing))
}
