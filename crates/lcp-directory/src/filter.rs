//! Entry filtering.
//!
//! Removes configured object classes and attributes from entries before
//! they are displayed. Matching is exact and case-sensitive.

use std::borrow::Cow;

use tracing::debug;

use crate::config::FilterConfig;
use crate::entry::{Entry, OBJECT_CLASS};

/// Applies `config` to `entry`.
///
/// Hidden `objectClass` values are dropped first, then hidden attributes are
/// removed entirely. The input is never modified; with nothing to hide it is
/// returned borrowed.
#[must_use]
pub fn filter_entry<'a>(entry: &'a Entry, config: &FilterConfig) -> Cow<'a, Entry> {
    if config.is_empty() {
        return Cow::Borrowed(entry);
    }

    let mut filtered = entry.clone();

    if !config.object_classes_to_hide.is_empty() {
        if let Some(classes) = filtered.attributes.get_mut(OBJECT_CLASS) {
            let before = classes.len();
            classes.retain(|class| !config.object_classes_to_hide.contains(class));
            if classes.len() != before {
                debug!(dn = %entry.dn, removed = before - classes.len(), "Hid object classes");
            }
        }
    }

    if !config.attributes_to_hide.is_empty() {
        let before = filtered.attributes.len();
        filtered
            .attributes
            .retain(|name, _| !config.attributes_to_hide.contains(name));
        if filtered.attributes.len() != before {
            debug!(
                dn = %entry.dn,
                removed = before - filtered.attributes.len(),
                "Hid attributes"
            );
        }
    }

    Cow::Owned(filtered)
}

impl FilterConfig {
    /// Shorthand for [`filter_entry`].
    #[must_use]
    pub fn apply<'a>(&self, entry: &'a Entry) -> Cow<'a, Entry> {
        filter_entry(entry, self)
    }
}
