//! Display hints derived from entries.

use crate::entry::Entry;

/// Icon of the tree root.
pub const ROOT_ICON: &str = "🌐";

/// Icon for entries whose object classes match nothing in [`ICON_TABLE`].
pub const DEFAULT_ICON: &str = "📄";

/// Lower-cased object class to icon.
pub const ICON_TABLE: [(&str, &str); 7] = [
    ("inetorgperson", "👤"),
    ("posixaccount", "🏠"),
    ("groupofuniquenames", "🔗"),
    ("groupofurls", "🔧"),
    ("organizationalunit", "📁"),
    ("simplesecurityobject", "🔑"),
    ("organizationalrole", "🔑"),
];

/// Icon for an entry, from the first of its object classes found in
/// [`ICON_TABLE`]. Case-insensitive.
#[must_use]
pub fn icon_for(entry: &Entry) -> &'static str {
    entry
        .object_classes()
        .iter()
        .find_map(|class| {
            let class = class.to_lowercase();
            ICON_TABLE
                .iter()
                .find(|(name, _)| *name == class)
                .map(|(_, icon)| *icon)
        })
        .unwrap_or(DEFAULT_ICON)
}

/// Leftmost DN component, kept whole (`ou=people`).
#[must_use]
pub fn rdn(dn: &str) -> &str {
    dn.split(',').next().unwrap_or(dn).trim()
}

/// Human-friendly name: `cn`, else `commonName`, else the value of the
/// leftmost DN component.
#[must_use]
pub fn display_name(entry: &Entry) -> String {
    if let Some(name) = entry.get_attr("cn").or_else(|| entry.get_attr("commonName")) {
        return name.to_string();
    }

    let first = rdn(&entry.dn);
    first
        .split_once('=')
        .map_or(first, |(_, value)| value.trim())
        .to_string()
}
