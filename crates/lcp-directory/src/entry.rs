//! Directory entries and attribute decoding.
//!
//! Values arrive from the wire as raw bytes. Every value is decoded as UTF-8;
//! anything that is not valid UTF-8 is kept as a tagged hex string
//! (`<binary: 0a1b...>`) so a single binary attribute never costs the
//! whole entry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The `objectClass` attribute name.
pub const OBJECT_CLASS: &str = "objectClass";

/// Attribute name to values, in the order the server returned them.
pub type Attributes = IndexMap<String, Vec<String>>;

/// A decoded directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Distinguished Name.
    pub dn: String,

    /// Attributes (all values are multi-valued).
    pub attributes: Attributes,
}

impl Entry {
    /// Creates an entry with no attributes.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: Attributes::new(),
        }
    }

    /// Adds values to an attribute, creating it if needed.
    #[must_use]
    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Decodes an entry as received from the wire.
    ///
    /// Attribute names that appear more than once are merged, keeping
    /// value order.
    #[must_use]
    pub fn from_raw(raw: RawEntry) -> Self {
        let mut attributes = Attributes::with_capacity(raw.attributes.len());
        for (name, values) in raw.attributes {
            attributes
                .entry(decode_name(&name))
                .or_insert_with(Vec::new)
                .extend(values.iter().map(|value| decode_value(value)));
        }
        Self {
            dn: raw.dn,
            attributes,
        }
    }

    /// Gets the first value of an attribute.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Gets all values of an attribute.
    #[must_use]
    pub fn get_attrs(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// Checks if the entry has an attribute.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// The entry's object classes, empty if it has none.
    #[must_use]
    pub fn object_classes(&self) -> &[String] {
        self.get_attrs(OBJECT_CLASS).unwrap_or_default()
    }

    /// Sorts attributes by name. Values keep their order.
    pub fn sort_attributes(&mut self) {
        self.attributes.sort_keys();
    }
}

/// An entry as it comes off the wire, before decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// Distinguished Name.
    pub dn: String,

    /// Attribute names and values as raw octet strings.
    pub attributes: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
}

impl RawEntry {
    /// Creates a raw entry with no attributes.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute.
    #[must_use]
    pub fn with_attribute<I, V>(mut self, name: impl Into<Vec<u8>>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        self.attributes
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }
}

impl From<Entry> for RawEntry {
    fn from(entry: Entry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry
                .attributes
                .into_iter()
                .map(|(name, values)| {
                    (
                        name.into_bytes(),
                        values.into_iter().map(String::into_bytes).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Decodes an attribute value, falling back to tagged hex for binary data.
#[must_use]
pub fn decode_value(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => format!("<binary: {}>", hex::encode(bytes)),
    }
}

/// Decodes an attribute name, replacing invalid sequences.
#[must_use]
pub fn decode_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
