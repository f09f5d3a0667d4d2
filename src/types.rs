//! Types shared by the manifest builder and the gallery runtime.
//!
//! The manifest is the only artifact that crosses from build time to the
//! page, so its JSON shape is the contract:
//!
//! ```json
//! {
//!   "signs": [
//!     { "path": "images/signs/a.png", "alt": "signs - a" }
//!   ],
//!   "signs-bg": [],
//!   "misc": []
//! }
//! ```
//!
//! Key order is meaningful for humans reading the file (product categories,
//! then service backgrounds, then misc), so [`Manifest`] keeps insertion order
//! instead of sorting keys.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One discoverable image: a relative URL and its alt text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageEntry {
    pub path: String,
    pub alt: String,
}

impl ImageEntry {
    pub fn new(path: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alt: alt.into(),
        }
    }
}

/// Ordered mapping from category key to image entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    sections: Vec<(String, Vec<ImageEntry>)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, entries: Vec<ImageEntry>) {
        let key = key.into();
        match self.sections.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = entries,
            None => self.sections.push((key, entries)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[ImageEntry]> {
        self.sections
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Entries for `key`, or an empty slice when the key is absent.
    pub fn entries(&self, key: &str) -> &[ImageEntry] {
        self.get(key).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ImageEntry])> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Pretty-printed JSON with 2-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (key, entries) in &self.sections {
            map.serialize_entry(key, entries)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ManifestVisitor;

        impl<'de> Visitor<'de> for ManifestVisitor {
            type Value = Manifest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping category keys to image entry arrays")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Manifest, A::Error> {
                let mut manifest = Manifest::new();
                while let Some((key, entries)) = access.next_entry::<String, Vec<ImageEntry>>()? {
                    // Later duplicates win, as with JSON.parse
                    manifest.insert(key, entries);
                }
                Ok(manifest)
            }
        }

        deserializer.deserialize_map(ManifestVisitor)
    }
}
