//! Shared value types for the label tree.
//!
//! Contains the label handle (`LabelId`), entry paths (`Entry`) with their
//! textual `0:1:3` form, and the decode limits applied when reading
//! containers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A label's position among its siblings. Tag 0 is reserved for the root.
pub type Tag = u32;

/// The tag carried by every document root.
pub const ROOT_TAG: Tag = 0;

// ==============================================================================
// Label Handle
// ==============================================================================

/// Handle to a label inside a [`LabelTree`](crate::tree::LabelTree).
///
/// Handles are cheap to copy and stay valid for the lifetime of the tree
/// that issued them, since labels are never removed. A handle from one tree
/// has no meaning in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub(crate) u32);

impl LabelId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

// ==============================================================================
// Entry Paths
// ==============================================================================

/// The tag path from the root to a label, rendered as `0:1:3:7`.
///
/// `#[serde(into/try_from)]` keeps the JSON form identical to the textual
/// form so dumps read the same way entries are printed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Entry(Vec<Tag>);

impl Entry {
    /// The entry of a document root.
    pub fn root() -> Self {
        Self(vec![ROOT_TAG])
    }

    /// Build an entry from explicit tags. The first tag must be the root tag.
    pub fn from_tags(tags: Vec<Tag>) -> Result<Self, CoreError> {
        match tags.first() {
            Some(&ROOT_TAG) if tags[1..].iter().all(|&t| t != ROOT_TAG) => Ok(Self(tags)),
            _ => Err(CoreError::InvalidEntry(
                tags.iter()
                    .map(Tag::to_string)
                    .collect::<Vec<_>>()
                    .join(":"),
            )),
        }
    }

    /// Entries assembled by walking a tree are valid by construction.
    pub(crate) fn from_path(tags: Vec<Tag>) -> Self {
        Self(tags)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.0
    }

    /// Number of ancestors of the label this entry names.
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    /// The entry of a child with the given tag.
    pub fn child(&self, tag: Tag) -> Self {
        let mut tags = self.0.clone();
        tags.push(tag);
        Self(tags)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags = self.0.iter();
        if let Some(first) = tags.next() {
            write!(f, "{first}")?;
        }
        for tag in tags {
            write!(f, ":{tag}")?;
        }
        Ok(())
    }
}

impl FromStr for Entry {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tags = s
            .trim()
            .split(':')
            .map(|part| part.trim().parse::<Tag>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| CoreError::InvalidEntry(s.to_string()))?;
        Self::from_tags(tags).map_err(|_| CoreError::InvalidEntry(s.to_string()))
    }
}

impl From<Entry> for String {
    fn from(entry: Entry) -> Self {
        entry.to_string()
    }
}

impl TryFrom<String> for Entry {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ==============================================================================
// Decode Limits
// ==============================================================================

/// Upper bounds applied while decoding a container. Anything beyond them is
/// reported as corrupt data instead of being allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    pub max_labels: usize,
    pub max_depth: usize,
    pub max_attributes_per_label: usize,
    /// Longest accepted string payload (format name or name attribute), in bytes.
    pub max_string_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_labels: 1_000_000,
            max_depth: 4096,
            max_attributes_per_label: 256,
            max_string_len: 1 << 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_parses_and_displays() {
        let entry: Entry = "0:1:3:7".parse().expect("valid entry");
        assert_eq!(entry.tags(), &[0, 1, 3, 7]);
        assert_eq!(entry.depth(), 3);
        assert_eq!(entry.to_string(), "0:1:3:7");
        assert_eq!(Entry::root().to_string(), "0");
    }

    #[test]
    fn entry_must_start_at_root() {
        assert!(matches!(
            "1:2".parse::<Entry>(),
            Err(CoreError::InvalidEntry(_))
        ));
        assert!(matches!(
            "0:1:0".parse::<Entry>(),
            Err(CoreError::InvalidEntry(_))
        ));
        assert!(matches!("".parse::<Entry>(), Err(CoreError::InvalidEntry(_))));
        assert!(matches!(
            "0:x".parse::<Entry>(),
            Err(CoreError::InvalidEntry(_))
        ));
    }

    #[test]
    fn entry_serializes_as_string() {
        let entry = Entry::root().child(1).child(27);
        let json = serde_json::to_string(&entry).expect("serialize entry");
        assert_eq!(json, "\"0:1:27\"");
        let back: Entry = serde_json::from_str(&json).expect("deserialize entry");
        assert_eq!(back, entry);
    }

    #[test]
    fn decode_limits_fill_missing_fields_with_defaults() {
        let limits: DecodeLimits =
            serde_json::from_str(r#"{"max_depth": 8}"#).expect("partial limits");
        assert_eq!(limits.max_depth, 8);
        assert_eq!(limits.max_labels, DecodeLimits::default().max_labels);
    }
}
