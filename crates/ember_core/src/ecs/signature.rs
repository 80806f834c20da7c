//! # Tag Signatures
//!
//! A [`TagSet`] is the canonical form of a set of component tags. It is the
//! key of the group cache, so two queries naming the same tags in any order
//! (or with repeats) map to the same group.

use std::fmt;

use super::component::Tag;

/// Canonical set of component tags.
///
/// Uses a sorted, deduplicated vector for consistent hashing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TagSet {
    /// Sorted list of tags, no duplicates.
    tags: Vec<Tag>,
}

impl TagSet {
    /// Creates a canonical tag set from any tag list.
    #[must_use]
    pub fn new(mut tags: Vec<Tag>) -> Self {
        tags.sort();
        tags.dedup();
        Self { tags }
    }

    /// Builds a tag set from string-like values.
    pub fn from_strs<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self::new(
            tags.into_iter()
                .map(|tag| Tag::new(tag.as_ref().to_owned()))
                .collect(),
        )
    }

    /// Checks if this set contains a tag.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags
            .binary_search_by(|probe| probe.as_str().cmp(tag))
            .is_ok()
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Checks if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterates the tags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Returns the tags as a sorted slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Tag] {
        &self.tags
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag.as_str())?;
        }
        f.write_str("}")
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self::from_strs(iter)
    }
}
