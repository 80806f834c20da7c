//! # Entity Management
//!
//! Entities are identified by an [`EntityId`] and own their components,
//! at most one per [`Tag`]. Entities are only ever mutated through the
//! [`World`](super::World), which keeps every group in sync.

use std::collections::BTreeMap;
use std::fmt;

use super::component::{Component, Tag};
use super::signature::TagSet;
use crate::error::{EcsError, EcsResult};

/// Unique identifier for an entity.
///
/// Ids are handed out in increasing order by each world and are never
/// reused, so a stale id can only ever resolve to "not found".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity id from its raw value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entity and the components attached to it.
#[derive(Clone, Debug)]
pub struct Entity<C> {
    /// The unique identifier for this entity.
    id: EntityId,
    /// Optional debug name.
    name: Option<String>,
    /// Attached components keyed by tag.
    components: BTreeMap<Tag, C>,
}

impl<C: Component> Entity<C> {
    pub(crate) fn new(id: EntityId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            components: BTreeMap::new(),
        }
    }

    /// Returns this entity's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the debug name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Gets the component stored under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] when the entity has no such tag.
    pub fn get(&self, tag: &str) -> EcsResult<&C> {
        self.components
            .get(tag)
            .ok_or_else(|| self.not_found(tag))
    }

    /// Gets the component stored under `tag`, or `None`.
    #[must_use]
    pub fn try_get(&self, tag: &str) -> Option<&C> {
        self.components.get(tag)
    }

    /// Checks that every given tag is present.
    ///
    /// Argument order does not matter and an empty list is always satisfied.
    pub fn has<I, T>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        tags.into_iter()
            .all(|tag| self.components.contains_key(tag.as_ref()))
    }

    /// Checks a single tag.
    #[inline]
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.components.contains_key(tag)
    }

    /// Checks that the entity's tags are a superset of `set`.
    #[must_use]
    pub fn has_all(&self, set: &TagSet) -> bool {
        set.iter().all(|tag| self.components.contains_key(tag))
    }

    /// Number of attached components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the entity has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates the attached tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.components.keys()
    }

    /// Iterates the attached components in tag order.
    pub fn components(&self) -> impl Iterator<Item = (&Tag, &C)> {
        self.components.iter()
    }

    /// Returns the entity's tags as a canonical set.
    #[must_use]
    pub fn tag_set(&self) -> TagSet {
        TagSet::new(self.components.keys().cloned().collect())
    }

    pub(crate) fn get_mut(&mut self, tag: &str) -> EcsResult<&mut C> {
        let id = self.id;
        self.components
            .get_mut(tag)
            .ok_or_else(|| EcsError::ComponentNotFound {
                entity: id,
                tag: Tag::new(tag.to_owned()),
            })
    }

    /// Stores `component`, returning its tag and any value it replaced.
    pub(crate) fn insert(&mut self, component: C) -> (Tag, Option<C>) {
        let tag = component.tag();
        let previous = self.components.insert(tag.clone(), component);
        (tag, previous)
    }

    pub(crate) fn take(&mut self, tag: &str) -> Option<(Tag, C)> {
        self.components.remove_entry(tag)
    }

    fn not_found(&self, tag: &str) -> EcsError {
        EcsError::ComponentNotFound {
            entity: self.id,
            tag: Tag::new(tag.to_owned()),
        }
    }
}
