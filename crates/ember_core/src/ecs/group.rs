//! # Groups
//!
//! A group is a live, cached view of every entity whose tags are a superset
//! of the group's key. Groups are built once (one scan over all entities)
//! and afterwards maintained eagerly: each component mutation re-tests the
//! mutated entity against the groups whose key mentions the mutated tag.
//!
//! ## Tag Index
//!
//! ```text
//! by_tag:  "position" -> [g0, g2]
//!          "sprite"   -> [g1, g2]
//! groups:  g0 {position}  g1 {sprite}  g2 {position, sprite}
//! ```
//!
//! Adding or removing `sprite` touches only `g1` and `g2`. Groups that do not
//! mention a tag cannot change membership when that tag changes.

use std::collections::{BTreeSet, HashMap};

use super::component::{Component, Tag};
use super::entity::{Entity, EntityId};
use super::signature::TagSet;
use super::world::WorldId;

/// Handle to a group owned by a world.
///
/// Handles are cheap to copy and are what systems capture at construction.
/// A handle is only meaningful to the world that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GroupHandle {
    world: WorldId,
    slot: usize,
}

impl GroupHandle {
    /// The world that issued this handle.
    #[inline]
    #[must_use]
    pub fn world(self) -> WorldId {
        self.world
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.slot
    }
}

/// Cached set of entities matching a tag set.
///
/// Members iterate in ascending [`EntityId`] order, which is creation order.
#[derive(Clone, Debug)]
pub struct Group {
    /// Required tags.
    key: TagSet,
    /// Current members.
    members: BTreeSet<EntityId>,
}

impl Group {
    fn new(key: TagSet) -> Self {
        Self {
            key,
            members: BTreeSet::new(),
        }
    }

    /// The tags an entity must hold to be a member.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &TagSet {
        &self.key
    }

    /// Number of members.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Checks membership by id.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains(&id)
    }

    /// Iterates member ids.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    /// Updates membership of one entity against this group's key.
    fn retest<C: Component>(&mut self, entity: &Entity<C>) {
        if entity.has_all(&self.key) {
            self.members.insert(entity.id());
        } else {
            self.members.remove(&entity.id());
        }
    }
}

/// All groups of a world plus the tag index used for fan-out.
#[derive(Debug)]
pub(crate) struct GroupIndex {
    world: WorldId,
    groups: Vec<Group>,
    by_key: HashMap<TagSet, usize>,
    by_tag: HashMap<Tag, Vec<usize>>,
}

impl GroupIndex {
    /// Creates an empty index. `capacity` is a reservation hint; a hint
    /// that cannot be satisfied is logged and ignored.
    pub(crate) fn new(world: WorldId, capacity: usize) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut by_key: HashMap<TagSet, usize> = HashMap::new();
        if groups.try_reserve(capacity).is_err() || by_key.try_reserve(capacity).is_err() {
            tracing::warn!(world = %world, capacity, "group capacity not reserved");
        }
        Self {
            world,
            groups,
            by_key,
            by_tag: HashMap::new(),
        }
    }

    /// Returns the handle for `key` if the group already exists.
    pub(crate) fn lookup(&self, key: &TagSet) -> Option<GroupHandle> {
        self.by_key.get(key).map(|&slot| self.handle(slot))
    }

    /// Builds a group for `key` by scanning `entities`, and registers it.
    pub(crate) fn build<'a, C, I>(&mut self, key: TagSet, entities: I) -> GroupHandle
    where
        C: Component,
        I: IntoIterator<Item = &'a Entity<C>>,
    {
        let slot = self.groups.len();
        let mut group = Group::new(key.clone());
        for entity in entities {
            if entity.has_all(&key) {
                group.members.insert(entity.id());
            }
        }
        for tag in key.iter() {
            self.by_tag.entry(tag.clone()).or_default().push(slot);
        }
        self.by_key.insert(key, slot);
        self.groups.push(group);
        self.handle(slot)
    }

    pub(crate) fn get(&self, handle: GroupHandle) -> Option<&Group> {
        self.groups.get(handle.slot())
    }

    /// Re-tests `entity` against every group whose key mentions `tag`.
    pub(crate) fn refresh<C: Component>(&mut self, entity: &Entity<C>, tag: &str) {
        let Some(slots) = self.by_tag.get(tag) else {
            return;
        };
        for &slot in slots {
            self.groups[slot].retest(entity);
        }
    }

    /// Removes `entity` from every group that could contain it.
    pub(crate) fn evict<C: Component>(&mut self, entity: &Entity<C>) {
        let id = entity.id();
        for tag in entity.tags() {
            if let Some(slots) = self.by_tag.get(tag.as_str()) {
                for &slot in slots {
                    self.groups[slot].members.remove(&id);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    /// Sum of all group sizes.
    pub(crate) fn memberships(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    fn handle(&self, slot: usize) -> GroupHandle {
        GroupHandle {
            world: self.world,
            slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(&'static str);

    impl Component for Marker {
        fn tag(&self) -> Tag {
            Tag::from_static(self.0)
        }
    }

    fn entity(id: u64, tags: &[&'static str]) -> Entity<Marker> {
        let mut entity = Entity::new(EntityId::from_raw(id), None);
        for tag in tags {
            entity.insert(Marker(*tag));
        }
        entity
    }

    #[test]
    fn test_build_scans_existing() {
        let entities = vec![entity(0, &["aaa"]), entity(1, &["aaa", "bbb"]), entity(2, &["bbb"])];
        let mut index = GroupIndex::new(WorldId::from_raw(0), 4);

        let handle = index.build(TagSet::from_strs(["aaa"]), &entities);
        let group = index.get(handle).expect("group exists");
        assert_eq!(group.len(), 2);
        assert_eq!(group.iter().collect::<Vec<_>>(), [EntityId::from_raw(0), EntityId::from_raw(1)]);
        assert_eq!(index.lookup(&TagSet::from_strs(["aaa"])), Some(handle));
    }

    #[test]
    fn test_refresh_only_touches_mentioned_groups() {
        let mut index = GroupIndex::new(WorldId::from_raw(0), 4);
        let both = index.build(TagSet::from_strs(["aaa", "bbb"]), std::iter::empty::<&Entity<Marker>>());
        let only_b = index.build(TagSet::from_strs(["bbb"]), std::iter::empty::<&Entity<Marker>>());

        let mut e = entity(5, &["aaa"]);
        index.refresh(&e, "aaa");
        assert!(index.get(both).is_some_and(Group::is_empty));

        e.insert(Marker("bbb"));
        index.refresh(&e, "bbb");
        assert!(index.get(both).is_some_and(|g| g.contains(e.id())));
        assert!(index.get(only_b).is_some_and(|g| g.contains(e.id())));

        e.take("aaa");
        index.refresh(&e, "aaa");
        assert!(index.get(both).is_some_and(Group::is_empty));
        assert!(index.get(only_b).is_some_and(|g| g.len() == 1));
        assert_eq!(index.memberships(), 1);
    }

    #[test]
    fn test_evict() {
        let entities = vec![entity(0, &["aaa", "bbb"])];
        let mut index = GroupIndex::new(WorldId::from_raw(0), 4);
        let a = index.build(TagSet::from_strs(["aaa"]), &entities);
        let b = index.build(TagSet::from_strs(["bbb"]), &entities);
        assert_eq!(index.memberships(), 2);

        index.evict(&entities[0]);
        assert!(index.get(a).is_some_and(Group::is_empty));
        assert!(index.get(b).is_some_and(Group::is_empty));
        assert_eq!(index.len(), 2);
    }
}
