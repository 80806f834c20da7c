//! # ECS World
//!
//! The central container for all entities, groups, systems and shared state.
//!
//! Every structural mutation (adding or removing a component, removing an
//! entity) goes through the world, which re-tests the affected entity
//! against the groups that mention the mutated tag before returning. A
//! system running later in the same tick therefore always sees the effect
//! of mutations made by an earlier one.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use super::commands::{Command, CommandQueue};
use super::component::Component;
use super::entity::{Entity, EntityId};
use super::group::{Group, GroupHandle, GroupIndex};
use super::signature::TagSet;
use super::system::{Schedule, System};
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};
use crate::state::SharedState;

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct WorldId(u64);

impl WorldId {
    /// Creates a world id from its raw value.
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

    fn next() -> Self {
        Self(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Counters describing a world at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Live entities.
    pub entities: usize,
    /// Cached groups.
    pub groups: usize,
    /// Registered systems.
    pub systems: usize,
    /// Completed ticks.
    pub ticks: u64,
    /// Sum of all group sizes.
    pub memberships: usize,
    /// Deferred commands not yet applied.
    pub pending_commands: usize,
    /// System runs that exceeded `WorldConfig::slow_system_warn_ms`.
    pub slow_systems: u64,
}

/// The ECS World - container for all game state.
///
/// `C` is the application's component type and `S` the shared-state bag
/// handed to every system through the world.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, Tag, World};
///
/// struct Marker(&'static str);
///
/// impl Component for Marker {
///     fn tag(&self) -> Tag {
///         Tag::from_static(self.0)
///     }
/// }
///
/// let mut world: World<Marker> = World::new();
/// let player = world.add_new_entity("player", [Marker("position"), Marker("sprite")]);
/// let drawable = world.get_group(["sprite", "position"]).unwrap();
///
/// assert_eq!(world.group(drawable).unwrap().len(), 1);
/// world.entity_mut(player).unwrap().remove("sprite");
/// assert!(world.group(drawable).unwrap().is_empty());
/// ```
pub struct World<C: Component, S = SharedState> {
    id: WorldId,
    config: WorldConfig,
    /// Next entity id to hand out; ids are never reused.
    next_entity: u64,
    entities: HashMap<EntityId, Entity<C>>,
    groups: GroupIndex,
    systems: Schedule<C, S>,
    /// Names of all registered systems in execution order, including the
    /// ones detached from `systems` while a tick runs.
    registered: Vec<String>,
    commands: CommandQueue<C>,
    state: S,
    tick: u64,
    in_tick: bool,
    slow_systems: u64,
}

impl<C: Component> World<C, SharedState> {
    /// Creates an empty world with default configuration and an empty
    /// [`SharedState`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world with the given configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        Self::with_config_and_state(config, SharedState::new())
    }
}

impl<C: Component> Default for World<C, SharedState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component, S> World<C, S> {
    /// Creates an empty world around an application-defined state value.
    #[must_use]
    pub fn with_state(state: S) -> Self {
        Self::with_config_and_state(WorldConfig::default(), state)
    }

    /// Creates an empty world from a configuration and a state value.
    #[must_use]
    pub fn with_config_and_state(config: WorldConfig, state: S) -> Self {
        let id = WorldId::next();
        tracing::debug!(world = %id, entity_capacity = config.entity_capacity, "world created");
        let mut entities: HashMap<EntityId, Entity<C>> = HashMap::new();
        if entities.try_reserve(config.entity_capacity).is_err() {
            tracing::warn!(world = %id, capacity = config.entity_capacity, "entity capacity not reserved");
        }
        Self {
            id,
            entities,
            groups: GroupIndex::new(id, config.group_capacity),
            config,
            next_entity: 0,
            systems: Schedule::new(),
            registered: Vec::new(),
            commands: CommandQueue::new(),
            state,
            tick: 0,
            in_tick: false,
            slow_systems: 0,
        }
    }

    /// Returns this world's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WorldId {
        self.id
    }

    /// Returns the configuration the world was built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Number of completed ticks.
    #[inline]
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates and registers an empty entity.
    pub fn new_entity(&mut self, name: Option<&str>) -> EntityMut<'_, C> {
        let id = EntityId::from_raw(self.next_entity);
        self.next_entity += 1;
        tracing::trace!(world = %self.id, entity = %id, name, "entity created");

        let entity = self
            .entities
            .entry(id)
            .or_insert_with(|| Entity::new(id, name.map(str::to_owned)));
        EntityMut {
            entity,
            groups: &mut self.groups,
        }
    }

    /// Creates a named entity holding `components`.
    pub fn add_new_entity<I>(&mut self, name: &str, components: I) -> EntityId
    where
        I: IntoIterator<Item = C>,
    {
        let mut entity = self.new_entity(Some(name));
        entity.add_all(components);
        entity.id()
    }

    /// Looks up an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity<C>> {
        self.entities.get(&id)
    }

    /// Looks up an entity for mutation.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_, C>> {
        let entity = self.entities.get_mut(&id)?;
        Some(EntityMut {
            entity,
            groups: &mut self.groups,
        })
    }

    /// Looks up an entity, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for unknown or removed ids.
    pub fn require(&self, id: EntityId) -> EcsResult<&Entity<C>> {
        self.entity(id).ok_or(EcsError::EntityNotFound(id))
    }

    /// Looks up an entity for mutation, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] for unknown or removed ids.
    pub fn require_mut(&mut self, id: EntityId) -> EcsResult<EntityMut<'_, C>> {
        self.entity_mut(id).ok_or(EcsError::EntityNotFound(id))
    }

    /// Checks whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates all live entities in unspecified order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity<C>> {
        self.entities.values()
    }

    /// Finds the oldest entity carrying `name`. Linear scan, for debugging.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Entity<C>> {
        self.entities
            .values()
            .filter(|entity| entity.name() == Some(name))
            .min_by_key(|entity| entity.id())
    }

    /// Removes an entity from the world and from every group.
    ///
    /// Removing an unknown id is a no-op returning `None`.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity<C>> {
        let entity = self.entities.remove(&id)?;
        self.groups.evict(&entity);
        tracing::trace!(world = %self.id, entity = %id, "entity removed");
        Some(entity)
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Returns the group of entities holding every tag in `tags`.
    ///
    /// Tags are canonicalized (sorted, deduplicated), so argument order and
    /// repeats do not matter. The first request for a tag set scans all
    /// entities once; later requests return the cached handle.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EmptyQuery`] when `tags` is empty.
    pub fn get_group<I, T>(&mut self, tags: I) -> EcsResult<GroupHandle>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let key = TagSet::from_strs(tags);
        if key.is_empty() {
            return Err(EcsError::EmptyQuery);
        }
        if let Some(handle) = self.groups.lookup(&key) {
            return Ok(handle);
        }

        let handle = self.groups.build(key, self.entities.values());
        if let Some(group) = self.groups.get(handle) {
            tracing::debug!(
                world = %self.id,
                key = %group.key(),
                members = group.len(),
                "group created"
            );
        }
        Ok(handle)
    }

    /// Resolves a group handle.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ForeignGroup`] if the handle came from another world.
    pub fn group(&self, handle: GroupHandle) -> EcsResult<&Group> {
        let foreign = EcsError::ForeignGroup {
            expected: self.id,
            found: handle.world(),
        };
        if handle.world() != self.id {
            return Err(foreign);
        }
        self.groups.get(handle).ok_or(foreign)
    }

    /// Iterates the members of a group as entities, in group order.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ForeignGroup`] if the handle came from another world.
    pub fn group_entities(
        &self,
        handle: GroupHandle,
    ) -> EcsResult<impl Iterator<Item = &Entity<C>> + '_> {
        let group = self.group(handle)?;
        Ok(group.iter().filter_map(move |id| self.entities.get(&id)))
    }

    /// Snapshots the member ids of a group, in group order.
    ///
    /// Use this to walk a group while mutating the world; resolve each id
    /// with [`World::entity`] or [`World::entity_mut`], which return `None`
    /// for entities removed during the walk.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ForeignGroup`] if the handle came from another world.
    pub fn group_ids(&self, handle: GroupHandle) -> EcsResult<Vec<EntityId>> {
        Ok(self.group(handle)?.iter().collect())
    }

    /// Number of cached groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Appends a system to the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ForeignGroup`] if any handle the system reports
    /// through [`System::groups`] was issued by another world. The system is
    /// not registered in that case.
    pub fn add_system<T>(&mut self, system: T) -> EcsResult<()>
    where
        T: System<C, S> + 'static,
    {
        for &handle in system.groups() {
            self.group(handle)?;
        }
        tracing::debug!(
            world = %self.id,
            system = system.name(),
            position = self.registered.len(),
            "system registered"
        );
        self.registered.push(system.name().to_owned());
        self.systems.push(Box::new(system));
        Ok(())
    }

    /// Number of registered systems, including while a tick is running.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.registered.len()
    }

    /// Names of registered systems in execution order.
    #[must_use]
    pub fn system_names(&self) -> Vec<&str> {
        self.registered.iter().map(String::as_str).collect()
    }

    /// Runs one tick.
    ///
    /// Every registered system's `update` runs exactly once, in registration
    /// order. A failing system does not stop the tick: the remaining systems
    /// still run, and the first error is returned after the tick completes.
    /// Deferred commands are applied after the last system.
    ///
    /// Systems registered during the tick first run on the next tick. A
    /// nested call from inside a system returns immediately without running
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a system during this tick.
    pub fn update(&mut self) -> EcsResult<()> {
        if self.in_tick {
            tracing::debug!(world = %self.id, "nested update ignored");
            return Ok(());
        }

        let span = tracing::debug_span!("tick", world = %self.id, tick = self.tick);
        let _entered = span.enter();

        self.in_tick = true;
        let mut schedule = std::mem::take(&mut self.systems);
        let (result, slow) = schedule.run(self);
        self.slow_systems += slow;
        schedule.append(&mut self.systems);
        self.systems = schedule;
        self.in_tick = false;

        let applied = self.apply_commands();
        self.tick += 1;

        if self.config.log_ticks {
            tracing::trace!(
                entities = self.entities.len(),
                groups = self.groups.len(),
                commands = applied,
                "tick complete"
            );
        }
        result
    }

    // =========================================================================
    // Deferred commands and shared state
    // =========================================================================

    /// The deferred command queue, applied at the end of each tick.
    pub fn commands(&mut self) -> &mut CommandQueue<C> {
        &mut self.commands
    }

    /// Applies all queued commands in FIFO order and returns how many took
    /// effect. Commands naming a missing entity are skipped.
    pub fn apply_commands(&mut self) -> usize {
        let mut applied = 0;
        for command in self.commands.drain() {
            if self.apply(command) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, command: Command<C>) -> bool {
        match command {
            Command::Spawn { name, components } => {
                let mut entity = self.new_entity(name.as_deref());
                entity.add_all(components);
                true
            }
            Command::Despawn(id) => {
                let removed = self.remove_entity(id).is_some();
                if !removed {
                    tracing::debug!(world = %self.id, entity = %id, "despawn of missing entity skipped");
                }
                removed
            }
            Command::Insert { entity, component } => match self.entity_mut(entity) {
                Some(mut target) => {
                    target.add(component);
                    true
                }
                None => {
                    tracing::warn!(world = %self.id, %entity, "insert into missing entity skipped");
                    false
                }
            },
            Command::Remove { entity, tag } => match self.entity_mut(entity) {
                Some(mut target) => {
                    target.remove(tag.as_str());
                    true
                }
                None => {
                    tracing::warn!(world = %self.id, %entity, %tag, "remove from missing entity skipped");
                    false
                }
            },
        }
    }

    /// The shared-state bag.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// The shared-state bag, mutably.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Snapshot of the world's counters.
    #[must_use]
    pub fn stats(&self) -> WorldStats {
        WorldStats {
            entities: self.entities.len(),
            groups: self.groups.len(),
            systems: self.registered.len(),
            ticks: self.tick,
            memberships: self.groups.memberships(),
            pending_commands: self.commands.len(),
            slow_systems: self.slow_systems,
        }
    }
}

/// Mutable access to one entity.
///
/// Every structural change made through this handle is reflected in all
/// groups before the call returns. Read access is available through
/// [`Deref`] to [`Entity`].
pub struct EntityMut<'w, C: Component> {
    entity: &'w mut Entity<C>,
    groups: &'w mut GroupIndex,
}

impl<C: Component> EntityMut<'_, C> {
    /// Returns the entity's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// Attaches a component, returning the value it replaced under the same tag.
    pub fn add(&mut self, component: C) -> Option<C> {
        let (tag, previous) = self.entity.insert(component);
        if previous.is_none() {
            self.groups.refresh(&*self.entity, tag.as_str());
        }
        previous
    }

    /// Attaches several components in order.
    pub fn add_all<I>(&mut self, components: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
    {
        for component in components {
            self.add(component);
        }
        self
    }

    /// Detaches the component under `tag`, if present.
    pub fn remove(&mut self, tag: &str) -> Option<C> {
        let (tag, component) = self.entity.take(tag)?;
        self.groups.refresh(&*self.entity, tag.as_str());
        Some(component)
    }

    /// Edits the component under `tag` in place.
    ///
    /// If the edit changes the component's tag (for example by switching an
    /// enum variant), the component is moved to its new tag, replacing any
    /// component already stored there, and groups are updated for both tags.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentNotFound`] when the entity has no such tag.
    pub fn modify<R>(&mut self, tag: &str, edit: impl FnOnce(&mut C) -> R) -> EcsResult<R> {
        let component = self.entity.get_mut(tag)?;
        let result = edit(component);
        let retagged = component.tag().as_str() != tag;

        if retagged {
            if let Some((old_tag, value)) = self.entity.take(tag) {
                let (new_tag, _) = self.entity.insert(value);
                self.groups.refresh(&*self.entity, old_tag.as_str());
                self.groups.refresh(&*self.entity, new_tag.as_str());
            }
        }
        Ok(result)
    }
}

impl<C: Component> Deref for EntityMut<'_, C> {
    type Target = Entity<C>;

    fn deref(&self) -> &Self::Target {
        self.entity
    }
}
