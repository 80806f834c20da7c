//! # Deferred Commands
//!
//! Structural mutations queued during a tick and applied, in FIFO order,
//! after the last system has run. Direct mutation through the world stays
//! the default; the queue is for systems that want the rest of the tick to
//! see the pre-mutation population.

use super::component::Tag;
use super::entity::EntityId;

/// A queued structural mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<C> {
    /// Create an entity with the given components.
    Spawn {
        /// Optional debug name.
        name: Option<String>,
        /// Initial components, added in order.
        components: Vec<C>,
    },
    /// Remove an entity.
    Despawn(EntityId),
    /// Attach (or overwrite) a component.
    Insert {
        /// Target entity.
        entity: EntityId,
        /// Component to attach.
        component: C,
    },
    /// Detach the component under a tag.
    Remove {
        /// Target entity.
        entity: EntityId,
        /// Tag to detach.
        tag: Tag,
    },
}

/// FIFO queue of [`Command`]s owned by a world.
#[derive(Debug)]
pub struct CommandQueue<C> {
    queue: Vec<Command<C>>,
}

impl<C> CommandQueue<C> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues an entity spawn.
    pub fn spawn<I>(&mut self, name: Option<&str>, components: I)
    where
        I: IntoIterator<Item = C>,
    {
        self.queue.push(Command::Spawn {
            name: name.map(str::to_owned),
            components: components.into_iter().collect(),
        });
    }

    /// Queues an entity removal.
    pub fn despawn(&mut self, entity: EntityId) {
        self.queue.push(Command::Despawn(entity));
    }

    /// Queues a component insert.
    pub fn insert(&mut self, entity: EntityId, component: C) {
        self.queue.push(Command::Insert { entity, component });
    }

    /// Queues a component removal.
    pub fn remove(&mut self, entity: EntityId, tag: impl Into<Tag>) {
        self.queue.push(Command::Remove {
            entity,
            tag: tag.into(),
        });
    }

    /// Queues an arbitrary command.
    pub fn push(&mut self, command: Command<C>) {
        self.queue.push(command);
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops every queued command.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub(crate) fn drain(&mut self) -> std::vec::IntoIter<Command<C>> {
        std::mem::take(&mut self.queue).into_iter()
    }
}

impl<C> Default for CommandQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}
