//! # Entity Component System
//!
//! Entities own tagged components; groups are live, cached views over the
//! entities holding a tag set; systems read groups once per tick.
//!
//! ## Design Philosophy
//!
//! - Groups are maintained eagerly at the point of mutation, never lazily
//! - A tag index limits each mutation to the groups that mention the tag
//! - Entity IDs are never reused within a world
//! - Systems run in registration order on the calling thread

mod commands;
mod component;
mod entity;
mod group;
mod signature;
mod system;
mod world;

pub use commands::{Command, CommandQueue};
pub use component::{Component, Tag};
pub use entity::{Entity, EntityId};
pub use group::{Group, GroupHandle};
pub use signature::TagSet;
pub use system::{from_fn, FnSystem, System};
pub use world::{EntityMut, World, WorldId, WorldStats};
