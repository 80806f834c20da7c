//! # EMBER Core
//!
//! A small Entity Component System for game loops:
//! - Entities are bags of components keyed by tag
//! - Groups are cached, always-current views over a tag set
//! - Systems run once per tick, in registration order
//!
//! ## Architecture Rules
//!
//! 1. **Groups never go stale** - every mutation fixes up membership before it returns
//! 2. **No hidden globals** - each [`World`] owns its entities, groups, systems and state
//! 3. **Single-threaded ticks** - systems receive `&mut World` one after another
//!
//! ## Example
//!
//! ```rust
//! use ember_core::{Component, Tag, World};
//!
//! #[derive(Debug)]
//! enum Part {
//!     Position { x: f32, y: f32 },
//!     Sprite(&'static str),
//! }
//!
//! impl Component for Part {
//!     fn tag(&self) -> Tag {
//!         match self {
//!             Part::Position { .. } => Tag::from_static("position"),
//!             Part::Sprite(_) => Tag::from_static("sprite"),
//!         }
//!     }
//! }
//!
//! let mut world: World<Part> = World::new();
//! let drawable = world.get_group(["position", "sprite"])?;
//! world.add_new_entity("hero", [Part::Position { x: 0.0, y: 0.0 }, Part::Sprite("hero.png")]);
//! assert_eq!(world.group(drawable)?.len(), 1);
//! # Ok::<(), ember_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod state;

pub use config::WorldConfig;
pub use ecs::{
    from_fn, Command, CommandQueue, Component, Entity, EntityId, EntityMut, FnSystem, Group,
    GroupHandle, System, Tag, TagSet, World, WorldId, WorldStats,
};
pub use error::{EcsError, EcsResult};
pub use state::SharedState;
