//! # Systems and Scheduling
//!
//! A system is a per-tick behavior unit. It usually captures one or more
//! [`GroupHandle`]s in its constructor and reads those groups on every
//! [`System::update`]. The world's schedule runs systems strictly in
//! registration order, one after another, on the calling thread.

use std::time::{Duration, Instant};

use super::component::Component;
use super::group::GroupHandle;
use super::world::World;
use crate::error::EcsResult;
use crate::state::SharedState;

/// Per-tick behavior unit.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, EcsResult, GroupHandle, System, Tag, World};
///
/// struct Marker(&'static str);
///
/// impl Component for Marker {
///     fn tag(&self) -> Tag {
///         Tag::from_static(self.0)
///     }
/// }
///
/// struct CountMovers {
///     movers: [GroupHandle; 1],
///     seen: usize,
/// }
///
/// impl CountMovers {
///     fn new(world: &mut World<Marker>) -> EcsResult<Self> {
///         Ok(Self { movers: [world.get_group(["velocity"])?], seen: 0 })
///     }
/// }
///
/// impl System<Marker> for CountMovers {
///     fn update(&mut self, world: &mut World<Marker>) -> EcsResult<()> {
///         self.seen = world.group(self.movers[0])?.len();
///         Ok(())
///     }
///
///     fn groups(&self) -> &[GroupHandle] {
///         &self.movers
///     }
/// }
///
/// let mut world: World<Marker> = World::new();
/// let system = CountMovers::new(&mut world).unwrap();
/// world.add_system(system).unwrap();
/// world.update().unwrap();
/// ```
pub trait System<C: Component, S = SharedState> {
    /// Runs the system for one tick.
    ///
    /// # Errors
    ///
    /// Implementations propagate component access failures so that
    /// authoring mistakes surface from [`World::update`].
    fn update(&mut self, world: &mut World<C, S>) -> EcsResult<()>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Group handles captured by this system.
    ///
    /// [`World::add_system`] checks that every handle listed here was issued
    /// by the world the system is being registered with.
    fn groups(&self) -> &[GroupHandle] {
        &[]
    }
}

/// A system built from a closure.
pub struct FnSystem<F> {
    name: &'static str,
    run: F,
}

/// Wraps a closure as a [`System`].
pub fn from_fn<C, S, F>(name: &'static str, run: F) -> FnSystem<F>
where
    C: Component,
    F: FnMut(&mut World<C, S>) -> EcsResult<()>,
{
    FnSystem { name, run }
}

impl<C, S, F> System<C, S> for FnSystem<F>
where
    C: Component,
    F: FnMut(&mut World<C, S>) -> EcsResult<()>,
{
    fn update(&mut self, world: &mut World<C, S>) -> EcsResult<()> {
        (self.run)(world)
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Ordered list of systems owned by a world.
pub(crate) struct Schedule<C: Component, S = SharedState> {
    systems: Vec<Box<dyn System<C, S>>>,
}

impl<C: Component, S> Schedule<C, S> {
    pub(crate) fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, system: Box<dyn System<C, S>>) {
        self.systems.push(system);
    }

    /// Moves every system of `other` to the end of this schedule.
    pub(crate) fn append(&mut self, other: &mut Self) {
        self.systems.append(&mut other.systems);
    }

    /// Runs every system once, in order.
    ///
    /// All systems run even if one fails; the first error is returned along
    /// with the number of systems that exceeded the time budget.
    pub(crate) fn run(&mut self, world: &mut World<C, S>) -> (EcsResult<()>, u64) {
        let budget = world.config().slow_system_warn_ms.map(Duration::from_millis);
        let mut first_error = None;
        let mut slow = 0;

        for system in &mut self.systems {
            let started = budget.map(|_| Instant::now());
            let outcome = system.update(world);

            if let (Some(budget), Some(started)) = (budget, started) {
                let elapsed = started.elapsed();
                if elapsed > budget {
                    slow += 1;
                    tracing::warn!(
                        system = system.name(),
                        elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                        budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                        "system exceeded its time budget"
                    );
                }
            }

            if let Err(err) = outcome {
                tracing::error!(system = system.name(), error = %err, "system update failed");
                first_error.get_or_insert(err);
            }
        }

        (first_error.map_or(Ok(()), Err), slow)
    }
}

impl<C: Component, S> Default for Schedule<C, S> {
    fn default() -> Self {
        Self::new()
    }
}
