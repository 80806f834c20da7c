//! # Shared State
//!
//! The default per-world bag for cross-cutting per-frame data: elapsed
//! time, shared context, object pools. Values are keyed by string and
//! stored with their concrete type; readers name the type they expect.
//!
//! Keys are owned by convention: each key has one writer, and the keys in
//! [`keys`] are written by the game loop.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// Well-known keys.
pub mod keys {
    /// Seconds since the previous tick (`f32`), written by the game loop
    /// before each `World::update`.
    pub const DELTA_SECONDS: &str = "delta_seconds";
    /// Seconds since the loop started (`f64`).
    pub const ELAPSED_SECONDS: &str = "elapsed_seconds";
}

/// String-keyed bag of typed values.
#[derive(Default)]
pub struct SharedState {
    values: HashMap<String, Box<dyn Any>>,
}

impl SharedState {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value if it had
    /// the same type.
    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        self.values
            .insert(key.into(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Reads the value under `key` if it exists with type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    /// Mutably borrows the value under `key` if it exists with type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut::<T>()
    }

    /// Returns the value under `key`, first storing `init()` if the key is
    /// missing or holds a different type.
    ///
    /// The result is always `Some`; it is an `Option` because the stored
    /// value is type-erased.
    pub fn get_or_insert_with<T: Any>(
        &mut self,
        key: &str,
        init: impl FnOnce() -> T,
    ) -> Option<&mut T> {
        let slot = match self.values.entry(key.to_owned()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is::<T>() {
                    tracing::warn!(key, "shared state value replaced with a different type");
                    entry.insert(Box::new(init()));
                }
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(Box::new(init())),
        };
        slot.downcast_mut::<T>()
    }

    /// Removes the value under `key`. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Whether any value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates stored keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("SharedState").field("keys", &keys).finish()
    }
}
