//! # Component System
//!
//! Components are pure data containers with no behavior. The core never
//! looks inside a component; it only reads the component's [`Tag`], which
//! decides which slot of an entity the component occupies.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// String discriminator identifying a component kind.
///
/// Tags compare by exact byte equality (case-sensitive, no trimming).
/// Static tags are free to construct; owned tags are accepted for kinds
/// named at runtime (e.g. from a config file).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(Cow<'static, str>);

impl Tag {
    /// Creates a tag from a string literal without allocating.
    #[inline]
    #[must_use]
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Creates a tag from any string.
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Tag {
    fn from(tag: &'static str) -> Self {
        Self::from_static(tag)
    }
}

impl From<String> for Tag {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

/// Trait for ECS components.
///
/// Applications usually model their component domain as one enum and map
/// each variant to a tag. An entity holds at most one component per tag.
///
/// # Example
///
/// ```rust
/// use ember_core::{Component, Tag};
///
/// enum GameComponent {
///     Position { x: f32, y: f32 },
///     Sprite { image: String },
/// }
///
/// impl Component for GameComponent {
///     fn tag(&self) -> Tag {
///         match self {
///             Self::Position { .. } => Tag::from_static("position"),
///             Self::Sprite { .. } => Tag::from_static("sprite"),
///         }
///     }
/// }
/// ```
pub trait Component: 'static {
    /// The tag this component is stored under.
    fn tag(&self) -> Tag;
}
