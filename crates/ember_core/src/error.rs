//! # ECS Error Types
//!
//! All errors that can occur in the ECS core.

use thiserror::Error;

use crate::ecs::{EntityId, Tag, WorldId};

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Requested a component tag the entity does not hold.
    #[error("entity {entity} has no component tagged `{tag}`")]
    ComponentNotFound {
        /// The entity that was queried.
        entity: EntityId,
        /// The missing tag.
        tag: Tag,
    },

    /// Asked for a group with no required tags.
    #[error("group query must name at least one tag")]
    EmptyQuery,

    /// Entity id is not (or no longer) registered in the world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A group handle was used with a world other than the one that issued it.
    #[error("group handle belongs to world {found}, expected world {expected}")]
    ForeignGroup {
        /// The world the handle was presented to.
        expected: WorldId,
        /// The world that issued the handle.
        found: WorldId,
    },

    /// Invalid configuration content.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read configuration {path}: {message}")]
    ConfigIo {
        /// Path that was opened.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EcsError::ComponentNotFound {
            entity: EntityId::from_raw(7),
            tag: Tag::from_static("sprite"),
        };
        assert_eq!(err.to_string(), "entity #7 has no component tagged `sprite`");

        let err = EcsError::ForeignGroup {
            expected: WorldId::from_raw(1),
            found: WorldId::from_raw(2),
        };
        assert_eq!(
            err.to_string(),
            "group handle belongs to world W2, expected world W1"
        );
    }
}
