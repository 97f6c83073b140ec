//! Factory-level error types.

use engine_component::{ComponentError, CreatorError, EntityError, EntityId};

/// Errors raised while building, restoring or describing entities.
///
/// These are authoring-time failures. Callers building a scene are expected to
/// abort on them rather than continue with a partial entity.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The archetype document could not be parsed.
    #[error("malformed archetype document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The archetype document could not be read from disk.
    #[error("failed to read archetype document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No archetype with this name has been registered.
    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),

    /// A template named a component key with no registered creator.
    #[error("archetype '{archetype}': {source}")]
    Creator {
        archetype: String,
        #[source]
        source: CreatorError,
    },

    /// A template supplied field values a component could not read.
    #[error("archetype '{archetype}', component '{key}': {source}")]
    Component {
        archetype: String,
        key: String,
        #[source]
        source: ComponentError,
    },

    /// A template attached the same component kind twice.
    #[error("archetype '{archetype}': {source}")]
    Entity {
        archetype: String,
        #[source]
        source: EntityError,
    },

    /// A live entity's component could not be written into a snapshot, or a
    /// snapshot's fields could not be read back.
    #[error("{entity}: {source}")]
    Snapshot {
        entity: EntityId,
        #[source]
        source: ComponentError,
    },

    /// A snapshot listed the same component kind twice.
    #[error("{entity}: {source}")]
    Restore {
        entity: EntityId,
        #[source]
        source: EntityError,
    },

    /// A snapshot named a component kind with no registered creator.
    #[error("{entity}: no component creator builds {component}")]
    NoCreatorForType {
        entity: EntityId,
        component: engine_component::ComponentTypeId,
    },

    /// A snapshot tried to restore onto an ID that is still live.
    #[error("{0} is already live")]
    IdInUse(EntityId),

    /// A snapshot carried the unassigned ID.
    #[error("snapshot has no entity id")]
    UnassignedId,

    /// Snapshot bytes could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Snapshot bytes could not be decoded.
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
