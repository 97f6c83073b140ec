//! Component-layer error types.

use crate::component::ComponentTypeId;
use crate::entity::EntityId;

/// Errors raised while reading or writing a single component's fields.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// The structured data did not describe the component kind.
    #[error("failed to read {component} fields: {source}")]
    Read {
        component: ComponentTypeId,
        #[source]
        source: serde_json::Error,
    },

    /// The component could not be written out as structured data.
    #[error("failed to write {component} fields: {source}")]
    Write {
        component: ComponentTypeId,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while composing an entity.
#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    /// The entity already owns a component with this type ID.
    #[error("{entity} already has a {component} component")]
    DuplicateComponent {
        entity: EntityId,
        component: ComponentTypeId,
    },
}

/// Errors raised by the component creator registry.
#[derive(Debug, thiserror::Error)]
pub enum CreatorError {
    /// A creator is already bound to this key.
    #[error("a component creator is already registered under '{0}'")]
    DuplicateKey(String),

    /// No creator is bound to this key.
    #[error("no component creator registered under '{0}'")]
    UnknownKey(String),
}
