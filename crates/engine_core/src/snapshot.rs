//! Entity snapshots and their MessagePack codec.
//!
//! A snapshot records an entity's ID together with every component's field
//! values, so an entity keeps its identity when it is written out and read
//! back in.

use engine_component::{ComponentTypeId, EntityId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FactoryError;

/// One component's type and field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSnapshot {
    /// The component kind.
    pub type_id: ComponentTypeId,
    /// The component's fields.
    pub fields: Value,
}

/// An entity's identity and component data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// The entity's ID.
    pub id: EntityId,
    /// Components, ascending by type ID.
    pub components: Vec<ComponentSnapshot>,
}

/// Encode a snapshot to MessagePack bytes.
///
/// # Errors
///
/// Returns [`FactoryError::Encode`] if serialisation fails.
pub fn encode(snapshot: &EntitySnapshot) -> Result<Vec<u8>, FactoryError> {
    Ok(rmp_serde::to_vec_named(snapshot)?)
}

/// Decode a snapshot from MessagePack bytes.
///
/// # Errors
///
/// Returns [`FactoryError::Decode`] if deserialisation fails.
pub fn decode(bytes: &[u8]) -> Result<EntitySnapshot, FactoryError> {
    Ok(rmp_serde::from_slice(bytes)?)
}
