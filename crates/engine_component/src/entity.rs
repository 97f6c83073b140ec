//! Entity identifiers and per-entity component storage.
//!
//! An [`Entity`] owns its components exclusively and keeps them sorted
//! ascending by [`ComponentTypeId`]. Insertion is an ordered insert, lookup a
//! binary search. The number of components per entity is bounded by the number
//! of component kinds, so the O(n) shift on insert never matters in practice.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::component::{Attached, Component, ComponentKind, ComponentTypeId};
use crate::error::EntityError;

/// A unique entity identifier.
///
/// IDs are allocated by the entity factory, start at 1 and are never reused.
/// `0` is the unassigned sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The unassigned / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an entity ID from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is an assigned (non-zero) ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// One game object: an identified, ordered composition of components.
#[derive(Debug, Default)]
pub struct Entity {
    id: EntityId,
    components: Vec<Box<dyn Component>>,
    kind: Option<String>,
}

impl Entity {
    /// Create an empty entity with the unassigned ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entity's ID ([`EntityId::INVALID`] until registered).
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Assigns the entity's ID. Only the factory calls this.
    pub fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    /// The coarse entity-kind tag assigned during [`Entity::init`].
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Attaches a component, keeping the sequence sorted by type ID.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::DuplicateComponent`] if a component with the same
    /// type ID is already attached; the entity is left unchanged.
    pub fn add_component(&mut self, component: Box<dyn Component>) -> Result<(), EntityError> {
        let type_id = component.component_type_id();
        match self.search(type_id) {
            Ok(_) => Err(EntityError::DuplicateComponent {
                entity: self.id,
                component: type_id,
            }),
            Err(pos) => {
                trace!(entity = %self.id, component = %type_id, "attached component");
                self.components.insert(pos, component);
                Ok(())
            }
        }
    }

    /// Attaches a typed component value.
    ///
    /// # Errors
    ///
    /// See [`Entity::add_component`].
    pub fn add<T: ComponentKind>(&mut self, value: T) -> Result<(), EntityError> {
        self.add_component(value.boxed())
    }

    /// Builder-style [`Entity::add`].
    ///
    /// # Errors
    ///
    /// See [`Entity::add_component`].
    pub fn with<T: ComponentKind>(mut self, value: T) -> Result<Self, EntityError> {
        self.add(value)?;
        Ok(self)
    }

    /// Looks up the component with the given type ID.
    #[must_use]
    pub fn get_component(&self, type_id: ComponentTypeId) -> Option<&dyn Component> {
        let pos = self.search(type_id).ok()?;
        Some(self.components[pos].as_ref())
    }

    /// Looks up the component with the given type ID, mutably.
    pub fn get_component_mut(&mut self, type_id: ComponentTypeId) -> Option<&mut dyn Component> {
        let pos = self.search(type_id).ok()?;
        Some(self.components[pos].as_mut())
    }

    /// Typed lookup.
    #[must_use]
    pub fn get<T: ComponentKind>(&self) -> Option<&T> {
        self.get_component(T::TYPE_ID)?
            .as_any()
            .downcast_ref::<Attached<T>>()
            .map(Attached::value)
    }

    /// Typed mutable lookup.
    pub fn get_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.get_component_mut(T::TYPE_ID)?
            .as_any_mut()
            .downcast_mut::<Attached<T>>()
            .map(Attached::value_mut)
    }

    /// Returns `true` if a component with the given type ID is attached.
    #[must_use]
    pub fn has_component(&self, type_id: ComponentTypeId) -> bool {
        self.search(type_id).is_ok()
    }

    /// The attached components, ascending by type ID.
    pub fn components(&self) -> impl Iterator<Item = &(dyn Component + 'static)> {
        self.components.iter().map(AsRef::as_ref)
    }

    /// The attached type IDs, ascending.
    #[must_use]
    pub fn component_types(&self) -> Vec<ComponentTypeId> {
        self.components
            .iter()
            .map(|c| c.component_type_id())
            .collect()
    }

    /// Number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Deep-copies every component, preserving order.
    #[must_use]
    pub fn clone_components(&self) -> Vec<Box<dyn Component>> {
        self.components.iter().map(|c| c.clone_box()).collect()
    }

    /// Deep-copies this entity into a new, unassigned, uninitialised entity.
    ///
    /// The copy keeps this entity's component order, so it needs no re-sort
    /// and cannot hit a duplicate type ID.
    #[must_use]
    pub fn duplicate(&self) -> Entity {
        Entity {
            id: EntityId::INVALID,
            components: self.clone_components(),
            kind: None,
        }
    }

    /// Finishes construction: points every component back at this entity,
    /// runs each component's init hook and assigns the entity-kind tag.
    pub fn init(&mut self) {
        let id = self.id;
        for component in &mut self.components {
            component.init(id);
        }
        self.kind = self
            .components
            .iter()
            .find_map(|c| c.entity_kind().map(str::to_owned));
    }

    fn search(&self, type_id: ComponentTypeId) -> Result<usize, usize> {
        self.components
            .binary_search_by_key(&type_id, |c| c.component_type_id())
    }
}
