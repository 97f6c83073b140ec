//! Component creators and the key → creator registry.
//!
//! Systems that own a component kind register a [`ComponentCreator`] for it
//! during engine initialisation. The entity factory resolves the component
//! names found in entity templates against this registry.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::component::{Attached, Component, ComponentKind, ComponentTypeId};
use crate::error::CreatorError;

/// Instantiates exactly one component kind with default field values.
#[derive(Clone, Copy)]
pub struct ComponentCreator {
    type_id: ComponentTypeId,
    create: fn() -> Box<dyn Component>,
}

impl ComponentCreator {
    /// The creator for component kind `T`.
    #[must_use]
    pub fn of<T: ComponentKind>() -> Self {
        Self {
            type_id: T::TYPE_ID,
            create: || Box::new(Attached::new(T::default())),
        }
    }

    /// The type ID of the components this creator builds.
    #[must_use]
    pub fn component_type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Builds a fresh, unowned component.
    #[must_use]
    pub fn create(&self) -> Box<dyn Component> {
        (self.create)()
    }
}

impl fmt::Debug for ComponentCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCreator")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

/// Maps string keys to component creators.
#[derive(Debug, Default)]
pub struct CreatorRegistry {
    creators: BTreeMap<String, ComponentCreator>,
}

impl CreatorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `creator`.
    ///
    /// # Errors
    ///
    /// Returns [`CreatorError::DuplicateKey`] if `key` is already bound.
    pub fn add(&mut self, key: impl Into<String>, creator: ComponentCreator) -> Result<(), CreatorError> {
        let key = key.into();
        if self.creators.contains_key(&key) {
            return Err(CreatorError::DuplicateKey(key));
        }
        debug!(key, component = %creator.component_type_id(), "registered component creator");
        self.creators.insert(key, creator);
        Ok(())
    }

    /// Returns the creator bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ComponentCreator> {
        self.creators.get(key)
    }

    /// Builds a component through the creator bound to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CreatorError::UnknownKey`] if nothing is bound to `key`.
    pub fn create(&self, key: &str) -> Result<Box<dyn Component>, CreatorError> {
        self.get(key)
            .map(ComponentCreator::create)
            .ok_or_else(|| CreatorError::UnknownKey(key.to_string()))
    }

    /// Returns the first creator (by key order) building components of `type_id`.
    #[must_use]
    pub fn find_by_type(&self, type_id: ComponentTypeId) -> Option<&ComponentCreator> {
        self.creators
            .values()
            .find(|creator| creator.component_type_id() == type_id)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.creators.keys().map(String::as_str)
    }

    /// Number of registered creators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.creators.len()
    }

    /// Returns `true` if no creators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.creators.is_empty()
    }

    /// Drops every registered creator.
    pub fn clear(&mut self) {
        self.creators.clear();
    }
}
