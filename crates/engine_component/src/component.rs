//! Core [`Component`] trait and the closed set of component type IDs.
//!
//! Every kind of data an [`Entity`](crate::Entity) can own is listed in
//! [`ComponentTypeId`]. The enumeration is closed on purpose: its declaration
//! order is the sort order of every entity's component sequence, which is what
//! makes binary-search lookup possible.
//!
//! Component kinds are written as plain `serde` structs implementing
//! [`ComponentKind`]. Once attached to an entity they live behind the
//! object-safe [`Component`] trait, wrapped in [`Attached`], which also carries
//! the back-reference to the owning entity.

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::EntityId;
use crate::error::ComponentError;

/// A small integer identifying a component kind.
///
/// The numeric value is stable for the lifetime of the process and totally
/// ordered. Entities keep their components sorted ascending by this ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ComponentTypeId {
    /// Position, rotation and scale.
    Transform = 0,
    /// Velocity and mass for simple integration.
    Body = 1,
    /// Texture reference and tint consumed by the renderer.
    Sprite = 2,
    /// Marks an entity as driven by player input.
    Controller = 3,
    /// Hit points.
    Health = 4,
    /// Coarse entity-kind tag.
    Tag = 5,
}

impl ComponentTypeId {
    /// Every component type ID, in ascending order.
    pub const ALL: [ComponentTypeId; 6] = [
        ComponentTypeId::Transform,
        ComponentTypeId::Body,
        ComponentTypeId::Sprite,
        ComponentTypeId::Controller,
        ComponentTypeId::Health,
        ComponentTypeId::Tag,
    ];

    /// Returns the numeric value of this ID.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Returns the canonical name of the component kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ComponentTypeId::Transform => "Transform",
            ComponentTypeId::Body => "Body",
            ComponentTypeId::Sprite => "Sprite",
            ComponentTypeId::Controller => "Controller",
            ComponentTypeId::Health => "Health",
            ComponentTypeId::Tag => "Tag",
        }
    }

    /// Looks up a component type ID by its canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.name() == name)
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The capability set shared by every attached component.
///
/// This trait is object-safe; entities store `Box<dyn Component>`. Concrete
/// component kinds implement [`ComponentKind`] instead and get this trait
/// through [`Attached`].
pub trait Component: Any + fmt::Debug {
    /// The type ID this component is sorted and looked up by.
    fn component_type_id(&self) -> ComponentTypeId;

    /// The entity that owns this component, or [`EntityId::INVALID`] before
    /// the owning entity has been initialised.
    fn owner(&self) -> EntityId;

    /// Records the owning entity and runs the kind's initialisation hook.
    fn init(&mut self, owner: EntityId);

    /// Reads field values from structured data. Fields absent from `data`
    /// keep their current values.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Read`] if `data` does not describe this kind,
    /// including when it names a field the kind does not have.
    fn serialize(&mut self, data: &Value) -> Result<(), ComponentError>;

    /// Writes the component's field values out as structured data.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Write`] if the value cannot be represented.
    fn to_value(&self) -> Result<Value, ComponentError>;

    /// Deep-copies the component. The copy has no owner until it is attached
    /// and initialised.
    fn clone_box(&self) -> Box<dyn Component>;

    /// The coarse entity-kind tag this component assigns, if any.
    fn entity_kind(&self) -> Option<&str>;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Authoring trait for a concrete component kind.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use engine_component::{ComponentKind, ComponentTypeId};
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl ComponentKind for Health {
///     const TYPE_ID: ComponentTypeId = ComponentTypeId::Health;
/// }
/// ```
pub trait ComponentKind: Clone + fmt::Debug + Default + Serialize + DeserializeOwned + 'static {
    /// The type ID every instance of this kind carries.
    const TYPE_ID: ComponentTypeId;

    /// Called when the owning entity is initialised.
    fn on_init(&mut self, _owner: EntityId) {}

    /// The coarse entity-kind tag this component assigns, if any.
    fn entity_kind(&self) -> Option<&str> {
        None
    }

    /// Boxes a value of this kind for attachment to an entity.
    fn boxed(self) -> Box<dyn Component> {
        Box::new(Attached::new(self))
    }
}

/// A component kind attached to (or ready to be attached to) an entity.
#[derive(Debug, Clone)]
pub struct Attached<T: ComponentKind> {
    owner: EntityId,
    value: T,
}

impl<T: ComponentKind> Attached<T> {
    /// Wraps a value with no owner.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            owner: EntityId::INVALID,
            value,
        }
    }

    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The wrapped value, mutably.
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: ComponentKind> Component for Attached<T> {
    fn component_type_id(&self) -> ComponentTypeId {
        T::TYPE_ID
    }

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn init(&mut self, owner: EntityId) {
        self.owner = owner;
        self.value.on_init(owner);
    }

    fn serialize(&mut self, data: &Value) -> Result<(), ComponentError> {
        // Overlay the incoming fields onto the current ones. Fields left out
        // keep their current values; names the kind does not have are errors.
        let mut merged = serde_json::to_value(&self.value).map_err(|source| ComponentError::Write {
            component: T::TYPE_ID,
            source,
        })?;
        match (&mut merged, data) {
            (Value::Object(current), Value::Object(incoming)) => {
                for (key, value) in incoming {
                    let Some(slot) = current.get_mut(key) else {
                        return Err(ComponentError::Read {
                            component: T::TYPE_ID,
                            source: <serde_json::Error as serde::de::Error>::unknown_field(key, &[]),
                        });
                    };
                    *slot = value.clone();
                }
            }
            (_, Value::Null) => {}
            (slot, other) => *slot = other.clone(),
        }
        self.value = serde_json::from_value(merged).map_err(|source| ComponentError::Read {
            component: T::TYPE_ID,
            source,
        })?;
        Ok(())
    }

    fn to_value(&self) -> Result<Value, ComponentError> {
        serde_json::to_value(&self.value).map_err(|source| ComponentError::Write {
            component: T::TYPE_ID,
            source,
        })
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Attached::new(self.value.clone()))
    }

    fn entity_kind(&self) -> Option<&str> {
        self.value.entity_kind()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
