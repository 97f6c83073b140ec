//! Gameplay component kinds.
//!
//! These are plain `serde` structs implementing [`ComponentKind`]. Every
//! struct is `#[serde(default)]` so entity templates only need to list the
//! fields they change.

use engine_component::{ComponentKind, ComponentTypeId};
use engine_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub use engine_math::Transform;

/// Linear motion state integrated by the physics system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Body {
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Mass in arbitrary units. Zero mass bodies are static.
    pub mass: f32,
    /// Velocity damping per second, in `[0, 1]`.
    pub damping: f32,
}

impl Body {
    /// Returns `true` if the body never moves.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

impl Default for Body {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: 1.0,
            damping: 0.0,
        }
    }
}

impl ComponentKind for Body {
    const TYPE_ID: ComponentTypeId = ComponentTypeId::Body;
}

/// A texture reference drawn at the owner's transform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Sprite {
    /// Texture asset name.
    pub texture: String,
    /// RGB tint multiplied into the texture.
    pub tint: Vec3,
    /// Hidden sprites are skipped by the renderer.
    pub visible: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: String::new(),
            tint: Vec3::ONE,
            visible: true,
        }
    }
}

impl ComponentKind for Sprite {
    const TYPE_ID: ComponentTypeId = ComponentTypeId::Sprite;
}

/// Marks an entity as steered by player input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Controller {
    /// Movement speed in world units per second.
    pub speed: f32,
}

impl Default for Controller {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

impl ComponentKind for Controller {
    const TYPE_ID: ComponentTypeId = ComponentTypeId::Controller;
}

/// Hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Health {
    /// Current hit points.
    pub current: f32,
    /// Maximum hit points.
    pub max: f32,
}

impl Health {
    /// Create a health component at full HP.
    #[must_use]
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Returns `true` while HP is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Apply damage, clamping to zero.
    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    /// Heal, clamping to max.
    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::full(100.0)
    }
}

impl ComponentKind for Health {
    const TYPE_ID: ComponentTypeId = ComponentTypeId::Health;
}

/// Coarse entity-kind tag, e.g. `"player"` or `"enemy"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Tag {
    /// The entity kind.
    pub name: String,
}

impl Tag {
    /// Create a tag.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ComponentKind for Tag {
    const TYPE_ID: ComponentTypeId = ComponentTypeId::Tag;

    fn entity_kind(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Attached, Component, Entity};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_health_damage_and_heal() {
        let mut h = Health::full(100.0);
        assert!(h.is_alive());
        h.damage(60.0);
        assert_eq!(h.current, 40.0);
        h.heal(30.0);
        assert_eq!(h.current, 70.0);
        h.damage(200.0);
        assert_eq!(h.current, 0.0);
        assert!(!h.is_alive());
    }

    #[test]
    fn test_sprite_reads_partial_description() {
        let mut sprite = Attached::new(Sprite::default());
        sprite.serialize(&json!({ "texture": "ship.png" })).unwrap();
        assert_eq!(sprite.value().texture, "ship.png");
        assert!(sprite.value().visible);
        assert_eq!(sprite.value().tint, Vec3::ONE);
    }

    #[test]
    fn test_tag_assigns_entity_kind() {
        let mut entity = Entity::new().with(Tag::new("enemy")).unwrap();
        entity.init();
        assert_eq!(entity.kind(), Some("enemy"));
    }

    #[test]
    fn test_empty_tag_assigns_nothing() {
        let mut entity = Entity::new().with(Tag::default()).unwrap();
        entity.init();
        assert_eq!(entity.kind(), None);
    }

    #[test]
    fn test_zero_mass_body_is_static() {
        let body = Body {
            mass: 0.0,
            ..Body::default()
        };
        assert!(body.is_static());
        assert!(!Body::default().is_static());
    }
}
