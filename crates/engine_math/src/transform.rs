//! 2D transform component.
//!
//! [`Transform`] represents position, rotation and scale on the play field.

use engine_component::{ComponentKind, ComponentTypeId};
use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// A 2D transform: position, rotation in radians, and per-axis scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Transform {
    /// World-space position.
    pub position: Vec2,
    /// Counter-clockwise rotation in radians.
    pub rotation: f32,
    /// Per-axis scale factor.
    pub scale: Vec2,
}

impl Transform {
    /// The identity transform: origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        rotation: 0.0,
        scale: Vec2::ONE,
    };

    /// Create a transform at the given position with default rotation/scale.
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// The affine matrix mapping local space to world space.
    #[must_use]
    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
    }

    /// Translate the transform by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec2) -> Self {
        self.position += offset;
        self
    }

    /// Rotate the transform by `angle` radians.
    #[must_use]
    pub fn rotated(mut self, angle: f32) -> Self {
        self.rotation += angle;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ComponentKind for Transform {
    const TYPE_ID: ComponentTypeId = ComponentTypeId::Transform;
}

#[cfg(test)]
mod tests {
    use engine_component::{Attached, Component};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transform::IDENTITY;
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.scale, Vec2::ONE);
        assert_eq!(t.to_affine(), Affine2::IDENTITY);
    }

    #[test]
    fn test_translated() {
        let t = Transform::IDENTITY.translated(Vec2::new(5.0, 0.0));
        assert_eq!(t.position, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_affine_applies_translation() {
        let t = Transform::from_position(Vec2::new(2.0, 3.0));
        assert_eq!(t.to_affine().transform_point2(Vec2::ZERO), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_partial_description_keeps_identity_scale() {
        let mut component = Attached::new(Transform::default());
        component
            .serialize(&json!({ "position": [4.0, -1.0] }))
            .unwrap();
        assert_eq!(component.value().position, Vec2::new(4.0, -1.0));
        assert_eq!(component.value().scale, Vec2::ONE);
    }
}
