//! # engine_math
//!
//! Math types for the engine. Re-exports [`glam`] for linear algebra and
//! defines the [`Transform`] component every placed entity carries.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{Affine2, Mat3, Vec2, Vec3};

pub use transform::Transform;
