//! Physics system: velocity integration.

use components::{Body, Transform};
use engine_component::{ComponentCreator, EntityId};
use engine_core::{Context, EntityFactory, Message, System};
use engine_math::Vec2;
use tracing::{debug, trace};

/// Owns the `Transform` and `Body` component kinds and moves bodies.
#[derive(Debug, Default)]
pub struct PhysicsSystem;

impl PhysicsSystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Advances every dynamic body by `dt` seconds. Returns the number of
/// bodies moved.
pub fn integrate(factory: &mut EntityFactory, dt: f32) -> usize {
    let mut moved = 0;
    for entity in factory.entities_mut() {
        let Some(body) = entity.get_mut::<Body>() else {
            continue;
        };
        if body.is_static() {
            continue;
        }
        body.velocity *= (1.0 - body.damping * dt).max(0.0);
        let velocity = body.velocity;

        if let Some(transform) = entity.get_mut::<Transform>() {
            transform.position += velocity * dt;
            moved += 1;
        }
    }
    moved
}

/// Sets the velocity of `entity`'s body. Returns `false` if the entity is
/// gone or has no body.
pub fn apply_motion(factory: &mut EntityFactory, entity: EntityId, velocity: Vec2) -> bool {
    match factory
        .get_object_with_id_mut(entity)
        .and_then(|e| e.get_mut::<Body>())
    {
        Some(body) => {
            body.velocity = velocity;
            true
        }
        None => false,
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &str {
        "Physics"
    }

    fn init(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let factory = ctx.factory_mut();
        factory.add_component_creator("Transform", ComponentCreator::of::<Transform>())?;
        factory.add_component_creator("Body", ComponentCreator::of::<Body>())?;
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut Context<'_>) {
        let moved = integrate(ctx.factory_mut(), dt);
        trace!(moved, "integrated bodies");
    }

    fn send_message(&mut self, message: &Message, ctx: &mut Context<'_>) {
        if let Message::Motion { entity, velocity } = message {
            if !apply_motion(ctx.factory_mut(), *entity, *velocity) {
                debug!(entity = %entity, "motion for an entity without a body");
            }
        }
    }
}
