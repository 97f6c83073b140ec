//! Graphics system.
//!
//! The demo has no renderer. `draw` walks the visible sprites the way a
//! renderer would batch them and reports the count.

use components::{Sprite, Transform};
use engine_component::ComponentCreator;
use engine_core::{Context, EntityFactory, System};
use tracing::{debug, info};

/// Owns the `Sprite` component kind.
#[derive(Debug, Default)]
pub struct GraphicsSystem {
    frames_drawn: u64,
    last_visible: usize,
}

impl GraphicsSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Counts the sprites that would be drawn: visible, with a texture, and
/// attached to an entity that has a transform.
#[must_use]
pub fn visible_sprites(factory: &EntityFactory) -> usize {
    factory
        .entities()
        .filter(|entity| entity.get::<Transform>().is_some())
        .filter_map(|entity| entity.get::<Sprite>())
        .filter(|sprite| sprite.visible && !sprite.texture.is_empty())
        .count()
}

impl System for GraphicsSystem {
    fn name(&self) -> &str {
        "Graphics"
    }

    fn init(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        ctx.factory_mut()
            .add_component_creator("Sprite", ComponentCreator::of::<Sprite>())?;
        Ok(())
    }

    fn update(&mut self, _dt: f32, _ctx: &mut Context<'_>) {}

    fn draw(&mut self, ctx: &mut Context<'_>) {
        let visible = visible_sprites(ctx.factory());
        if visible != self.last_visible {
            debug!(frame = ctx.frame(), visible, "sprite count changed");
        }
        self.last_visible = visible;
        self.frames_drawn += 1;
    }
}

impl Drop for GraphicsSystem {
    fn drop(&mut self) {
        info!(frames = self.frames_drawn, "graphics shut down");
    }
}
