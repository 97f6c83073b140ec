//! Gameplay logic.
//!
//! Spawns the scene from archetypes, steers the player from key events,
//! fires projectiles by cloning a hidden prototype, and resolves projectile
//! hits against asteroids.
//!
//! The scene is built during `init`, so this system must be registered after
//! every system that registers a component creator the archetypes use.

use components::{Body, Controller, Health, Sprite, Tag, Transform};
use engine_component::{ComponentCreator, EntityId};
use engine_core::{
    ArchetypeSet, Context, EntityFactory, FactoryError, KeyCode, KeyEvent, KeyState, Message,
    System,
};
use engine_math::Vec2;
use tracing::{debug, info, warn};

/// Projectile speed in world units per second.
const PROJECTILE_SPEED: f32 = 12.0;
/// Seconds a projectile lives before it is destroyed.
const PROJECTILE_LIFETIME: f32 = 1.5;
/// Damage one projectile deals.
const PROJECTILE_DAMAGE: f32 = 50.0;
/// Distance within which a projectile hits an asteroid.
const HIT_RADIUS: f32 = 1.5;
/// Where asteroids are placed when the scene is built.
const ASTEROID_SPAWNS: [Vec2; 3] = [
    Vec2::new(-6.0, 6.0),
    Vec2::new(0.0, 6.0),
    Vec2::new(6.0, 6.0),
];

/// Arrow keys currently held.
#[derive(Debug, Default, Clone, Copy)]
struct Heading {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Heading {
    /// Records a key change. Returns `false` for non-arrow keys.
    fn set(&mut self, code: KeyCode, held: bool) -> bool {
        let slot = match code {
            KeyCode::Up => &mut self.up,
            KeyCode::Down => &mut self.down,
            KeyCode::Left => &mut self.left,
            KeyCode::Right => &mut self.right,
            _ => return false,
        };
        *slot = held;
        true
    }

    fn direction(self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.down, self.up)).normalize_or_zero()
    }
}

/// A live projectile and its remaining lifetime.
#[derive(Debug, Clone, Copy)]
struct Shot {
    id: EntityId,
    remaining: f32,
}

/// A projectile striking an asteroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub shot: EntityId,
    pub target: EntityId,
    pub destroyed: bool,
}

/// Owns the `Controller`, `Health` and `Tag` component kinds and runs the
/// game rules.
#[derive(Debug)]
pub struct LogicSystem {
    archetypes: Option<ArchetypeSet>,
    player: Option<EntityId>,
    prototype: Option<EntityId>,
    shots: Vec<Shot>,
    heading: Heading,
}

impl LogicSystem {
    /// Create the logic system. `archetypes` are handed to the factory during
    /// `init`.
    #[must_use]
    pub fn new(archetypes: ArchetypeSet) -> Self {
        Self {
            archetypes: Some(archetypes),
            player: None,
            prototype: None,
            shots: Vec::new(),
            heading: Heading::default(),
        }
    }

    /// Builds the player, the asteroids and the hidden projectile prototype.
    fn spawn_scene(&mut self, factory: &mut EntityFactory) -> Result<(), FactoryError> {
        self.shots.clear();
        self.heading = Heading::default();

        self.player = Some(factory.create_from_archetype("player")?);
        for position in ASTEROID_SPAWNS {
            let id = factory.create_from_archetype("asteroid")?;
            if let Some(transform) = factory
                .get_object_with_id_mut(id)
                .and_then(|e| e.get_mut::<Transform>())
            {
                transform.position = position;
            }
        }
        self.prototype = Some(factory.create_from_archetype("projectile")?);

        info!(entities = factory.entity_count(), "scene spawned");
        Ok(())
    }

    /// The player's velocity for the held arrow keys.
    fn player_velocity(&self, factory: &EntityFactory) -> Option<(EntityId, Vec2)> {
        let player = self.player?;
        let speed = factory
            .get_object_with_id(player)?
            .get::<Controller>()
            .map_or(0.0, |c| c.speed);
        Some((player, self.heading.direction() * speed))
    }

    /// Clones the projectile prototype at the player's position and launches
    /// it. Returns the new projectile.
    fn fire(&mut self, factory: &mut EntityFactory) -> Option<EntityId> {
        let origin = factory
            .get_object_with_id(self.player?)?
            .get::<Transform>()?
            .position;
        let id = factory.clone_entity(self.prototype?)?;
        let shot = factory.get_object_with_id_mut(id)?;

        if let Some(transform) = shot.get_mut::<Transform>() {
            transform.position = origin;
        }
        if let Some(body) = shot.get_mut::<Body>() {
            body.velocity = Vec2::Y * PROJECTILE_SPEED;
            body.mass = 1.0;
        }
        if let Some(sprite) = shot.get_mut::<Sprite>() {
            sprite.visible = true;
        }

        self.shots.push(Shot {
            id,
            remaining: PROJECTILE_LIFETIME,
        });
        debug!(entity = %id, "fired projectile");
        Some(id)
    }

    fn handle_key(&mut self, event: KeyEvent, ctx: &mut Context<'_>) {
        let pressed = event.state == KeyState::Pressed;
        if self.heading.set(event.code, pressed) {
            if let Some((entity, velocity)) = self.player_velocity(ctx.factory()) {
                ctx.broadcast(Message::Motion { entity, velocity });
            }
            return;
        }
        if !pressed {
            return;
        }

        match event.code {
            KeyCode::Space => {
                if self.fire(ctx.factory_mut()).is_some() {
                    ctx.broadcast(Message::PlaySound("laser".into()));
                }
            }
            KeyCode::Enter => ctx.broadcast(Message::ChangeState("play".into())),
            KeyCode::Escape => ctx.request_exit(),
            _ => {}
        }
    }
}

/// Damages the first living asteroid within reach of each shot.
pub fn collide(factory: &mut EntityFactory, shots: &[EntityId]) -> Vec<Hit> {
    let targets: Vec<(EntityId, Vec2)> = factory
        .entities()
        .filter(|e| e.kind() == Some("asteroid"))
        .filter_map(|e| Some((e.id(), e.get::<Transform>()?.position)))
        .collect();

    let mut hits = Vec::new();
    for &shot in shots {
        let Some(at) = factory
            .get_object_with_id(shot)
            .and_then(|e| e.get::<Transform>())
            .map(|t| t.position)
        else {
            continue;
        };

        for &(target, position) in &targets {
            if position.distance(at) > HIT_RADIUS {
                continue;
            }
            let Some(health) = factory
                .get_object_with_id_mut(target)
                .and_then(|e| e.get_mut::<Health>())
            else {
                continue;
            };
            if !health.is_alive() {
                continue;
            }
            health.damage(PROJECTILE_DAMAGE);
            hits.push(Hit {
                shot,
                target,
                destroyed: !health.is_alive(),
            });
            break;
        }
    }
    hits
}

impl System for LogicSystem {
    fn name(&self) -> &str {
        "Logic"
    }

    fn init(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let factory = ctx.factory_mut();
        factory.add_component_creator("Controller", ComponentCreator::of::<Controller>())?;
        factory.add_component_creator("Health", ComponentCreator::of::<Health>())?;
        factory.add_component_creator("Tag", ComponentCreator::of::<Tag>())?;

        if let Some(archetypes) = self.archetypes.take() {
            factory.register_archetypes(archetypes);
        }
        self.spawn_scene(factory)?;
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut Context<'_>) {
        let live: Vec<EntityId> = self.shots.iter().map(|s| s.id).collect();
        for hit in collide(ctx.factory_mut(), &live) {
            self.shots.retain(|s| s.id != hit.shot);
            ctx.broadcast(Message::DestroyEntity(hit.shot));
            if hit.destroyed {
                info!(asteroid = %hit.target, "asteroid destroyed");
                ctx.broadcast(Message::DestroyEntity(hit.target));
                ctx.broadcast(Message::PlaySound("explosion".into()));
            }
        }

        let mut expired = Vec::new();
        self.shots.retain_mut(|shot| {
            shot.remaining -= dt;
            let alive = shot.remaining > 0.0;
            if !alive {
                expired.push(shot.id);
            }
            alive
        });
        for id in expired {
            ctx.broadcast(Message::DestroyEntity(id));
        }
    }

    fn send_message(&mut self, message: &Message, ctx: &mut Context<'_>) {
        match message {
            Message::Input(event) => self.handle_key(*event, ctx),
            Message::ChangeState(state) => {
                if let Err(err) = self.spawn_scene(ctx.factory_mut()) {
                    warn!(%state, error = %err, "failed to rebuild scene");
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use engine_core::{CoreEngine, EngineConfig};

    use super::*;
    use crate::audio::AudioSystem;
    use crate::graphics::GraphicsSystem;
    use crate::physics::PhysicsSystem;
    use crate::state::GameStateSystem;

    fn engine_with(archetypes: ArchetypeSet) -> CoreEngine {
        let mut engine = CoreEngine::new(EngineConfig::default().with_frame_rate(0.0));
        engine.add_system(PhysicsSystem::new());
        engine.add_system(GraphicsSystem::new());
        engine.add_system(AudioSystem::new());
        engine.add_system(GameStateSystem::new("play"));
        engine.add_system(LogicSystem::new(archetypes));
        engine.add_factory_system();
        engine
    }

    fn demo_engine() -> CoreEngine {
        let archetypes = ArchetypeSet::from_json(crate::DEFAULT_ARCHETYPES).unwrap();
        let mut engine = engine_with(archetypes);
        engine.initialize().unwrap();
        engine
    }

    fn of_kind(engine: &CoreEngine, kind: &str) -> Vec<EntityId> {
        engine
            .factory()
            .entities()
            .filter(|e| e.kind() == Some(kind))
            .map(|e| e.id())
            .collect()
    }

    fn position(engine: &CoreEngine, id: EntityId) -> Vec2 {
        engine
            .factory()
            .get_object_with_id(id)
            .and_then(|e| e.get::<Transform>())
            .unwrap()
            .position
    }

    fn press(engine: &mut CoreEngine, code: KeyCode) {
        engine.broadcast_message(Message::Input(KeyEvent::pressed(code)));
    }

    #[test]
    fn test_scene_spawned_during_init() {
        let engine = demo_engine();
        assert_eq!(of_kind(&engine, "player").len(), 1);
        assert_eq!(of_kind(&engine, "asteroid").len(), 3);
        assert_eq!(of_kind(&engine, "projectile").len(), 1);
        assert_eq!(engine.factory().entity_count(), 5);
    }

    #[test]
    fn test_missing_archetype_fails_init() {
        let mut engine = engine_with(ArchetypeSet::default());
        let err = engine.initialize().unwrap_err();
        assert!(err.to_string().contains("Logic"));
    }

    #[test]
    fn test_arrow_keys_steer_player() {
        let mut engine = demo_engine();
        let player = of_kind(&engine, "player")[0];

        press(&mut engine, KeyCode::Right);
        engine.run_frame(0.5);
        assert_eq!(position(&engine, player), Vec2::new(3.0, -5.0));

        engine.broadcast_message(Message::Input(KeyEvent::released(KeyCode::Right)));
        engine.run_frame(0.5);
        assert_eq!(position(&engine, player), Vec2::new(3.0, -5.0));
    }

    #[test]
    fn test_space_fires_clone_of_prototype() {
        let mut engine = demo_engine();
        press(&mut engine, KeyCode::Space);

        let projectiles = of_kind(&engine, "projectile");
        assert_eq!(projectiles.len(), 2);
        let shot = engine
            .factory()
            .get_object_with_id(*projectiles.last().unwrap())
            .unwrap();
        assert!(shot.get::<Sprite>().unwrap().visible);
        assert_eq!(shot.get::<Body>().unwrap().velocity, Vec2::new(0.0, 12.0));
        assert_eq!(shot.get::<Transform>().unwrap().position, Vec2::new(0.0, -5.0));
    }

    #[test]
    fn test_projectile_expires() {
        let mut engine = demo_engine();
        let player = of_kind(&engine, "player")[0];
        engine
            .factory_mut()
            .get_object_with_id_mut(player)
            .and_then(|e| e.get_mut::<Transform>())
            .unwrap()
            .position = Vec2::new(3.0, -5.0);

        press(&mut engine, KeyCode::Space);
        for _ in 0..2 {
            engine.run_frame(0.5);
        }
        assert_eq!(of_kind(&engine, "projectile").len(), 2);
        engine.run_frame(0.5);
        assert_eq!(of_kind(&engine, "projectile").len(), 1);
    }

    #[test]
    fn test_two_hits_destroy_asteroid() {
        let mut engine = demo_engine();
        let target = of_kind(&engine, "asteroid")[1];

        press(&mut engine, KeyCode::Space);
        for _ in 0..12 {
            engine.run_frame(0.1);
        }
        let health = engine
            .factory()
            .get_object_with_id(target)
            .and_then(|e| e.get::<Health>())
            .unwrap();
        assert_eq!(health.current, 50.0);
        assert_eq!(of_kind(&engine, "projectile").len(), 1);

        press(&mut engine, KeyCode::Space);
        for _ in 0..12 {
            engine.run_frame(0.1);
        }
        assert!(engine.factory().get_object_with_id(target).is_none());
        assert_eq!(of_kind(&engine, "asteroid").len(), 2);
    }

    #[test]
    fn test_enter_restarts_scene() {
        let mut engine = demo_engine();
        let player = of_kind(&engine, "player")[0];
        press(&mut engine, KeyCode::Space);
        assert_eq!(engine.factory().entity_count(), 6);

        press(&mut engine, KeyCode::Enter);
        assert_eq!(engine.factory().entity_count(), 5);
        let respawned = of_kind(&engine, "player")[0];
        assert!(respawned > player);
    }

    #[test]
    fn test_escape_requests_exit() {
        let mut engine = demo_engine();
        press(&mut engine, KeyCode::Escape);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_heading_direction() {
        let mut heading = Heading::default();
        assert_eq!(heading.direction(), Vec2::ZERO);
        assert!(heading.set(KeyCode::Up, true));
        assert_eq!(heading.direction(), Vec2::Y);
        assert!(heading.set(KeyCode::Down, true));
        assert_eq!(heading.direction(), Vec2::ZERO);
        assert!(!heading.set(KeyCode::Space, true));
    }
}
