//! The entity factory: lifecycle authority for every entity.
//!
//! The factory allocates entity IDs, owns every live [`Entity`], builds
//! entities from templates through its component creator registry, and
//! destroys entities. Destruction is deferred: [`EntityFactory::destroy`]
//! only records the ID, and the entity is freed during the factory's next
//! [`EntityFactory::update`], so no system ever loses an entity halfway
//! through its own frame step.
//!
//! IDs start at 1 and are never reused. Pending deletions are stored as IDs
//! and re-checked against the live registry, so queuing the same entity twice,
//! or an entity that is already gone, is harmless.

use std::collections::{BTreeMap, BTreeSet};

use engine_component::{ComponentCreator, CreatorError, CreatorRegistry, Entity, EntityId};
use tracing::{debug, info, trace};

use crate::error::FactoryError;
use crate::message::Message;
use crate::snapshot::{ComponentSnapshot, EntitySnapshot};
use crate::template::{ArchetypeSet, EntityTemplate};

/// Owns entity identity, storage, construction and destruction.
#[derive(Debug, Default)]
pub struct EntityFactory {
    /// The last ID handed out. `0` means none yet.
    last_id: u64,
    /// Every live entity, keyed by ID.
    live: BTreeMap<EntityId, Entity>,
    /// Entities queued for removal at the next update.
    pending: BTreeSet<EntityId>,
    /// Component creators, registered by systems during init.
    creators: CreatorRegistry,
    /// Archetypes available to [`EntityFactory::create_from_archetype`].
    archetypes: BTreeMap<String, EntityTemplate>,
}

impl EntityFactory {
    /// The factory's system name.
    pub const NAME: &'static str = "EntityFactory";

    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once when the engine initialises its systems.
    pub fn init(&mut self) {
        info!(creators = self.creators.len(), "entity factory initialised");
    }

    // -- Creators --

    /// Binds a component creator to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CreatorError::DuplicateKey`] if `key` is already bound.
    pub fn add_component_creator(
        &mut self,
        key: impl Into<String>,
        creator: ComponentCreator,
    ) -> Result<(), CreatorError> {
        self.creators.add(key, creator)
    }

    /// The component creator registry.
    #[must_use]
    pub fn creators(&self) -> &CreatorRegistry {
        &self.creators
    }

    // -- Construction --

    /// Assigns the next ID to `entity` and takes ownership of it.
    ///
    /// The entity is not initialised; call [`EntityFactory::init_entity`] once
    /// its components are attached.
    pub fn store_entity(&mut self, mut entity: Entity) -> EntityId {
        self.last_id += 1;
        let id = EntityId::from_raw(self.last_id);
        entity.set_id(id);
        self.live.insert(id, entity);
        trace!(entity = %id, "stored entity");
        id
    }

    /// Registers a bare entity for the caller to populate.
    pub fn create_empty_entity(&mut self) -> EntityId {
        self.store_entity(Entity::new())
    }

    /// Runs [`Entity::init`] on a live entity. Returns `false` if `id` is not live.
    pub fn init_entity(&mut self, id: EntityId) -> bool {
        match self.live.get_mut(&id) {
            Some(entity) => {
                entity.init();
                true
            }
            None => false,
        }
    }

    /// Builds, registers and initialises an entity from a template.
    ///
    /// Every component is built before anything is registered, so a failed
    /// build leaves the factory untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`FactoryError`] if a component key has no creator, a field
    /// object cannot be read, or two keys build the same component kind.
    pub fn build_entity(&mut self, template: &EntityTemplate) -> Result<EntityId, FactoryError> {
        let mut entity = Entity::new();
        for (key, fields) in &template.components {
            let mut component = self
                .creators
                .create(key)
                .map_err(|source| FactoryError::Creator {
                    archetype: template.name.clone(),
                    source,
                })?;
            component
                .serialize(fields)
                .map_err(|source| FactoryError::Component {
                    archetype: template.name.clone(),
                    key: key.clone(),
                    source,
                })?;
            entity
                .add_component(component)
                .map_err(|source| FactoryError::Entity {
                    archetype: template.name.clone(),
                    source,
                })?;
        }

        let id = self.store_entity(entity);
        self.init_entity(id);
        debug!(entity = %id, archetype = %template.name, "built entity");
        Ok(id)
    }

    /// Makes the archetypes in `set` available by name, replacing any
    /// previously registered archetype of the same name.
    pub fn register_archetypes(&mut self, set: ArchetypeSet) {
        for template in set.archetypes {
            debug!(archetype = %template.name, "registered archetype");
            self.archetypes.insert(template.name.clone(), template);
        }
    }

    /// Returns a registered archetype.
    #[must_use]
    pub fn archetype(&self, name: &str) -> Option<&EntityTemplate> {
        self.archetypes.get(name)
    }

    /// Builds an entity from a registered archetype.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::UnknownArchetype`] if `name` is not registered,
    /// or any error from [`EntityFactory::build_entity`].
    pub fn create_from_archetype(&mut self, name: &str) -> Result<EntityId, FactoryError> {
        let template = self
            .archetypes
            .get(name)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownArchetype(name.to_string()))?;
        self.build_entity(&template)
    }

    /// Deep-copies a live entity under a fresh ID and initialises the copy.
    ///
    /// Returns `None` if `id` is not live.
    pub fn clone_entity(&mut self, id: EntityId) -> Option<EntityId> {
        let copy = self.live.get(&id)?.duplicate();
        let copy_id = self.store_entity(copy);
        self.init_entity(copy_id);
        debug!(source = %id, entity = %copy_id, "cloned entity");
        Some(copy_id)
    }

    // -- Destruction --

    /// Queues an entity for removal during the next [`EntityFactory::update`].
    pub fn destroy(&mut self, id: EntityId) {
        if self.pending.insert(id) {
            trace!(entity = %id, "queued entity for destruction");
        }
    }

    /// Frees every queued entity that is still live, then clears the queue.
    /// Returns the number of entities removed.
    pub fn update(&mut self, _dt: f32) -> usize {
        let mut removed = 0;
        for id in std::mem::take(&mut self.pending) {
            if self.live.remove(&id).is_some() {
                removed += 1;
                debug!(entity = %id, "destroyed entity");
            }
        }
        removed
    }

    /// Immediately destroys every live entity and drops any queued deletions.
    pub fn destroy_all_entities(&mut self) {
        let count = self.live.len();
        self.live.clear();
        self.pending.clear();
        info!(count, "destroyed all entities");
    }

    /// Reacts to lifecycle messages.
    pub fn handle_message(&mut self, message: &Message) {
        match message {
            Message::DestroyEntity(id) => self.destroy(*id),
            Message::DestroyAllEntities => self.destroy_all_entities(),
            _ => {}
        }
    }

    /// Frees every entity, creator and archetype.
    pub fn shutdown(&mut self) {
        self.destroy_all_entities();
        self.creators.clear();
        self.archetypes.clear();
        info!("entity factory shut down");
    }

    // -- Lookup --

    /// Returns the live entity with `id`.
    #[must_use]
    pub fn get_object_with_id(&self, id: EntityId) -> Option<&Entity> {
        self.live.get(&id)
    }

    /// Returns the live entity with `id`, mutably.
    pub fn get_object_with_id_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.live.get_mut(&id)
    }

    /// Every live entity, ascending by ID.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.live.values()
    }

    /// Every live entity, mutably, ascending by ID.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.live.values_mut()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.live.len()
    }

    /// Number of queued deletions.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if `id` is queued for deletion.
    #[must_use]
    pub fn is_pending(&self, id: EntityId) -> bool {
        self.pending.contains(&id)
    }

    /// The last ID handed out.
    #[must_use]
    pub fn last_id(&self) -> EntityId {
        EntityId::from_raw(self.last_id)
    }

    // -- Snapshots --

    /// Records a live entity's ID and component data.
    ///
    /// Returns `Ok(None)` if `id` is not live.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Snapshot`] if a component cannot be written out.
    pub fn snapshot(&self, id: EntityId) -> Result<Option<EntitySnapshot>, FactoryError> {
        let Some(entity) = self.live.get(&id) else {
            return Ok(None);
        };
        let components = entity
            .components()
            .map(|component| -> Result<ComponentSnapshot, FactoryError> {
                let fields = component
                    .to_value()
                    .map_err(|source| FactoryError::Snapshot { entity: id, source })?;
                Ok(ComponentSnapshot {
                    type_id: component.component_type_id(),
                    fields,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(EntitySnapshot { id, components }))
    }

    /// Rebuilds an entity from a snapshot under its recorded ID.
    ///
    /// Restoring revives the recorded ID, so handles held from before the
    /// entity was destroyed refer to it again. Destroy requests queued for the
    /// ID while it was dead are discarded. Later allocations continue above
    /// the restored ID.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::UnassignedId`] or [`FactoryError::IdInUse`] if
    /// the recorded ID cannot be used, [`FactoryError::NoCreatorForType`] if a
    /// component kind has no registered creator, [`FactoryError::Snapshot`]
    /// if field values cannot be read back, or [`FactoryError::Restore`] if the
    /// snapshot lists a component kind twice.
    pub fn restore(&mut self, snapshot: &EntitySnapshot) -> Result<EntityId, FactoryError> {
        let id = snapshot.id;
        if !id.is_valid() {
            return Err(FactoryError::UnassignedId);
        }
        if self.live.contains_key(&id) {
            return Err(FactoryError::IdInUse(id));
        }

        let mut entity = Entity::new();
        for recorded in &snapshot.components {
            let creator = self
                .creators
                .find_by_type(recorded.type_id)
                .ok_or(FactoryError::NoCreatorForType {
                    entity: id,
                    component: recorded.type_id,
                })?;
            let mut component = creator.create();
            component
                .serialize(&recorded.fields)
                .map_err(|source| FactoryError::Snapshot { entity: id, source })?;
            entity
                .add_component(component)
                .map_err(|source| FactoryError::Restore { entity: id, source })?;
        }

        entity.set_id(id);
        entity.init();
        // A destroy queued while the ID was dead must not reach the revived entity.
        if self.pending.remove(&id) {
            trace!(entity = %id, "dropped stale destroy request");
        }
        self.live.insert(id, entity);
        self.last_id = self.last_id.max(id.id());
        debug!(entity = %id, "restored entity");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use components::{Body, Health, Tag, Transform};
    use engine_component::{ComponentError, ComponentTypeId};
    use engine_math::Vec2;
    use serde_json::json;

    use super::*;

    fn factory() -> EntityFactory {
        let mut factory = EntityFactory::new();
        factory
            .add_component_creator("Transform", ComponentCreator::of::<Transform>())
            .unwrap();
        factory
            .add_component_creator("Body", ComponentCreator::of::<Body>())
            .unwrap();
        factory
            .add_component_creator("Health", ComponentCreator::of::<Health>())
            .unwrap();
        factory
            .add_component_creator("Tag", ComponentCreator::of::<Tag>())
            .unwrap();
        factory
    }

    fn ship() -> EntityTemplate {
        EntityTemplate::new("ship")
            .component("Tag", json!({ "name": "ship" }))
            .component("Transform", json!({ "position": [1.0, 2.0] }))
            .component("Health", json!({ "current": 30.0, "max": 50.0 }))
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut factory = EntityFactory::new();
        let a = factory.create_empty_entity();
        let b = factory.create_empty_entity();
        let c = factory.build_entity(&EntityTemplate::new("empty")).unwrap();
        assert_eq!(a, EntityId::from_raw(1));
        assert!(a < b && b < c);
        assert_eq!(factory.last_id(), c);
    }

    #[test]
    fn test_ids_are_not_reused_after_destruction() {
        let mut factory = EntityFactory::new();
        let a = factory.create_empty_entity();
        factory.destroy(a);
        factory.update(0.0);
        let b = factory.create_empty_entity();
        assert!(b > a);
    }

    #[test]
    fn test_programmatic_construction() {
        let mut factory = EntityFactory::new();
        let id = factory.create_empty_entity();
        {
            let entity = factory.get_object_with_id_mut(id).unwrap();
            entity.add(Tag::new("crate")).unwrap();
            entity.add(Transform::default()).unwrap();
        }
        assert!(factory.init_entity(id));

        let entity = factory.get_object_with_id(id).unwrap();
        assert_eq!(entity.id(), id);
        assert_eq!(entity.kind(), Some("crate"));
        assert!(entity.components().all(|c| c.owner() == id));
    }

    #[test]
    fn test_build_entity_from_template() {
        let mut factory = factory();
        let id = factory.build_entity(&ship()).unwrap();
        let entity = factory.get_object_with_id(id).unwrap();

        assert_eq!(
            entity.component_types(),
            vec![
                ComponentTypeId::Transform,
                ComponentTypeId::Health,
                ComponentTypeId::Tag
            ]
        );
        assert_eq!(entity.get::<Transform>().unwrap().position, Vec2::new(1.0, 2.0));
        assert_eq!(entity.get::<Health>().unwrap().current, 30.0);
        assert_eq!(entity.kind(), Some("ship"));
    }

    #[test]
    fn test_unknown_component_key_builds_nothing() {
        let mut factory = factory();
        let template = ship().component("Jetpack", json!({}));
        let err = factory.build_entity(&template).unwrap_err();
        assert!(matches!(
            err,
            FactoryError::Creator {
                source: CreatorError::UnknownKey(_),
                ..
            }
        ));
        assert_eq!(factory.entity_count(), 0);
        assert_eq!(factory.last_id(), EntityId::INVALID);
    }

    #[test]
    fn test_bad_field_values_are_rejected() {
        let mut factory = factory();
        let template = EntityTemplate::new("broken").component("Health", json!({ "max": "lots" }));
        assert!(matches!(
            factory.build_entity(&template),
            Err(FactoryError::Component { ref key, .. }) if key == "Health"
        ));
    }

    #[test]
    fn test_misspelled_field_names_are_rejected() {
        let mut factory = factory();
        let template = EntityTemplate::new("typo")
            .component("Health", json!({ "maxx": 5.0, "curent": 1.0 }));
        let err = factory.build_entity(&template).unwrap_err();
        assert!(matches!(
            err,
            FactoryError::Component {
                ref key,
                source: ComponentError::Read { .. },
                ..
            } if key == "Health"
        ));
        assert_eq!(factory.entity_count(), 0);
    }

    #[test]
    fn test_two_keys_for_one_kind_are_rejected() {
        let mut factory = factory();
        factory
            .add_component_creator("Hull", ComponentCreator::of::<Health>())
            .unwrap();
        let template = EntityTemplate::new("twice")
            .component("Health", json!({}))
            .component("Hull", json!({}));
        assert!(matches!(
            factory.build_entity(&template),
            Err(FactoryError::Entity { .. })
        ));
    }

    #[test]
    fn test_create_from_archetype() {
        let mut factory = factory();
        factory.register_archetypes(ArchetypeSet {
            archetypes: vec![ship()],
        });
        let id = factory.create_from_archetype("ship").unwrap();
        assert!(factory.get_object_with_id(id).is_some());
        assert!(matches!(
            factory.create_from_archetype("moon"),
            Err(FactoryError::UnknownArchetype(name)) if name == "moon"
        ));
    }

    #[test]
    fn test_destroy_is_deferred_until_update() {
        let mut factory = factory();
        let id = factory.build_entity(&ship()).unwrap();
        factory.destroy(id);
        assert!(factory.get_object_with_id(id).is_some());
        assert!(factory.is_pending(id));

        assert_eq!(factory.update(0.016), 1);
        assert!(factory.get_object_with_id(id).is_none());
        assert_eq!(factory.pending_count(), 0);
    }

    #[test]
    fn test_double_destroy_removes_once() {
        let mut factory = factory();
        let id = factory.build_entity(&ship()).unwrap();
        let other = factory.build_entity(&ship()).unwrap();
        factory.destroy(id);
        factory.destroy(id);
        assert_eq!(factory.pending_count(), 1);

        assert_eq!(factory.update(0.016), 1);
        assert_eq!(factory.entity_count(), 1);
        assert!(factory.get_object_with_id(other).is_some());

        // Destroying an entity that is already gone is a silent no-op.
        factory.destroy(id);
        assert_eq!(factory.update(0.016), 0);
    }

    #[test]
    fn test_destroy_unknown_id_is_noop() {
        let mut factory = EntityFactory::new();
        factory.destroy(EntityId::from_raw(404));
        assert_eq!(factory.update(0.016), 0);
        assert_eq!(factory.pending_count(), 0);
    }

    #[test]
    fn test_clone_entity_is_value_equal_and_independent() {
        let mut factory = factory();
        let id = factory.create_empty_entity();
        {
            let entity = factory.get_object_with_id_mut(id).unwrap();
            entity.add(Transform::from_position(Vec2::new(1.0, 0.0))).unwrap();
            entity
                .add(Body {
                    velocity: Vec2::new(0.0, 2.0),
                    ..Body::default()
                })
                .unwrap();
        }
        factory.init_entity(id);

        let copy = factory.clone_entity(id).unwrap();
        assert_ne!(copy, id);
        {
            let original = factory.get_object_with_id(id).unwrap();
            let cloned = factory.get_object_with_id(copy).unwrap();
            assert_eq!(original.component_types(), cloned.component_types());
            assert_eq!(original.get::<Transform>(), cloned.get::<Transform>());
            assert_eq!(original.get::<Body>(), cloned.get::<Body>());
            assert!(cloned.components().all(|c| c.owner() == copy));
        }

        factory
            .get_object_with_id_mut(copy)
            .unwrap()
            .get_mut::<Transform>()
            .unwrap()
            .position
            .x = 9.0;
        let original = factory.get_object_with_id(id).unwrap();
        assert_eq!(original.get::<Transform>().unwrap().position.x, 1.0);
    }

    #[test]
    fn test_clone_missing_entity() {
        let mut factory = EntityFactory::new();
        assert!(factory.clone_entity(EntityId::from_raw(5)).is_none());
    }

    #[test]
    fn test_destroy_all_entities() {
        let mut factory = factory();
        let ids: Vec<_> = (0..3).map(|_| factory.build_entity(&ship()).unwrap()).collect();
        factory.destroy(ids[0]);
        factory.destroy_all_entities();

        assert_eq!(factory.entity_count(), 0);
        assert_eq!(factory.pending_count(), 0);
        for id in ids {
            assert!(factory.get_object_with_id(id).is_none());
        }
    }

    #[test]
    fn test_lifecycle_messages() {
        let mut factory = factory();
        let a = factory.build_entity(&ship()).unwrap();
        let b = factory.build_entity(&ship()).unwrap();

        factory.handle_message(&Message::DestroyEntity(a));
        factory.handle_message(&Message::PlaySound("ignored".into()));
        factory.update(0.016);
        assert!(factory.get_object_with_id(a).is_none());
        assert!(factory.get_object_with_id(b).is_some());

        factory.handle_message(&Message::DestroyAllEntities);
        assert_eq!(factory.entity_count(), 0);
    }

    #[test]
    fn test_snapshot_restore_keeps_identity() {
        let mut source = factory();
        source.create_empty_entity();
        let id = source.build_entity(&ship()).unwrap();
        let snapshot = source.snapshot(id).unwrap().unwrap();
        let bytes = crate::snapshot::encode(&snapshot).unwrap();

        let mut target = factory();
        let restored = target
            .restore(&crate::snapshot::decode(&bytes).unwrap())
            .unwrap();
        assert_eq!(restored, id);

        let entity = target.get_object_with_id(id).unwrap();
        assert_eq!(entity.kind(), Some("ship"));
        assert_eq!(entity.get::<Health>().unwrap().current, 30.0);
        assert!(target.create_empty_entity() > id);
    }

    #[test]
    fn test_restore_onto_live_id_fails() {
        let mut factory = factory();
        let id = factory.build_entity(&ship()).unwrap();
        let snapshot = factory.snapshot(id).unwrap().unwrap();
        assert!(matches!(
            factory.restore(&snapshot),
            Err(FactoryError::IdInUse(live)) if live == id
        ));
    }

    #[test]
    fn test_restore_discards_stale_destroy_requests() {
        let mut factory = factory();
        let id = factory.build_entity(&ship()).unwrap();
        let snapshot = factory.snapshot(id).unwrap().unwrap();

        factory.destroy(id);
        factory.update(0.016);
        assert!(factory.get_object_with_id(id).is_none());

        // Destroying a dead ID is a no-op and must stay one after a restore.
        factory.destroy(id);
        assert_eq!(factory.restore(&snapshot).unwrap(), id);
        assert!(!factory.is_pending(id));
        assert_eq!(factory.update(0.016), 0);
        assert!(factory.get_object_with_id(id).is_some());
    }

    #[test]
    fn test_restore_rejects_repeated_component_kind() {
        let mut factory = factory();
        let id = factory.build_entity(&ship()).unwrap();
        let mut snapshot = factory.snapshot(id).unwrap().unwrap();
        factory.destroy(id);
        factory.update(0.016);

        let health = snapshot
            .components
            .iter()
            .find(|c| c.type_id == ComponentTypeId::Health)
            .cloned()
            .unwrap();
        snapshot.components.push(health);
        assert!(matches!(
            factory.restore(&snapshot),
            Err(FactoryError::Restore { entity, .. }) if entity == id
        ));
        assert!(factory.get_object_with_id(id).is_none());
    }

    #[test]
    fn test_snapshot_of_missing_entity() {
        let factory = EntityFactory::new();
        assert!(factory.snapshot(EntityId::from_raw(1)).unwrap().is_none());
    }

    #[test]
    fn test_shutdown_frees_creators() {
        let mut factory = factory();
        factory.build_entity(&ship()).unwrap();
        factory.shutdown();
        assert_eq!(factory.entity_count(), 0);
        assert!(factory.creators().is_empty());
    }
}
