//! Entity registry - owns every entity and its components
//!
//! Entities live in a `Vec` kept in insertion order (turns scan it in that
//! order) with a hash index for lookup by ID. IDs start at 1 and are never
//! reused within a run.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::EntityId;
use crate::ecs::component::{Component, ComponentData, ComponentKind, ComponentType};

/// An identity plus at most one component of each kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub entity_type: String,
    pub active: bool,
    pub(crate) components: Vec<Component>,
}

impl Entity {
    fn new(id: EntityId, name: String, entity_type: String) -> Self {
        Self {
            id,
            name,
            entity_type,
            active: true,
            components: Vec::new(),
        }
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    pub fn has_all(&self, kinds: &[ComponentKind]) -> bool {
        kinds.iter().all(|kind| self.has(*kind))
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub(crate) fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.kind() == kind)
    }

    /// Typed payload lookup, e.g. `entity.component::<Health>()`
    pub fn component<T: ComponentType>(&self) -> Option<&T> {
        self.get(T::KIND).and_then(|c| c.typed::<T>())
    }

    pub fn component_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.get_mut(T::KIND).and_then(|c| c.typed_mut::<T>())
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.iter().map(|c| c.kind())
    }
}

/// Owner of all entities
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    index: AHashMap<EntityId, usize>,
    next_id: u32,
    max_entities: usize,
    max_components: usize,
}

impl EntityRegistry {
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_limits(config.max_entities, config.max_components_per_entity)
    }

    pub fn with_limits(max_entities: usize, max_components: usize) -> Self {
        Self {
            entities: Vec::new(),
            index: AHashMap::new(),
            next_id: 1,
            max_entities,
            max_components,
        }
    }

    /// Insert a new entity and return its freshly assigned ID
    pub fn create_entity(
        &mut self,
        name: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Result<EntityId> {
        if self.entities.len() >= self.max_entities {
            tracing::warn!(max = self.max_entities, "entity registry full");
            return Err(SimError::RegistryFull(self.max_entities));
        }

        let Some(after) = self.next_id.checked_add(1) else {
            tracing::warn!(next_id = self.next_id, "entity ids exhausted");
            return Err(SimError::RegistryFull(self.max_entities));
        };
        let id = EntityId(self.next_id);
        self.next_id = after;

        let entity = Entity::new(id, name.into(), entity_type.into());
        tracing::debug!(entity = %id, name = %entity.name, kind = %entity.entity_type, "created entity");

        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        Ok(id)
    }

    /// Remove an entity together with all of its components
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<Entity> {
        let position = self.index.remove(&id).ok_or(SimError::EntityNotFound(id))?;
        let entity = self.entities.remove(position);
        for (offset, later) in self.entities[position..].iter().enumerate() {
            self.index.insert(later.id, position + offset);
        }
        tracing::debug!(entity = %id, "destroyed entity");
        Ok(entity)
    }

    /// Attach a component, stamping its back-reference with `id`
    pub fn attach(&mut self, id: EntityId, data: impl Into<ComponentData>) -> Result<()> {
        let max_components = self.max_components;
        let entity = self.entity_mut(id).ok_or(SimError::EntityNotFound(id))?;
        let data = data.into();
        let kind = data.kind();

        if entity.has(kind) {
            return Err(SimError::DuplicateComponent { entity: id, kind });
        }
        if entity.components.len() >= max_components {
            return Err(SimError::ComponentLimit {
                entity: id,
                max: max_components,
            });
        }

        entity.components.push(Component {
            entity_id: Some(id),
            data,
        });
        Ok(())
    }

    /// Whether `attach` would accept a component of `kind` on `id`
    pub fn can_attach(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.entity(id)
            .is_some_and(|e| !e.has(kind) && e.components.len() < self.max_components)
    }

    /// Remove the component of `kind`, returning it unowned
    pub fn detach(&mut self, id: EntityId, kind: ComponentKind) -> Result<Component> {
        let entity = self.entity_mut(id).ok_or(SimError::EntityNotFound(id))?;
        let position = entity
            .components
            .iter()
            .position(|c| c.kind() == kind)
            .ok_or(SimError::ComponentNotFound { entity: id, kind })?;
        let mut component = entity.components.remove(position);
        component.entity_id = None;
        Ok(component)
    }

    pub fn get(&self, id: EntityId, kind: ComponentKind) -> Option<&Component> {
        self.entity(id).and_then(|e| e.get(kind))
    }

    pub(crate) fn get_mut(&mut self, id: EntityId, kind: ComponentKind) -> Option<&mut Component> {
        self.entity_mut(id).and_then(|e| e.get_mut(kind))
    }

    pub fn component<T: ComponentType>(&self, id: EntityId) -> Option<&T> {
        self.entity(id).and_then(|e| e.component::<T>())
    }

    pub fn component_mut<T: ComponentType>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entity_mut(id).and_then(|e| e.component_mut::<T>())
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.entities[i]),
            None => None,
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|e| e.active)
    }

    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<()> {
        let entity = self.entity_mut(id).ok_or(SimError::EntityNotFound(id))?;
        entity.active = active;
        Ok(())
    }

    /// Active entities holding every kind in `required`, in insertion order
    pub fn query(&self, required: &[ComponentKind]) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.active && e.has_all(required))
            .collect()
    }

    pub fn query_ids(&self, required: &[ComponentKind]) -> Vec<EntityId> {
        self.query(required).into_iter().map(|e| e.id).collect()
    }

    pub fn get_by_type_tag(&self, tag: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.entity_type == tag).collect()
    }

    pub fn count_by_type_tag(&self, tag: &str) -> usize {
        self.entities.iter().filter(|e| e.entity_type == tag).count()
    }

    /// All IDs in insertion order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The ID the next `create_entity` call will assign
    pub fn next_id(&self) -> EntityId {
        EntityId(self.next_id)
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.index.clear();
        self.next_id = 1;
    }

    /// Insert an entity that already carries an ID (used when loading saves)
    ///
    /// Component back-references are re-stamped and the ID counter moves
    /// past the loaded ID.
    pub fn insert_loaded(&mut self, mut entity: Entity) -> Result<()> {
        if self.entities.len() >= self.max_entities {
            return Err(SimError::RegistryFull(self.max_entities));
        }
        if entity.components.len() > self.max_components {
            return Err(SimError::ComponentLimit {
                entity: entity.id,
                max: self.max_components,
            });
        }
        let mut seen = Vec::with_capacity(entity.components.len());
        for component in &mut entity.components {
            let kind = component.kind();
            if seen.contains(&kind) {
                return Err(SimError::DuplicateComponent {
                    entity: entity.id,
                    kind,
                });
            }
            seen.push(kind);
            component.entity_id = Some(entity.id);
        }
        if let Some(&existing) = self.index.get(&entity.id) {
            self.entities[existing] = entity;
            return Ok(());
        }

        self.next_id = self.next_id.max(entity.id.0.saturating_add(1));
        self.index.insert(entity.id, self.entities.len());
        self.entities.push(entity);
        Ok(())
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Currency, Health, Needs, Position};

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut registry = EntityRegistry::default();
        let a = registry.create_entity("Alice", "Villager").unwrap();
        let b = registry.create_entity("Bob", "Villager").unwrap();
        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));

        registry.destroy_entity(b).unwrap();
        let c = registry.create_entity("Cara", "Villager").unwrap();
        assert_eq!(c, EntityId(3), "IDs are never reused");
    }

    #[test]
    fn test_registry_full() {
        let mut registry = EntityRegistry::with_limits(2, 16);
        registry.create_entity("a", "Crop").unwrap();
        registry.create_entity("b", "Crop").unwrap();
        assert!(matches!(
            registry.create_entity("c", "Crop"),
            Err(SimError::RegistryFull(2))
        ));
    }

    #[test]
    fn test_attach_stamps_back_reference() {
        let mut registry = EntityRegistry::default();
        let id = registry.create_entity("Alice", "Villager").unwrap();
        registry.attach(id, Health::new(100)).unwrap();

        let component = registry.get(id, ComponentKind::Health).unwrap();
        assert_eq!(component.entity_id, Some(id));
    }

    #[test]
    fn test_attach_rejects_duplicate_kind() {
        let mut registry = EntityRegistry::default();
        let id = registry.create_entity("Alice", "Villager").unwrap();
        registry.attach(id, Currency::new(5)).unwrap();
        let result = registry.attach(id, Currency::new(10));
        assert!(matches!(result, Err(SimError::DuplicateComponent { .. })));
        assert_eq!(registry.component::<Currency>(id).unwrap().amount, 5);
    }

    #[test]
    fn test_attach_respects_component_cap() {
        let mut registry = EntityRegistry::with_limits(10, 2);
        let id = registry.create_entity("Alice", "Villager").unwrap();
        registry.attach(id, Health::default()).unwrap();
        registry.attach(id, Needs::default()).unwrap();
        assert!(matches!(
            registry.attach(id, Currency::new(1)),
            Err(SimError::ComponentLimit { max: 2, .. })
        ));
    }

    #[test]
    fn test_detach_returns_unowned_component() {
        let mut registry = EntityRegistry::default();
        let id = registry.create_entity("Alice", "Villager").unwrap();
        registry.attach(id, Health::default()).unwrap();

        let detached = registry.detach(id, ComponentKind::Health).unwrap();
        assert_eq!(detached.entity_id, None);
        assert!(registry.get(id, ComponentKind::Health).is_none());
        assert!(registry.detach(id, ComponentKind::Health).is_err());
    }

    #[test]
    fn test_query_keeps_insertion_order_and_skips_inactive() {
        let mut registry = EntityRegistry::default();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let id = registry.create_entity(name, "Villager").unwrap();
            registry.attach(id, Position::default()).unwrap();
            ids.push(id);
        }
        registry.attach(ids[1], Health::default()).unwrap();
        registry.attach(ids[3], Health::default()).unwrap();
        registry.attach(ids[2], Health::default()).unwrap();
        registry.set_active(ids[3], false).unwrap();

        let found = registry.query_ids(&[ComponentKind::Position, ComponentKind::Health]);
        assert_eq!(found, vec![ids[1], ids[2]]);
    }

    #[test]
    fn test_destroy_keeps_order_of_remaining() {
        let mut registry = EntityRegistry::default();
        let a = registry.create_entity("a", "Crop").unwrap();
        let b = registry.create_entity("b", "Crop").unwrap();
        let c = registry.create_entity("c", "Crop").unwrap();
        registry.destroy_entity(a).unwrap();

        assert_eq!(registry.entity_ids(), vec![b, c]);
        assert_eq!(registry.entity(c).unwrap().name, "c");
        assert!(registry.destroy_entity(a).is_err());
    }

    #[test]
    fn test_type_tag_lookup() {
        let mut registry = EntityRegistry::default();
        registry.create_entity("Alice", "Villager").unwrap();
        registry.create_entity("Wheat", "Crop").unwrap();
        registry.create_entity("Bob", "Villager").unwrap();

        let villagers: Vec<_> = registry
            .get_by_type_tag("Villager")
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(villagers, vec!["Alice", "Bob"]);
        assert_eq!(registry.count_by_type_tag("Crop"), 1);
    }

    #[test]
    fn test_insert_loaded_advances_next_id() {
        let mut registry = EntityRegistry::default();
        let mut entity = Entity::new(EntityId(41), "Old".into(), "Villager".into());
        entity.components.push(Component::new(Health::default()));
        registry.insert_loaded(entity).unwrap();

        assert_eq!(registry.next_id(), EntityId(42));
        assert_eq!(
            registry.get(EntityId(41), ComponentKind::Health).unwrap().entity_id,
            Some(EntityId(41))
        );
    }

    #[test]
    fn test_insert_loaded_at_id_ceiling() {
        let mut registry = EntityRegistry::default();
        let entity = Entity::new(EntityId(u32::MAX), "Last".into(), "Villager".into());
        registry.insert_loaded(entity).unwrap();
        assert_eq!(registry.next_id(), EntityId(u32::MAX));
        assert!(matches!(
            registry.create_entity("Overflow", "Villager"),
            Err(SimError::RegistryFull(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_can_attach_checks_kind_and_cap() {
        let mut registry = EntityRegistry::with_limits(4, 2);
        let id = registry.create_entity("Alice", "Villager").unwrap();
        assert!(registry.can_attach(id, ComponentKind::Health));
        registry.attach(id, Health::default()).unwrap();
        assert!(!registry.can_attach(id, ComponentKind::Health));
        registry.attach(id, Currency::new(5)).unwrap();
        assert!(!registry.can_attach(id, ComponentKind::Needs));
        assert!(!registry.can_attach(EntityId(99), ComponentKind::Needs));
    }
}
