//! Ready-made entity templates

use crate::core::clock::TimeOfDay;
use crate::core::error::Result;
use crate::core::types::EntityId;
use crate::ecs::component::{
    ComponentData, Currency, Goal, Health, Inventory, Memory, Needs, Occupation, Position,
    Relationship, Schedule,
};
use crate::ecs::registry::EntityRegistry;

impl EntityRegistry {
    /// Create an entity with a full component set, or nothing at all
    fn spawn_with(
        &mut self,
        name: &str,
        entity_type: &str,
        components: Vec<ComponentData>,
    ) -> Result<EntityId> {
        let id = self.create_entity(name, entity_type)?;
        for data in components {
            if let Err(err) = self.attach(id, data) {
                self.destroy_entity(id)?;
                return Err(err);
            }
        }
        Ok(id)
    }

    pub fn spawn_player(&mut self, name: &str) -> Result<EntityId> {
        self.spawn_with(
            name,
            "Player",
            vec![
                Position::new("Your Farm", 0.0, 0.0).into(),
                Health::new(100).into(),
                Inventory::new(20).into(),
                Currency::new(100).into(),
                Relationship::new().into(),
            ],
        )
    }

    /// A villager with every component kind and a simple day plan
    pub fn spawn_villager(&mut self, name: &str, occupation: &str) -> Result<EntityId> {
        let mut schedule = Schedule::new();
        schedule.set(TimeOfDay::Morning, "Work");
        schedule.set(TimeOfDay::Afternoon, "Work");
        schedule.set(TimeOfDay::Evening, "Socialize");
        schedule.set(TimeOfDay::Night, "Rest");

        self.spawn_with(
            name,
            "Villager",
            vec![
                Position::new("Village Square", 0.0, 0.0).into(),
                Health::new(100).into(),
                Inventory::new(15).into(),
                Currency::new(50).into(),
                Relationship::new().into(),
                Needs::default().into(),
                schedule.into(),
                Occupation::new(occupation, "Work Place", 1).into(),
                Memory::new(50).into(),
                Goal::new().into(),
            ],
        )
    }

    pub fn spawn_crop(&mut self, name: &str, location: &str) -> Result<EntityId> {
        self.spawn_with(name, "Crop", vec![Position::new(location, 0.0, 0.0).into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::ComponentKind;

    #[test]
    fn test_villager_has_every_kind() {
        let mut registry = EntityRegistry::default();
        let id = registry.spawn_villager("Mira", "Farmer").unwrap();
        let entity = registry.entity(id).unwrap();
        assert!(entity.has_all(&ComponentKind::ALL));
        assert_eq!(entity.component::<Currency>().unwrap().amount, 50);
        assert_eq!(entity.component::<Occupation>().unwrap().occupation, "Farmer");
    }

    #[test]
    fn test_player_template() {
        let mut registry = EntityRegistry::default();
        let id = registry.spawn_player("You").unwrap();
        let entity = registry.entity(id).unwrap();
        assert_eq!(entity.entity_type, "Player");
        assert_eq!(entity.components.len(), 5);
        assert_eq!(entity.component::<Inventory>().unwrap().capacity, 20);
        assert!(!entity.has(ComponentKind::Needs));
    }

    #[test]
    fn test_failed_spawn_leaves_no_entity() {
        let mut registry = EntityRegistry::with_limits(10, 3);
        assert!(registry.spawn_villager("Mira", "Farmer").is_err());
        assert!(registry.is_empty());
    }
}
