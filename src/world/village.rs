//! Farming-village preset map

use crate::core::error::Result;
use crate::core::types::LocationId;
use crate::world::graph::{World, WorldLimits};
use crate::world::location::LocationType;

/// Shape overrides applied after a location is added
struct Plan<'a> {
    name: &'a str,
    kind: LocationType,
    x: f32,
    y: f32,
    size: Option<(f32, f32)>,
    capacity: Option<usize>,
    description: &'a str,
}

impl<'a> Plan<'a> {
    fn new(name: &'a str, kind: LocationType, x: f32, y: f32) -> Self {
        Self {
            name,
            kind,
            x,
            y,
            size: None,
            capacity: None,
            description: "",
        }
    }

    fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Some((width, height));
        self
    }

    fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    fn describe(mut self, description: &'a str) -> Self {
        self.description = description;
        self
    }

    fn place(self, world: &mut World) -> Result<LocationId> {
        let id = world.add_location(self.name, self.kind, self.x, self.y)?;
        if let Some(location) = world.get_mut(id) {
            if let Some((width, height)) = self.size {
                location.width = width;
                location.height = height;
            }
            if let Some(capacity) = self.capacity {
                location.capacity = capacity;
            }
            location.description = self.description.to_string();
        }
        Ok(id)
    }
}

impl World {
    /// A 200×200 village: square, two fields with a barn, a store and three houses
    pub fn farming_village(limits: WorldLimits) -> Result<Self> {
        let mut world = World::new("Farming Village", 200.0, 200.0, limits);

        let square = Plan::new("Village Square", LocationType::VillageCenter, 100.0, 100.0)
            .size(30.0, 30.0)
            .capacity(50)
            .describe("The heart of the village where everyone gathers")
            .place(&mut world)?;

        let west = Plan::new("West Field", LocationType::Field, 50.0, 150.0)
            .size(20.0, 20.0)
            .describe("Tilled soil ready for planting")
            .place(&mut world)?;
        let east = Plan::new("East Field", LocationType::Field, 80.0, 150.0)
            .size(20.0, 20.0)
            .describe("Tilled soil ready for planting")
            .place(&mut world)?;
        let barn = Plan::new("Barn", LocationType::Workshop, 65.0, 170.0)
            .describe("Tools and feed are kept here")
            .place(&mut world)?;
        world.connect(west, barn, 15.0, "Path to barn")?;
        world.connect(east, barn, 15.0, "Path to barn")?;
        world.connect(west, square, 20.0, "Road to village")?;

        let store = Plan::new("General Store", LocationType::Shop, 150.0, 100.0)
            .size(15.0, 15.0)
            .describe("A general store selling goods and supplies")
            .place(&mut world)?;
        world.connect(store, square, 10.0, "Main street")?;

        for i in 0..3 {
            let name = format!("House {}", i + 1);
            let house = Plan::new(&name, LocationType::Home, 100.0 + i as f32 * 20.0, 50.0)
                .size(15.0, 15.0)
                .capacity(5)
                .describe("A cozy village home")
                .place(&mut world)?;
            world.connect(house, square, 15.0, "Village path")?;
        }

        tracing::info!(locations = world.len(), "built farming village");
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_village_layout() {
        let world = World::farming_village(WorldLimits::default()).unwrap();
        assert_eq!(world.name, "Farming Village");
        assert_eq!(world.len(), 8);

        let square = world.get_by_name("Village Square").unwrap();
        assert_eq!(square.capacity, 50);
        assert_eq!(square.connections.len(), 5);

        assert_eq!(world.locations_by_type(LocationType::Field).len(), 2);
        assert!(world.get_by_name("General Store").unwrap().can_shop);
        assert_eq!(world.get_by_name("House 2").unwrap().x, 120.0);
    }

    #[test]
    fn test_village_is_connected() {
        let world = World::farming_village(WorldLimits::default()).unwrap();
        let east = world.get_by_name("East Field").unwrap().id;
        let store = world.get_by_name("General Store").unwrap().id;

        let path = world.find_path(east, store);
        let names: Vec<_> = path
            .iter()
            .filter_map(|id| world.get(*id))
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["East Field", "Barn", "West Field", "Village Square", "General Store"]);
        assert_eq!(world.path_distance(&path), 60.0);
    }
}
