//! Persistence - JSON save files for the world and full simulation snapshots
//!
//! Location occupancy is not part of the location shape, so snapshots carry
//! it separately as placements. ID counters are never stored; they are
//! recomputed from the highest loaded ID.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agriculture::AgricultureManager;
use crate::core::clock::GameClock;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{EntityId, LocationId};
use crate::economy::{EconomyManager, Inventory, ItemDefinition, Shop};
use crate::ecs::{Entity, EntityRegistry};
use crate::event::{EventSubtype, GameEvent};
use crate::simulation::Simulation;
use crate::social::{GiftPreferences, PairRelationship, Personality, SocialManager};
use crate::world::{Location, World, WorldLimits};

pub const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// WORLD FILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldFile {
    pub world_name: String,
    pub world_width: f32,
    pub world_height: f32,
    pub locations: Vec<Location>,
}

impl WorldFile {
    pub fn from_world(world: &World) -> Self {
        Self {
            world_name: world.name.clone(),
            world_width: world.width,
            world_height: world.height,
            locations: world.iter().cloned().collect(),
        }
    }

    pub fn into_world(self, limits: WorldLimits) -> Result<World> {
        let mut world = World::new(self.world_name, self.world_width, self.world_height, limits);
        for location in self.locations {
            world.insert_location(location)?;
        }
        Ok(world)
    }
}

pub fn save_world(world: &World, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&WorldFile::from_world(world))?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_world(path: &Path, limits: WorldLimits) -> Result<World> {
    let content = std::fs::read_to_string(path)?;
    let file: WorldFile = serde_json::from_str(&content)?;
    file.into_world(limits)
}

// ============================================================================
// REGISTRY FILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub entities: Vec<Entity>,
}

impl RegistryFile {
    pub fn from_registry(registry: &EntityRegistry) -> Self {
        Self {
            entities: registry.iter().cloned().collect(),
        }
    }

    pub fn into_registry(self, config: &SimulationConfig) -> Result<EntityRegistry> {
        let mut registry = EntityRegistry::new(config);
        for entity in self.entities {
            registry.insert_loaded(entity)?;
        }
        Ok(registry)
    }
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Which location holds an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub entity_id: EntityId,
    pub location_id: LocationId,
}

/// One entity's gift tastes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftProfile {
    pub entity_id: EntityId,
    pub preferences: GiftPreferences,
}

/// The whole simulation state in one JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub clock: GameClock,
    pub registry: RegistryFile,
    pub world: WorldFile,
    pub placements: Vec<Placement>,
    pub agriculture: AgricultureManager,
    pub items: Vec<ItemDefinition>,
    pub shops: Vec<Shop>,
    pub inventories: Vec<Inventory>,
    pub global_price_modifier: f32,
    pub relationships: Vec<PairRelationship>,
    #[serde(default)]
    pub personalities: Vec<Personality>,
    #[serde(default)]
    pub gift_preferences: Vec<GiftProfile>,
}

impl Snapshot {
    pub fn capture(sim: &Simulation) -> Self {
        let placements = sim
            .world
            .iter()
            .flat_map(|location| {
                location.occupants.iter().map(move |&entity_id| Placement {
                    entity_id,
                    location_id: location.id,
                })
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            clock: sim.clock.clone(),
            registry: RegistryFile::from_registry(&sim.registry),
            world: WorldFile::from_world(&sim.world),
            placements,
            agriculture: sim.agriculture.clone(),
            items: sim.economy.catalog().iter().cloned().collect(),
            shops: sim.economy.shops().to_vec(),
            inventories: sim.economy.inventories().into_iter().cloned().collect(),
            global_price_modifier: sim.economy.global_price_modifier,
            relationships: sim.social.relationships().to_vec(),
            personalities: sim.social.personalities().into_iter().cloned().collect(),
            gift_preferences: sim
                .social
                .gift_preference_table()
                .into_iter()
                .map(|(entity_id, preferences)| GiftProfile {
                    entity_id,
                    preferences: preferences.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild the simulation, enforcing the caps in `config`
    pub fn restore(self, config: &SimulationConfig) -> Result<Simulation> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SimError::InvalidSnapshot(format!(
                "version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }

        let world = self.world.into_world(WorldLimits::from_config(config))?;
        let mut sim = Simulation::with_world(config, world);
        sim.clock = self.clock;
        sim.registry = self.registry.into_registry(config)?;
        sim.agriculture = self.agriculture;

        for placement in self.placements {
            if !sim.registry.contains(placement.entity_id) {
                return Err(SimError::EntityNotFound(placement.entity_id));
            }
            sim.world
                .move_entity(placement.entity_id, None, placement.location_id)?;
        }

        let mut economy = EconomyManager::new(config);
        for definition in self.items {
            economy.register_item(definition);
        }
        for shop in self.shops {
            economy.insert_shop(shop)?;
        }
        for inventory in self.inventories {
            if inventory.entity_id.is_none() {
                return Err(SimError::InvalidSnapshot("inventory without an owner".to_string()));
            }
            economy.insert_inventory(inventory);
        }
        economy.global_price_modifier = self.global_price_modifier;
        sim.economy = economy;

        let mut social = SocialManager::new(config);
        for relationship in self.relationships {
            if !social.insert_relationship(relationship) {
                return Err(SimError::InvalidSnapshot(format!(
                    "more than {} relationships",
                    config.max_relationships
                )));
            }
        }
        for personality in self.personalities {
            social.set_personality(personality);
        }
        for profile in self.gift_preferences {
            social.set_gift_preferences(profile.entity_id, profile.preferences);
        }
        sim.social = social;
        sim.emit(GameEvent::new(
            EventSubtype::GameLoaded,
            None,
            format!("Loaded day {} of {}", sim.clock.day, sim.clock.season),
        ));

        tracing::info!(
            entities = sim.registry.len(),
            locations = sim.world.len(),
            day = sim.clock.day,
            "snapshot restored"
        );
        Ok(sim)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_file_shape() {
        let world = World::farming_village(WorldLimits::default()).unwrap();
        let value = serde_json::to_value(WorldFile::from_world(&world)).unwrap();
        assert_eq!(value["world_name"], "Farming Village");
        let square = &value["locations"][0];
        assert_eq!(square["type"], "village_center");
        assert!(square["connections"][0]["location_id"].is_u64());
        assert!(square.get("occupants").is_none());
    }

    #[test]
    fn test_world_file_round_trip() {
        let world = World::farming_village(WorldLimits::default()).unwrap();
        let file = WorldFile::from_world(&world);
        let json = serde_json::to_string(&file).unwrap();
        let back: WorldFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, file);

        let mut rebuilt = back.into_world(WorldLimits::default()).unwrap();
        let id = rebuilt
            .add_location("Pond", crate::world::LocationType::Water, 0.0, 0.0)
            .unwrap();
        assert_eq!(id, LocationId(world.len() as u32 + 1));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let config = SimulationConfig::default();
        let mut snapshot = Snapshot::capture(&Simulation::new(&config));
        snapshot.version = 99;
        assert!(matches!(
            snapshot.restore(&config),
            Err(SimError::InvalidSnapshot(_))
        ));
    }
}
