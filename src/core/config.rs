//! Simulation configuration with documented limits
//!
//! Every hard cap the simulation relies on for predictability lives here.
//! Exceeding a cap is never fatal: the specific operation fails and the
//! turn carries on.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the simulation kernel
///
/// Loaded from TOML; any key left out falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === ENTITY REGISTRY ===
    /// Maximum number of live entities
    pub max_entities: usize,

    /// Maximum components attached to one entity
    ///
    /// There are only ten component kinds, so anything above ten is
    /// effectively unlimited.
    pub max_components_per_entity: usize,

    // === WORLD GRAPH ===
    /// Maximum number of locations in the world
    pub max_locations: usize,

    /// Maximum outgoing connections per location
    pub max_connections_per_location: usize,

    /// Hard ceiling on occupants of any location, regardless of its own capacity
    pub max_entities_per_location: usize,

    /// Longest route (in nodes) `find_path` will return
    ///
    /// Longer routes are reported as unreachable.
    pub max_path_length: usize,

    // === TURN ENGINE ===
    /// Actions recorded per turn; later actions in a full turn are dropped
    pub max_actions_per_turn: usize,

    /// Number of turns retained in the history ring
    pub max_turn_history: usize,

    // === CLOCK ===
    /// Days in each season
    ///
    /// Four seasons make a year, so the default gives a 112-day year.
    pub days_per_season: u32,

    // === ECONOMY ===
    /// Maximum number of shops the economy manager hosts
    pub max_shops: usize,

    /// Maximum item stacks held by one shop
    pub max_shop_stock: usize,

    /// Upper bound on slots for any economy inventory
    pub max_inventory_slots: usize,

    // === SOCIAL ===
    /// Maximum pair relationships tracked by the social manager
    pub max_relationships: usize,

    // === TRANSPARENCY ===
    /// Events retained in the event log ring
    pub max_event_log: usize,

    /// Most listeners the event bus accepts
    pub max_event_subscribers: usize,

    /// Decision records retained in the decision log ring
    pub max_decision_log: usize,

    // === WEATHER ===
    /// Roll a new weather condition every morning
    pub dynamic_weather: bool,

    /// Seed for the weather generator; equal seeds give equal forecasts
    pub weather_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Entity registry
            max_entities: 1000,
            max_components_per_entity: 16,

            // World graph
            max_locations: 100,
            max_connections_per_location: 10,
            max_entities_per_location: 50,
            max_path_length: 20,

            // Turn engine
            max_actions_per_turn: 100,
            max_turn_history: 1000,

            // Clock
            days_per_season: 28,

            // Economy
            max_shops: 20,
            max_shop_stock: 100,
            max_inventory_slots: 50,

            // Social
            max_relationships: 100,

            // Transparency
            max_event_log: 10_000,
            max_event_subscribers: 100,
            max_decision_log: 1000,

            // Weather
            dynamic_weather: true,
            weather_seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let caps = [
            ("max_entities", self.max_entities),
            ("max_components_per_entity", self.max_components_per_entity),
            ("max_locations", self.max_locations),
            ("max_connections_per_location", self.max_connections_per_location),
            ("max_entities_per_location", self.max_entities_per_location),
            ("max_path_length", self.max_path_length),
            ("max_actions_per_turn", self.max_actions_per_turn),
            ("max_turn_history", self.max_turn_history),
            ("max_shops", self.max_shops),
            ("max_shop_stock", self.max_shop_stock),
            ("max_inventory_slots", self.max_inventory_slots),
            ("max_relationships", self.max_relationships),
            ("max_event_log", self.max_event_log),
            ("max_event_subscribers", self.max_event_subscribers),
            ("max_decision_log", self.max_decision_log),
        ];
        if let Some((name, _)) = caps.iter().find(|(_, value)| *value == 0) {
            return Err(SimError::Config(format!("{} must be at least 1", name)));
        }

        if self.days_per_season == 0 {
            return Err(SimError::Config("days_per_season must be at least 1".into()));
        }

        Ok(())
    }
}
