//! Location - a named node in the world graph
//!
//! Locations carry a rectangle on the map, capability flags derived from
//! their type, a capacity, outgoing connections and the IDs of entities
//! currently there.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, LocationId, Vec2};

/// Kind of place; drives the default capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Outdoor,
    Indoor,
    Field,
    Shop,
    Home,
    Workshop,
    Road,
    Water,
    Forest,
    VillageCenter,
}

impl LocationType {
    /// Indoor places are also sheltered from weather
    pub fn is_indoor(&self) -> bool {
        matches!(self, Self::Indoor | Self::Shop | Self::Home | Self::Workshop)
    }

    pub fn can_rest(&self) -> bool {
        matches!(self, Self::Home | Self::Indoor)
    }

    pub fn can_work(&self) -> bool {
        matches!(self, Self::Workshop | Self::Shop)
    }

    pub fn can_shop(&self) -> bool {
        *self == Self::Shop
    }

    pub fn can_farm(&self) -> bool {
        *self == Self::Field
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Outdoor => "outdoor",
            Self::Indoor => "indoor",
            Self::Field => "field",
            Self::Shop => "shop",
            Self::Home => "home",
            Self::Workshop => "workshop",
            Self::Road => "road",
            Self::Water => "water",
            Self::Forest => "forest",
            Self::VillageCenter => "village_center",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Directed edge to another location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub location_id: LocationId,
    pub distance: f32,
    pub blocked: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub indoor: bool,
    pub protected_from_weather: bool,
    pub can_rest: bool,
    pub can_work: bool,
    pub can_shop: bool,
    pub can_farm: bool,
    pub capacity: usize,
    pub connections: Vec<Connection>,
    /// Not persisted; rebuilt as entities move
    #[serde(skip)]
    pub occupants: Vec<EntityId>,
}

impl Location {
    /// A 10×10 location with capacity 10 and type-derived flags
    pub fn new(id: LocationId, name: impl Into<String>, kind: LocationType, x: f32, y: f32) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            kind,
            x,
            y,
            width: 10.0,
            height: 10.0,
            indoor: kind.is_indoor(),
            protected_from_weather: kind.is_indoor(),
            can_rest: kind.can_rest(),
            can_work: kind.can_work(),
            can_shop: kind.can_shop(),
            can_farm: kind.can_farm(),
            capacity: 10,
            connections: Vec::new(),
            occupants: Vec::new(),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the right and bottom edges belong to neighbours
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn connection_to(&self, target: LocationId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.location_id == target)
    }

    pub fn connection_to_mut(&mut self, target: LocationId) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.location_id == target)
    }

    /// An unblocked edge leads from here to `target`
    pub fn is_connected_to(&self, target: LocationId) -> bool {
        self.connection_to(target).is_some_and(|c| !c.blocked)
    }

    pub fn has_occupant(&self, entity: EntityId) -> bool {
        self.occupants.contains(&entity)
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }
}
