//! World graph - locations, connections and occupancy
//!
//! `connect` always creates edges in pairs, but each direction keeps its own
//! blocked flag. Pathfinding is an unweighted BFS that ignores blocked edges.

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{EntityId, LocationId, Vec2};
use crate::world::location::{Connection, Location, LocationType};

/// Hard caps for a world graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldLimits {
    pub max_locations: usize,
    pub max_connections: usize,
    pub max_occupants: usize,
    pub max_path_length: usize,
}

impl WorldLimits {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            max_locations: config.max_locations,
            max_connections: config.max_connections_per_location,
            max_occupants: config.max_entities_per_location,
            max_path_length: config.max_path_length,
        }
    }
}

impl Default for WorldLimits {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

/// Named container owning every location
#[derive(Debug, Clone)]
pub struct World {
    pub name: String,
    pub width: f32,
    pub height: f32,
    locations: Vec<Location>,
    index: AHashMap<LocationId, usize>,
    next_location_id: u32,
    limits: WorldLimits,
}

impl World {
    pub fn new(name: impl Into<String>, width: f32, height: f32, limits: WorldLimits) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            locations: Vec::new(),
            index: AHashMap::new(),
            next_location_id: 1,
            limits,
        }
    }

    pub fn limits(&self) -> WorldLimits {
        self.limits
    }

    /// Add a location with default size, capacity and type-derived flags
    pub fn add_location(
        &mut self,
        name: impl Into<String>,
        kind: LocationType,
        x: f32,
        y: f32,
    ) -> Result<LocationId> {
        if self.locations.len() >= self.limits.max_locations {
            tracing::warn!(max = self.limits.max_locations, "world full");
            return Err(SimError::WorldFull(self.limits.max_locations));
        }
        let id = LocationId(self.next_location_id);
        self.next_location_id += 1;

        let location = Location::new(id, name, kind, x, y);
        tracing::debug!(location = %id, name = %location.name, kind = %kind, "added location");
        self.index.insert(id, self.locations.len());
        self.locations.push(location);
        Ok(id)
    }

    /// Insert a location that already has an ID (used when loading)
    pub fn insert_location(&mut self, mut location: Location) -> Result<()> {
        if self.locations.len() >= self.limits.max_locations {
            return Err(SimError::WorldFull(self.limits.max_locations));
        }
        if location.connections.len() > self.limits.max_connections {
            return Err(SimError::ConnectionLimit {
                location: location.id,
                max: self.limits.max_connections,
            });
        }
        location.occupants.clear();
        self.next_location_id = self.next_location_id.max(location.id.0 + 1);
        match self.index.get(&location.id) {
            Some(&i) => self.locations[i] = location,
            None => {
                self.index.insert(location.id, self.locations.len());
                self.locations.push(location);
            }
        }
        Ok(())
    }

    /// Remove a location together with every connection leading into it
    pub fn remove_location(&mut self, id: LocationId) -> Result<Location> {
        let position = self.index.remove(&id).ok_or(SimError::LocationNotFound(id))?;
        let removed = self.locations.remove(position);
        for (offset, later) in self.locations[position..].iter().enumerate() {
            self.index.insert(later.id, position + offset);
        }
        for location in &mut self.locations {
            location.connections.retain(|c| c.location_id != id);
        }
        Ok(removed)
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.index.get(&id).map(|&i| &self.locations[i])
    }

    pub fn get_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.locations[i]),
            None => None,
        }
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn locations_by_type(&self, kind: LocationType) -> Vec<LocationId> {
        self.locations
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    // ========================================================================
    // CONNECTIONS
    // ========================================================================

    /// Add a single directed edge
    pub fn add_connection(
        &mut self,
        from: LocationId,
        to: LocationId,
        distance: f32,
        description: &str,
    ) -> Result<()> {
        let max = self.limits.max_connections;
        let location = self.get_mut(from).ok_or(SimError::LocationNotFound(from))?;
        if location.connection_to(to).is_some() {
            return Err(SimError::DuplicateConnection { from, to });
        }
        if location.connections.len() >= max {
            return Err(SimError::ConnectionLimit { location: from, max });
        }
        location.connections.push(Connection {
            location_id: to,
            distance: distance.max(0.0),
            blocked: false,
            description: description.to_string(),
        });
        Ok(())
    }

    /// Connect two locations in both directions
    ///
    /// Each side is attempted independently; a rejected side does not roll
    /// back the other. The first error encountered is returned.
    pub fn connect(
        &mut self,
        a: LocationId,
        b: LocationId,
        distance: f32,
        description: &str,
    ) -> Result<()> {
        if self.get(a).is_none() {
            return Err(SimError::LocationNotFound(a));
        }
        if self.get(b).is_none() {
            return Err(SimError::LocationNotFound(b));
        }
        let forward = self.add_connection(a, b, distance, description);
        let backward = self.add_connection(b, a, distance, description);
        if let Err(err) = &forward {
            tracing::debug!(from = %a, to = %b, error = %err, "connection side rejected");
        }
        if let Err(err) = &backward {
            tracing::debug!(from = %b, to = %a, error = %err, "connection side rejected");
        }
        forward.and(backward)
    }

    /// Block or unblock travel from `from` to `to` only
    pub fn set_blocked(&mut self, from: LocationId, to: LocationId, blocked: bool) -> Result<()> {
        let location = self.get_mut(from).ok_or(SimError::LocationNotFound(from))?;
        let connection = location
            .connection_to_mut(to)
            .ok_or(SimError::NoConnection { from, to })?;
        connection.blocked = blocked;
        Ok(())
    }

    /// An unblocked edge leads from `from` to `to`
    pub fn is_connected(&self, from: LocationId, to: LocationId) -> bool {
        self.get(from).is_some_and(|l| l.is_connected_to(to))
    }

    pub fn connection_distance(&self, from: LocationId, to: LocationId) -> Option<f32> {
        self.get(from)
            .and_then(|l| l.connection_to(to))
            .map(|c| c.distance)
    }

    // ========================================================================
    // OCCUPANCY
    // ========================================================================

    /// Whether `location` can take one more occupant
    pub fn has_room(&self, location: LocationId) -> bool {
        self.get(location).is_some_and(|l| {
            l.occupants.len() < l.capacity && l.occupants.len() < self.limits.max_occupants
        })
    }

    /// Move an entity into `to`, leaving wherever it was
    ///
    /// Either the whole move happens or nothing changes. `from` is the
    /// caller's belief about the current location; the entity is removed
    /// from its actual location in any case so it never occupies two.
    pub fn move_entity(
        &mut self,
        entity: EntityId,
        from: Option<LocationId>,
        to: LocationId,
    ) -> Result<()> {
        let target = self.get(to).ok_or(SimError::LocationNotFound(to))?;
        if target.has_occupant(entity) {
            return Err(SimError::AlreadyPresent {
                entity,
                location: to,
            });
        }
        if !self.has_room(to) {
            return Err(SimError::LocationFull(to));
        }

        let current = from
            .filter(|id| self.get(*id).is_some_and(|l| l.has_occupant(entity)))
            .or_else(|| self.entity_location(entity));
        if let Some(current) = current {
            if let Some(location) = self.get_mut(current) {
                location.occupants.retain(|e| *e != entity);
            }
        }
        if let Some(location) = self.get_mut(to) {
            location.occupants.push(entity);
        }
        tracing::debug!(entity = %entity, to = %to, "entity moved");
        Ok(())
    }

    /// Take an entity out of whatever location holds it
    pub fn remove_entity(&mut self, entity: EntityId) -> Option<LocationId> {
        let current = self.entity_location(entity)?;
        if let Some(location) = self.get_mut(current) {
            location.occupants.retain(|e| *e != entity);
        }
        Some(current)
    }

    pub fn entity_location(&self, entity: EntityId) -> Option<LocationId> {
        self.locations
            .iter()
            .find(|l| l.has_occupant(entity))
            .map(|l| l.id)
    }

    pub fn occupants(&self, location: LocationId) -> &[EntityId] {
        self.get(location).map_or(&[], |l| l.occupants.as_slice())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Shortest route by hop count over unblocked edges, including both ends
    ///
    /// Ties go to whichever connection was added first. Unreachable goals,
    /// unknown endpoints and routes longer than the path cap give an empty
    /// vector.
    pub fn find_path(&self, start: LocationId, goal: LocationId) -> Vec<LocationId> {
        if self.get(start).is_none() || self.get(goal).is_none() {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let mut came_from: AHashMap<LocationId, LocationId> = AHashMap::new();
        let mut visited: AHashSet<LocationId> = AHashSet::new();
        let mut frontier = VecDeque::new();
        visited.insert(start);
        frontier.push_back(start);

        while let Some(current) = frontier.pop_front() {
            if current == goal {
                break;
            }
            let Some(location) = self.get(current) else {
                continue;
            };
            for connection in location.connections.iter().filter(|c| !c.blocked) {
                let next = connection.location_id;
                if self.get(next).is_some() && visited.insert(next) {
                    came_from.insert(next, current);
                    frontier.push_back(next);
                }
            }
        }

        if !came_from.contains_key(&goal) {
            return Vec::new();
        }

        let mut path = vec![goal];
        let mut current = goal;
        while let Some(&previous) = came_from.get(&current) {
            path.push(previous);
            current = previous;
        }
        path.reverse();

        if path.len() > self.limits.max_path_length {
            tracing::debug!(len = path.len(), max = self.limits.max_path_length, "path too long");
            return Vec::new();
        }
        path
    }

    /// Sum of edge distances along `path`; unknown edges count as zero
    pub fn path_distance(&self, path: &[LocationId]) -> f32 {
        path.windows(2)
            .filter_map(|pair| self.connection_distance(pair[0], pair[1]))
            .sum()
    }

    /// Location of `kind` whose centre is closest to (x, y)
    pub fn nearest_of_type(&self, x: f32, y: f32, kind: LocationType) -> Option<LocationId> {
        let point = Vec2::new(x, y);
        let mut best: Option<(LocationId, f32)> = None;
        for location in self.locations.iter().filter(|l| l.kind == kind) {
            let distance = location.center().distance(&point);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((location.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Every location whose rectangle contains (x, y)
    pub fn locations_at(&self, x: f32, y: f32) -> Vec<LocationId> {
        self.locations
            .iter()
            .filter(|l| l.contains_point(x, y))
            .map(|l| l.id)
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new("World", 100.0, 100.0, WorldLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_world() -> (World, LocationId, LocationId, LocationId) {
        let mut world = World::default();
        let a = world.add_location("A", LocationType::Outdoor, 0.0, 0.0).unwrap();
        let b = world.add_location("B", LocationType::Outdoor, 20.0, 0.0).unwrap();
        let c = world.add_location("C", LocationType::Outdoor, 40.0, 0.0).unwrap();
        world.connect(a, b, 10.0, "").unwrap();
        world.connect(b, c, 10.0, "").unwrap();
        (world, a, b, c)
    }

    #[test]
    fn test_location_ids_are_monotone() {
        let mut world = World::default();
        let a = world.add_location("A", LocationType::Home, 0.0, 0.0).unwrap();
        let b = world.add_location("B", LocationType::Home, 0.0, 0.0).unwrap();
        assert_eq!(a, LocationId(1));
        assert_eq!(b, LocationId(2));
        world.remove_location(b).unwrap();
        let c = world.add_location("C", LocationType::Home, 0.0, 0.0).unwrap();
        assert_eq!(c, LocationId(3));
    }

    #[test]
    fn test_world_full() {
        let limits = WorldLimits {
            max_locations: 1,
            ..WorldLimits::default()
        };
        let mut world = World::new("Tiny", 10.0, 10.0, limits);
        world.add_location("A", LocationType::Home, 0.0, 0.0).unwrap();
        assert!(matches!(
            world.add_location("B", LocationType::Home, 0.0, 0.0),
            Err(SimError::WorldFull(1))
        ));
    }

    #[test]
    fn test_connect_is_bidirectional() {
        let (world, a, b, _) = line_world();
        assert!(world.is_connected(a, b));
        assert!(world.is_connected(b, a));
        assert_eq!(world.connection_distance(a, b), Some(10.0));
        assert_eq!(world.connection_distance(a, LocationId(99)), None);
    }

    #[test]
    fn test_connect_missing_endpoint() {
        let (mut world, a, _, _) = line_world();
        assert!(matches!(
            world.connect(a, LocationId(99), 1.0, ""),
            Err(SimError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_side_does_not_roll_back_other() {
        let mut world = World::default();
        let a = world.add_location("A", LocationType::Outdoor, 0.0, 0.0).unwrap();
        let b = world.add_location("B", LocationType::Outdoor, 0.0, 0.0).unwrap();
        world.add_connection(a, b, 5.0, "").unwrap();

        let result = world.connect(a, b, 5.0, "");
        assert!(matches!(result, Err(SimError::DuplicateConnection { .. })));
        assert!(world.is_connected(b, a), "reverse side still created");
        assert_eq!(world.get(a).unwrap().connections.len(), 1);
    }

    #[test]
    fn test_connection_limit() {
        let limits = WorldLimits {
            max_connections: 1,
            ..WorldLimits::default()
        };
        let mut world = World::new("Small", 10.0, 10.0, limits);
        let hub = world.add_location("Hub", LocationType::Road, 0.0, 0.0).unwrap();
        let a = world.add_location("A", LocationType::Road, 0.0, 0.0).unwrap();
        let b = world.add_location("B", LocationType::Road, 0.0, 0.0).unwrap();
        world.connect(hub, a, 1.0, "").unwrap();
        assert!(matches!(
            world.connect(hub, b, 1.0, ""),
            Err(SimError::ConnectionLimit { .. })
        ));
        assert!(world.is_connected(b, hub));
        assert!(!world.is_connected(hub, b));
    }

    #[test]
    fn test_blocked_is_one_directional() {
        let (mut world, a, b, _) = line_world();
        world.set_blocked(a, b, true).unwrap();
        assert!(!world.is_connected(a, b));
        assert!(world.is_connected(b, a));
        assert!(world.set_blocked(a, LocationId(77), true).is_err());
    }

    #[test]
    fn test_find_path_and_distance() {
        let (mut world, a, b, c) = line_world();
        assert_eq!(world.find_path(a, c), vec![a, b, c]);
        assert_eq!(world.path_distance(&[a, b, c]), 20.0);

        world.set_blocked(b, c, true).unwrap();
        assert!(world.find_path(a, c).is_empty());
        assert_eq!(world.find_path(c, a), vec![c, b, a]);
    }

    #[test]
    fn test_find_path_prefers_first_added_on_ties() {
        let mut world = World::default();
        let s = world.add_location("S", LocationType::Road, 0.0, 0.0).unwrap();
        let left = world.add_location("L", LocationType::Road, 0.0, 0.0).unwrap();
        let right = world.add_location("R", LocationType::Road, 0.0, 0.0).unwrap();
        let g = world.add_location("G", LocationType::Road, 0.0, 0.0).unwrap();
        world.connect(s, right, 1.0, "").unwrap();
        world.connect(s, left, 1.0, "").unwrap();
        world.connect(left, g, 1.0, "").unwrap();
        world.connect(right, g, 1.0, "").unwrap();
        assert_eq!(world.find_path(s, g), vec![s, right, g]);
    }

    #[test]
    fn test_find_path_respects_length_cap() {
        let limits = WorldLimits {
            max_path_length: 2,
            ..WorldLimits::default()
        };
        let mut world = World::new("Long", 10.0, 10.0, limits);
        let a = world.add_location("A", LocationType::Road, 0.0, 0.0).unwrap();
        let b = world.add_location("B", LocationType::Road, 0.0, 0.0).unwrap();
        let c = world.add_location("C", LocationType::Road, 0.0, 0.0).unwrap();
        world.connect(a, b, 1.0, "").unwrap();
        world.connect(b, c, 1.0, "").unwrap();
        assert_eq!(world.find_path(a, b), vec![a, b]);
        assert!(world.find_path(a, c).is_empty());
    }

    #[test]
    fn test_path_distance_skips_unknown_edges() {
        let (world, a, _, c) = line_world();
        assert_eq!(world.path_distance(&[a, c]), 0.0);
        assert_eq!(world.path_distance(&[a]), 0.0);
    }

    #[test]
    fn test_move_entity_respects_capacity() {
        let (mut world, a, b, _) = line_world();
        world.get_mut(b).unwrap().capacity = 1;
        world.move_entity(EntityId(1), None, a).unwrap();
        world.move_entity(EntityId(1), Some(a), b).unwrap();
        assert_eq!(world.entity_location(EntityId(1)), Some(b));
        assert!(world.occupants(a).is_empty());

        world.move_entity(EntityId(2), None, a).unwrap();
        assert!(matches!(
            world.move_entity(EntityId(2), Some(a), b),
            Err(SimError::LocationFull(_))
        ));
        assert_eq!(world.entity_location(EntityId(2)), Some(a), "failed move changes nothing");
    }

    #[test]
    fn test_move_entity_never_duplicates_occupancy() {
        let (mut world, a, b, _) = line_world();
        world.move_entity(EntityId(5), None, a).unwrap();
        world.move_entity(EntityId(5), None, b).unwrap();
        assert!(!world.get(a).unwrap().has_occupant(EntityId(5)));
        assert!(matches!(
            world.move_entity(EntityId(5), None, b),
            Err(SimError::AlreadyPresent { .. })
        ));
    }

    #[test]
    fn test_nearest_of_type_uses_centres() {
        let mut world = World::default();
        let near = world.add_location("Near", LocationType::Home, 0.0, 0.0).unwrap();
        let far = world.add_location("Far", LocationType::Home, 50.0, 50.0).unwrap();
        world.add_location("Shop", LocationType::Shop, 1.0, 1.0).unwrap();

        assert_eq!(world.nearest_of_type(6.0, 6.0, LocationType::Home), Some(near));
        assert_eq!(world.nearest_of_type(54.0, 54.0, LocationType::Home), Some(far));
        assert_eq!(world.nearest_of_type(0.0, 0.0, LocationType::Field), None);
    }

    #[test]
    fn test_locations_at() {
        let (world, a, _, _) = line_world();
        assert_eq!(world.locations_at(5.0, 5.0), vec![a]);
        assert!(world.locations_at(15.0, 5.0).is_empty());
    }

    #[test]
    fn test_remove_location_drops_incoming_edges() {
        let (mut world, a, b, c) = line_world();
        world.remove_location(b).unwrap();
        assert!(world.get(a).unwrap().connections.is_empty());
        assert!(world.get(c).unwrap().connections.is_empty());
        assert!(world.get(b).is_none());
        assert_eq!(world.get(c).unwrap().name, "C");
    }
}
