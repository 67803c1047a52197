//! Decision records - what an entity knew, what it weighed, what it chose
//!
//! The game loop snapshots a `DecisionContext` before asking the decider,
//! then files a `DecisionRecord` with the outcome once the action has run.

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionKind};
use super::game_loop::Simulation;
use crate::core::clock::{Season, TimeOfDay, Weather};
use crate::core::types::{EntityId, LocationId};
use crate::ecs::component::{self, Currency, Goal, Health, Memory, Needs, Occupation, Position, Relationship, Schedule};
use crate::ecs::Entity;

/// Distance within which other entities count as nearby
pub const NEARBY_RADIUS: f32 = 100.0;
pub const MAX_NEARBY_ENTITIES: usize = 20;
pub const MAX_RECENT_EVENTS: usize = 10;
pub const MAX_DECISION_OPTIONS: usize = 10;

// ============================================================================
// CONTEXT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyEntity {
    pub id: EntityId,
    pub name: String,
    /// The deciding entity's opinion score, 0 for strangers
    pub relationship: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub stacks: usize,
    pub capacity: usize,
}

/// Everything the decider could see when it chose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub entity_id: EntityId,
    pub entity_name: String,
    pub entity_type: String,

    pub day: u32,
    pub time_of_day: TimeOfDay,
    pub season: Season,
    pub year: u32,
    pub weather: Weather,

    pub location: Option<String>,
    pub position: Option<(f32, f32)>,
    pub needs: Option<Needs>,
    pub health: Option<Health>,
    pub currency: Option<u32>,
    pub inventory: Option<InventorySummary>,
    pub occupation: Option<Occupation>,
    pub current_goal: Option<String>,
    pub current_activity: Option<String>,
    pub memory_count: usize,

    pub nearby: Vec<NearbyEntity>,
    /// IDs of the latest logged events involving this entity, newest first
    pub recent_events: Vec<u64>,
}

impl DecisionContext {
    pub fn capture(entity: &Entity, sim: &Simulation) -> Self {
        Self::capture_within(entity, sim, NEARBY_RADIUS)
    }

    pub fn capture_within(entity: &Entity, sim: &Simulation, radius: f32) -> Self {
        let clock = &sim.clock;
        let position = entity.component::<Position>();
        let goal = entity
            .component::<Goal>()
            .map(|g| g.current.clone())
            .filter(|g| !g.is_empty());

        Self {
            entity_id: entity.id,
            entity_name: entity.name.clone(),
            entity_type: entity.entity_type.clone(),
            day: clock.day,
            time_of_day: clock.time_of_day,
            season: clock.season,
            year: clock.year,
            weather: clock.weather,
            location: position.map(|p| p.location.clone()),
            position: position.map(|p| (p.x, p.y)),
            needs: entity.component::<Needs>().copied(),
            health: entity.component::<Health>().copied(),
            currency: entity.component::<Currency>().map(|c| c.amount),
            inventory: entity
                .component::<component::Inventory>()
                .map(|pack| InventorySummary {
                    stacks: pack.items.len(),
                    capacity: pack.capacity,
                }),
            occupation: entity.component::<Occupation>().cloned(),
            current_goal: goal,
            current_activity: entity
                .component::<Schedule>()
                .and_then(|s| s.activity_at(clock.time_of_day))
                .map(str::to_string),
            memory_count: entity.component::<Memory>().map_or(0, |m| m.len()),
            nearby: position.map_or_else(Vec::new, |p| nearby_entities(entity, p, sim, radius)),
            recent_events: sim
                .events
                .by_entity(entity.id)
                .into_iter()
                .take(MAX_RECENT_EVENTS)
                .map(|e| e.id)
                .collect(),
        }
    }
}

fn nearby_entities(entity: &Entity, here: &Position, sim: &Simulation, radius: f32) -> Vec<NearbyEntity> {
    let opinions = entity.component::<Relationship>();
    sim.registry
        .iter()
        .filter(|other| other.active && other.id != entity.id)
        .filter_map(|other| {
            let there = other.component::<Position>()?;
            let distance = ((there.x - here.x).powi(2) + (there.y - here.y).powi(2)).sqrt();
            (distance <= radius).then(|| NearbyEntity {
                id: other.id,
                name: other.name.clone(),
                relationship: opinions.map_or(0, |r| r.get(other.id)),
            })
        })
        .take(MAX_NEARBY_ENTITIES)
        .collect()
}

// ============================================================================
// OPTIONS
// ============================================================================

/// One course of action a decider weighed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub kind: ActionKind,
    pub description: String,
    pub utility: f32,
    pub cost: f32,
    /// Expected probability of success, 0-1
    pub success_chance: f32,
    pub target_entity: Option<EntityId>,
    pub target_location: Option<LocationId>,
    pub target_item: Option<String>,
}

impl DecisionOption {
    /// The option an action represents, scored as a sure thing
    pub fn for_action(action: &Action) -> Self {
        let mut description = action.kind.name().to_string();
        if let Some(item) = &action.target_item {
            description.push(' ');
            description.push_str(item);
        }
        if let Some(entity) = action.target_entity {
            description.push_str(&format!(" with {}", entity));
        }
        if let Some(location) = action.target_location {
            description.push_str(&format!(" to {}", location));
        }
        Self {
            kind: action.kind,
            description,
            utility: 1.0,
            cost: 0.0,
            success_chance: 1.0,
            target_entity: action.target_entity,
            target_location: action.target_location,
            target_item: action.target_item.clone(),
        }
    }

    pub fn scored(mut self, utility: f32, cost: f32, success_chance: f32) -> Self {
        self.utility = utility;
        self.cost = cost;
        self.success_chance = success_chance.clamp(0.0, 1.0);
        self
    }
}

/// A decider's answer: the action to take plus the reasoning behind it
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: Action,
    pub options: Vec<DecisionOption>,
    /// Index into `options` of the one taken
    pub chosen: usize,
    pub reasoning: String,
}

impl Decision {
    /// A decision with no alternatives considered
    pub fn single(action: Action, reasoning: impl Into<String>) -> Self {
        Self {
            options: vec![DecisionOption::for_action(&action)],
            action,
            chosen: 0,
            reasoning: reasoning.into(),
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub succeeded: bool,
    pub actual_utility: f32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// 0 until the decision log assigns one
    pub id: u64,
    pub day: u32,
    pub time_of_day: TimeOfDay,
    pub entity_id: EntityId,
    pub entity_name: String,
    pub context: DecisionContext,
    pub options: Vec<DecisionOption>,
    pub chosen: usize,
    pub reasoning: String,
    /// `None` until the action has run
    pub outcome: Option<DecisionOutcome>,
}

impl DecisionRecord {
    /// `None` when there are no options or `chosen` is not among the first
    /// `MAX_DECISION_OPTIONS`
    pub fn new(
        context: DecisionContext,
        mut options: Vec<DecisionOption>,
        chosen: usize,
        reasoning: impl Into<String>,
    ) -> Option<Self> {
        options.truncate(MAX_DECISION_OPTIONS);
        if chosen >= options.len() {
            return None;
        }
        Some(Self {
            id: 0,
            day: context.day,
            time_of_day: context.time_of_day,
            entity_id: context.entity_id,
            entity_name: context.entity_name.clone(),
            context,
            options,
            chosen,
            reasoning: reasoning.into(),
            outcome: None,
        })
    }

    pub fn chosen_option(&self) -> Option<&DecisionOption> {
        self.options.get(self.chosen)
    }

    pub fn chosen_action(&self) -> Option<ActionKind> {
        self.chosen_option().map(|o| o.kind)
    }

    pub fn set_outcome(&mut self, succeeded: bool, actual_utility: f32, description: impl Into<String>) {
        self.outcome = Some(DecisionOutcome {
            succeeded,
            actual_utility,
            description: description.into(),
        });
    }

    pub fn is_executed(&self) -> bool {
        self.outcome.is_some()
    }
}

// ============================================================================
// LOG
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

/// Bounded ring of decision records; statistics outlive evicted records
#[derive(Debug, Clone)]
pub struct DecisionLog {
    records: VecDeque<DecisionRecord>,
    capacity: usize,
    next_id: u64,
    stats: DecisionStats,
    by_action: AHashMap<ActionKind, u64>,
}

impl DecisionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
            stats: DecisionStats::default(),
            by_action: AHashMap::new(),
        }
    }

    /// File a record, assigning its ID; success counts only if it has an outcome
    pub fn log(&mut self, mut record: DecisionRecord) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        record.id = id;

        self.stats.total += 1;
        if let Some(kind) = record.chosen_action() {
            *self.by_action.entry(kind).or_insert(0) += 1;
        }
        match &record.outcome {
            Some(outcome) if outcome.succeeded => self.stats.successful += 1,
            Some(_) => self.stats.failed += 1,
            None => {}
        }

        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        id
    }

    /// Up to `count` records, newest first
    pub fn recent(&self, count: usize) -> Vec<&DecisionRecord> {
        self.records.iter().rev().take(count).collect()
    }

    pub fn by_entity(&self, entity: EntityId) -> Vec<&DecisionRecord> {
        self.records.iter().rev().filter(|r| r.entity_id == entity).collect()
    }

    pub fn by_day(&self, day: u32) -> Vec<&DecisionRecord> {
        self.records.iter().rev().filter(|r| r.day == day).collect()
    }

    pub fn by_action(&self, kind: ActionKind) -> Vec<&DecisionRecord> {
        self.records
            .iter()
            .rev()
            .filter(|r| r.chosen_action() == Some(kind))
            .collect()
    }

    pub fn count_by_action(&self, kind: ActionKind) -> u64 {
        self.by_action.get(&kind).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> DecisionStats {
        self.stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.by_action.clear();
        self.stats = DecisionStats::default();
    }
}

impl Default for DecisionLog {
    fn default() -> Self {
        Self::new(1000)
    }
}
