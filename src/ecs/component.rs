//! Components: typed data attached to exactly one entity
//!
//! A `Component` pairs the owning entity's ID with a `ComponentData` payload
//! drawn from a closed set of kinds. The registry filters on the payload's
//! discriminant, so there is no downcasting anywhere.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::clock::TimeOfDay;
use crate::core::types::EntityId;

/// Most relationship scores one entity keeps
pub const MAX_RELATIONSHIP_ENTRIES: usize = 100;
/// Ceiling on any memory buffer's capacity
pub const MAX_MEMORY_ENTRIES: usize = 50;
/// Most pending goals one entity keeps
pub const MAX_GOALS: usize = 10;

/// The closed set of component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Position,
    Health,
    Inventory,
    Currency,
    Relationship,
    Needs,
    Schedule,
    Occupation,
    Memory,
    Goal,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 10] = [
        ComponentKind::Position,
        ComponentKind::Health,
        ComponentKind::Inventory,
        ComponentKind::Currency,
        ComponentKind::Relationship,
        ComponentKind::Needs,
        ComponentKind::Schedule,
        ComponentKind::Occupation,
        ComponentKind::Memory,
        ComponentKind::Goal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Health => "health",
            Self::Inventory => "inventory",
            Self::Currency => "currency",
            Self::Relationship => "relationship",
            Self::Needs => "needs",
            Self::Schedule => "schedule",
            Self::Occupation => "occupation",
            Self::Memory => "memory",
            Self::Goal => "goal",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A component as stored on an entity
///
/// `entity_id` is a back-reference for serialization and diagnostics; it is
/// `None` until the registry attaches the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub entity_id: Option<EntityId>,
    #[serde(flatten)]
    pub data: ComponentData,
}

impl Component {
    pub fn new(data: impl Into<ComponentData>) -> Self {
        Self {
            entity_id: None,
            data: data.into(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.data.kind()
    }

    /// Typed view of the payload
    pub fn typed<T: ComponentType>(&self) -> Option<&T> {
        T::from_data(&self.data)
    }

    pub fn typed_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        T::from_data_mut(&mut self.data)
    }
}

/// Component payload, tagged by `"type"` in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentData {
    Position(Position),
    Health(Health),
    Inventory(Inventory),
    Currency(Currency),
    Relationship(Relationship),
    Needs(Needs),
    Schedule(Schedule),
    Occupation(Occupation),
    Memory(Memory),
    Goal(Goal),
}

impl ComponentData {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Position(_) => ComponentKind::Position,
            Self::Health(_) => ComponentKind::Health,
            Self::Inventory(_) => ComponentKind::Inventory,
            Self::Currency(_) => ComponentKind::Currency,
            Self::Relationship(_) => ComponentKind::Relationship,
            Self::Needs(_) => ComponentKind::Needs,
            Self::Schedule(_) => ComponentKind::Schedule,
            Self::Occupation(_) => ComponentKind::Occupation,
            Self::Memory(_) => ComponentKind::Memory,
            Self::Goal(_) => ComponentKind::Goal,
        }
    }
}

impl From<Component> for ComponentData {
    fn from(component: Component) -> Self {
        component.data
    }
}

/// Payload types that can be looked up by type on an entity
pub trait ComponentType: Sized {
    const KIND: ComponentKind;

    fn from_data(data: &ComponentData) -> Option<&Self>;
    fn from_data_mut(data: &mut ComponentData) -> Option<&mut Self>;
}

macro_rules! component_type {
    ($ty:ident) => {
        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn from_data(data: &ComponentData) -> Option<&Self> {
                match data {
                    ComponentData::$ty(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_data_mut(data: &mut ComponentData) -> Option<&mut Self> {
                match data {
                    ComponentData::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ComponentData {
            fn from(inner: $ty) -> Self {
                ComponentData::$ty(inner)
            }
        }
    };
}

component_type!(Position);
component_type!(Health);
component_type!(Inventory);
component_type!(Currency);
component_type!(Relationship);
component_type!(Needs);
component_type!(Schedule);
component_type!(Occupation);
component_type!(Memory);
component_type!(Goal);

// ============================================================================
// POSITION
// ============================================================================

/// Where an entity stands: a location name plus coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub location: String,
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(location: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            location: location.into(),
            x,
            y,
        }
    }

    pub fn set(&mut self, location: impl Into<String>, x: f32, y: f32) {
        self.location = location.into();
        self.x = x;
        self.y = y;
    }
}

// ============================================================================
// HEALTH
// ============================================================================

/// Hit points, always within `0..=maximum`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub maximum: i32,
}

impl Health {
    pub fn new(maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            current: maximum,
            maximum,
        }
    }

    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount.max(0)).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).min(self.maximum);
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

// ============================================================================
// INVENTORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_name: String,
    pub quantity: u32,
}

/// Named item stacks carried by an entity
///
/// `capacity` bounds the number of distinct item names; adding to an
/// existing name never needs a new slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<ItemStack>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    /// Add `quantity` of `name`; false when a new slot is needed and none is free
    pub fn add_item(&mut self, name: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        if let Some(stack) = self.items.iter_mut().find(|s| s.item_name == name) {
            stack.quantity = stack.quantity.saturating_add(quantity);
            return true;
        }
        if self.items.len() >= self.capacity {
            return false;
        }
        self.items.push(ItemStack {
            item_name: name.to_string(),
            quantity,
        });
        true
    }

    /// Remove `quantity` of `name`; false (and no change) when not enough is held
    pub fn remove_item(&mut self, name: &str, quantity: u32) -> bool {
        let Some(index) = self.items.iter().position(|s| s.item_name == name) else {
            return false;
        };
        if self.items[index].quantity < quantity {
            return false;
        }
        self.items[index].quantity -= quantity;
        if self.items[index].quantity == 0 {
            self.items.remove(index);
        }
        true
    }

    pub fn has_item(&self, name: &str, quantity: u32) -> bool {
        self.count(name) >= quantity
    }

    pub fn count(&self, name: &str) -> u32 {
        self.items
            .iter()
            .find(|s| s.item_name == name)
            .map_or(0, |s| s.quantity)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(20)
    }
}

// ============================================================================
// CURRENCY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Currency {
    pub amount: u32,
}

impl Currency {
    pub fn new(amount: u32) -> Self {
        Self { amount }
    }

    pub fn add(&mut self, amount: u32) {
        self.amount = self.amount.saturating_add(amount);
    }

    /// Atomic: either the full amount is removed or nothing changes
    pub fn remove(&mut self, amount: u32) -> bool {
        match self.amount.checked_sub(amount) {
            Some(rest) => {
                self.amount = rest;
                true
            }
            None => false,
        }
    }

    pub fn has(&self, amount: u32) -> bool {
        self.amount >= amount
    }
}

// ============================================================================
// RELATIONSHIP
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipScore {
    pub entity_id: EntityId,
    pub score: i32,
}

/// How one entity feels about another, by score band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipLevel {
    Enemy,
    Dislike,
    Neutral,
    Friendly,
    Friend,
    CloseFriend,
}

impl RelationshipLevel {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s < -50 => Self::Enemy,
            s if s < -10 => Self::Dislike,
            s if s < 10 => Self::Neutral,
            s if s < 50 => Self::Friendly,
            s if s < 75 => Self::Friend,
            _ => Self::CloseFriend,
        }
    }
}

/// Per-entity opinion scores in `[-100, 100]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Relationship {
    pub scores: Vec<RelationshipScore>,
}

impl Relationship {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score toward `other`; strangers read as 0
    pub fn get(&self, other: EntityId) -> i32 {
        self.scores
            .iter()
            .find(|s| s.entity_id == other)
            .map_or(0, |s| s.score)
    }

    /// Adjust the score toward `other`, clamping to `[-100, 100]`
    ///
    /// Returns false when `other` is new and the table is full.
    pub fn modify(&mut self, other: EntityId, delta: i32) -> bool {
        if let Some(entry) = self.scores.iter_mut().find(|s| s.entity_id == other) {
            entry.score = entry.score.saturating_add(delta).clamp(-100, 100);
            return true;
        }
        if self.scores.len() >= MAX_RELATIONSHIP_ENTRIES {
            return false;
        }
        self.scores.push(RelationshipScore {
            entity_id: other,
            score: delta.clamp(-100, 100),
        });
        true
    }

    pub fn level(&self, other: EntityId) -> RelationshipLevel {
        RelationshipLevel::from_score(self.get(other))
    }
}

// ============================================================================
// NEEDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeedType {
    Hunger,
    Energy,
    Social,
}

/// Satisfaction levels in `[0, 100]`; higher is better
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: f32,
    pub energy: f32,
    pub social: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: 50.0,
            energy: 100.0,
            social: 50.0,
        }
    }
}

impl Needs {
    /// Decay over `dt` periods
    pub fn decay(&mut self, dt: f32) {
        self.hunger = (self.hunger - 5.0 * dt).clamp(0.0, 100.0);
        self.energy = (self.energy - 3.0 * dt).clamp(0.0, 100.0);
        self.social = (self.social - 2.0 * dt).clamp(0.0, 100.0);
    }

    pub fn eat(&mut self, amount: f32) {
        self.hunger = (self.hunger + amount).clamp(0.0, 100.0);
    }

    pub fn rest(&mut self, amount: f32) {
        self.energy = (self.energy + amount).clamp(0.0, 100.0);
    }

    pub fn socialize(&mut self, amount: f32) {
        self.social = (self.social + amount).clamp(0.0, 100.0);
    }

    /// Lowest need; ties favour hunger, then energy
    pub fn most_urgent(&self) -> NeedType {
        if self.hunger <= self.energy && self.hunger <= self.social {
            NeedType::Hunger
        } else if self.energy <= self.social {
            NeedType::Energy
        } else {
            NeedType::Social
        }
    }
}

// ============================================================================
// SCHEDULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time_of_day: TimeOfDay,
    pub activity: String,
}

/// Planned activity per period of the day, at most one entry each
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, time_of_day: TimeOfDay, activity: impl Into<String>) {
        let activity = activity.into();
        match self.entries.iter_mut().find(|e| e.time_of_day == time_of_day) {
            Some(entry) => entry.activity = activity,
            None => self.entries.push(ScheduleEntry {
                time_of_day,
                activity,
            }),
        }
    }

    pub fn activity_at(&self, time_of_day: TimeOfDay) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.time_of_day == time_of_day)
            .map(|e| e.activity.as_str())
    }
}

// ============================================================================
// OCCUPATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    pub occupation: String,
    pub workplace: String,
    pub skill_level: u32,
}

impl Occupation {
    pub fn new(occupation: impl Into<String>, workplace: impl Into<String>, skill_level: u32) -> Self {
        Self {
            occupation: occupation.into(),
            workplace: workplace.into(),
            skill_level,
        }
    }
}

impl Default for Occupation {
    fn default() -> Self {
        Self::new("Villager", "None", 1)
    }
}

// ============================================================================
// MEMORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub text: String,
    pub day: u32,
    pub time_of_day: TimeOfDay,
}

/// Bounded log of remembered events; the oldest entry is dropped on overflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(deserialize_with = "memory_capacity")]
    pub capacity: usize,
    pub entries: VecDeque<MemoryEntry>,
}

impl Memory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.clamp(1, MAX_MEMORY_ENTRIES),
            entries: VecDeque::new(),
        }
    }

    pub fn remember(&mut self, text: impl Into<String>, day: u32, time_of_day: TimeOfDay) {
        let capacity = self.capacity.clamp(1, MAX_MEMORY_ENTRIES);
        while self.entries.len() >= capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(MemoryEntry {
            text: text.into(),
            day,
            time_of_day,
        });
    }

    /// Up to `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &MemoryEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn memory_capacity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(usize::deserialize(deserializer)?.clamp(1, MAX_MEMORY_ENTRIES))
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(MAX_MEMORY_ENTRIES)
    }
}

// ============================================================================
// GOAL
// ============================================================================

/// Current goal (empty for none) plus a bounded, deduplicated pending list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Goal {
    pub current: String,
    pub goals: Vec<String>,
}

impl Goal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current(&mut self, goal: impl Into<String>) {
        self.current = goal.into();
    }

    /// Queue a goal; false when it is already queued or the list is full
    pub fn add(&mut self, goal: impl Into<String>) -> bool {
        let goal = goal.into();
        if self.goals.len() >= MAX_GOALS || self.goals.contains(&goal) {
            return false;
        }
        self.goals.push(goal);
        true
    }

    /// Remove a goal from the list, clearing `current` if it matched
    pub fn complete(&mut self, goal: &str) -> bool {
        let Some(index) = self.goals.iter().position(|g| g == goal) else {
            return false;
        };
        self.goals.remove(index);
        if self.current == goal {
            self.current.clear();
        }
        true
    }

    pub fn has_goal(&self, goal: &str) -> bool {
        self.goals.iter().any(|g| g == goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps() {
        let mut health = Health::new(100);
        health.damage(30);
        assert_eq!(health.current, 70);
        health.damage(500);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
        health.heal(40);
        assert_eq!(health.current, 40);
        health.heal(500);
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_inventory_stacks_by_name() {
        let mut inv = Inventory::new(2);
        assert!(inv.add_item("Wheat", 5));
        assert!(inv.add_item("Wheat", 3));
        assert_eq!(inv.items.len(), 1);
        assert_eq!(inv.count("Wheat"), 8);

        assert!(inv.add_item("Corn", 1));
        assert!(!inv.add_item("Carrot", 1), "third distinct item exceeds capacity");
        assert!(inv.add_item("Corn", 4), "existing stack needs no new slot");
    }

    #[test]
    fn test_inventory_remove_is_atomic() {
        let mut inv = Inventory::new(5);
        inv.add_item("Wheat", 3);
        assert!(!inv.remove_item("Wheat", 4));
        assert_eq!(inv.count("Wheat"), 3);
        assert!(inv.remove_item("Wheat", 3));
        assert!(!inv.has_item("Wheat", 1));
        assert!(inv.items.is_empty(), "emptied stacks are dropped");
    }

    #[test]
    fn test_currency_remove_fails_when_short() {
        let mut wallet = Currency::new(10);
        assert!(!wallet.remove(11));
        assert_eq!(wallet.amount, 10);
        assert!(wallet.remove(10));
        assert_eq!(wallet.amount, 0);
    }

    #[test]
    fn test_relationship_clamps_and_levels() {
        let mut rel = Relationship::new();
        let other = EntityId(4);
        assert_eq!(rel.get(other), 0);
        assert_eq!(rel.level(other), RelationshipLevel::Neutral);

        rel.modify(other, 60);
        assert_eq!(rel.level(other), RelationshipLevel::Friend);
        rel.modify(other, 90);
        assert_eq!(rel.get(other), 100);
        assert_eq!(rel.level(other), RelationshipLevel::CloseFriend);
        rel.modify(other, -300);
        assert_eq!(rel.get(other), -100);
        assert_eq!(rel.level(other), RelationshipLevel::Enemy);
    }

    #[test]
    fn test_relationship_table_is_bounded() {
        let mut rel = Relationship::new();
        for id in 0..MAX_RELATIONSHIP_ENTRIES as u32 {
            assert!(rel.modify(EntityId(id + 1), 1));
        }
        assert!(!rel.modify(EntityId(9999), 5));
        assert!(rel.modify(EntityId(1), 5), "known entries can still change");
    }

    #[test]
    fn test_needs_decay_and_restore() {
        let mut needs = Needs::default();
        needs.decay(2.0);
        assert_eq!(needs.hunger, 40.0);
        assert_eq!(needs.energy, 94.0);
        assert_eq!(needs.social, 46.0);

        needs.decay(100.0);
        assert_eq!(needs.hunger, 0.0);

        needs.rest(500.0);
        assert_eq!(needs.energy, 100.0);
    }

    #[test]
    fn test_needs_most_urgent_tie_order() {
        let needs = Needs {
            hunger: 30.0,
            energy: 30.0,
            social: 30.0,
        };
        assert_eq!(needs.most_urgent(), NeedType::Hunger);

        let needs = Needs {
            hunger: 80.0,
            energy: 20.0,
            social: 20.0,
        };
        assert_eq!(needs.most_urgent(), NeedType::Energy);

        let needs = Needs {
            hunger: 80.0,
            energy: 70.0,
            social: 10.0,
        };
        assert_eq!(needs.most_urgent(), NeedType::Social);
    }

    #[test]
    fn test_memory_drops_oldest() {
        let mut memory = Memory::new(2);
        memory.remember("first", 1, TimeOfDay::Morning);
        memory.remember("second", 1, TimeOfDay::Evening);
        memory.remember("third", 2, TimeOfDay::Morning);
        assert_eq!(memory.len(), 2);
        let texts: Vec<_> = memory.recent(5).map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second"]);
    }

    #[test]
    fn test_memory_capacity_is_capped() {
        assert_eq!(Memory::new(500).capacity, MAX_MEMORY_ENTRIES);
    }

    #[test]
    fn test_memory_loaded_capacity_is_clamped() {
        let memory: Memory = serde_json::from_str(r#"{"capacity":0,"entries":[]}"#).unwrap();
        assert_eq!(memory.capacity, 1);
        let memory: Memory = serde_json::from_str(r#"{"capacity":900,"entries":[]}"#).unwrap();
        assert_eq!(memory.capacity, MAX_MEMORY_ENTRIES);
    }

    #[test]
    fn test_memory_zero_capacity_keeps_latest() {
        let mut memory = Memory::new(3);
        memory.capacity = 0;
        memory.remember("first", 1, TimeOfDay::Morning);
        memory.remember("second", 1, TimeOfDay::Afternoon);
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.recent(1).next().unwrap().text, "second");
    }

    #[test]
    fn test_large_values_saturate() {
        let mut pack = Inventory::new(2);
        assert!(pack.add_item("Wheat", u32::MAX - 1));
        assert!(pack.add_item("Wheat", 5));
        assert_eq!(pack.count("Wheat"), u32::MAX);

        let mut relationship = Relationship::new();
        relationship.modify(EntityId(2), 50);
        relationship.modify(EntityId(2), i32::MAX);
        assert_eq!(relationship.get(EntityId(2)), 100);
        relationship.modify(EntityId(2), i32::MIN);
        assert_eq!(relationship.get(EntityId(2)), -100);
    }

    #[test]
    fn test_goal_completion_clears_current() {
        let mut goal = Goal::new();
        assert!(goal.add("Harvest wheat"));
        assert!(!goal.add("Harvest wheat"), "duplicates rejected");
        goal.set_current("Harvest wheat");

        assert!(goal.complete("Harvest wheat"));
        assert!(goal.current.is_empty());
        assert!(!goal.has_goal("Harvest wheat"));
        assert!(!goal.complete("Harvest wheat"));
    }

    #[test]
    fn test_schedule_overwrites_slot() {
        let mut schedule = Schedule::new();
        schedule.set(TimeOfDay::Morning, "Farm");
        schedule.set(TimeOfDay::Morning, "Shop");
        assert_eq!(schedule.entries.len(), 1);
        assert_eq!(schedule.activity_at(TimeOfDay::Morning), Some("Shop"));
        assert_eq!(schedule.activity_at(TimeOfDay::Night), None);
    }

    #[test]
    fn test_component_json_is_tagged() {
        let mut component = Component::new(Health::new(80));
        component.entity_id = Some(EntityId(3));
        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["type"], "health");
        assert_eq!(json["entity_id"], 3);
        assert_eq!(json["maximum"], 80);

        let back: Component = serde_json::from_value(json).unwrap();
        assert_eq!(back, component);
    }

    #[test]
    fn test_typed_view() {
        let mut component = Component::new(Currency::new(5));
        assert_eq!(component.kind(), ComponentKind::Currency);
        assert!(component.typed::<Health>().is_none());
        component.typed_mut::<Currency>().unwrap().add(5);
        assert_eq!(component.typed::<Currency>().unwrap().amount, 10);
    }
}
