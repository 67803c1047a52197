//! Social model - relationships, personalities, conversations and gifts
//!
//! Relationships are pairwise and order-insensitive: `(a, b)` and `(b, a)`
//! resolve to the same record.

pub mod personality;
pub mod relationship;

pub use personality::{GiftPreferences, GiftReaction, Personality, PersonalityTrait};
pub use relationship::{PairRelationship, RelationshipType};

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::EntityId;

pub const MAX_CONVERSATION_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationTopic {
    Weather,
    Farming,
    Family,
    Work,
    Hobbies,
    Gossip,
    Dreams,
    Past,
    Romance,
    Business,
    Food,
    Village,
}

impl ConversationTopic {
    pub const ALL: [ConversationTopic; 12] = [
        Self::Weather,
        Self::Farming,
        Self::Family,
        Self::Work,
        Self::Hobbies,
        Self::Gossip,
        Self::Dreams,
        Self::Past,
        Self::Romance,
        Self::Business,
        Self::Food,
        Self::Village,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Farming => "farming",
            Self::Family => "family",
            Self::Work => "work",
            Self::Hobbies => "hobbies",
            Self::Gossip => "gossip",
            Self::Dreams => "dreams",
            Self::Past => "the past",
            Self::Romance => "romance",
            Self::Business => "business",
            Self::Food => "food",
            Self::Village => "the village",
        }
    }
}

/// One finished conversation, kept for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub initiator: EntityId,
    pub recipient: EntityId,
    pub topic: ConversationTopic,
    pub affection_gained: i32,
}

fn pair_key(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone)]
pub struct SocialManager {
    relationships: Vec<PairRelationship>,
    index: AHashMap<(EntityId, EntityId), usize>,
    personalities: AHashMap<EntityId, Personality>,
    gift_preferences: AHashMap<EntityId, GiftPreferences>,
    history: VecDeque<ConversationRecord>,
    max_relationships: usize,
}

impl SocialManager {
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_capacity(config.max_relationships)
    }

    pub fn with_capacity(max_relationships: usize) -> Self {
        Self {
            relationships: Vec::new(),
            index: AHashMap::new(),
            personalities: AHashMap::new(),
            gift_preferences: AHashMap::new(),
            history: VecDeque::new(),
            max_relationships,
        }
    }

    // ========================================================================
    // RELATIONSHIPS
    // ========================================================================

    pub fn relationship(&self, a: EntityId, b: EntityId) -> Option<&PairRelationship> {
        self.index.get(&pair_key(a, b)).map(|&i| &self.relationships[i])
    }

    pub fn relationship_mut(&mut self, a: EntityId, b: EntityId) -> Option<&mut PairRelationship> {
        let i = *self.index.get(&pair_key(a, b))?;
        self.relationships.get_mut(i)
    }

    /// Fetch or create the relationship between `a` and `b`
    ///
    /// `None` when the pair is new and the manager is at capacity, or when
    /// `a == b`.
    pub fn ensure_relationship(&mut self, a: EntityId, b: EntityId) -> Option<&mut PairRelationship> {
        if a == b {
            return None;
        }
        let key = pair_key(a, b);
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                if self.relationships.len() >= self.max_relationships {
                    tracing::warn!(a = %a, b = %b, max = self.max_relationships, "relationship limit reached");
                    return None;
                }
                self.relationships.push(PairRelationship::new(a, b));
                let i = self.relationships.len() - 1;
                self.index.insert(key, i);
                tracing::debug!(a = %a, b = %b, "entities met");
                i
            }
        };
        self.relationships.get_mut(i)
    }

    /// Add a fully formed relationship, replacing any for the same pair
    pub fn insert_relationship(&mut self, relationship: PairRelationship) -> bool {
        let key = pair_key(relationship.entity_a, relationship.entity_b);
        if let Some(&i) = self.index.get(&key) {
            self.relationships[i] = relationship;
            return true;
        }
        if self.relationships.len() >= self.max_relationships {
            return false;
        }
        self.relationships.push(relationship);
        self.index.insert(key, self.relationships.len() - 1);
        true
    }

    pub fn relationships(&self) -> &[PairRelationship] {
        &self.relationships
    }

    pub fn relationships_of(&self, entity: EntityId) -> impl Iterator<Item = &PairRelationship> {
        self.relationships.iter().filter(move |r| r.involves(entity))
    }

    /// Affection between two entities, 0 for strangers who never met
    pub fn affection(&self, a: EntityId, b: EntityId) -> i32 {
        self.relationship(a, b).map_or(0, |r| r.affection)
    }

    // ========================================================================
    // PERSONALITIES
    // ========================================================================

    pub fn set_personality(&mut self, personality: Personality) {
        self.personalities.insert(personality.entity_id, personality);
    }

    pub fn personality(&self, entity: EntityId) -> Option<&Personality> {
        self.personalities.get(&entity)
    }

    pub fn set_gift_preferences(&mut self, entity: EntityId, preferences: GiftPreferences) {
        self.gift_preferences.insert(entity, preferences);
    }

    pub fn gift_preferences(&self, entity: EntityId) -> Option<&GiftPreferences> {
        self.gift_preferences.get(&entity)
    }

    /// Every personality, ordered by entity
    pub fn personalities(&self) -> Vec<&Personality> {
        let mut all: Vec<&Personality> = self.personalities.values().collect();
        all.sort_by_key(|p| p.entity_id);
        all
    }

    /// Every entity's gift tastes, ordered by entity
    pub fn gift_preference_table(&self) -> Vec<(EntityId, &GiftPreferences)> {
        let mut all: Vec<(EntityId, &GiftPreferences)> =
            self.gift_preferences.iter().map(|(id, prefs)| (*id, prefs)).collect();
        all.sort_by_key(|(id, _)| *id);
        all
    }

    /// Give `entity` the stock personality and tastes for its occupation
    pub fn assign_default_profile(&mut self, entity: EntityId, occupation: &str) {
        use PersonalityTrait::*;
        let (traits, preferences): (&[PersonalityTrait], GiftPreferences) = match occupation {
            "Farmer" => (
                &[Friendly, Honest, Generous],
                GiftPreferences::new()
                    .love("Hoe")
                    .love("Watering Can")
                    .love("Wheat Seeds")
                    .like("Wheat")
                    .like("Corn")
                    .dislike("Stone"),
            ),
            "Merchant" | "Shopkeeper" => (
                &[Greedy, Honest, Ambitious],
                GiftPreferences::new()
                    .love("Iron Ore")
                    .love("Bread")
                    .like("Wheat")
                    .like("Corn"),
            ),
            _ => (
                &[Shy, Honest],
                GiftPreferences::new()
                    .love("Carrot")
                    .love("Tomato")
                    .like("Bread")
                    .like("Vegetable Soup"),
            ),
        };
        self.set_personality(Personality::new(entity).with_traits(traits));
        self.set_gift_preferences(entity, preferences);
    }

    // ========================================================================
    // INTERACTIONS
    // ========================================================================

    /// `from` talks with `to` about `topic`
    ///
    /// Returns false when no relationship can be formed.
    pub fn converse(&mut self, from: EntityId, to: EntityId, topic: ConversationTopic) -> bool {
        let mut gain = 3;
        if self.personality(to).is_some_and(|p| p.chattiness > 70) {
            gain += 2;
        }
        for entity in [from, to] {
            if self
                .personality(entity)
                .is_some_and(|p| p.has_trait(PersonalityTrait::Friendly))
            {
                gain += 1;
            }
        }

        let Some(rel) = self.ensure_relationship(from, to) else {
            return false;
        };
        rel.modify_affection(gain);
        rel.modify_trust(1);
        rel.record_talk();

        if self.history.len() >= MAX_CONVERSATION_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(ConversationRecord {
            initiator: from,
            recipient: to,
            topic,
            affection_gained: gain,
        });
        tracing::debug!(from = %from, to = %to, topic = topic.name(), gain, "conversation");
        true
    }

    /// Affection a gift would earn from `receiver`
    pub fn gift_affection(&self, receiver: EntityId, item_name: &str, item_value: u32) -> i32 {
        let reaction = self
            .gift_preferences(receiver)
            .map_or(GiftReaction::Neutral, |p| p.reaction(item_name));
        let mut affection = reaction.base_affection();
        if item_value > 50 {
            affection += 3;
        } else if item_value < 10 {
            affection -= 1;
        }
        match self.personality(receiver) {
            Some(p) => (affection as f32 * (0.5 + p.generosity_modifier() * 0.5)) as i32,
            None => affection,
        }
    }

    /// `from` gives `to` an item worth `item_value`
    pub fn give_gift(&mut self, from: EntityId, to: EntityId, item_name: &str, item_value: u32) -> bool {
        let affection = self.gift_affection(to, item_name, item_value);
        let Some(rel) = self.ensure_relationship(from, to) else {
            return false;
        };
        rel.modify_affection(affection);
        rel.record_gift();
        tracing::debug!(from = %from, to = %to, item = item_name, affection, "gift given");
        true
    }

    /// Let `days` pass for every relationship
    pub fn decay_all(&mut self, days: u32) {
        for rel in &mut self.relationships {
            rel.apply_decay(days);
        }
    }

    /// Conversations, oldest first
    pub fn conversation_history(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.history.iter()
    }
}

impl Default for SocialManager {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}
