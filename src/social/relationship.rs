//! Pairwise relationships between villagers

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;

pub const MIN_AFFECTION: i32 = -100;
pub const MAX_AFFECTION: i32 = 100;

/// Days without contact before affection starts to fade
pub const DECAY_GRACE_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Stranger,
    Acquaintance,
    Friend,
    CloseFriend,
    Romantic,
    Family,
    Rival,
    Enemy,
}

impl RelationshipType {
    /// Classification by affection alone
    pub fn from_affection(affection: i32) -> Self {
        match affection {
            a if a >= 80 => Self::CloseFriend,
            a if a >= 50 => Self::Friend,
            a if a >= 20 => Self::Acquaintance,
            a if a <= -80 => Self::Enemy,
            a if a <= -50 => Self::Rival,
            _ => Self::Stranger,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stranger => "Stranger",
            Self::Acquaintance => "Acquaintance",
            Self::Friend => "Friend",
            Self::CloseFriend => "Close Friend",
            Self::Romantic => "Romantic",
            Self::Family => "Family",
            Self::Rival => "Rival",
            Self::Enemy => "Enemy",
        }
    }
}

/// Relationship between two entities, the same whichever side asks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRelationship {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    pub kind: RelationshipType,
    /// -100 (hatred) to 100 (devotion)
    pub affection: i32,
    /// 0 to 100
    pub trust: i32,
    /// 0 to 100
    pub respect: i32,
    pub times_talked: u32,
    pub times_gifted: u32,
    pub days_since_interaction: u32,
    /// Locked relationships (family) never change
    pub is_locked: bool,
}

impl PairRelationship {
    /// New relationship; the pair is stored lowest ID first
    pub fn new(a: EntityId, b: EntityId) -> Self {
        let (entity_a, entity_b) = if a <= b { (a, b) } else { (b, a) };
        Self {
            entity_a,
            entity_b,
            kind: RelationshipType::Stranger,
            affection: 0,
            trust: 50,
            respect: 50,
            times_talked: 0,
            times_gifted: 0,
            days_since_interaction: 0,
            is_locked: false,
        }
    }

    pub fn involves(&self, entity: EntityId) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }

    /// The other side of the pair, if `entity` is one side
    pub fn other(&self, entity: EntityId) -> Option<EntityId> {
        if self.entity_a == entity {
            Some(self.entity_b)
        } else if self.entity_b == entity {
            Some(self.entity_a)
        } else {
            None
        }
    }

    pub fn modify_affection(&mut self, change: i32) {
        if self.is_locked {
            return;
        }
        self.affection = (self.affection + change).clamp(MIN_AFFECTION, MAX_AFFECTION);
        self.update_type();
    }

    pub fn modify_trust(&mut self, change: i32) {
        if !self.is_locked {
            self.trust = (self.trust + change).clamp(0, 100);
        }
    }

    pub fn modify_respect(&mut self, change: i32) {
        if !self.is_locked {
            self.respect = (self.respect + change).clamp(0, 100);
        }
    }

    fn update_type(&mut self) {
        let next = RelationshipType::from_affection(self.affection);
        if next != self.kind {
            tracing::debug!(
                a = %self.entity_a,
                b = %self.entity_b,
                from = self.kind.name(),
                to = next.name(),
                "relationship changed"
            );
            self.kind = next;
        }
    }

    pub fn meets_requirements(&self, min_affection: i32, min_trust: i32) -> bool {
        self.affection >= min_affection && self.trust >= min_trust
    }

    pub fn record_talk(&mut self) {
        self.times_talked += 1;
        self.days_since_interaction = 0;
    }

    pub fn record_gift(&mut self) {
        self.times_gifted += 1;
        self.days_since_interaction = 0;
    }

    /// Let `days` pass without contact
    ///
    /// After a week of silence affection fades by one point per further week.
    pub fn apply_decay(&mut self, days: u32) {
        if self.is_locked {
            return;
        }
        self.days_since_interaction += days;
        if self.days_since_interaction > DECAY_GRACE_DAYS {
            let decay = (self.days_since_interaction - DECAY_GRACE_DAYS) / 7;
            self.modify_affection(-(decay as i32));
        }
    }
}
