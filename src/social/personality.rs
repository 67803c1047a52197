//! Personalities and gift tastes

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;

pub const MAX_PERSONALITY_TRAITS: usize = 10;
pub const MAX_GIFT_PREFERENCES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    Friendly,
    Shy,
    Generous,
    Greedy,
    Honest,
    Deceitful,
    Optimistic,
    Pessimistic,
    Ambitious,
    Lazy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub entity_id: EntityId,
    pub traits: Vec<PersonalityTrait>,
    /// 0-100: how easy to befriend
    pub friendliness: i32,
    /// 0-100: appreciation of gifts
    pub generosity: i32,
    /// 0-100: enjoyment of conversation
    pub chattiness: i32,
    pub trustworthiness: i32,
}

impl Personality {
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            traits: Vec::new(),
            friendliness: 50,
            generosity: 50,
            chattiness: 50,
            trustworthiness: 50,
        }
    }

    pub fn with_traits(mut self, traits: &[PersonalityTrait]) -> Self {
        for &t in traits {
            self.add_trait(t);
        }
        self
    }

    /// Add a trait; false if already present or the trait list is full
    pub fn add_trait(&mut self, personality_trait: PersonalityTrait) -> bool {
        if self.traits.len() >= MAX_PERSONALITY_TRAITS || self.has_trait(personality_trait) {
            return false;
        }
        self.traits.push(personality_trait);
        true
    }

    pub fn has_trait(&self, personality_trait: PersonalityTrait) -> bool {
        self.traits.contains(&personality_trait)
    }

    /// 0.0 to 2.0, 1.0 at the default of 50
    pub fn friendliness_modifier(&self) -> f32 {
        self.friendliness as f32 / 50.0
    }

    pub fn generosity_modifier(&self) -> f32 {
        self.generosity as f32 / 50.0
    }

    pub fn trust_modifier(&self) -> f32 {
        self.trustworthiness as f32 / 50.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftReaction {
    Loved,
    Liked,
    Neutral,
    Disliked,
}

impl GiftReaction {
    pub fn base_affection(&self) -> i32 {
        match self {
            Self::Loved => 15,
            Self::Liked => 10,
            Self::Neutral => 5,
            Self::Disliked => -5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftPreferences {
    pub loved: Vec<String>,
    pub liked: Vec<String>,
    pub disliked: Vec<String>,
}

impl GiftPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn love(mut self, item: &str) -> Self {
        push_capped(&mut self.loved, item);
        self
    }

    pub fn like(mut self, item: &str) -> Self {
        push_capped(&mut self.liked, item);
        self
    }

    pub fn dislike(mut self, item: &str) -> Self {
        push_capped(&mut self.disliked, item);
        self
    }

    pub fn reaction(&self, item: &str) -> GiftReaction {
        let has = |list: &[String]| list.iter().any(|i| i == item);
        if has(&self.loved) {
            GiftReaction::Loved
        } else if has(&self.liked) {
            GiftReaction::Liked
        } else if has(&self.disliked) {
            GiftReaction::Disliked
        } else {
            GiftReaction::Neutral
        }
    }
}

fn push_capped(list: &mut Vec<String>, item: &str) {
    if list.len() < MAX_GIFT_PREFERENCES && !list.iter().any(|i| i == item) {
        list.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_unique() {
        let mut p = Personality::new(EntityId(1));
        assert!(p.add_trait(PersonalityTrait::Friendly));
        assert!(!p.add_trait(PersonalityTrait::Friendly));
        assert!(p.has_trait(PersonalityTrait::Friendly));
        assert!(!p.has_trait(PersonalityTrait::Shy));
    }

    #[test]
    fn test_modifiers_centre_on_one() {
        let mut p = Personality::new(EntityId(1));
        assert!((p.generosity_modifier() - 1.0).abs() < f32::EPSILON);
        p.generosity = 100;
        assert!((p.generosity_modifier() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gift_reactions() {
        let prefs = GiftPreferences::new().love("Hoe").like("Corn").dislike("Stone");
        assert_eq!(prefs.reaction("Hoe"), GiftReaction::Loved);
        assert_eq!(prefs.reaction("Corn"), GiftReaction::Liked);
        assert_eq!(prefs.reaction("Stone"), GiftReaction::Disliked);
        assert_eq!(prefs.reaction("Bread"), GiftReaction::Neutral);
    }
}
