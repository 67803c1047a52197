//! Action definitions - what an entity intends to do in a turn

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, LocationId, Plot};
use crate::social::ConversationTopic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Talk,
    Gift,
    Plant,
    Water,
    Harvest,
    Buy,
    Sell,
    Rest,
    Work,
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Movement,
    Social,
    Farming,
    Trade,
    Idle,
}

impl ActionKind {
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionKind::Move => ActionCategory::Movement,
            ActionKind::Talk | ActionKind::Gift => ActionCategory::Social,
            ActionKind::Plant | ActionKind::Water | ActionKind::Harvest => ActionCategory::Farming,
            ActionKind::Buy | ActionKind::Sell => ActionCategory::Trade,
            ActionKind::Rest | ActionKind::Work | ActionKind::Wait => ActionCategory::Idle,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Move => "Move",
            ActionKind::Talk => "Talk",
            ActionKind::Gift => "Gift",
            ActionKind::Plant => "Plant",
            ActionKind::Water => "Water",
            ActionKind::Harvest => "Harvest",
            ActionKind::Buy => "Buy",
            ActionKind::Sell => "Sell",
            ActionKind::Rest => "Rest",
            ActionKind::Work => "Work",
            ActionKind::Wait => "Wait",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome recorded on an action once the engine has handled it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    /// Side effects applied
    Success,
    /// A subsystem refused; nothing changed
    Failed,
    /// Rejected before reaching any subsystem
    Invalid,
    /// Preconditions held but a transient condition got in the way
    Blocked,
}

impl ActionResult {
    pub fn name(&self) -> &'static str {
        match self {
            ActionResult::Success => "Success",
            ActionResult::Failed => "Failed",
            ActionResult::Invalid => "Invalid",
            ActionResult::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Chosen by whoever builds the action; not required to be unique
    pub id: u32,
    pub actor: EntityId,
    pub kind: ActionKind,
    pub target_entity: Option<EntityId>,
    pub target_location: Option<LocationId>,
    pub target_plot: Option<Plot>,
    pub target_item: Option<String>,
    /// Conversation subject for `Talk`; weather when unset
    pub topic: Option<ConversationTopic>,
    pub result: Option<ActionResult>,
    pub message: String,
    pub turn_number: u32,
}

impl Action {
    pub fn new(id: u32, actor: EntityId, kind: ActionKind) -> Self {
        Self {
            id,
            actor,
            kind,
            target_entity: None,
            target_location: None,
            target_plot: None,
            target_item: None,
            topic: None,
            result: None,
            message: String::new(),
            turn_number: 0,
        }
    }

    pub fn wait(id: u32, actor: EntityId) -> Self {
        Self::new(id, actor, ActionKind::Wait)
    }

    pub fn move_to(id: u32, actor: EntityId, location: LocationId) -> Self {
        Self::new(id, actor, ActionKind::Move).with_location(location)
    }

    pub fn talk(id: u32, actor: EntityId, target: EntityId, topic: ConversationTopic) -> Self {
        let mut action = Self::new(id, actor, ActionKind::Talk).with_entity(target);
        action.topic = Some(topic);
        action
    }

    pub fn gift(id: u32, actor: EntityId, target: EntityId, item: &str) -> Self {
        Self::new(id, actor, ActionKind::Gift).with_entity(target).with_item(item)
    }

    pub fn plant(id: u32, actor: EntityId, plot: Plot, seed: &str) -> Self {
        Self::new(id, actor, ActionKind::Plant).with_plot(plot).with_item(seed)
    }

    pub fn with_entity(mut self, target: EntityId) -> Self {
        self.target_entity = Some(target);
        self
    }

    pub fn with_location(mut self, target: LocationId) -> Self {
        self.target_location = Some(target);
        self
    }

    pub fn with_plot(mut self, plot: Plot) -> Self {
        self.target_plot = Some(plot);
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.target_item = Some(item.into());
        self
    }

    pub fn resolve(&mut self, result: ActionResult, message: impl Into<String>) {
        self.result = Some(result);
        self.message = message.into();
    }

    pub fn succeeded(&self) -> bool {
        self.result == Some(ActionResult::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_targets() {
        let action = Action::plant(3, EntityId(1), Plot::new(2, 4), "Wheat Seeds");
        assert_eq!(action.kind, ActionKind::Plant);
        assert_eq!(action.target_plot, Some(Plot::new(2, 4)));
        assert_eq!(action.target_item.as_deref(), Some("Wheat Seeds"));
        assert!(action.result.is_none());
    }

    #[test]
    fn test_resolve_records_outcome() {
        let mut action = Action::wait(1, EntityId(1));
        action.resolve(ActionResult::Success, "Completed");
        assert!(action.succeeded());
        assert_eq!(action.message, "Completed");
    }

    #[test]
    fn test_categories() {
        assert_eq!(ActionKind::Harvest.category(), ActionCategory::Farming);
        assert_eq!(ActionKind::Sell.category(), ActionCategory::Trade);
        assert_eq!(ActionKind::Wait.category(), ActionCategory::Idle);
    }
}
