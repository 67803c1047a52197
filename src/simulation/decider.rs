//! Deciders - choose what each entity does in a turn

use std::collections::VecDeque;

use ahash::AHashMap;

use super::action::Action;
use super::decision::Decision;
use super::game_loop::Simulation;
use crate::core::types::EntityId;
use crate::ecs::Entity;

/// Picks an action for one entity, given read-only access to the world
///
/// Returning `None` means the entity sits the turn out and nothing is logged.
pub trait Decider {
    fn decide(&mut self, entity: &Entity, sim: &Simulation) -> Option<Action>;

    /// The chosen action together with the options weighed and why;
    /// the game loop logs this for every entity that acts
    fn deliberate(&mut self, entity: &Entity, sim: &Simulation) -> Option<Decision> {
        let action = self.decide(entity, sim)?;
        Some(Decision::single(action, "No alternatives considered"))
    }
}

/// Every entity waits
#[derive(Debug, Default)]
pub struct IdleDecider {
    next_action_id: u32,
}

impl Decider for IdleDecider {
    fn decide(&mut self, entity: &Entity, _sim: &Simulation) -> Option<Action> {
        self.next_action_id += 1;
        Some(Action::wait(self.next_action_id, entity.id))
    }

    fn deliberate(&mut self, entity: &Entity, sim: &Simulation) -> Option<Decision> {
        let action = self.decide(entity, sim)?;
        Some(Decision::single(action, "Nothing to do"))
    }
}

/// Replays queued actions per entity, one per turn
#[derive(Debug, Default)]
pub struct ScriptedDecider {
    plans: AHashMap<EntityId, VecDeque<Action>>,
}

impl ScriptedDecider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&mut self, action: Action) {
        self.plans.entry(action.actor).or_default().push_back(action);
    }

    pub fn pending(&self, entity: EntityId) -> usize {
        self.plans.get(&entity).map_or(0, |q| q.len())
    }
}

impl Decider for ScriptedDecider {
    fn decide(&mut self, entity: &Entity, _sim: &Simulation) -> Option<Action> {
        self.plans.get_mut(&entity.id)?.pop_front()
    }

    fn deliberate(&mut self, entity: &Entity, sim: &Simulation) -> Option<Decision> {
        let action = self.decide(entity, sim)?;
        let remaining = self.pending(entity.id);
        Some(Decision::single(action, format!("Scripted, {} more queued", remaining)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::simulation::ActionKind;

    fn sim_with_two() -> (Simulation, EntityId, EntityId) {
        let mut sim = Simulation::new(&SimulationConfig::default());
        let a = sim.registry.spawn_villager("Ann", "Farmer").unwrap();
        let b = sim.registry.spawn_villager("Ben", "Baker").unwrap();
        (sim, a, b)
    }

    #[test]
    fn test_idle_numbers_actions() {
        let (sim, a, b) = sim_with_two();
        let mut decider = IdleDecider::default();
        let first = decider.decide(sim.registry.entity(a).unwrap(), &sim).unwrap();
        let second = decider.decide(sim.registry.entity(b).unwrap(), &sim).unwrap();
        assert_eq!((first.id, first.actor, first.kind), (1, a, ActionKind::Wait));
        assert_eq!((second.id, second.actor), (2, b));
    }

    #[test]
    fn test_scripted_replays_in_order_per_entity() {
        let (sim, a, b) = sim_with_two();
        let mut decider = ScriptedDecider::new();
        decider.plan(Action::wait(1, a));
        decider.plan(Action::new(2, b, ActionKind::Rest));
        decider.plan(Action::new(3, a, ActionKind::Work));
        assert_eq!(decider.pending(a), 2);
        assert_eq!(decider.pending(b), 1);

        let ann = sim.registry.entity(a).unwrap();
        let ben = sim.registry.entity(b).unwrap();
        assert_eq!(decider.decide(ann, &sim).unwrap().id, 1);
        assert_eq!(decider.decide(ben, &sim).unwrap().kind, ActionKind::Rest);
        assert_eq!(decider.decide(ann, &sim).unwrap().kind, ActionKind::Work);
        assert_eq!(decider.pending(a), 0);
    }

    #[test]
    fn test_scripted_exhausted_yields_none() {
        let (sim, a, b) = sim_with_two();
        let mut decider = ScriptedDecider::new();
        decider.plan(Action::wait(1, a));

        let ann = sim.registry.entity(a).unwrap();
        let decision = decider.deliberate(ann, &sim).unwrap();
        assert_eq!(decision.reasoning, "Scripted, 0 more queued");
        assert_eq!(decision.options.len(), 1);
        assert!(decider.deliberate(ann, &sim).is_none());
        assert!(decider.decide(sim.registry.entity(b).unwrap(), &sim).is_none());
        assert_eq!(decider.pending(b), 0);
    }
}
