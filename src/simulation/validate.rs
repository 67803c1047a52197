//! Action validation - precondition checks that run before any side effect

use thiserror::Error;

use super::action::{Action, ActionKind};
use super::game_loop::Simulation;
use crate::core::types::{EntityId, LocationId, Plot};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Actor {0} does not exist or is inactive")]
    InactiveActor(EntityId),

    #[error("{0} action needs a {1}")]
    MissingTarget(ActionKind, &'static str),

    #[error("Actor {0} is not in the world")]
    NotInWorld(EntityId),

    #[error("Unknown location {0}")]
    UnknownLocation(LocationId),

    #[error("No open route from {from} to {to}")]
    NoRoute { from: LocationId, to: LocationId },

    #[error("Location {0} is full")]
    LocationFull(LocationId),

    #[error("Target {0} does not exist or is inactive")]
    InactiveTarget(EntityId),

    #[error("Invalid plot {0}")]
    InvalidPlot(Plot),

    #[error("Cannot farm at location {0}")]
    NotFarmland(LocationId),

    #[error("Cannot shop at location {0}")]
    NotShop(LocationId),

    #[error("The shop does not stock {0}")]
    NotStocked(String),

    #[error("Actor does not hold {0}")]
    NotHeld(String),
}

/// Check an action's preconditions against the current state
pub fn validate(action: &Action, sim: &Simulation) -> Result<(), ValidationError> {
    if !sim.registry.is_active(action.actor) {
        return Err(ValidationError::InactiveActor(action.actor));
    }

    match action.kind {
        ActionKind::Move => validate_move(action, sim),
        ActionKind::Talk | ActionKind::Gift => {
            let target = action
                .target_entity
                .ok_or(ValidationError::MissingTarget(action.kind, "target entity"))?;
            if !sim.registry.is_active(target) {
                return Err(ValidationError::InactiveTarget(target));
            }
            if action.kind == ActionKind::Gift && action.target_item.is_none() {
                return Err(ValidationError::MissingTarget(action.kind, "gift item"));
            }
            Ok(())
        }
        ActionKind::Plant | ActionKind::Water | ActionKind::Harvest => {
            let plot = action
                .target_plot
                .ok_or(ValidationError::MissingTarget(action.kind, "plot"))?;
            if !plot.is_valid() {
                return Err(ValidationError::InvalidPlot(plot));
            }
            let here = current_location(action.actor, sim)?;
            if !sim.world.get(here).is_some_and(|l| l.can_farm) {
                return Err(ValidationError::NotFarmland(here));
            }
            Ok(())
        }
        ActionKind::Buy | ActionKind::Sell => validate_trade(action, sim),
        ActionKind::Rest | ActionKind::Work | ActionKind::Wait => Ok(()),
    }
}

fn current_location(actor: EntityId, sim: &Simulation) -> Result<LocationId, ValidationError> {
    sim.world
        .entity_location(actor)
        .ok_or(ValidationError::NotInWorld(actor))
}

fn validate_move(action: &Action, sim: &Simulation) -> Result<(), ValidationError> {
    let to = action
        .target_location
        .ok_or(ValidationError::MissingTarget(ActionKind::Move, "target location"))?;
    let from = current_location(action.actor, sim)?;
    let here = sim.world.get(from).ok_or(ValidationError::UnknownLocation(from))?;
    if sim.world.get(to).is_none() {
        return Err(ValidationError::UnknownLocation(to));
    }
    if !here.connection_to(to).is_some_and(|c| !c.blocked) {
        return Err(ValidationError::NoRoute { from, to });
    }
    if !sim.world.has_room(to) {
        return Err(ValidationError::LocationFull(to));
    }
    Ok(())
}

fn validate_trade(action: &Action, sim: &Simulation) -> Result<(), ValidationError> {
    let item = action
        .target_item
        .as_deref()
        .ok_or(ValidationError::MissingTarget(action.kind, "item"))?;
    let here = current_location(action.actor, sim)?;
    if !sim.world.get(here).is_some_and(|l| l.can_shop) {
        return Err(ValidationError::NotShop(here));
    }
    let shop = sim
        .economy
        .find_shop_at(here)
        .ok_or(ValidationError::NotShop(here))?;

    if action.kind == ActionKind::Buy {
        if shop.find_stock(item).is_none() {
            return Err(ValidationError::NotStocked(item.to_string()));
        }
    } else if !sim
        .economy
        .inventory(action.actor)
        .is_some_and(|inv| inv.find(item).is_some())
    {
        return Err(ValidationError::NotHeld(item.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::world::{World, WorldLimits};

    fn village() -> (Simulation, EntityId) {
        let config = SimulationConfig::default();
        let world = World::farming_village(WorldLimits::from_config(&config)).unwrap();
        let mut sim = Simulation::with_world(&config, world);
        let square = sim.world.get_by_name("Village Square").unwrap().id;
        let player = sim.add_player("Player", square).unwrap();
        (sim, player)
    }

    fn location(sim: &Simulation, name: &str) -> LocationId {
        sim.world.get_by_name(name).unwrap().id
    }

    #[test]
    fn test_move_needs_open_route() {
        let (mut sim, player) = village();
        let store = location(&sim, "General Store");
        let barn = location(&sim, "Barn");
        assert!(validate(&Action::move_to(1, player, store), &sim).is_ok());
        assert!(matches!(
            validate(&Action::move_to(1, player, barn), &sim),
            Err(ValidationError::NoRoute { .. })
        ));
        let square = location(&sim, "Village Square");
        sim.world.set_blocked(square, store, true).unwrap();
        assert!(validate(&Action::move_to(1, player, store), &sim).is_err());
        assert_eq!(
            validate(&Action::new(1, player, ActionKind::Move), &sim),
            Err(ValidationError::MissingTarget(ActionKind::Move, "target location"))
        );
    }

    #[test]
    fn test_farming_needs_farmland() {
        let (mut sim, player) = village();
        let action = Action::plant(1, player, Plot::new(0, 0), "Wheat Seeds");
        assert!(matches!(validate(&action, &sim), Err(ValidationError::NotFarmland(_))));

        let field = location(&sim, "West Field");
        sim.place_entity(player, field).unwrap();
        assert!(validate(&action, &sim).is_ok());
        let bad = Action::plant(1, player, Plot::new(-1, 0), "Wheat Seeds");
        assert!(matches!(validate(&bad, &sim), Err(ValidationError::InvalidPlot(_))));
    }

    #[test]
    fn test_social_targets_must_be_active() {
        let (mut sim, player) = village();
        let other = sim.registry.spawn_villager("Tom", "Farmer").unwrap();
        let talk = Action::talk(1, player, other, crate::social::ConversationTopic::Farming);
        assert!(validate(&talk, &sim).is_ok());
        sim.registry.set_active(other, false).unwrap();
        assert_eq!(validate(&talk, &sim), Err(ValidationError::InactiveTarget(other)));

        let gift = Action::new(1, player, ActionKind::Gift).with_entity(other);
        assert!(validate(&gift, &sim).is_err());
    }

    #[test]
    fn test_idle_actions_always_pass() {
        let (sim, player) = village();
        for kind in [ActionKind::Rest, ActionKind::Work, ActionKind::Wait] {
            assert!(validate(&Action::new(1, player, kind), &sim).is_ok());
        }
    }
}
