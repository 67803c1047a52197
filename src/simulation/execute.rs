//! Action execution - applies a validated action to the simulation
//!
//! Each executor either applies all of its side effects or none of them;
//! refusals are reported through the action's result and message.

use super::action::{Action, ActionKind, ActionResult};
use super::game_loop::Simulation;
use crate::core::error::SimError;
use crate::core::types::{EntityId, LocationId, Plot};
use crate::ecs::component::{self, ComponentKind, Memory, Needs, Position};
use crate::event::{EventSubtype, GameEvent};
use crate::social::ConversationTopic;

/// Energy regained by resting for one period
pub const REST_ENERGY: f32 = 30.0;
/// Social need met by a conversation or a gift
pub const SOCIAL_GAIN: f32 = 10.0;
/// Gift value used when the item is not in the catalogue
pub const DEFAULT_GIFT_VALUE: u32 = 10;

/// Execute `action`, recording its result and message
pub fn execute(action: &mut Action, sim: &mut Simulation) {
    let (result, message) = match action.kind {
        ActionKind::Move => execute_move(action, sim),
        ActionKind::Talk => execute_talk(action, sim),
        ActionKind::Gift => execute_gift(action, sim),
        ActionKind::Plant => execute_plant(action, sim),
        ActionKind::Water => execute_water(action, sim),
        ActionKind::Harvest => execute_harvest(action, sim),
        ActionKind::Buy => execute_buy(action, sim),
        ActionKind::Sell => execute_sell(action, sim),
        ActionKind::Rest => {
            if let Some(needs) = sim.registry.component_mut::<Needs>(action.actor) {
                needs.rest(REST_ENERGY);
            }
            (ActionResult::Success, "Rested".to_string())
        }
        ActionKind::Work => (ActionResult::Success, "Worked".to_string()),
        ActionKind::Wait => (ActionResult::Success, "Waited".to_string()),
    };
    action.resolve(result, message);
}

type Outcome = (ActionResult, String);

fn failed(message: impl ToString) -> Outcome {
    (ActionResult::Failed, message.to_string())
}

fn display_name(sim: &Simulation, entity: EntityId) -> String {
    sim.registry
        .entity(entity)
        .map_or_else(|| format!("entity {}", entity), |e| e.name.clone())
}

fn remember(sim: &mut Simulation, entity: EntityId, text: String) {
    let (day, time_of_day) = (sim.clock.day, sim.clock.time_of_day);
    if let Some(memory) = sim.registry.component_mut::<Memory>(entity) {
        memory.remember(text, day, time_of_day);
    }
}

fn socialize(sim: &mut Simulation, entity: EntityId) {
    if let Some(needs) = sim.registry.component_mut::<Needs>(entity) {
        needs.socialize(SOCIAL_GAIN);
    }
}

fn location_and_plot(action: &Action, sim: &Simulation) -> Result<(LocationId, Plot), Outcome> {
    let here = sim
        .world
        .entity_location(action.actor)
        .ok_or_else(|| failed("Entity not in world"))?;
    let plot = action.target_plot.ok_or_else(|| failed("No plot given"))?;
    Ok((here, plot))
}

fn execute_move(action: &Action, sim: &mut Simulation) -> Outcome {
    let Some(to) = action.target_location else {
        return failed("No destination");
    };
    let from = sim.world.entity_location(action.actor);
    match sim.world.move_entity(action.actor, from, to) {
        Ok(()) => {
            let Some(location) = sim.world.get(to) else {
                return failed(SimError::LocationNotFound(to));
            };
            let name = location.name.clone();
            let center = location.center();
            if let Some(position) = sim.registry.component_mut::<Position>(action.actor) {
                position.set(name.as_str(), center.x, center.y);
            }
            let mover = display_name(sim, action.actor);
            sim.emit(
                GameEvent::new(
                    EventSubtype::EntityMoved,
                    Some(action.actor),
                    format!("{} moved to {}", mover, name),
                )
                .with_location(name.as_str()),
            );
            (ActionResult::Success, format!("Moved to {}", name))
        }
        Err(e @ SimError::LocationFull(_)) => (ActionResult::Blocked, e.to_string()),
        Err(e) => failed(e),
    }
}

fn execute_talk(action: &Action, sim: &mut Simulation) -> Outcome {
    let Some(target) = action.target_entity else {
        return failed("No one to talk to");
    };
    let topic = action.topic.unwrap_or(ConversationTopic::Weather);
    let before = sim.social.affection(action.actor, target);
    if !sim.social.converse(action.actor, target, topic) {
        return failed("Conversation failed");
    }
    let after = sim.social.affection(action.actor, target);

    let speaker = display_name(sim, action.actor);
    let listener = display_name(sim, target);
    sim.emit(
        GameEvent::new(
            EventSubtype::ConversationStarted,
            Some(action.actor),
            format!("{} talked with {} about {}", speaker, listener, topic.name()),
        )
        .with_target(target),
    );
    sim.emit(GameEvent::relationship_change(action.actor, target, before, after, "conversation"));
    socialize(sim, action.actor);
    socialize(sim, target);
    remember(sim, action.actor, format!("Talked with {} about {}", listener, topic.name()));
    remember(sim, target, format!("Talked with {} about {}", speaker, topic.name()));
    (ActionResult::Success, format!("Talked with {}", listener))
}

fn execute_gift(action: &Action, sim: &mut Simulation) -> Outcome {
    let (Some(target), Some(item)) = (action.target_entity, action.target_item.as_deref()) else {
        return failed("Nothing to give");
    };
    let value = sim
        .economy
        .catalog()
        .get(item)
        .map_or(DEFAULT_GIFT_VALUE, |def| def.base_value);

    // Stage the unit transfer so a refused gift leaves both packs untouched
    let Some(mut giver) = sim
        .registry
        .component::<component::Inventory>(action.actor)
        .filter(|pack| pack.has_item(item, 1))
        .cloned()
    else {
        return failed(format!("You don't have {}", item));
    };
    let receiver_pack = sim.registry.component::<component::Inventory>(target);
    if receiver_pack.is_none() && !sim.registry.can_attach(target, ComponentKind::Inventory) {
        return (
            ActionResult::Blocked,
            format!("{} cannot carry {}", display_name(sim, target), item),
        );
    }
    let mut receiver = receiver_pack.cloned().unwrap_or_default();
    giver.remove_item(item, 1);
    if !receiver.add_item(item, 1) {
        return (
            ActionResult::Blocked,
            format!("{} cannot carry {}", display_name(sim, target), item),
        );
    }

    let before = sim.social.affection(action.actor, target);
    if !sim.social.give_gift(action.actor, target, item, value) {
        return failed("Gift giving failed");
    }
    let after = sim.social.affection(action.actor, target);

    match sim.registry.component_mut::<component::Inventory>(target) {
        Some(pack) => *pack = receiver,
        None => {
            if let Err(e) = sim.registry.attach(target, receiver) {
                tracing::warn!(target = %target, error = %e, "gift receiver lost its room for an inventory");
                return failed(e);
            }
        }
    }
    if let Some(pack) = sim.registry.component_mut::<component::Inventory>(action.actor) {
        *pack = giver;
    }

    let giver_name = display_name(sim, action.actor);
    let receiver_name = display_name(sim, target);
    sim.emit(
        GameEvent::new(
            EventSubtype::GiftGiven,
            Some(action.actor),
            format!("{} gave {} to {}", giver_name, item, receiver_name),
        )
        .with_target(target),
    );
    sim.emit(GameEvent::relationship_change(action.actor, target, before, after, "gift"));
    socialize(sim, action.actor);
    socialize(sim, target);
    remember(sim, action.actor, format!("Gave {} to {}", item, receiver_name));
    remember(sim, target, format!("Received {} from {}", item, giver_name));
    (ActionResult::Success, format!("Gave {} to {}", item, receiver_name))
}

fn execute_plant(action: &Action, sim: &mut Simulation) -> Outcome {
    let (here, plot) = match location_and_plot(action, sim) {
        Ok(found) => found,
        Err(outcome) => return outcome,
    };
    let Some(seed) = action.target_item.as_deref() else {
        return failed("No seed to plant");
    };
    match sim.agriculture.plant(here, plot, seed, Some(action.actor)) {
        Ok(_) => {
            sim.emit(GameEvent::crop_action(EventSubtype::CropPlanted, action.actor, seed, plot));
            (ActionResult::Success, format!("Planted {} at {}", seed, plot))
        }
        Err(e) => failed(e),
    }
}

fn execute_water(action: &Action, sim: &mut Simulation) -> Outcome {
    let (here, plot) = match location_and_plot(action, sim) {
        Ok(found) => found,
        Err(outcome) => return outcome,
    };
    let crop_name = sim
        .agriculture
        .crop_at(here, plot)
        .map_or_else(|| "crop".to_string(), |c| c.crop_type.clone());
    match sim.agriculture.water(here, plot) {
        Ok(()) => {
            sim.emit(GameEvent::crop_action(EventSubtype::CropWatered, action.actor, &crop_name, plot));
            (ActionResult::Success, format!("Watered crop at {}", plot))
        }
        Err(e) => failed(e),
    }
}

fn execute_harvest(action: &Action, sim: &mut Simulation) -> Outcome {
    let (here, plot) = match location_and_plot(action, sim) {
        Ok(found) => found,
        Err(outcome) => return outcome,
    };
    let Some((crop_name, quantity)) = sim
        .agriculture
        .crop_at(here, plot)
        .map(|c| (c.crop_type.clone(), c.predicted_yield))
    else {
        return failed(format!("Nothing is growing at plot {}", plot));
    };
    let Some(mut pack) = sim.registry.component::<component::Inventory>(action.actor).cloned() else {
        return (ActionResult::Blocked, "No inventory to carry the harvest".to_string());
    };
    if quantity > 0 && !pack.add_item(&crop_name, quantity) {
        return (ActionResult::Blocked, "Inventory full".to_string());
    }

    match sim.agriculture.harvest(here, plot) {
        Ok(harvest) => {
            if let Some(carried) = sim.registry.component_mut::<component::Inventory>(action.actor) {
                *carried = pack;
            }
            sim.emit(GameEvent::crop_action(
                EventSubtype::CropHarvested,
                action.actor,
                &harvest.crop_name,
                plot,
            ));
            (
                ActionResult::Success,
                format!("Harvested {} {}", harvest.quantity, harvest.crop_name),
            )
        }
        Err(e) => failed(e),
    }
}

fn execute_buy(action: &Action, sim: &mut Simulation) -> Outcome {
    let Some(item) = action.target_item.as_deref() else {
        return failed("Nothing to buy");
    };
    let Some(shop) = sim
        .world
        .entity_location(action.actor)
        .and_then(|here| sim.economy.find_shop_at(here))
        .map(|s| s.id)
    else {
        return failed("No shop here");
    };
    match sim.economy.purchase(shop, action.actor, item) {
        Ok(price) => {
            sim.emit(GameEvent::trade(action.actor, item, price, true, "purchase"));
            sim.emit(GameEvent::currency(action.actor, price, false, format!("Bought {}", item)));
            (ActionResult::Success, format!("Bought {} for {}", item, price))
        }
        Err(e) => {
            sim.emit(GameEvent::trade(action.actor, item, 0, false, e.to_string()));
            failed(e)
        }
    }
}

fn execute_sell(action: &Action, sim: &mut Simulation) -> Outcome {
    let Some(item) = action.target_item.as_deref() else {
        return failed("Nothing to sell");
    };
    let Some(shop) = sim
        .world
        .entity_location(action.actor)
        .and_then(|here| sim.economy.find_shop_at(here))
        .map(|s| s.id)
    else {
        return failed("No shop here");
    };
    match sim.economy.sell_goods(shop, action.actor, item) {
        Ok(price) => {
            sim.emit(GameEvent::trade(action.actor, item, price, true, "sale"));
            sim.emit(GameEvent::currency(action.actor, price, true, format!("Sold {}", item)));
            (ActionResult::Success, format!("Sold {} for {}", item, price))
        }
        Err(e) => {
            sim.emit(GameEvent::trade(action.actor, item, 0, false, e.to_string()));
            failed(e)
        }
    }
}
