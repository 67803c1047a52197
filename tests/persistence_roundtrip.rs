//! Save/load round trips for snapshots and individual object shapes

use village_sim::core::config::SimulationConfig;
use village_sim::core::types::{EntityId, ItemId};
use village_sim::economy::{Inventory, Item, ItemCatalog, ItemQuality, DEFAULT_MAX_WEIGHT};
use village_sim::ecs::component::{Component, Currency, Health};
use village_sim::persistence::Snapshot;
use village_sim::simulation::{Action, GameLoop, ScriptedDecider};
use village_sim::social::ConversationTopic;

fn played_village() -> GameLoop {
    let mut game = GameLoop::village(SimulationConfig::default()).unwrap();
    let square = game.sim().world.get_by_name("Village Square").unwrap().id;
    let home = game.sim().world.get_by_name("House 1").unwrap().id;
    let player = game.sim_mut().add_player("Player", square).unwrap();
    let tom = game.sim_mut().add_villager("Tom", "Farmer", home).unwrap();
    game.sim_mut().economy.give_item(player, "Corn", 3).unwrap();
    assert!(game.initialize());

    let mut decider = ScriptedDecider::new();
    decider.plan(Action::talk(1, player, tom, ConversationTopic::Weather));
    game.set_decider(Box::new(decider));
    assert!(game.start());
    game.run(6);
    game
}

#[test]
fn test_snapshot_round_trip_is_identity() {
    let game = played_village();
    let snapshot = Snapshot::capture(game.sim());
    let json = snapshot.to_json().unwrap();

    let restored = Snapshot::from_json(&json)
        .unwrap()
        .restore(&SimulationConfig::default())
        .unwrap();

    assert_eq!(restored.clock, game.sim().clock);
    assert_eq!(
        restored.registry.iter().collect::<Vec<_>>(),
        game.sim().registry.iter().collect::<Vec<_>>()
    );
    assert_eq!(
        restored.world.iter().collect::<Vec<_>>(),
        game.sim().world.iter().collect::<Vec<_>>()
    );
    assert_eq!(restored.economy.shops(), game.sim().economy.shops());
    assert_eq!(restored.economy.inventories(), game.sim().economy.inventories());
    assert_eq!(Snapshot::capture(&restored).to_json().unwrap(), json);
}

#[test]
fn test_social_profiles_survive_round_trip() {
    let game = played_village();
    let tom = EntityId(2);
    let json = Snapshot::capture(game.sim()).to_json().unwrap();
    let restored = Snapshot::from_json(&json)
        .unwrap()
        .restore(&SimulationConfig::default())
        .unwrap();

    let before = &game.sim().social;
    let after = &restored.social;
    assert!(after.personality(tom).is_some());
    assert_eq!(after.personality(tom), before.personality(tom));
    assert_eq!(after.gift_preferences(tom), before.gift_preferences(tom));
    for item in ["Corn", "Bread", "Wheat", "Stone"] {
        assert_eq!(after.gift_affection(tom, item, 12), before.gift_affection(tom, item, 12));
    }
}

#[test]
fn test_next_ids_follow_loaded_maximum() {
    let game = played_village();
    let json = Snapshot::capture(game.sim()).to_json().unwrap();
    let mut restored = Snapshot::from_json(&json)
        .unwrap()
        .restore(&SimulationConfig::default())
        .unwrap();

    assert_eq!(restored.registry.next_id(), EntityId(3));
    let id = restored.registry.create_entity("Newcomer", "Villager").unwrap();
    assert_eq!(id, EntityId(3));
}

#[test]
fn test_restored_engine_keeps_running() {
    let game = played_village();
    let day = game.sim().clock.day;
    let sim = Snapshot::capture(game.sim())
        .restore(&SimulationConfig::default())
        .unwrap();
    let mut resumed = GameLoop::from_parts(SimulationConfig::default(), sim);
    assert!(resumed.initialize());
    assert!(resumed.start());
    assert_eq!(resumed.sim().economy.shops().len(), 1);
    assert_eq!(resumed.run(4), 4);
    assert_eq!(resumed.sim().clock.day, day + 1);
}

#[test]
fn test_component_json_is_tagged() {
    let mut component = Component::new(Health::new(80));
    component.entity_id = Some(EntityId(4));
    let value = serde_json::to_value(&component).unwrap();
    assert_eq!(value["type"], "health");
    assert_eq!(value["entity_id"], 4);
    assert_eq!(value["current"], 80);

    let back: Component = serde_json::from_value(value).unwrap();
    assert_eq!(back, component);

    let currency: Component = serde_json::from_str(r#"{"type":"currency","entity_id":null,"amount":7}"#).unwrap();
    assert_eq!(currency.typed::<Currency>().map(|c| c.amount), Some(7));
}

#[test]
fn test_inventory_json_shape() {
    let catalog = ItemCatalog::with_defaults();
    let mut inventory = Inventory::new(Some(EntityId(2)), 5, DEFAULT_MAX_WEIGHT);
    inventory.add_currency(12);
    inventory
        .add_item(Item::new(ItemId(9), "Bread", 2, ItemQuality::Good), &catalog)
        .unwrap();

    let value = serde_json::to_value(&inventory).unwrap();
    for field in ["entity_id", "items", "max_slots", "total_weight", "max_weight", "currency"] {
        assert!(value.get(field).is_some(), "missing {}", field);
    }
    let item = &value["items"][0];
    assert_eq!(item["item_name"], "Bread");
    assert_eq!(item["entity_id"], 2);

    let back: Inventory = serde_json::from_value(value).unwrap();
    assert_eq!(back, inventory);
}
