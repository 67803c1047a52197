//! End-to-end scenarios over the public API
//!
//! Each test pins one concrete behaviour with literal inputs:
//! stacking, shop round-trips, trades, routing, turn cadence and the
//! new-day hook.

use village_sim::core::clock::TimeOfDay;
use village_sim::core::config::SimulationConfig;
use village_sim::core::types::{EntityId, ItemId, LocationId, ShopId};
use village_sim::economy::{
    Inventory, Item, ItemCatalog, ItemQuality, PricingStrategy, Shop, TradeOffer, DEFAULT_MAX_WEIGHT,
};
use village_sim::simulation::GameLoop;
use village_sim::social::ConversationTopic;
use village_sim::world::{LocationType, World, WorldLimits};

fn started_village() -> GameLoop {
    let mut game = GameLoop::village(SimulationConfig::default()).unwrap();
    let square = game.sim().world.get_by_name("Village Square").unwrap().id;
    let home = game.sim().world.get_by_name("House 1").unwrap().id;
    game.sim_mut().add_player("Player", square).unwrap();
    game.sim_mut().add_villager("Tom", "Farmer", home).unwrap();
    assert!(game.initialize());
    assert!(game.start());
    game
}

// ============================================================================
// Economy
// ============================================================================

#[test]
fn test_stack_and_split() {
    let catalog = ItemCatalog::with_defaults();
    let wheat = catalog.get("Wheat").unwrap();
    let mut a = Item::new(ItemId(1), "Wheat", 10, ItemQuality::Normal);
    let mut b = Item::new(ItemId(2), "Wheat", 5, ItemQuality::Normal);

    assert!(a.stack(&mut b, wheat));
    assert_eq!(a.quantity, 15);
    assert_eq!(b.quantity, 0);

    let c = a.split(7, ItemId(3)).unwrap();
    assert_eq!(c.quantity, 7);
    assert_eq!(c.id, ItemId(3));
    assert_eq!(a.quantity, 8);
}

#[test]
fn test_shop_buy_sell_round_trip() {
    let catalog = ItemCatalog::with_defaults();
    let mut shop = Shop::new(ShopId(1), "General Store", LocationId(1), None);
    assert_eq!(shop.pricing, PricingStrategy::Fixed);
    shop.add_stock(Item::new(ItemId(1), "Hoe", 1, ItemQuality::Normal)).unwrap();

    let mut buyer = Inventory::new(Some(EntityId(1)), 10, DEFAULT_MAX_WEIGHT);
    buyer.add_currency(100);

    let hoe = shop.stock_item(ItemId(1)).unwrap().clone();
    assert_eq!(shop.sell_price(&hoe, &catalog, 1.0), 60);
    assert_eq!(shop.buy_price(&hoe, &catalog, 1.0), 25);

    assert_eq!(shop.sell_to(&mut buyer, ItemId(1), &catalog, 1.0), Ok(60));
    assert_eq!(buyer.currency, 40);
    assert_eq!(shop.stock_count("Hoe"), 0);

    assert_eq!(shop.buy_from(&mut buyer, ItemId(1), &catalog, 1.0), Ok(25));
    assert_eq!(buyer.currency, 65);
    assert_eq!(shop.stock_count("Hoe"), 1);
}

#[test]
fn test_trade_atomicity() {
    let catalog = ItemCatalog::with_defaults();
    let mut inv1 = Inventory::new(Some(EntityId(1)), 10, DEFAULT_MAX_WEIGHT);
    let mut inv2 = Inventory::new(Some(EntityId(2)), 10, DEFAULT_MAX_WEIGHT);
    inv1.add_currency(100);
    inv2.add_currency(50);

    let mut offer = TradeOffer::new(1, EntityId(1), EntityId(2));
    offer.offer_currency(50);
    offer.execute(&mut inv1, &mut inv2, &catalog).unwrap();
    assert_eq!(inv1.currency, 50);
    assert_eq!(inv2.currency, 100);
    assert!(offer.completed);

    let mut poor = Inventory::new(Some(EntityId(3)), 10, DEFAULT_MAX_WEIGHT);
    poor.add_currency(49);
    let mut rich = Inventory::new(Some(EntityId(4)), 10, DEFAULT_MAX_WEIGHT);
    rich.add_currency(50);
    let mut offer = TradeOffer::new(2, EntityId(3), EntityId(4));
    offer.offer_currency(50);
    assert!(offer.execute(&mut poor, &mut rich, &catalog).is_err());
    assert_eq!(poor.currency, 49);
    assert_eq!(rich.currency, 50);
    assert!(!offer.completed);
}

// ============================================================================
// World
// ============================================================================

#[test]
fn test_bfs_path_with_blocked_edge() {
    let mut world = World::new("Test", 100.0, 100.0, WorldLimits::default());
    let a = world.add_location("A", LocationType::Outdoor, 0.0, 0.0).unwrap();
    let b = world.add_location("B", LocationType::Outdoor, 10.0, 0.0).unwrap();
    let c = world.add_location("C", LocationType::Outdoor, 20.0, 0.0).unwrap();
    world.connect(a, b, 10.0, "").unwrap();
    world.connect(b, c, 10.0, "").unwrap();

    world.set_blocked(b, c, true).unwrap();
    assert!(world.find_path(a, c).is_empty());

    world.set_blocked(b, c, false).unwrap();
    let path = world.find_path(a, c);
    assert_eq!(path, vec![a, b, c]);
    assert_eq!(world.path_distance(&path), 20.0);
}

// ============================================================================
// Engine
// ============================================================================

#[test]
fn test_turn_cadence() {
    let mut game = started_village();
    let before = game.sim().clock.elapsed_periods();
    for _ in 0..5 {
        assert!(game.process_turn());
    }
    assert_eq!(game.turn_count(), 6);
    assert_eq!(game.current_turn(), 6);
    assert_eq!(game.sim().clock.elapsed_periods(), before + 5);
}

#[test]
fn test_new_day_hook() {
    let mut game = started_village();
    let player = EntityId(1);
    let tom = EntityId(2);
    assert!(game.sim_mut().social.converse(player, tom, ConversationTopic::Village));
    game.sim_mut().clock.set_time_of_day(TimeOfDay::Night);
    let day = game.sim().clock.day;

    assert!(game.process_turn());

    let sim = game.sim();
    assert_eq!(sim.clock.day, day + 1);
    assert_eq!(sim.clock.time_of_day, TimeOfDay::Morning);
    assert_eq!(
        sim.social.relationship(player, tom).unwrap().days_since_interaction,
        1
    );
    assert_eq!(sim.agriculture.days_ticked, 1);
}
