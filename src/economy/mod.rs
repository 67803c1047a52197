//! Economy manager - item catalogue, shops, inventories and trades
//!
//! Entity inventories are held here, keyed by entity, so the turn engine can
//! resolve a buyer or seller by ID. Every transfer is all-or-nothing.

pub mod inventory;
pub mod item;
pub mod shop;
pub mod trade;

pub use inventory::{Inventory, DEFAULT_MAX_WEIGHT};
pub use item::{Item, ItemCatalog, ItemDefinition, ItemQuality, ItemType};
pub use shop::{PricingStrategy, Shop};
pub use trade::TradeOffer;

use ahash::AHashMap;
use thiserror::Error;

use crate::core::config::SimulationConfig;
use crate::core::types::{EntityId, ItemId, LocationId, ShopId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    #[error("Not enough money: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },

    #[error("Shop cannot pay {needed}, has {available}")]
    ShopOutOfFunds { needed: u32, available: u32 },

    #[error("No free inventory slot")]
    NoSpace,

    #[error("Too heavy: {needed}g to carry, {available}g free")]
    TooHeavy { needed: u32, available: u32 },

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Item not stocked: {0}")]
    NotStocked(String),

    #[error("Shop not found: {0}")]
    ShopNotFound(ShopId),

    #[error("Shop {0} has no room for more stock")]
    ShopFull(ShopId),

    #[error("Economy already hosts {0} shops")]
    TooManyShops(usize),

    #[error("No inventory for entity {0}")]
    NoInventory(EntityId),

    #[error("Invalid quantity: {0}")]
    BadQuantity(u32),

    #[error("Trade offer {0} is already settled")]
    OfferSettled(u32),
}

#[derive(Debug, Clone)]
pub struct EconomyManager {
    catalog: ItemCatalog,
    shops: Vec<Shop>,
    inventories: AHashMap<EntityId, Inventory>,
    next_item_id: u32,
    next_shop_id: u32,
    next_trade_id: u32,
    pub global_price_modifier: f32,
    max_shops: usize,
    max_shop_stock: usize,
    max_inventory_slots: usize,
}

impl EconomyManager {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            catalog: ItemCatalog::new(),
            shops: Vec::new(),
            inventories: AHashMap::new(),
            next_item_id: 1,
            next_shop_id: 1,
            next_trade_id: 1,
            global_price_modifier: 1.0,
            max_shops: config.max_shops,
            max_shop_stock: config.max_shop_stock,
            max_inventory_slots: config.max_inventory_slots,
        }
    }

    /// Manager with the default item catalogue registered
    pub fn with_default_items(config: &SimulationConfig) -> Self {
        let mut manager = Self::new(config);
        manager.catalog = ItemCatalog::with_defaults();
        manager
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn register_item(&mut self, definition: ItemDefinition) {
        self.catalog.register(definition);
    }

    /// Mint a new item instance of a registered definition
    pub fn create_item(&mut self, name: &str, quantity: u32, quality: ItemQuality) -> Result<Item, EconomyError> {
        if self.catalog.get(name).is_none() {
            return Err(EconomyError::UnknownItem(name.to_string()));
        }
        if quantity == 0 {
            return Err(EconomyError::BadQuantity(0));
        }
        Ok(Item::new(self.allocate_item_id(), name, quantity, quality))
    }

    fn allocate_item_id(&mut self) -> ItemId {
        let id = ItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    // ========================================================================
    // SHOPS
    // ========================================================================

    pub fn create_shop(
        &mut self,
        name: &str,
        location: LocationId,
        owner: Option<EntityId>,
    ) -> Result<ShopId, EconomyError> {
        if self.shops.len() >= self.max_shops {
            return Err(EconomyError::TooManyShops(self.max_shops));
        }
        let id = ShopId(self.next_shop_id);
        self.next_shop_id += 1;
        let mut shop = Shop::new(id, name, location, owner);
        shop.max_stock = self.max_shop_stock;
        self.shops.push(shop);
        tracing::debug!(shop = %id, name, location = %location, "opened shop");
        Ok(id)
    }

    /// Register a shop that already has an ID (used when loading)
    pub fn insert_shop(&mut self, shop: Shop) -> Result<(), EconomyError> {
        if let Some(existing) = self.shops.iter_mut().find(|s| s.id == shop.id) {
            *existing = shop;
            return Ok(());
        }
        if self.shops.len() >= self.max_shops {
            return Err(EconomyError::TooManyShops(self.max_shops));
        }
        self.next_shop_id = self.next_shop_id.max(shop.id.0 + 1);
        let highest_item = shop.stock.iter().map(|i| i.id.0).max().unwrap_or(0);
        self.next_item_id = self.next_item_id.max(highest_item + 1);
        self.shops.push(shop);
        Ok(())
    }

    pub fn shop(&self, id: ShopId) -> Option<&Shop> {
        self.shops.iter().find(|s| s.id == id)
    }

    pub fn shop_mut(&mut self, id: ShopId) -> Option<&mut Shop> {
        self.shops.iter_mut().find(|s| s.id == id)
    }

    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    pub fn find_shop_at(&self, location: LocationId) -> Option<&Shop> {
        self.shops.iter().find(|s| s.location_id == location)
    }

    /// Stock a shop with a freshly minted item
    pub fn stock_shop(
        &mut self,
        shop: ShopId,
        name: &str,
        quantity: u32,
        quality: ItemQuality,
    ) -> Result<ItemId, EconomyError> {
        if self.shop(shop).is_none() {
            return Err(EconomyError::ShopNotFound(shop));
        }
        let item = self.create_item(name, quantity, quality)?;
        let id = item.id;
        self.shop_mut(shop)
            .ok_or(EconomyError::ShopNotFound(shop))?
            .add_stock(item)?;
        Ok(id)
    }

    /// Price a shop pays for one of its customer's items
    pub fn price_buy(&self, shop: ShopId, item: &Item) -> Option<u32> {
        self.shop(shop)
            .map(|s| s.buy_price(item, &self.catalog, self.global_price_modifier))
    }

    /// Price a shop charges for one of its stocked items
    pub fn price_sell(&self, shop: ShopId, item: &Item) -> Option<u32> {
        self.shop(shop)
            .map(|s| s.sell_price(item, &self.catalog, self.global_price_modifier))
    }

    /// `buyer` purchases stocked item `item_id` from `shop`; returns the price
    pub fn buy(&mut self, shop: ShopId, buyer: &mut Inventory, item_id: ItemId) -> Result<u32, EconomyError> {
        let global = self.global_price_modifier;
        let shop = self
            .shops
            .iter_mut()
            .find(|s| s.id == shop)
            .ok_or(EconomyError::ShopNotFound(shop))?;
        shop.sell_to(buyer, item_id, &self.catalog, global)
    }

    /// `seller` sells item `item_id` to `shop`; returns the price received
    pub fn sell(&mut self, shop: ShopId, seller: &mut Inventory, item_id: ItemId) -> Result<u32, EconomyError> {
        let global = self.global_price_modifier;
        let shop = self
            .shops
            .iter_mut()
            .find(|s| s.id == shop)
            .ok_or(EconomyError::ShopNotFound(shop))?;
        shop.buy_from(seller, item_id, &self.catalog, global)
    }

    /// An entity buys one unit of `item_name` from `shop`
    ///
    /// Splits a single unit off a larger stack first; if the purchase then
    /// fails the unit is merged back.
    pub fn purchase(&mut self, shop_id: ShopId, buyer: EntityId, item_name: &str) -> Result<u32, EconomyError> {
        let mut inventory = self
            .inventories
            .remove(&buyer)
            .ok_or(EconomyError::NoInventory(buyer))?;
        let result = self.purchase_unit(shop_id, &mut inventory, item_name);
        self.inventories.insert(buyer, inventory);
        result
    }

    fn purchase_unit(&mut self, shop_id: ShopId, buyer: &mut Inventory, item_name: &str) -> Result<u32, EconomyError> {
        let shop = self.shop(shop_id).ok_or(EconomyError::ShopNotFound(shop_id))?;
        let (source, quantity) = shop
            .find_stock(item_name)
            .map(|i| (i.id, i.quantity))
            .ok_or_else(|| EconomyError::NotStocked(item_name.to_string()))?;
        if quantity <= 1 {
            return self.buy(shop_id, buyer, source);
        }

        let unit_id = self.allocate_item_id();
        let shop = self.shop_mut(shop_id).ok_or(EconomyError::ShopNotFound(shop_id))?;
        let unit = shop
            .stock
            .iter_mut()
            .find(|i| i.id == source)
            .and_then(|i| i.split(1, unit_id))
            .ok_or(EconomyError::ItemNotFound(source))?;
        shop.stock.push(unit);

        let result = self.buy(shop_id, buyer, unit_id);
        if result.is_err() {
            if let Some(shop) = self.shop_mut(shop_id) {
                if let Some(unit) = shop.remove_stock(unit_id) {
                    if let Some(origin) = shop.stock.iter_mut().find(|i| i.id == source) {
                        origin.quantity += unit.quantity;
                    }
                }
            }
        }
        result
    }

    /// An entity sells one unit of `item_name` to `shop`
    pub fn sell_goods(&mut self, shop_id: ShopId, seller: EntityId, item_name: &str) -> Result<u32, EconomyError> {
        let mut inventory = self
            .inventories
            .remove(&seller)
            .ok_or(EconomyError::NoInventory(seller))?;
        let result = self.sell_unit(shop_id, &mut inventory, item_name);
        self.inventories.insert(seller, inventory);
        result
    }

    fn sell_unit(&mut self, shop_id: ShopId, seller: &mut Inventory, item_name: &str) -> Result<u32, EconomyError> {
        let (source, quantity) = seller
            .find(item_name)
            .map(|i| (i.id, i.quantity))
            .ok_or_else(|| EconomyError::NotStocked(item_name.to_string()))?;
        if quantity <= 1 {
            return self.sell(shop_id, seller, source);
        }

        let unit_id = self.allocate_item_id();
        let mut staged = seller.clone();
        let unit = staged
            .items
            .iter_mut()
            .find(|i| i.id == source)
            .and_then(|i| i.split(1, unit_id))
            .ok_or(EconomyError::ItemNotFound(source))?;
        // The split unit gets its own slot so it can be sold by ID
        staged.items.push(unit);
        let price = self.sell(shop_id, &mut staged, unit_id)?;
        *seller = staged;
        Ok(price)
    }

    /// Restock every shop that has auto-restock enabled
    pub fn restock_all(&mut self) -> usize {
        let mut next_item_id = self.next_item_id;
        let mut added = 0;
        for shop in self.shops.iter_mut().filter(|s| s.auto_restock) {
            added += shop.restock(&self.catalog, &mut next_item_id);
        }
        self.next_item_id = next_item_id;
        if added > 0 {
            tracing::debug!(stacks = added, "shops restocked");
        }
        added
    }

    // ========================================================================
    // INVENTORIES
    // ========================================================================

    /// Create (or replace) the inventory of `entity`; slots are capped by config
    pub fn create_inventory(&mut self, entity: EntityId, max_slots: usize, max_weight: u32) -> &mut Inventory {
        let slots = max_slots.min(self.max_inventory_slots);
        let inventory = self
            .inventories
            .entry(entity)
            .or_insert_with(|| Inventory::new(Some(entity), slots, max_weight));
        *inventory = Inventory::new(Some(entity), slots, max_weight);
        inventory
    }

    /// Register an inventory that already has contents (used when loading)
    pub fn insert_inventory(&mut self, inventory: Inventory) -> Option<EntityId> {
        let entity = inventory.entity_id?;
        let highest_item = inventory.items.iter().map(|i| i.id.0).max().unwrap_or(0);
        self.next_item_id = self.next_item_id.max(highest_item + 1);
        self.inventories.insert(entity, inventory);
        Some(entity)
    }

    pub fn inventory(&self, entity: EntityId) -> Option<&Inventory> {
        self.inventories.get(&entity)
    }

    pub fn inventory_mut(&mut self, entity: EntityId) -> Option<&mut Inventory> {
        self.inventories.get_mut(&entity)
    }

    /// All inventories ordered by owner
    pub fn inventories(&self) -> Vec<&Inventory> {
        let mut all: Vec<_> = self.inventories.values().collect();
        all.sort_by_key(|inv| inv.entity_id);
        all
    }

    /// Give an entity an item, minting it from the catalogue
    pub fn give_item(&mut self, entity: EntityId, name: &str, quantity: u32) -> Result<(), EconomyError> {
        if !self.inventories.contains_key(&entity) {
            return Err(EconomyError::NoInventory(entity));
        }
        let item = self.create_item(name, quantity, ItemQuality::Normal)?;
        let inventory = self
            .inventories
            .get_mut(&entity)
            .ok_or(EconomyError::NoInventory(entity))?;
        inventory.add_item(item, &self.catalog)
    }

    pub fn add_currency(&mut self, entity: EntityId, amount: u32) -> bool {
        match self.inventories.get_mut(&entity) {
            Some(inventory) => {
                inventory.add_currency(amount);
                true
            }
            None => false,
        }
    }

    pub fn remove_currency(&mut self, entity: EntityId, amount: u32) -> bool {
        self.inventories
            .get_mut(&entity)
            .is_some_and(|inventory| inventory.remove_currency(amount))
    }

    // ========================================================================
    // TRADES
    // ========================================================================

    pub fn create_trade(&mut self, from: EntityId, to: EntityId) -> TradeOffer {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        TradeOffer::new(id, from, to)
    }

    /// Execute an offer between the two parties' registered inventories
    pub fn execute_trade(&mut self, offer: &mut TradeOffer) -> Result<(), EconomyError> {
        let from_id = offer.from_entity_id;
        let to_id = offer.to_entity_id;
        let mut from = self
            .inventories
            .remove(&from_id)
            .ok_or(EconomyError::NoInventory(from_id))?;
        let Some(to) = self.inventories.get_mut(&to_id) else {
            self.inventories.insert(from_id, from);
            return Err(EconomyError::NoInventory(to_id));
        };
        let result = offer.execute(&mut from, to, &self.catalog);
        self.inventories.insert(from_id, from);
        result
    }
}

impl Default for EconomyManager {
    fn default() -> Self {
        Self::with_default_items(&SimulationConfig::default())
    }
}
