//! Shops: priced stock and a till
//!
//! Prices are the item's value scaled by the shop's modifier and the
//! economy-wide modifier. "Sell price" is what the shop charges a customer,
//! "buy price" what it pays when a customer sells to it.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, ItemId, LocationId, ShopId};
use crate::economy::inventory::Inventory;
use crate::economy::item::{Item, ItemCatalog, ItemQuality};
use crate::economy::EconomyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    #[default]
    Fixed,
    SupplyDemand,
    Haggle,
    Barter,
}

fn default_max_stock() -> usize {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub location_id: LocationId,
    pub owner_entity_id: Option<EntityId>,
    pub pricing: PricingStrategy,
    pub buy_price_modifier: f32,
    pub sell_price_modifier: f32,
    pub currency: u32,
    pub infinite_currency: bool,
    pub auto_restock: bool,
    pub stock: Vec<Item>,
    #[serde(default = "default_max_stock")]
    pub max_stock: usize,
}

impl Shop {
    pub fn new(id: ShopId, name: impl Into<String>, location_id: LocationId, owner: Option<EntityId>) -> Self {
        Self {
            id,
            name: name.into(),
            location_id,
            owner_entity_id: owner,
            pricing: PricingStrategy::Fixed,
            buy_price_modifier: 0.5,
            sell_price_modifier: 1.2,
            currency: 1000,
            infinite_currency: false,
            auto_restock: false,
            stock: Vec::new(),
            max_stock: default_max_stock(),
        }
    }

    /// What the shop pays for `item`
    pub fn buy_price(&self, item: &Item, catalog: &ItemCatalog, global_modifier: f32) -> u32 {
        self.price(item, catalog, self.buy_price_modifier * global_modifier)
    }

    /// What the shop charges for `item`
    pub fn sell_price(&self, item: &Item, catalog: &ItemCatalog, global_modifier: f32) -> u32 {
        self.price(item, catalog, self.sell_price_modifier * global_modifier)
    }

    fn price(&self, item: &Item, catalog: &ItemCatalog, modifier: f32) -> u32 {
        catalog
            .get(&item.item_name)
            .map_or(0, |def| (item.value(def) as f32 * modifier) as u32)
    }

    pub fn add_stock(&mut self, mut item: Item) -> Result<(), EconomyError> {
        if self.stock.len() >= self.max_stock {
            return Err(EconomyError::ShopFull(self.id));
        }
        item.entity_id = None;
        self.stock.push(item);
        Ok(())
    }

    pub fn remove_stock(&mut self, id: ItemId) -> Option<Item> {
        let index = self.stock.iter().position(|i| i.id == id)?;
        Some(self.stock.remove(index))
    }

    pub fn stock_item(&self, id: ItemId) -> Option<&Item> {
        self.stock.iter().find(|i| i.id == id)
    }

    pub fn find_stock(&self, name: &str) -> Option<&Item> {
        self.stock.iter().find(|i| i.item_name == name)
    }

    /// Units of `name` on the shelves
    pub fn stock_count(&self, name: &str) -> u32 {
        self.stock
            .iter()
            .filter(|i| i.item_name == name)
            .map(|i| i.quantity)
            .sum()
    }

    /// Sell a stocked item to `buyer`; returns the price paid
    ///
    /// Either the item, the buyer's payment and the shop's takings all move,
    /// or nothing does.
    pub fn sell_to(
        &mut self,
        buyer: &mut Inventory,
        item_id: ItemId,
        catalog: &ItemCatalog,
        global_modifier: f32,
    ) -> Result<u32, EconomyError> {
        let item = self
            .stock_item(item_id)
            .ok_or(EconomyError::ItemNotFound(item_id))?;
        let price = self.sell_price(item, catalog, global_modifier);
        if !buyer.has_currency(price) {
            return Err(EconomyError::InsufficientFunds {
                needed: price,
                available: buyer.currency,
            });
        }

        let mut staged = buyer.clone();
        staged.add_item(item.clone(), catalog)?;
        staged.remove_currency(price);

        *buyer = staged;
        self.remove_stock(item_id);
        if !self.infinite_currency {
            self.currency = self.currency.saturating_add(price);
        }
        tracing::debug!(shop = %self.name, item = item_id.0, price, "shop sold item");
        Ok(price)
    }

    /// Buy an item from `seller`; returns the price paid out
    pub fn buy_from(
        &mut self,
        seller: &mut Inventory,
        item_id: ItemId,
        catalog: &ItemCatalog,
        global_modifier: f32,
    ) -> Result<u32, EconomyError> {
        let item = seller.get(item_id).ok_or(EconomyError::ItemNotFound(item_id))?;
        let price = self.buy_price(item, catalog, global_modifier);
        if !self.infinite_currency && self.currency < price {
            return Err(EconomyError::ShopOutOfFunds {
                needed: price,
                available: self.currency,
            });
        }
        if self.stock.len() >= self.max_stock {
            return Err(EconomyError::ShopFull(self.id));
        }

        let item = seller
            .remove_item(item_id, catalog)
            .ok_or(EconomyError::ItemNotFound(item_id))?;
        self.add_stock(item)?;
        seller.add_currency(price);
        if !self.infinite_currency {
            self.currency -= price;
        }
        tracing::debug!(shop = %self.name, item = item_id.0, price, "shop bought item");
        Ok(price)
    }

    /// Put one stack of every tradeable item the shop is out of back on the shelves
    ///
    /// New item IDs are drawn from `next_item_id`. Returns the number of stacks added.
    pub fn restock(&mut self, catalog: &ItemCatalog, next_item_id: &mut u32) -> usize {
        let mut added = 0;
        for definition in catalog.iter().filter(|d| d.tradeable) {
            if self.stock.len() >= self.max_stock {
                break;
            }
            if self.find_stock(&definition.name).is_some() {
                continue;
            }
            let quantity = if definition.stackable { 10 } else { 1 };
            let item = Item::new(ItemId(*next_item_id), definition.name.as_str(), quantity, ItemQuality::Normal);
            *next_item_id += 1;
            if self.add_stock(item).is_ok() {
                added += 1;
            }
        }
        added
    }
}
