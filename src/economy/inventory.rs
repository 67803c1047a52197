//! Economy inventory: item stacks, weight and currency for one holder

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, ItemId};
use crate::economy::item::{Item, ItemCatalog};
use crate::economy::EconomyError;

/// Default weight capacity in grams
pub const DEFAULT_MAX_WEIGHT: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub entity_id: Option<EntityId>,
    pub items: Vec<Item>,
    pub max_slots: usize,
    pub total_weight: u32,
    pub max_weight: u32,
    pub currency: u32,
}

impl Inventory {
    pub fn new(entity_id: Option<EntityId>, max_slots: usize, max_weight: u32) -> Self {
        Self {
            entity_id,
            items: Vec::new(),
            max_slots,
            total_weight: 0,
            max_weight,
            currency: 0,
        }
    }

    /// Add an item, filling matching stacks first and then a free slot
    ///
    /// Atomic: when the item cannot be placed in full, nothing changes.
    pub fn add_item(&mut self, mut item: Item, catalog: &ItemCatalog) -> Result<(), EconomyError> {
        let definition = catalog
            .get(&item.item_name)
            .ok_or_else(|| EconomyError::UnknownItem(item.item_name.clone()))?;
        if item.quantity == 0 {
            return Err(EconomyError::BadQuantity(0));
        }

        let added_weight = definition.weight.saturating_mul(item.quantity);
        if self.total_weight.saturating_add(added_weight) > self.max_weight {
            return Err(EconomyError::TooHeavy {
                needed: added_weight,
                available: self.max_weight.saturating_sub(self.total_weight),
            });
        }

        let stack_room: u32 = if definition.stackable {
            self.items
                .iter()
                .filter(|existing| existing.can_stack_with(&item))
                .map(|existing| definition.max_stack.saturating_sub(existing.quantity))
                .sum()
        } else {
            0
        };
        if stack_room < item.quantity && self.items.len() >= self.max_slots {
            return Err(EconomyError::NoSpace);
        }

        if definition.stackable {
            for existing in self.items.iter_mut() {
                if existing.stack(&mut item, definition) {
                    break;
                }
            }
        }
        if item.quantity > 0 {
            item.entity_id = self.entity_id;
            self.items.push(item);
        }
        self.total_weight += added_weight;
        Ok(())
    }

    /// Take a whole stack out by ID
    pub fn remove_item(&mut self, id: ItemId, catalog: &ItemCatalog) -> Option<Item> {
        let index = self.items.iter().position(|i| i.id == id)?;
        let item = self.items.remove(index);
        self.release_weight(&item, item.quantity, catalog);
        Some(item)
    }

    /// Remove `quantity` units of `name` across stacks; false (and no change) if short
    pub fn remove_quantity(&mut self, name: &str, quantity: u32, catalog: &ItemCatalog) -> bool {
        if quantity == 0 || self.count(name) < quantity {
            return false;
        }
        let unit_weight = catalog.get(name).map_or(0, |d| d.weight);
        let mut remaining = quantity;
        self.items.retain_mut(|item| {
            if remaining == 0 || item.item_name != name {
                return true;
            }
            let taken = remaining.min(item.quantity);
            item.quantity -= taken;
            remaining -= taken;
            item.quantity > 0
        });
        self.total_weight = self.total_weight.saturating_sub(unit_weight * quantity);
        true
    }

    fn release_weight(&mut self, item: &Item, quantity: u32, catalog: &ItemCatalog) {
        let unit_weight = catalog.get(&item.item_name).map_or(0, |d| d.weight);
        self.total_weight = self.total_weight.saturating_sub(unit_weight * quantity);
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// First stack with the given name
    pub fn find(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.item_name == name)
    }

    pub fn count(&self, name: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.item_name == name)
            .map(|i| i.quantity)
            .sum()
    }

    pub fn has_space(&self) -> bool {
        self.items.len() < self.max_slots
    }

    pub fn add_currency(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Atomic: either the full amount is removed or nothing changes
    pub fn remove_currency(&mut self, amount: u32) -> bool {
        match self.currency.checked_sub(amount) {
            Some(rest) => {
                self.currency = rest;
                true
            }
            None => false,
        }
    }

    pub fn has_currency(&self, amount: u32) -> bool {
        self.currency >= amount
    }
}
