//! Direct trades between two inventories

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, ItemId};
use crate::economy::inventory::Inventory;
use crate::economy::item::ItemCatalog;
use crate::economy::EconomyError;

/// Most items either side can put into one offer
pub const MAX_TRADE_ITEMS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub id: u32,
    pub from_entity_id: EntityId,
    pub to_entity_id: EntityId,
    pub offered_items: Vec<ItemId>,
    pub offered_currency: u32,
    pub requested_items: Vec<ItemId>,
    pub requested_currency: u32,
    pub accepted: bool,
    pub completed: bool,
    pub cancelled: bool,
}

impl TradeOffer {
    pub fn new(id: u32, from: EntityId, to: EntityId) -> Self {
        Self {
            id,
            from_entity_id: from,
            to_entity_id: to,
            offered_items: Vec::new(),
            offered_currency: 0,
            requested_items: Vec::new(),
            requested_currency: 0,
            accepted: false,
            completed: false,
            cancelled: false,
        }
    }

    pub fn offer_item(&mut self, item: ItemId) -> bool {
        if self.offered_items.len() >= MAX_TRADE_ITEMS {
            return false;
        }
        self.offered_items.push(item);
        true
    }

    pub fn request_item(&mut self, item: ItemId) -> bool {
        if self.requested_items.len() >= MAX_TRADE_ITEMS {
            return false;
        }
        self.requested_items.push(item);
        true
    }

    pub fn offer_currency(&mut self, amount: u32) {
        self.offered_currency = amount;
    }

    pub fn request_currency(&mut self, amount: u32) {
        self.requested_currency = amount;
    }

    pub fn accept(&mut self) {
        if !self.cancelled {
            self.accepted = true;
        }
    }

    pub fn cancel(&mut self) {
        if !self.completed {
            self.cancelled = true;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.completed || self.cancelled
    }

    /// Swap everything in the offer between the two inventories
    ///
    /// Both inventories are staged and only written back when every
    /// currency and item transfer succeeds.
    pub fn execute(
        &mut self,
        from: &mut Inventory,
        to: &mut Inventory,
        catalog: &ItemCatalog,
    ) -> Result<(), EconomyError> {
        if self.is_settled() {
            return Err(EconomyError::OfferSettled(self.id));
        }
        if !from.has_currency(self.offered_currency) {
            return Err(EconomyError::InsufficientFunds {
                needed: self.offered_currency,
                available: from.currency,
            });
        }
        if !to.has_currency(self.requested_currency) {
            return Err(EconomyError::InsufficientFunds {
                needed: self.requested_currency,
                available: to.currency,
            });
        }

        let mut staged_from = from.clone();
        let mut staged_to = to.clone();

        staged_from.remove_currency(self.offered_currency);
        staged_to.add_currency(self.offered_currency);
        staged_to.remove_currency(self.requested_currency);
        staged_from.add_currency(self.requested_currency);

        for &id in &self.offered_items {
            let item = staged_from
                .remove_item(id, catalog)
                .ok_or(EconomyError::ItemNotFound(id))?;
            staged_to.add_item(item, catalog)?;
        }
        for &id in &self.requested_items {
            let item = staged_to
                .remove_item(id, catalog)
                .ok_or(EconomyError::ItemNotFound(id))?;
            staged_from.add_item(item, catalog)?;
        }

        *from = staged_from;
        *to = staged_to;
        self.completed = true;
        tracing::debug!(offer = self.id, from = %self.from_entity_id, to = %self.to_entity_id, "trade completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::inventory::DEFAULT_MAX_WEIGHT;
    use crate::economy::item::{Item, ItemQuality};

    fn pair() -> (Inventory, Inventory, ItemCatalog) {
        let mut a = Inventory::new(Some(EntityId(1)), 5, DEFAULT_MAX_WEIGHT);
        let mut b = Inventory::new(Some(EntityId(2)), 5, DEFAULT_MAX_WEIGHT);
        a.add_currency(100);
        b.add_currency(50);
        (a, b, ItemCatalog::with_defaults())
    }

    #[test]
    fn test_settled_offer_cannot_run_twice() {
        let (mut a, mut b, catalog) = pair();
        let mut offer = TradeOffer::new(1, EntityId(1), EntityId(2));
        offer.offer_currency(10);
        offer.execute(&mut a, &mut b, &catalog).unwrap();
        assert_eq!(
            offer.execute(&mut a, &mut b, &catalog),
            Err(EconomyError::OfferSettled(1))
        );
        assert_eq!((a.currency, b.currency), (90, 60));
    }

    #[test]
    fn test_item_swap() {
        let (mut a, mut b, catalog) = pair();
        a.add_item(Item::new(ItemId(1), "Hoe", 1, ItemQuality::Normal), &catalog).unwrap();
        b.add_item(Item::new(ItemId(2), "Corn", 6, ItemQuality::Normal), &catalog).unwrap();

        let mut offer = TradeOffer::new(3, EntityId(1), EntityId(2));
        offer.offer_item(ItemId(1));
        offer.request_item(ItemId(2));
        offer.request_currency(5);
        offer.execute(&mut a, &mut b, &catalog).unwrap();

        assert_eq!(a.count("Corn"), 6);
        assert_eq!(b.count("Hoe"), 1);
        assert_eq!((a.currency, b.currency), (105, 45));
    }

    #[test]
    fn test_missing_item_rolls_back_everything() {
        let (mut a, mut b, catalog) = pair();
        let mut offer = TradeOffer::new(4, EntityId(1), EntityId(2));
        offer.offer_currency(20);
        offer.offer_item(ItemId(77));
        assert_eq!(
            offer.execute(&mut a, &mut b, &catalog),
            Err(EconomyError::ItemNotFound(ItemId(77)))
        );
        assert_eq!((a.currency, b.currency), (100, 50));
        assert!(!offer.completed);
    }

    #[test]
    fn test_cancelled_offer() {
        let (mut a, mut b, catalog) = pair();
        let mut offer = TradeOffer::new(5, EntityId(1), EntityId(2));
        offer.cancel();
        offer.accept();
        assert!(!offer.accepted);
        assert!(offer.execute(&mut a, &mut b, &catalog).is_err());
    }
}
