//! Item definitions, the catalogue, and concrete item instances

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Crop,
    Seed,
    Tool,
    Product,
    Material,
    Food,
    Gift,
    Misc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemQuality {
    Poor,
    #[default]
    Normal,
    Good,
    Excellent,
    Masterwork,
}

impl ItemQuality {
    /// Value multiplier applied to the base value
    pub fn multiplier(&self) -> f32 {
        match self {
            Self::Poor => 0.5,
            Self::Normal => 1.0,
            Self::Good => 1.5,
            Self::Excellent => 2.0,
            Self::Masterwork => 3.0,
        }
    }
}

/// What an item name means: value, stacking rules and weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    pub base_value: u32,
    pub stackable: bool,
    pub max_stack: u32,
    pub tradeable: bool,
    /// Grams per unit
    pub weight: u32,
}

impl ItemDefinition {
    pub fn new(
        name: impl Into<String>,
        item_type: ItemType,
        base_value: u32,
        stackable: bool,
        max_stack: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            item_type,
            base_value,
            stackable,
            max_stack: if stackable { max_stack.max(1) } else { 1 },
            tradeable: true,
            weight: 100,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

/// Registered item definitions, looked up by name
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    definitions: Vec<ItemDefinition>,
    by_name: AHashMap<String, usize>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crops, seeds, tools, materials and food sold around the village
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        let crops = [("Wheat", 12, 5), ("Corn", 15, 8), ("Tomato", 10, 6), ("Potato", 8, 4), ("Carrot", 6, 3)];
        for (name, value, _) in crops {
            catalog.register(ItemDefinition::new(name, ItemType::Crop, value, true, 99));
        }
        for (name, _, seed_value) in crops {
            catalog.register(ItemDefinition::new(
                format!("{} Seeds", name),
                ItemType::Seed,
                seed_value,
                true,
                99,
            ));
        }

        catalog.register(ItemDefinition::new("Hoe", ItemType::Tool, 50, false, 1).with_weight(500));
        catalog.register(ItemDefinition::new("Watering Can", ItemType::Tool, 30, false, 1).with_weight(300));
        catalog.register(ItemDefinition::new("Sickle", ItemType::Tool, 40, false, 1).with_weight(400));

        catalog.register(ItemDefinition::new("Wood", ItemType::Material, 5, true, 50));
        catalog.register(ItemDefinition::new("Stone", ItemType::Material, 3, true, 50));
        catalog.register(ItemDefinition::new("Iron Ore", ItemType::Material, 15, true, 50));

        catalog.register(ItemDefinition::new("Bread", ItemType::Food, 10, true, 20));
        catalog.register(ItemDefinition::new("Vegetable Soup", ItemType::Food, 15, true, 10));
        catalog
    }

    /// Register or replace a definition by name
    pub fn register(&mut self, definition: ItemDefinition) {
        match self.by_name.get(&definition.name) {
            Some(&i) => self.definitions[i] = definition,
            None => {
                self.by_name.insert(definition.name.clone(), self.definitions.len());
                self.definitions.push(definition);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ItemDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// A concrete stack of one item name at one quality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub item_name: String,
    pub quantity: u32,
    pub quality: ItemQuality,
    /// Wear in percent; 100 is pristine
    pub condition: u32,
    /// Holder, `None` while in a shop's stock
    pub entity_id: Option<EntityId>,
}

impl Item {
    pub fn new(id: ItemId, item_name: impl Into<String>, quantity: u32, quality: ItemQuality) -> Self {
        Self {
            id,
            item_name: item_name.into(),
            quantity,
            quality,
            condition: 100,
            entity_id: None,
        }
    }

    /// Worth of the whole stack: base × quality × condition% × quantity
    pub fn value(&self, definition: &ItemDefinition) -> u32 {
        let unit = definition.base_value as f32 * self.quality.multiplier() * self.condition as f32 / 100.0;
        (unit * self.quantity as f32) as u32
    }

    pub fn can_stack_with(&self, other: &Item) -> bool {
        self.item_name == other.item_name && self.quality == other.quality
    }

    /// Move as much of `other` into this stack as fits
    ///
    /// Returns true only when `other` was fully absorbed (its quantity is
    /// then 0). A partial fill leaves the remainder in `other`.
    pub fn stack(&mut self, other: &mut Item, definition: &ItemDefinition) -> bool {
        if !definition.stackable || !self.can_stack_with(other) {
            return false;
        }
        let total = self.quantity + other.quantity;
        if total > definition.max_stack {
            self.quantity = definition.max_stack.max(self.quantity);
            other.quantity = total - self.quantity;
            return false;
        }
        self.quantity = total;
        other.quantity = 0;
        true
    }

    /// Split `quantity` units off into a new stack with `new_id`
    pub fn split(&mut self, quantity: u32, new_id: ItemId) -> Option<Item> {
        if quantity == 0 || quantity >= self.quantity {
            return None;
        }
        self.quantity -= quantity;
        Some(Item {
            id: new_id,
            item_name: self.item_name.clone(),
            quantity,
            quality: self.quality,
            condition: self.condition,
            entity_id: self.entity_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = ItemCatalog::with_defaults();
        let hoe = catalog.get("Hoe").unwrap();
        assert_eq!(hoe.base_value, 50);
        assert_eq!(hoe.weight, 500);
        assert!(!hoe.stackable);
        assert_eq!(catalog.get("Corn Seeds").unwrap().base_value, 8);
        assert_eq!(catalog.get("Wheat").unwrap().max_stack, 99);
        assert!(catalog.get("Dragon Egg").is_none());
    }

    #[test]
    fn test_value_applies_quality_and_condition() {
        let def = ItemDefinition::new("Hoe", ItemType::Tool, 50, false, 1);
        let mut hoe = Item::new(ItemId(1), "Hoe", 1, ItemQuality::Good);
        assert_eq!(hoe.value(&def), 75);
        hoe.condition = 50;
        assert_eq!(hoe.value(&def), 37);

        let def = ItemDefinition::new("Wheat", ItemType::Crop, 12, true, 99);
        let wheat = Item::new(ItemId(2), "Wheat", 3, ItemQuality::Poor);
        assert_eq!(wheat.value(&def), 18);
    }

    #[test]
    fn test_stack_partial_fill() {
        let def = ItemDefinition::new("Bread", ItemType::Food, 10, true, 20);
        let mut a = Item::new(ItemId(1), "Bread", 15, ItemQuality::Normal);
        let mut b = Item::new(ItemId(2), "Bread", 10, ItemQuality::Normal);
        assert!(!a.stack(&mut b, &def));
        assert_eq!(a.quantity, 20);
        assert_eq!(b.quantity, 5);
    }

    #[test]
    fn test_stack_rejects_mismatch() {
        let def = ItemDefinition::new("Wheat", ItemType::Crop, 12, true, 99);
        let mut a = Item::new(ItemId(1), "Wheat", 1, ItemQuality::Normal);
        let mut b = Item::new(ItemId(2), "Wheat", 1, ItemQuality::Good);
        assert!(!a.stack(&mut b, &def));
        assert_eq!((a.quantity, b.quantity), (1, 1));
    }

    #[test]
    fn test_split_bounds() {
        let mut a = Item::new(ItemId(1), "Wheat", 5, ItemQuality::Normal);
        assert!(a.split(0, ItemId(2)).is_none());
        assert!(a.split(5, ItemId(2)).is_none());
        let b = a.split(2, ItemId(2)).unwrap();
        assert_eq!((a.quantity, b.quantity), (3, 2));
        assert_eq!(b.id, ItemId(2));
    }
}
