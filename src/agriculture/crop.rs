//! Crop types and growing crops

use serde::{Deserialize, Serialize};

use crate::core::clock::{Season, Weather};
use crate::core::types::{EntityId, Plot};

/// Days a mature crop can stand before it starts to rot
const MATURE_GRACE_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Seed,
    Sprout,
    Growing,
    Mature,
    Withered,
}

/// Static description of a plantable crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropType {
    pub name: String,
    pub days_to_mature: u32,
    /// Days spent as a seed, and again as a sprout
    pub days_sprout: u32,
    pub days_growing: u32,
    pub preferred_season: Season,
    pub any_season: bool,
    pub water_requirement: u32,
    pub min_yield: u32,
    pub max_yield: u32,
    pub sell_price: u32,
    pub seed_cost: u32,
}

impl CropType {
    pub fn new(name: impl Into<String>, days_to_mature: u32, preferred_season: Season) -> Self {
        Self {
            name: name.into(),
            days_to_mature,
            days_sprout: days_to_mature / 4,
            days_growing: days_to_mature / 2,
            preferred_season,
            any_season: false,
            water_requirement: 50,
            min_yield: 1,
            max_yield: 10,
            sell_price: 10,
            seed_cost: 5,
        }
    }

    pub fn with_yield(mut self, min: u32, max: u32) -> Self {
        self.min_yield = min;
        self.max_yield = max.max(min);
        self
    }

    pub fn with_prices(mut self, sell_price: u32, seed_cost: u32) -> Self {
        self.sell_price = sell_price;
        self.seed_cost = seed_cost;
        self
    }

    pub fn with_water(mut self, requirement: u32) -> Self {
        self.water_requirement = requirement;
        self
    }

    /// Grows without an off-season penalty
    pub fn hardy(mut self) -> Self {
        self.any_season = true;
        self
    }

    pub fn in_season(&self, season: Season) -> bool {
        self.any_season || self.preferred_season == season
    }

    /// The village's standard crops
    pub fn defaults() -> Vec<CropType> {
        vec![
            CropType::new("Wheat", 8, Season::Spring)
                .with_water(40)
                .with_yield(3, 10)
                .with_prices(12, 5),
            CropType::new("Corn", 10, Season::Summer)
                .with_water(60)
                .with_yield(4, 15)
                .with_prices(15, 8),
            CropType::new("Tomato", 7, Season::Summer)
                .with_water(70)
                .with_yield(5, 20)
                .with_prices(8, 6),
            CropType::new("Potato", 9, Season::Fall)
                .with_yield(6, 20)
                .with_prices(6, 4)
                .hardy(),
            CropType::new("Carrot", 6, Season::Spring)
                .with_water(45)
                .with_yield(4, 12)
                .with_prices(7, 3),
        ]
    }
}

/// A crop growing on one plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: u32,
    pub crop_type: String,
    pub plot: Plot,
    pub stage: GrowthStage,
    pub days_planted: u32,
    pub days_in_stage: u32,
    pub health: i32,
    pub water_level: i32,
    pub watered_today: bool,
    pub planted_by: Option<EntityId>,
    pub predicted_yield: u32,
}

impl Crop {
    pub fn new(id: u32, crop_type: impl Into<String>, plot: Plot, planted_by: Option<EntityId>) -> Self {
        Self {
            id,
            crop_type: crop_type.into(),
            plot,
            stage: GrowthStage::Seed,
            days_planted: 0,
            days_in_stage: 0,
            health: 100,
            water_level: 50,
            watered_today: false,
            planted_by,
            predicted_yield: 0,
        }
    }

    /// Advance one day of growth; returns the new stage if it changed
    pub fn update_day(&mut self, kind: &CropType, weather: Weather, season: Season) -> Option<GrowthStage> {
        if self.stage == GrowthStage::Withered {
            return None;
        }

        self.days_planted += 1;
        self.days_in_stage += 1;

        if !self.watered_today {
            self.water_level -= 15;
        }
        self.watered_today = false;
        self.water_level = self.water_level.clamp(0, 100);

        if self.water_level < 20 {
            self.health -= 10;
        }

        match weather {
            Weather::Rainy => self.water_level += 20,
            Weather::Stormy => self.health -= 5,
            Weather::Drought => {
                self.water_level -= 10;
                self.health -= 5;
            }
            Weather::Sunny | Weather::Cloudy => {}
        }
        self.water_level = self.water_level.clamp(0, 100);

        if !kind.in_season(season) {
            self.health -= 2;
        }

        if self.health <= 0 {
            self.health = 0;
            self.stage = GrowthStage::Withered;
            return Some(GrowthStage::Withered);
        }

        let before = self.stage;
        match self.stage {
            GrowthStage::Seed if self.days_in_stage >= kind.days_sprout => {
                self.enter(GrowthStage::Sprout);
            }
            GrowthStage::Sprout if self.days_in_stage >= kind.days_sprout => {
                self.enter(GrowthStage::Growing);
            }
            GrowthStage::Growing if self.days_planted >= kind.days_to_mature => {
                self.enter(GrowthStage::Mature);
                let spread = (kind.max_yield - kind.min_yield) as f32;
                self.predicted_yield = kind.min_yield + (spread * self.health as f32 / 100.0) as u32;
            }
            GrowthStage::Mature if self.days_in_stage > MATURE_GRACE_DAYS => {
                self.health -= 5;
            }
            _ => {}
        }
        self.health = self.health.min(100);

        (self.stage != before).then_some(self.stage)
    }

    fn enter(&mut self, stage: GrowthStage) {
        self.stage = stage;
        self.days_in_stage = 0;
    }

    /// Water the crop; withered crops cannot be revived
    pub fn water(&mut self) -> bool {
        if self.stage == GrowthStage::Withered {
            return false;
        }
        self.water_level = (self.water_level + 40).min(100);
        self.watered_today = true;
        self.health = (self.health + 5).min(100);
        true
    }

    pub fn is_ready(&self) -> bool {
        self.stage == GrowthStage::Mature
    }
}
