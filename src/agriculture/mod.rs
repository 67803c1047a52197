//! Agriculture manager - fields, planting, watering and harvest
//!
//! Fields are keyed by the location they sit on. Growth happens only in
//! `tick_day`, which the game loop calls once per day boundary.

pub mod crop;
pub mod field;

pub use crop::{Crop, CropType, GrowthStage};
pub use field::Field;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::clock::{Season, Weather};
use crate::core::types::{EntityId, LocationId, Plot};

/// Plots per side of a newly registered field
pub const DEFAULT_FIELD_SIZE: u32 = 5;

/// Suffix seed items carry in the item catalogue
const SEED_SUFFIX: &str = " Seeds";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FarmError {
    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    #[error("No field at location {0}")]
    NoField(LocationId),

    #[error("Plot {0} is outside the field")]
    OutOfBounds(Plot),

    #[error("Plot {0} is already planted")]
    PlotOccupied(Plot),

    #[error("Field at location {0} is full")]
    FieldFull(LocationId),

    #[error("Nothing is growing at plot {0}")]
    NoCrop(Plot),

    #[error("Crop at plot {0} has withered")]
    Withered(Plot),

    #[error("Crop at plot {0} is not ready to harvest")]
    NotReady(Plot),
}

/// Produce collected from one plot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    pub crop_name: String,
    pub quantity: u32,
}

/// What one day of growth changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthReport {
    pub crops_updated: u32,
    pub matured: u32,
    pub withered: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgricultureManager {
    crop_types: Vec<CropType>,
    fields: Vec<Field>,
    next_crop_id: u32,
    pub total_harvested: u32,
    pub days_ticked: u32,
}

impl AgricultureManager {
    pub fn new() -> Self {
        Self {
            next_crop_id: 1,
            ..Self::default()
        }
    }

    /// Manager preloaded with the standard crop types
    pub fn with_default_crops() -> Self {
        let mut manager = Self::new();
        for kind in CropType::defaults() {
            manager.register_crop_type(kind);
        }
        manager
    }

    /// Register or replace a crop type by name
    pub fn register_crop_type(&mut self, kind: CropType) {
        match self.crop_types.iter_mut().find(|t| t.name == kind.name) {
            Some(existing) => *existing = kind,
            None => self.crop_types.push(kind),
        }
    }

    /// Look up a crop type by crop name or by its seed item name
    pub fn crop_type(&self, name: &str) -> Option<&CropType> {
        let name = name.strip_suffix(SEED_SUFFIX).unwrap_or(name);
        self.crop_types.iter().find(|t| t.name == name)
    }

    pub fn crop_types(&self) -> &[CropType] {
        &self.crop_types
    }

    /// Returns false when the location already has a field
    pub fn register_field(&mut self, location: LocationId, width: u32, height: u32) -> bool {
        if self.field(location).is_some() {
            return false;
        }
        self.fields.push(Field::new(location, width, height));
        true
    }

    pub fn field(&self, location: LocationId) -> Option<&Field> {
        self.fields.iter().find(|f| f.location_id == location)
    }

    fn field_mut(&mut self, location: LocationId) -> Result<&mut Field, FarmError> {
        self.fields
            .iter_mut()
            .find(|f| f.location_id == location)
            .ok_or(FarmError::NoField(location))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn crop_at(&self, location: LocationId, plot: Plot) -> Option<&Crop> {
        self.field(location).and_then(|f| f.crop_at(plot))
    }

    /// Plant a crop from a crop or seed name; returns the new crop's ID
    pub fn plant(
        &mut self,
        location: LocationId,
        plot: Plot,
        seed_item: &str,
        planted_by: Option<EntityId>,
    ) -> Result<u32, FarmError> {
        let crop_name = self
            .crop_type(seed_item)
            .map(|t| t.name.clone())
            .ok_or_else(|| FarmError::UnknownCrop(seed_item.to_string()))?;
        let id = self.next_crop_id;

        let field = self.field_mut(location)?;
        if !field.contains(plot) {
            return Err(FarmError::OutOfBounds(plot));
        }
        if field.crop_at(plot).is_some() {
            return Err(FarmError::PlotOccupied(plot));
        }
        if field.is_full() {
            return Err(FarmError::FieldFull(location));
        }
        field.crops.push(Crop::new(id, crop_name.as_str(), plot, planted_by));

        self.next_crop_id += 1;
        tracing::debug!(crop = %crop_name, location = %location, plot = %plot, "planted");
        Ok(id)
    }

    pub fn water(&mut self, location: LocationId, plot: Plot) -> Result<(), FarmError> {
        let crop = self
            .field_mut(location)?
            .crop_at_mut(plot)
            .ok_or(FarmError::NoCrop(plot))?;
        if crop.water() {
            Ok(())
        } else {
            Err(FarmError::Withered(plot))
        }
    }

    /// Collect a mature crop, freeing its plot
    pub fn harvest(&mut self, location: LocationId, plot: Plot) -> Result<Harvest, FarmError> {
        let field = self.field_mut(location)?;
        let crop = field.crop_at(plot).ok_or(FarmError::NoCrop(plot))?;
        if !crop.is_ready() {
            return Err(FarmError::NotReady(plot));
        }
        let crop = field.take_crop(plot).ok_or(FarmError::NoCrop(plot))?;
        field.total_harvested += 1;
        self.total_harvested += 1;

        tracing::debug!(crop = %crop.crop_type, quantity = crop.predicted_yield, "harvested");
        Ok(Harvest {
            crop_name: crop.crop_type,
            quantity: crop.predicted_yield,
        })
    }

    /// Grow every crop by one day under the given conditions
    pub fn tick_day(&mut self, weather: Weather, season: Season) -> GrowthReport {
        let mut report = GrowthReport::default();
        let crop_types = &self.crop_types;

        for field in &mut self.fields {
            for crop in &mut field.crops {
                let Some(kind) = crop_types.iter().find(|t| t.name == crop.crop_type) else {
                    continue;
                };
                report.crops_updated += 1;
                match crop.update_day(kind, weather, season) {
                    Some(GrowthStage::Mature) => report.matured += 1,
                    Some(GrowthStage::Withered) => {
                        report.withered += 1;
                        tracing::info!(crop = %crop.crop_type, plot = %crop.plot, "crop withered");
                    }
                    _ => {}
                }
            }
        }

        self.days_ticked += 1;
        tracing::debug!(?report, "agriculture day");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_field() -> (AgricultureManager, LocationId) {
        let mut manager = AgricultureManager::with_default_crops();
        let field = LocationId(2);
        assert!(manager.register_field(field, 2, 2));
        (manager, field)
    }

    #[test]
    fn test_register_field_once() {
        let (mut manager, field) = manager_with_field();
        assert!(!manager.register_field(field, 4, 4));
    }

    #[test]
    fn test_plant_accepts_seed_names() {
        let (mut manager, field) = manager_with_field();
        manager.plant(field, Plot::new(0, 0), "Wheat Seeds", None).unwrap();
        assert_eq!(manager.crop_at(field, Plot::new(0, 0)).unwrap().crop_type, "Wheat");
    }

    #[test]
    fn test_plant_rejections() {
        let (mut manager, field) = manager_with_field();
        assert_eq!(
            manager.plant(field, Plot::new(0, 0), "Mandrake", None),
            Err(FarmError::UnknownCrop("Mandrake".into()))
        );
        assert_eq!(
            manager.plant(LocationId(9), Plot::new(0, 0), "Corn", None),
            Err(FarmError::NoField(LocationId(9)))
        );
        assert_eq!(
            manager.plant(field, Plot::new(5, 0), "Corn", None),
            Err(FarmError::OutOfBounds(Plot::new(5, 0)))
        );
        manager.plant(field, Plot::new(1, 1), "Corn", None).unwrap();
        assert_eq!(
            manager.plant(field, Plot::new(1, 1), "Corn", None),
            Err(FarmError::PlotOccupied(Plot::new(1, 1)))
        );
    }

    #[test]
    fn test_harvest_requires_mature_crop() {
        let (mut manager, field) = manager_with_field();
        let plot = Plot::new(0, 1);
        manager.plant(field, plot, "Carrot", Some(EntityId(1))).unwrap();
        assert_eq!(manager.harvest(field, plot), Err(FarmError::NotReady(plot)));

        for _ in 0..6 {
            manager.water(field, plot).unwrap();
            manager.tick_day(Weather::Sunny, Season::Spring);
        }
        let harvest = manager.harvest(field, plot).unwrap();
        assert_eq!(harvest.crop_name, "Carrot");
        assert_eq!(harvest.quantity, 12);
        assert!(manager.crop_at(field, plot).is_none());
        assert_eq!(manager.total_harvested, 1);
    }

    #[test]
    fn test_tick_day_reports_growth() {
        let (mut manager, field) = manager_with_field();
        manager.plant(field, Plot::new(0, 0), "Wheat", None).unwrap();
        let report = manager.tick_day(Weather::Sunny, Season::Spring);
        assert_eq!(report.crops_updated, 1);
        assert_eq!(manager.days_ticked, 1);
        assert_eq!(manager.crop_at(field, Plot::new(0, 0)).unwrap().days_planted, 1);
    }

    #[test]
    fn test_water_missing_crop() {
        let (mut manager, field) = manager_with_field();
        assert_eq!(
            manager.water(field, Plot::new(0, 0)),
            Err(FarmError::NoCrop(Plot::new(0, 0)))
        );
    }
}
