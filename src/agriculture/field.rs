//! Farm fields: a grid of plots on one location

use serde::{Deserialize, Serialize};

use crate::core::types::{LocationId, Plot};
use crate::agriculture::crop::Crop;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub location_id: LocationId,
    pub width: u32,
    pub height: u32,
    pub crops: Vec<Crop>,
    pub total_harvested: u32,
}

impl Field {
    pub fn new(location_id: LocationId, width: u32, height: u32) -> Self {
        Self {
            location_id,
            width,
            height,
            crops: Vec::new(),
            total_harvested: 0,
        }
    }

    pub fn plot_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn contains(&self, plot: Plot) -> bool {
        plot.is_valid() && (plot.x as u32) < self.width && (plot.y as u32) < self.height
    }

    pub fn is_full(&self) -> bool {
        self.crops.len() >= self.plot_count()
    }

    pub fn crop_at(&self, plot: Plot) -> Option<&Crop> {
        self.crops.iter().find(|c| c.plot == plot)
    }

    pub fn crop_at_mut(&mut self, plot: Plot) -> Option<&mut Crop> {
        self.crops.iter_mut().find(|c| c.plot == plot)
    }

    pub fn take_crop(&mut self, plot: Plot) -> Option<Crop> {
        let index = self.crops.iter().position(|c| c.plot == plot)?;
        Some(self.crops.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_bounds() {
        let field = Field::new(LocationId(1), 3, 2);
        assert_eq!(field.plot_count(), 6);
        assert!(field.contains(Plot::new(2, 1)));
        assert!(!field.contains(Plot::new(3, 0)));
        assert!(!field.contains(Plot::new(0, 2)));
        assert!(!field.contains(Plot::new(-1, 0)));
    }

    #[test]
    fn test_take_crop() {
        let mut field = Field::new(LocationId(1), 2, 2);
        field.crops.push(Crop::new(1, "Corn", Plot::new(1, 1), None));
        assert!(field.crop_at(Plot::new(1, 1)).is_some());
        assert_eq!(field.take_crop(Plot::new(1, 1)).unwrap().crop_type, "Corn");
        assert!(field.take_crop(Plot::new(1, 1)).is_none());
    }
}
