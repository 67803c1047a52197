pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{GameClock, Season, TimeOfDay, Weather};
pub use config::SimulationConfig;
pub use error::{Result, SimError};
pub use types::{EntityId, ItemId, LocationId, Plot, ShopId};
