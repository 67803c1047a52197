//! World graph: locations, connections and occupancy

pub mod graph;
pub mod location;
pub mod village;

pub use graph::{World, WorldLimits};
pub use location::{Connection, Location, LocationType};
