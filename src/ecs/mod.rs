//! Entity-component store

pub mod archetypes;
pub mod component;
pub mod registry;

pub use component::{Component, ComponentData, ComponentKind, ComponentType};
pub use registry::{Entity, EntityRegistry};
