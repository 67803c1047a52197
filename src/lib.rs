//! Village Sim - turn-based farming village simulation
//!
//! An entity-component store, a world graph the entities move through, and a
//! turn engine that dispatches each entity's action to the agriculture,
//! economy and social managers under one simulated clock.

pub mod agriculture;
pub mod core;
pub mod economy;
pub mod ecs;
pub mod event;
pub mod persistence;
pub mod simulation;
pub mod social;
pub mod world;
