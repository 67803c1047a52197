use thiserror::Error;

use crate::core::types::{EntityId, LocationId};
use crate::economy::EconomyError;
use crate::ecs::component::ComponentKind;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Registry full: at most {0} entities")]
    RegistryFull(usize),

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Entity {entity} already has a {kind} component")]
    DuplicateComponent { entity: EntityId, kind: ComponentKind },

    #[error("Entity {entity} already carries {max} components")]
    ComponentLimit { entity: EntityId, max: usize },

    #[error("Entity {entity} has no {kind} component")]
    ComponentNotFound { entity: EntityId, kind: ComponentKind },

    #[error("Location not found: {0}")]
    LocationNotFound(LocationId),

    #[error("World full: at most {0} locations")]
    WorldFull(usize),

    #[error("Location {location} already has {max} connections")]
    ConnectionLimit { location: LocationId, max: usize },

    #[error("Location {from} is already connected to {to}")]
    DuplicateConnection { from: LocationId, to: LocationId },

    #[error("No connection from {from} to {to}")]
    NoConnection { from: LocationId, to: LocationId },

    #[error("Location {0} is full")]
    LocationFull(LocationId),

    #[error("Entity {entity} is already at location {location}")]
    AlreadyPresent { entity: EntityId, location: LocationId },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Economy error: {0}")]
    Economy(#[from] EconomyError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
