//! Domain layer: entities and the evolution chain resolver
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod catalog;
pub mod entities;
pub mod error;
pub mod evolution;

pub use catalog::{MoveRecord, TypeRecord, NO_EFFECT_DESCRIPTION};
pub use entities::*;
pub use error::DomainError;
pub use evolution::{resolve, EvolutionNode, EvolutionNodeRef, StageInfo};
