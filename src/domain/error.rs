//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid input to the pure domain logic.
/// A species missing from its chain is not one of them: that is `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed evolution chain at {species}: {reason}")]
    MalformedChain { species: String, reason: String },

    #[error("target species name must not be empty")]
    InvalidTarget,

    #[error("invalid generation name: {0}")]
    InvalidGeneration(String),
}
