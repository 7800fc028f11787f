//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (DocumentSource, RecordStore)
//! but are themselves concrete structs, not traits.

mod evolution;
mod ingest;

pub use evolution::{ChainData, EvolutionOutcome, EvolutionPolicy, NO_CHAIN_DEFAULT};
pub use ingest::{IngestReport, IngestService};
