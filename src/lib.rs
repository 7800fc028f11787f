//! dexsync: ingest PokeAPI species data into a record table.
//!
//! Layers, innermost first:
//! - `domain`: records and the evolution chain resolver, no I/O
//! - `application`: wire documents, evolution fallback policy, ingestion service
//! - `infrastructure`: document sources, record store, service container
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
