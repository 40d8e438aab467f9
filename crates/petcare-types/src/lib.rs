//! Shared type definitions for the pet care simulator.
//!
//! This crate is the single source of truth for the value types exchanged
//! between the pet state machine, the manager, and the engine binary.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for pet identifiers
//! - [`enums`] -- Species and stat-kind enumerations
//! - [`structs`] -- Items, notification payloads, and status snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Species, StatKind};
pub use ids::PetId;
pub use structs::{Item, MAX_STAT_VALUE, PetDied, PetStatus, StatSnapshot, StatsChanged};
