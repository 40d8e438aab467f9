//! Pet state, stat mechanics, and lifecycle for the pet care simulator.
//!
//! This crate contains the logic layer for a single pet: everything that
//! operates on one pet's stats and alive flag without knowing about the
//! registry or the decay timer. It sits between `petcare-types` (which
//! defines the data structures) and `petcare-core` (which owns the
//! registry and the background tick).
//!
//! # Modules
//!
//! - [`config`] -- Tunable stat and decay parameters ([`CareConfig`])
//! - [`error`] -- Error types for pet operations ([`PetError`])
//! - [`item`] -- Timed, cancellable item application ([`ItemOutcome`])
//! - [`observer`] -- Synchronous observer registries ([`ObserverRegistry`])
//! - [`pet`] -- The pet entity and its `Alive -> Deceased` state machine ([`Pet`])
//! - [`vitals`] -- Pure stat arithmetic (clamping, depletion)

pub mod config;
pub mod error;
pub mod item;
pub mod observer;
pub mod pet;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use config::CareConfig;
pub use error::PetError;
pub use item::{CancelReason, ItemOutcome, ShutdownSignal};
pub use observer::{ObserverRegistry, SubscriptionId};
pub use pet::Pet;
