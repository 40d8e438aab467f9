//! Pet registry, decay scheduling, and configuration for the pet care
//! simulator.
//!
//! This crate owns everything above a single pet: the registry of adopted
//! pets, the background tick that decays them, the shutdown signal that
//! cancels pending item applications, and the YAML configuration.
//!
//! # Modules
//!
//! - [`catalog`] -- The item catalog with species filtering ([`ItemCatalog`]).
//! - [`config`] -- Configuration loading from `petcare-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Manager construction errors ([`ManagerError`]).
//! - [`manager`] -- The pet registry and event hub ([`PetManager`]).
//! - [`scheduler`] -- The recurring decay trigger ([`DecayScheduler`]).

pub mod catalog;
pub mod config;
pub mod error;
pub mod manager;
pub mod scheduler;

pub use catalog::ItemCatalog;
pub use config::{ConfigError, SimulatorConfig};
pub use error::ManagerError;
pub use manager::PetManager;
pub use scheduler::DecayScheduler;
