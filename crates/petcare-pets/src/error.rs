//! Error types for the petcare-pets crate.
//!
//! Most pet operations are total: acting on a deceased pet is a reported
//! no-op, not an error. The only invalid input left once the type system
//! rules out an absent pet is a pet without a name.

/// Errors that can occur when creating a pet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PetError {
    /// The pet name was empty or only whitespace.
    #[error("pet name cannot be empty")]
    EmptyName,
}
