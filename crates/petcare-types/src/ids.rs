//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Pet names are not unique, so every adoption gets a [`PetId`] that
//! observers and logs can use to tell two pets called "Rex" apart. IDs use
//! UUID v7 (time-ordered).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an adopted pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PetId(pub Uuid);

impl PetId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for PetId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PetId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<PetId> for Uuid {
    fn from(id: PetId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let first = PetId::new();
        let second = PetId::new();
        assert_ne!(first, second);
        assert_ne!(first.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = PetId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
