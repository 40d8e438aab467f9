//! Core value structs shared across the workspace.
//!
//! - [`Item`] -- an immutable catalog entry the caretaker can apply to a pet
//! - [`StatsChanged`] / [`PetDied`] -- notification payloads pushed to observers
//! - [`PetStatus`] -- point-in-time status of one pet, rendered for display

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{Species, StatKind};
use crate::ids::PetId;

/// Upper bound of every stat value. The lower bound is 0.
pub const MAX_STAT_VALUE: u32 = 100;

/// Full mapping of stat kind to current value, ordered by [`StatKind`].
pub type StatSnapshot = BTreeMap<StatKind, u32>;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A consumable the caretaker uses to restore one stat.
///
/// Items are immutable values supplied by a catalog. Using one keeps the
/// pet busy for [`duration`](Self::duration) before the effect lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name of the item.
    pub name: String,

    /// The stat this item restores.
    pub affected_stat: StatKind,

    /// How many points the stat is raised by (clamped at the maximum).
    pub effect_amount: u32,

    /// Busy time before the effect applies, in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,

    /// Species that may use this item. Empty means every species.
    #[serde(default)]
    pub compatible_with: BTreeSet<Species>,
}

impl Item {
    /// Create an item usable by every species.
    pub fn new(
        name: impl Into<String>,
        affected_stat: StatKind,
        effect_amount: u32,
        duration_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            affected_stat,
            effect_amount,
            duration_ms,
            compatible_with: BTreeSet::new(),
        }
    }

    /// Restrict the item to the given species.
    #[must_use]
    pub fn only_for(mut self, species: impl IntoIterator<Item = Species>) -> Self {
        self.compatible_with.extend(species);
        self
    }

    /// Busy period as a [`Duration`].
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Whether a pet of the given species can use this item.
    pub fn is_compatible_with(&self, species: Species) -> bool {
        self.compatible_with.is_empty() || self.compatible_with.contains(&species)
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Payload of the stats-changed notification.
///
/// Emitted synchronously by every successful stat mutation while the pet
/// is alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsChanged {
    /// The pet whose stats changed.
    pub pet_id: PetId,
    /// The pet's name.
    pub pet_name: String,
    /// The pet's species.
    pub species: Species,
    /// Every stat value right after the change.
    pub stats: StatSnapshot,
}

/// Payload of the died notification. Emitted exactly once per pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetDied {
    /// The pet that died.
    pub pet_id: PetId,
    /// The pet's name.
    pub pet_name: String,
    /// The pet's species.
    pub species: Species,
    /// Wall-clock time of death.
    pub died_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Point-in-time status of a single pet.
///
/// The `Display` impl renders the caretaker-facing status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetStatus {
    /// The pet's identifier.
    pub pet_id: PetId,
    /// The pet's name.
    pub name: String,
    /// The pet's species.
    pub species: Species,
    /// Whether the pet is alive.
    pub alive: bool,
    /// Current stat values; `None` once the pet is deceased.
    pub stats: Option<StatSnapshot>,
}

impl core::fmt::Display for PetStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (&self.stats, self.alive) {
            (Some(stats), true) => {
                write!(f, "{} ({}) - Stats: [", self.name, self.species)?;
                for (index, (kind, value)) in stats.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{kind}: {value}")?;
                }
                write!(f, "]")
            }
            _ => write!(f, "{} the {} (Deceased)", self.name, self.species),
        }
    }
}
