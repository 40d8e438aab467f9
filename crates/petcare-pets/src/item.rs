//! Timed, cancellable item application.
//!
//! Using an item keeps the pet busy for the item's duration before the
//! effect lands. The wait holds no lock: decay ticks, other item uses and
//! queries on the same pet proceed while it is pending. The wait races the
//! pet's own death and the process shutdown signal; losing that race
//! discards the effect.

use petcare_types::{Item, StatKind};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::pet::Pet;

/// Process-wide shutdown flag. Flips to `true` once, when the owner shuts
/// down. A dropped sender is treated the same as a shutdown.
pub type ShutdownSignal = watch::Receiver<bool>;

/// Why a pending item application was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The pet died during the busy period.
    PetDied,
    /// The owner shut down during the busy period.
    Shutdown,
}

impl core::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PetDied => write!(f, "pet died"),
            Self::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Result of one item application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The effect landed; `value` is the stat's new value.
    Applied {
        /// The stat that was raised.
        stat: StatKind,
        /// Its value after the increase.
        value: u32,
    },
    /// The pet was already deceased; nothing happened.
    PetDeceased,
    /// The busy period was interrupted; no stat changed.
    Cancelled(CancelReason),
}

impl ItemOutcome {
    /// Whether the item's effect was applied.
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

impl Pet {
    /// Use `item` on this pet.
    ///
    /// A deceased pet is reported and left untouched. Otherwise the species
    /// prelude runs, the pet stays busy for `item.duration()`, and the stat
    /// is raised only if the pet is still alive and `shutdown` has not
    /// fired by then.
    pub async fn apply_item(&self, item: &Item, shutdown: ShutdownSignal) -> ItemOutcome {
        if !self.is_alive() {
            warn!(pet = %self.name(), item = %item.name, "{} can't use items, it's no longer with us", self.name());
            return ItemOutcome::PetDeceased;
        }

        if let Some(line) = self.species().item_prelude(self.name(), &item.name) {
            info!(pet = %self.name(), "{line}");
        }
        info!(
            pet = %self.name(),
            item = %item.name,
            duration_ms = item.duration_ms,
            "{} is using {}...",
            self.name(),
            item.name
        );

        let cancelled = tokio::select! {
            biased;
            () = until_deceased(self.alive_signal()) => Some(CancelReason::PetDied),
            () = until_shutdown(shutdown) => Some(CancelReason::Shutdown),
            () = tokio::time::sleep(item.duration()) => None,
        };

        if let Some(reason) = cancelled {
            debug!(pet = %self.name(), item = %item.name, %reason, "Item application cancelled");
            return ItemOutcome::Cancelled(reason);
        }

        // The pet may have died between the timer firing and this point;
        // increase_stat re-checks under the pet lock.
        match self.increase_stat(item.affected_stat, item.effect_amount) {
            Some(value) => {
                info!(pet = %self.name(), item = %item.name, "{} finished using {}", self.name(), item.name);
                ItemOutcome::Applied {
                    stat: item.affected_stat,
                    value,
                }
            }
            None => ItemOutcome::Cancelled(CancelReason::PetDied),
        }
    }
}

async fn until_deceased(mut alive: watch::Receiver<bool>) {
    let _ = alive.wait_for(|alive| !*alive).await;
}

async fn until_shutdown(mut shutdown: ShutdownSignal) {
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}
