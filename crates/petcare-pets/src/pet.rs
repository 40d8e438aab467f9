//! The pet entity and its lifecycle state machine.
//!
//! A [`Pet`] owns one stat table and one alive flag behind a per-pet
//! mutex. Every mutation (clamping, the liveliness evaluation that may
//! follow it, and the alive-flag flip) happens inside a single critical
//! section, so concurrent decay ticks and item effects on the same pet
//! never lose an update and never fire two death notifications.
//!
//! Notifications are collected while the lock is held and delivered right
//! after it is released, before the mutating call returns. Observers may
//! therefore call back into the pet (or into whoever owns it) freely.
//!
//! # State machine
//!
//! ```text
//! Alive --(any stat reaches 0)--> Deceased   (terminal)
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use petcare_types::{PetDied, PetId, PetStatus, Species, StatKind, StatSnapshot, StatsChanged};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::PetError;
use crate::observer::{ObserverRegistry, SubscriptionId};
use crate::vitals;

/// Mutable part of a pet, guarded by the per-pet lock.
#[derive(Debug)]
struct PetState {
    stats: StatSnapshot,
    alive: bool,
    died_at: Option<DateTime<Utc>>,
}

/// Notification produced inside the critical section, delivered after it.
enum Notice {
    Stats(StatsChanged),
    Died(PetDied),
}

/// A single adopted pet.
///
/// Pets are shared as `Arc<Pet>` between the manager, the decay tick and
/// any in-flight item application.
#[derive(Debug)]
pub struct Pet {
    id: PetId,
    name: String,
    species: Species,
    adopted_at: DateTime<Utc>,
    state: Mutex<PetState>,
    /// Mirrors the alive flag so item waits can be cancelled on death.
    alive_tx: watch::Sender<bool>,
    stats_changed: ObserverRegistry<StatsChanged>,
    died: ObserverRegistry<PetDied>,
}

impl Pet {
    /// Create a pet with every stat set to `initial_value` (clamped to the
    /// stat maximum).
    ///
    /// The name is trimmed; a blank name is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::EmptyName`] if `name` is empty or whitespace.
    pub fn new(name: &str, species: Species, initial_value: u32) -> Result<Self, PetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PetError::EmptyName);
        }

        let (alive_tx, _alive_rx) = watch::channel(true);
        let pet = Self {
            id: PetId::new(),
            name: name.to_owned(),
            species,
            adopted_at: Utc::now(),
            state: Mutex::new(PetState {
                stats: vitals::filled(initial_value),
                alive: true,
                died_at: None,
            }),
            alive_tx,
            stats_changed: ObserverRegistry::new(),
            died: ObserverRegistry::new(),
        };

        info!(pet_id = %pet.id, pet = %pet.name, species = %species, "{}", species.greeting(&pet.name));
        Ok(pet)
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Unique identifier assigned at creation.
    pub const fn id(&self) -> PetId {
        self.id
    }

    /// The pet's name (never empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pet's species.
    pub const fn species(&self) -> Species {
        self.species
    }

    /// When the pet was created.
    pub const fn adopted_at(&self) -> DateTime<Utc> {
        self.adopted_at
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether the pet is still alive.
    pub fn is_alive(&self) -> bool {
        self.lock().alive
    }

    /// When the pet died, if it has.
    pub fn died_at(&self) -> Option<DateTime<Utc>> {
        self.lock().died_at
    }

    /// Copy of the full stat table.
    pub fn stats(&self) -> StatSnapshot {
        self.lock().stats.clone()
    }

    /// Current value of one stat.
    pub fn stat(&self, kind: StatKind) -> u32 {
        self.lock().stats.get(&kind).copied().unwrap_or(0)
    }

    /// Point-in-time status. Stats are omitted once the pet is deceased.
    pub fn status(&self) -> PetStatus {
        let state = self.lock();
        PetStatus {
            pet_id: self.id,
            name: self.name.clone(),
            species: self.species,
            alive: state.alive,
            stats: state.alive.then(|| state.stats.clone()),
        }
    }

    /// Receiver that flips to `false` when the pet dies.
    pub(crate) fn alive_signal(&self) -> watch::Receiver<bool> {
        self.alive_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Register a callback for every stat change while the pet is alive.
    pub fn subscribe_stats_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StatsChanged) + Send + Sync + 'static,
    {
        self.stats_changed.subscribe(callback)
    }

    /// Register a callback for the pet's death. It fires at most once.
    pub fn subscribe_died<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PetDied) + Send + Sync + 'static,
    {
        self.died.subscribe(callback)
    }

    /// Remove a stats-changed or died subscription.
    ///
    /// Returns `true` if the subscription existed on this pet.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.stats_changed.unsubscribe(id) || self.died.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Set every stat to `initial_value` (clamped) and notify.
    ///
    /// Intended for construction time; has no effect on a deceased pet.
    pub fn initialize_stats(&self, initial_value: u32) {
        let notices = {
            let mut state = self.lock();
            if !state.alive {
                return;
            }
            state.stats = vitals::filled(initial_value);
            vec![Notice::Stats(self.stats_event(&state))]
        };
        self.dispatch(notices);
    }

    /// Lower one stat by `amount` (floored at 0), notify, then evaluate
    /// liveliness.
    ///
    /// Returns the new value, or `None` if the pet was already deceased.
    pub fn decrease_stat(&self, kind: StatKind, amount: u32) -> Option<u32> {
        let (value, notices) = {
            let mut state = self.lock();
            if !state.alive {
                return None;
            }
            let value = vitals::decreased(state.stats.get(&kind).copied().unwrap_or(0), amount);
            state.stats.insert(kind, value);

            let mut notices = vec![Notice::Stats(self.stats_event(&state))];
            if let Some(died) = self.evaluate_liveliness(&mut state) {
                notices.push(Notice::Died(died));
            }
            (value, notices)
        };
        self.dispatch(notices);
        Some(value)
    }

    /// Raise one stat by `amount` (capped at the maximum) and notify.
    ///
    /// An increase can never kill, so liveliness is not evaluated.
    /// Returns the new value, or `None` if the pet is deceased.
    pub fn increase_stat(&self, kind: StatKind, amount: u32) -> Option<u32> {
        let (value, notices) = {
            let mut state = self.lock();
            if !state.alive {
                return None;
            }
            let value = vitals::increased(state.stats.get(&kind).copied().unwrap_or(0), amount);
            state.stats.insert(kind, value);
            (value, vec![Notice::Stats(self.stats_event(&state))])
        };
        self.dispatch(notices);
        debug!(pet = %self.name, stat = %kind, value, "Stat increased");
        Some(value)
    }

    /// Apply one decay step to every stat, in [`StatKind::ALL`] order.
    ///
    /// Stops at the first stat that kills the pet; later stats keep their
    /// value. Returns whether the pet is still alive afterwards.
    pub fn pass_time(&self, amount: u32) -> bool {
        for kind in StatKind::ALL {
            if self.decrease_stat(kind, amount).is_none() || !self.is_alive() {
                return false;
            }
        }
        true
    }

    /// Flip to deceased if any stat is depleted.
    ///
    /// Idempotent: a pet that is already deceased stays silent. Returns
    /// `true` only for the call that performed the transition.
    pub fn check_liveliness(&self) -> bool {
        let died = {
            let mut state = self.lock();
            self.evaluate_liveliness(&mut state)
        };
        let Some(event) = died else {
            return false;
        };
        self.dispatch(vec![Notice::Died(event)]);
        true
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, PetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stats_event(&self, state: &PetState) -> StatsChanged {
        StatsChanged {
            pet_id: self.id,
            pet_name: self.name.clone(),
            species: self.species,
            stats: state.stats.clone(),
        }
    }

    /// The only place the alive flag is ever cleared.
    fn evaluate_liveliness(&self, state: &mut PetState) -> Option<PetDied> {
        if !state.alive || !vitals::is_depleted(&state.stats) {
            return None;
        }
        let died_at = Utc::now();
        state.alive = false;
        state.died_at = Some(died_at);
        self.alive_tx.send_replace(false);

        Some(PetDied {
            pet_id: self.id,
            pet_name: self.name.clone(),
            species: self.species,
            died_at,
        })
    }

    fn dispatch(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Stats(event) => {
                    let _ = self.stats_changed.notify(&event);
                }
                Notice::Died(event) => {
                    warn!(
                        pet_id = %self.id,
                        pet = %self.name,
                        species = %self.species,
                        "Oh no! {} the {} has passed away due to neglect",
                        self.name,
                        self.species
                    );
                    let _ = self.died.notify(&event);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn make_pet(initial: u32) -> Pet {
        Pet::new("Rex", Species::Dog, initial).unwrap()
    }

    fn count_deaths(pet: &Pet) -> Arc<AtomicUsize> {
        let deaths = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&deaths);
        let _ = pet.subscribe_died(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        deaths
    }

    fn count_changes(pet: &Pet) -> Arc<AtomicUsize> {
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        let _ = pet.subscribe_stats_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        changes
    }

    #[test]
    fn new_pet_starts_alive_with_initial_stats() {
        let pet = make_pet(50);
        assert!(pet.is_alive());
        assert!(pet.died_at().is_none());
        for kind in StatKind::ALL {
            assert_eq!(pet.stat(kind), 50);
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(Pet::new("   ", Species::Cat, 50).err(), Some(PetError::EmptyName));
        assert_eq!(Pet::new("", Species::Cat, 50).err(), Some(PetError::EmptyName));
    }

    #[test]
    fn name_is_trimmed() {
        let pet = Pet::new("  Tom  ", Species::Cat, 50).unwrap();
        assert_eq!(pet.name(), "Tom");
    }

    #[test]
    fn decrease_is_clamped_at_zero() {
        let pet = make_pet(50);
        assert_eq!(pet.decrease_stat(StatKind::Fun, 500), Some(0));
        assert_eq!(pet.stat(StatKind::Fun), 0);
    }

    #[test]
    fn increase_is_clamped_at_maximum() {
        let pet = make_pet(90);
        assert_eq!(pet.increase_stat(StatKind::Sleep, 50), Some(100));
    }

    #[test]
    fn fifty_single_stat_decrements_kill_exactly_once() {
        let pet = make_pet(50);
        let deaths = count_deaths(&pet);

        for _ in 0..49 {
            let _ = pet.decrease_stat(StatKind::Hunger, 1);
        }
        assert!(pet.is_alive());
        assert_eq!(deaths.load(Ordering::SeqCst), 0);

        assert_eq!(pet.decrease_stat(StatKind::Hunger, 1), Some(0));
        assert!(!pet.is_alive());
        assert!(pet.died_at().is_some());
        assert_eq!(deaths.load(Ordering::SeqCst), 1);

        // Other stats were never touched.
        assert_eq!(pet.stat(StatKind::Fun), 50);
        assert_eq!(pet.stat(StatKind::Sleep), 50);
    }

    #[test]
    fn check_liveliness_is_idempotent() {
        let pet = make_pet(50);
        let deaths = count_deaths(&pet);

        assert!(!pet.check_liveliness());
        let _ = pet.decrease_stat(StatKind::Sleep, 50);
        assert_eq!(deaths.load(Ordering::SeqCst), 1);

        for _ in 0..5 {
            assert!(!pet.check_liveliness());
        }
        assert_eq!(deaths.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn check_liveliness_kills_a_pet_initialised_at_zero() {
        let pet = make_pet(0);
        let deaths = count_deaths(&pet);
        assert!(pet.is_alive());
        assert!(pet.check_liveliness());
        assert!(!pet.is_alive());
        assert_eq!(deaths.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deceased_pet_ignores_mutations() {
        let pet = make_pet(1);
        let _ = pet.decrease_stat(StatKind::Hunger, 1);
        assert!(!pet.is_alive());

        let changes = count_changes(&pet);
        let before = pet.stats();
        assert_eq!(pet.increase_stat(StatKind::Fun, 10), None);
        assert_eq!(pet.decrease_stat(StatKind::Fun, 10), None);
        pet.initialize_stats(80);
        assert!(!pet.pass_time(1));

        assert_eq!(pet.stats(), before);
        assert_eq!(changes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pass_time_stops_after_fatal_stat() {
        let pet = make_pet(5);
        // Hunger is first in decay order; drop it to 1 so the next tick kills.
        let _ = pet.decrease_stat(StatKind::Hunger, 4);

        assert!(!pet.pass_time(1));
        assert_eq!(pet.stat(StatKind::Hunger), 0);
        assert_eq!(pet.stat(StatKind::Fun), 5);
        assert_eq!(pet.stat(StatKind::Sleep), 5);
    }

    #[test]
    fn pass_time_decays_every_stat() {
        let pet = make_pet(50);
        assert!(pet.pass_time(2));
        for kind in StatKind::ALL {
            assert_eq!(pet.stat(kind), 48);
        }
    }

    #[test]
    fn fatal_decrement_reports_stats_before_death() {
        let pet = make_pet(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&order);
        let _ = pet.subscribe_stats_changed(move |event| {
            log.lock().unwrap().push(format!("stats:{}", event.stats.get(&StatKind::Hunger).copied().unwrap_or(99)));
        });
        let log = Arc::clone(&order);
        let _ = pet.subscribe_died(move |event| {
            log.lock().unwrap().push(format!("died:{}", event.pet_name));
        });

        let _ = pet.decrease_stat(StatKind::Hunger, 1);
        assert_eq!(*order.lock().unwrap(), vec!["stats:0", "died:Rex"]);
    }

    #[test]
    fn observer_can_query_the_pet_without_deadlock() {
        let pet = Arc::new(make_pet(1));
        let seen_alive = Arc::new(Mutex::new(None));

        let inner = Arc::clone(&pet);
        let seen = Arc::clone(&seen_alive);
        let _ = pet.subscribe_died(move |_| {
            *seen.lock().unwrap() = Some(inner.is_alive());
        });

        let _ = pet.decrease_stat(StatKind::Fun, 1);
        assert_eq!(*seen_alive.lock().unwrap(), Some(false));
    }

    #[test]
    fn panicking_observer_does_not_break_the_pet() {
        let pet = make_pet(1);
        let _ = pet.subscribe_stats_changed(|_| panic!("observer bug"));
        let deaths = count_deaths(&pet);

        assert_eq!(pet.decrease_stat(StatKind::Hunger, 1), Some(0));
        assert!(!pet.is_alive());
        assert_eq!(deaths.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribed_observer_is_silent() {
        let pet = make_pet(50);
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        let id = pet.subscribe_stats_changed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let _ = pet.increase_stat(StatKind::Fun, 1);
        assert!(pet.unsubscribe(id));
        let _ = pet.increase_stat(StatKind::Fun, 1);
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_decrements_lose_no_update() {
        let pet = Arc::new(make_pet(100));
        let deaths = count_deaths(&pet);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pet = Arc::clone(&pet);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        let _ = pet.decrease_stat(StatKind::Hunger, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pet.stat(StatKind::Hunger), 20);
        assert!(pet.is_alive());
        assert_eq!(deaths.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn concurrent_fatal_decrements_fire_one_death() {
        let pet = Arc::new(make_pet(10));
        let deaths = count_deaths(&pet);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pet = Arc::clone(&pet);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        let _ = pet.decrease_stat(StatKind::Sleep, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!pet.is_alive());
        assert_eq!(pet.stat(StatKind::Sleep), 0);
        assert_eq!(deaths.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn status_reflects_lifecycle() {
        let pet = make_pet(50);
        assert_eq!(
            pet.status().to_string(),
            "Rex (Dog) - Stats: [Hunger: 50, Fun: 50, Sleep: 50]"
        );
        let _ = pet.decrease_stat(StatKind::Fun, 50);
        let status = pet.status();
        assert!(!status.alive);
        assert!(status.stats.is_none());
        assert_eq!(status.to_string(), "Rex the Dog (Deceased)");
    }
}
