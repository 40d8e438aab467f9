//! The pet registry and event hub.
//!
//! [`PetManager`] owns every adopted pet, the decay scheduler, and the
//! shutdown signal that cancels in-flight item applications. It is a cheap
//! handle (`Clone` shares the same registry) so the engine, the scheduler
//! task and item tasks can all reach it.
//!
//! # Locking
//!
//! One registry mutex guards the pet list and the scheduler slot. It is
//! never held across an `.await` and never held while a pet mutates, so
//! pet observers (including the manager's own death handler) may call back
//! into the manager freely. Lock order is registry, then pet.
//!
//! # Scheduler invariant
//!
//! After every adoption, tick and death notification, a scheduler is
//! running if and only if at least one registered pet is alive. After
//! [`shutdown`](PetManager::shutdown) no scheduler ever runs again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use petcare_pets::{CareConfig, ItemOutcome, ObserverRegistry, Pet, PetError, ShutdownSignal, SubscriptionId};
use petcare_types::{Item, PetDied, PetStatus, Species};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::error::ManagerError;
use crate::scheduler::DecayScheduler;

/// A registered pet plus the manager's subscriptions on it.
#[derive(Debug)]
struct Entry {
    pet: Arc<Pet>,
    subscriptions: [SubscriptionId; 2],
}

#[derive(Debug)]
struct Registry {
    /// Adoption order.
    entries: Vec<Entry>,
    scheduler: Option<DecayScheduler>,
    next_generation: u64,
    shut_down: bool,
}

impl Registry {
    fn any_alive(&self) -> bool {
        self.entries.iter().any(|entry| entry.pet.is_alive())
    }

    fn living(&self) -> Vec<Arc<Pet>> {
        self.entries
            .iter()
            .filter(|entry| entry.pet.is_alive())
            .map(|entry| Arc::clone(&entry.pet))
            .collect()
    }
}

#[derive(Debug)]
struct Shared {
    config: CareConfig,
    runtime: Handle,
    registry: Mutex<Registry>,
    died_observers: ObserverRegistry<PetDied>,
    shutdown_tx: watch::Sender<bool>,
}

/// Registry of adopted pets and owner of the decay scheduler.
#[derive(Debug, Clone)]
pub struct PetManager {
    shared: Arc<Shared>,
}

impl PetManager {
    /// Create an empty manager bound to the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NoRuntime`] when called outside a runtime.
    pub fn new(config: CareConfig) -> Result<Self, ManagerError> {
        let runtime = Handle::try_current()?;
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                runtime,
                registry: Mutex::new(Registry {
                    entries: Vec::new(),
                    scheduler: None,
                    next_generation: 1,
                    shut_down: false,
                }),
                died_observers: ObserverRegistry::new(),
                shutdown_tx,
            }),
        })
    }

    /// The stat and decay settings this manager was built with.
    pub fn config(&self) -> &CareConfig {
        &self.shared.config
    }

    // -----------------------------------------------------------------------
    // Adoption and removal
    // -----------------------------------------------------------------------

    /// Register an existing pet and start decay if needed.
    ///
    /// Returns `false` (and changes nothing) if the pet is already
    /// registered.
    pub fn adopt(&self, pet: Arc<Pet>) -> bool {
        // Subscribed before the insert; a rejected duplicate drops both again.
        let stats_sub = pet.subscribe_stats_changed(|event| {
            trace!(pet = %event.pet_name, stats = ?event.stats, "Stats changed");
        });
        let weak = Arc::downgrade(&self.shared);
        let died_sub = pet.subscribe_died(move |event| {
            if let Some(manager) = Self::from_weak(&weak) {
                manager.on_pet_died(event);
            }
        });

        let started = {
            let mut registry = self.lock();
            if registry.entries.iter().any(|entry| entry.pet.id() == pet.id()) {
                None
            } else {
                registry.entries.push(Entry {
                    pet: Arc::clone(&pet),
                    subscriptions: [stats_sub, died_sub],
                });
                Some(self.start_locked(&mut registry))
            }
        };

        let Some(started) = started else {
            let _ = pet.unsubscribe(stats_sub);
            let _ = pet.unsubscribe(died_sub);
            warn!(pet = %pet.name(), pet_id = %pet.id(), "Pet is already under your care");
            return false;
        };

        info!(
            pet = %pet.name(),
            species = %pet.species(),
            "{} the {} is now under your care",
            pet.name(),
            pet.species()
        );
        if let Some(generation) = started {
            self.log_started(generation);
        }
        true
    }

    /// Create a pet with the configured initial stats and adopt it.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::EmptyName`] for a blank name. Nothing is
    /// registered in that case.
    pub fn adopt_new(&self, species: Species, name: &str) -> Result<Arc<Pet>, PetError> {
        let pet = match Pet::new(name, species, self.shared.config.clamped_initial_value()) {
            Ok(pet) => Arc::new(pet),
            Err(err) => {
                warn!(species = %species, error = %err, "Cannot adopt pet, adoption cancelled");
                return Err(err);
            }
        };
        let _ = self.adopt(Arc::clone(&pet));
        Ok(pet)
    }

    /// Remove one deceased pet with exactly this name and species.
    ///
    /// Living pets are never removed. Returns the removed pet, or `None`
    /// when nothing matched.
    pub fn formally_remove(&self, name: &str, species: Species) -> Option<Arc<Pet>> {
        let entry = {
            let mut registry = self.lock();
            let index = registry.entries.iter().position(|entry| {
                entry.pet.name() == name && entry.pet.species() == species && !entry.pet.is_alive()
            })?;
            registry.entries.remove(index)
        };

        for id in entry.subscriptions {
            let _ = entry.pet.unsubscribe(id);
        }
        info!(pet = %name, species = %species, "Deceased pet formally removed");
        Some(entry.pet)
    }

    // -----------------------------------------------------------------------
    // Decay scheduling
    // -----------------------------------------------------------------------

    /// Start the decay scheduler if none is running and any pet is alive.
    ///
    /// Idempotent. Does nothing after [`shutdown`](Self::shutdown).
    pub fn start_updates(&self) {
        let started = {
            let mut registry = self.lock();
            self.start_locked(&mut registry)
        };
        if let Some(generation) = started {
            self.log_started(generation);
        }
    }

    /// Stop the decay scheduler if one is running. Idempotent.
    ///
    /// Safe to call from inside a tick or an observer.
    pub fn stop_updates(&self) {
        let scheduler = self.lock().scheduler.take();
        if let Some(scheduler) = scheduler {
            Self::halt(&scheduler);
        }
    }

    /// Start a scheduler while the caller holds the registry lock.
    ///
    /// Returns the new generation, or `None` if nothing was started.
    fn start_locked(&self, registry: &mut Registry) -> Option<u64> {
        if registry.shut_down || registry.scheduler.is_some() || !registry.any_alive() {
            return None;
        }

        let generation = registry.next_generation;
        registry.next_generation = generation.saturating_add(1);

        let weak = Arc::downgrade(&self.shared);
        registry.scheduler = Some(DecayScheduler::start(
            &self.shared.runtime,
            self.shared.config.decay_interval(),
            generation,
            move |generation| {
                if let Some(manager) = Self::from_weak(&weak) {
                    manager.on_scheduler_fired(generation);
                }
            },
        ));
        Some(generation)
    }

    /// Stop the scheduler if no registered pet is alive.
    ///
    /// The liveness check and the removal share one critical section, so
    /// an adoption can never land between them. Returns `true` if a
    /// scheduler was stopped.
    fn stop_if_none_alive(&self) -> bool {
        let scheduler = {
            let mut registry = self.lock();
            if registry.any_alive() {
                return false;
            }
            registry.scheduler.take()
        };
        let Some(scheduler) = scheduler else {
            return false;
        };
        info!("No living pets remain");
        Self::halt(&scheduler);
        true
    }

    fn log_started(&self, generation: u64) {
        let config = &self.shared.config;
        info!(
            generation,
            decay_amount = config.decay_amount,
            interval_ms = config.decay_interval_ms,
            "Pet care routine initiated: Hunger, Fun and Sleep will decrease by {} every {:?}",
            config.decay_amount,
            config.decay_interval()
        );
    }

    fn halt(scheduler: &DecayScheduler) {
        scheduler.stop();
        info!(
            generation = scheduler.generation(),
            period = ?scheduler.period(),
            "Pet care routine paused/stopped"
        );
    }

    /// Whether a decay scheduler is currently active.
    pub fn is_updating(&self) -> bool {
        self.lock()
            .scheduler
            .as_ref()
            .is_some_and(|scheduler| !scheduler.is_finished())
    }

    /// Apply one decay step to every living pet.
    ///
    /// Pets are snapshotted under the registry lock and decayed outside it,
    /// so adoptions and removals during the pass only show up on the next
    /// tick. With no living pets the scheduler is stopped instead. Returns
    /// the number of pets in the snapshot.
    pub fn tick(&self) -> usize {
        let snapshot = self.lock().living();
        self.decay(&snapshot)
    }

    fn on_scheduler_fired(&self, generation: u64) {
        let snapshot = {
            let registry = self.lock();
            let current = registry.scheduler.as_ref().map(DecayScheduler::generation);
            if current != Some(generation) {
                debug!(generation, ?current, "Ignoring stale decay firing");
                return;
            }
            registry.living()
        };
        let _ = self.decay(&snapshot);
    }

    fn decay(&self, snapshot: &[Arc<Pet>]) -> usize {
        if snapshot.is_empty() {
            debug!("No living pets to update");
            let _ = self.stop_if_none_alive();
            return 0;
        }

        let amount = self.shared.config.decay_amount;
        for pet in snapshot {
            // Another pet's death earlier in this pass must not skip this one.
            if pet.is_alive() {
                let _ = pet.pass_time(amount);
            }
        }
        debug!(pets = snapshot.len(), amount, "Decay tick applied");
        snapshot.len()
    }

    fn on_pet_died(&self, event: &PetDied) {
        let _ = self.shared.died_observers.notify(event);
        let _ = self.stop_if_none_alive();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every registered pet, living or deceased, in adoption order.
    pub fn list_all(&self) -> Vec<Arc<Pet>> {
        self.lock()
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.pet))
            .collect()
    }

    /// Living pets in adoption order.
    pub fn list_living(&self) -> Vec<Arc<Pet>> {
        self.lock().living()
    }

    /// First living pet whose name matches, ignoring case.
    pub fn find_living_by_name(&self, name: &str) -> Option<Arc<Pet>> {
        let wanted = name.trim().to_lowercase();
        self.lock()
            .entries
            .iter()
            .find(|entry| entry.pet.is_alive() && entry.pet.name().to_lowercase() == wanted)
            .map(|entry| Arc::clone(&entry.pet))
    }

    /// Status of every registered pet, in adoption order.
    pub fn statuses(&self) -> Vec<PetStatus> {
        self.list_all().iter().map(|pet| pet.status()).collect()
    }

    /// Caretaker-facing status line of every registered pet.
    pub fn status_report(&self) -> Vec<String> {
        self.statuses().iter().map(ToString::to_string).collect()
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Use `item` on `pet` in the background.
    ///
    /// The application is cancelled if the pet dies or the manager shuts
    /// down before the item's busy period ends.
    pub fn use_item(&self, pet: &Arc<Pet>, item: Item) -> JoinHandle<ItemOutcome> {
        let pet = Arc::clone(pet);
        let shutdown = self.shutdown_signal();
        self.shared
            .runtime
            .spawn(async move { pet.apply_item(&item, shutdown).await })
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Register a callback for the death of any registered pet.
    ///
    /// Runs before the manager decides whether to stop the scheduler.
    pub fn subscribe_pet_died<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PetDied) + Send + Sync + 'static,
    {
        self.shared.died_observers.subscribe(callback)
    }

    /// Remove a callback added with [`subscribe_pet_died`](Self::subscribe_pet_died).
    pub fn unsubscribe_pet_died(&self, id: SubscriptionId) -> bool {
        self.shared.died_observers.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Receiver that flips to `true` on [`shutdown`](Self::shutdown).
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shared.shutdown_tx.subscribe()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }

    /// Stop decay for good and cancel pending item applications.
    ///
    /// Idempotent. Pets stay registered and queryable.
    pub fn shutdown(&self) {
        let scheduler = {
            let mut registry = self.lock();
            if registry.shut_down {
                return;
            }
            registry.shut_down = true;
            registry.scheduler.take()
        };
        drop(scheduler);
        self.shared.shutdown_tx.send_replace(true);
        info!("All pet care routines have been stopped");
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
