//! Registry mutations racing deaths and ticks on a multi-threaded runtime.
//!
//! The interleaving tests hook a tracing layer onto a log line emitted in
//! the window under test and run a second registry mutation from inside
//! it, so the race is hit on every run instead of by chance.

#![allow(clippy::unwrap_used)]

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use petcare_core::PetManager;
use petcare_pets::{CareConfig, Pet};
use petcare_types::{Species, StatKind};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

fn manager(decay_interval_ms: u64) -> PetManager {
    PetManager::new(CareConfig {
        initial_stat_value: 50,
        decay_amount: 1,
        decay_interval_ms,
    })
    .unwrap()
}

fn death_counter(manager: &PetManager) -> Arc<AtomicUsize> {
    let deaths = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&deaths);
    let _ = manager.subscribe_pet_died(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    deaths
}

/// Runs `action` once, the first time an event's message contains `needle`.
struct OnMessage<F> {
    needle: &'static str,
    fired: AtomicBool,
    action: F,
}

impl<F> OnMessage<F> {
    const fn new(needle: &'static str, action: F) -> Self {
        Self {
            needle,
            fired: AtomicBool::new(false),
            action,
        }
    }
}

impl<S, F> Layer<S> for OnMessage<F>
where
    S: Subscriber,
    F: Fn() + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = MessageText::default();
        event.record(&mut message);
        if message.0.contains(self.needle) && !self.fired.swap(true, Ordering::SeqCst) {
            (self.action)();
        }
    }
}

#[derive(Default)]
struct MessageText(String);

impl Visit for MessageText {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Run `work` on a blocking thread with `layer` as its only subscriber.
async fn with_hook<L, W>(layer: L, work: W)
where
    L: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
    W: FnOnce() + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, work);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn adoption_between_last_death_and_stop_keeps_decay_running() {
    let manager = manager(20);
    let rex = manager.adopt_new(Species::Dog, "Rex").unwrap();
    let tom: Arc<Mutex<Option<Arc<Pet>>>> = Arc::new(Mutex::new(None));

    let adopter = manager.clone();
    let adopted = Arc::clone(&tom);
    let layer = OnMessage::new("No living pets remain", move || {
        *adopted.lock().unwrap() = Some(adopter.adopt_new(Species::Cat, "Tom").unwrap());
    });
    with_hook(layer, move || {
        let _ = rex.decrease_stat(StatKind::Hunger, 50);
    })
    .await;

    let tom = tom.lock().unwrap().clone().unwrap();
    assert!(tom.is_alive());
    assert!(manager.is_updating(), "a living pet must keep decay running");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(tom.stat(StatKind::Fun) < 50, "Tom never decayed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn readopting_while_the_first_adoption_completes_is_refused() {
    let manager = manager(60_000);
    let deaths = death_counter(&manager);
    let pet = Arc::new(Pet::new("Rex", Species::Dog, 50).unwrap());
    let nested: Arc<Mutex<Option<bool>>> = Arc::new(Mutex::new(None));

    let adopter = manager.clone();
    let again = Arc::clone(&pet);
    let result = Arc::clone(&nested);
    let layer = OnMessage::new("is now under your care", move || {
        *result.lock().unwrap() = Some(adopter.adopt(Arc::clone(&again)));
    });
    let outer = manager.clone();
    let first = Arc::clone(&pet);
    with_hook(layer, move || assert!(outer.adopt(first))).await;

    assert_eq!(*nested.lock().unwrap(), Some(false));
    assert_eq!(manager.list_all().len(), 1);

    let _ = pet.decrease_stat(StatKind::Sleep, 50);
    assert_eq!(deaths.load(Ordering::SeqCst), 1, "death relayed more than once");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_adoptions_of_one_pet_register_it_once() {
    const THREADS: usize = 8;

    let manager = manager(60_000);
    let deaths = death_counter(&manager);
    let pet = Arc::new(Pet::new("Rex", Species::Dog, 50).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let threads: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            let pet = Arc::clone(&pet);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                manager.adopt(pet)
            })
        })
        .collect();
    let accepted = threads
        .into_iter()
        .map(|thread| thread.join().unwrap())
        .filter(|accepted| *accepted)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(manager.list_all().len(), 1);

    let _ = pet.decrease_stat(StatKind::Fun, 50);
    assert_eq!(deaths.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_the_last_death_with_an_adoption_keeps_the_invariant() {
    for round in 0..50 {
        let manager = manager(60_000);
        let rex = manager.adopt_new(Species::Dog, "Rex").unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let killer = {
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let _ = rex.decrease_stat(StatKind::Hunger, 50);
            })
        };
        let adopter = {
            let manager = manager.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                manager.adopt_new(Species::Cat, "Tom").unwrap()
            })
        };
        killer.join().unwrap();
        let tom = adopter.join().unwrap();

        assert!(tom.is_alive());
        assert!(manager.is_updating(), "round {round}: decay stopped with Tom alive");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_ticks_apply_every_step() {
    const TICKS: u32 = 10;

    let manager = manager(60_000);
    let pets: Vec<_> = ["Rex", "Tom", "Goldie"]
        .into_iter()
        .zip([Species::Dog, Species::Cat, Species::Fish])
        .map(|(name, species)| manager.adopt_new(species, name).unwrap())
        .collect();

    let threads: Vec<_> = (0..2)
        .map(|_| {
            let manager = manager.clone();
            std::thread::spawn(move || {
                for _ in 0..TICKS {
                    assert!(manager.tick() >= 3);
                }
            })
        })
        .collect();
    let late = manager.adopt_new(Species::Rabbit, "Thumper").unwrap();
    for thread in threads {
        thread.join().unwrap();
    }

    for pet in &pets {
        for kind in StatKind::ALL {
            assert_eq!(pet.stat(kind), 30, "{} {kind}", pet.name());
        }
    }
    assert!(late.stat(StatKind::Fun) >= 30);
    assert_eq!(manager.list_all().len(), 4);
    assert!(manager.is_updating());
}
