//! Pet care simulator binary.
//!
//! Loads configuration, adopts the seed pets, and lets their stats decay
//! in the background until every pet has passed away or the process
//! receives Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `petcare-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the pet manager and the item catalog
//! 4. Subscribe the death alert
//! 5. Adopt seed pets and hand out their welcome items
//! 6. Wait for Ctrl-C or for the last pet to die
//! 7. Shut down and log the final roster

mod error;

use std::path::Path;

use petcare_core::{ItemCatalog, PetManager, SimulatorConfig};
use petcare_pets::CareConfig;
use petcare_types::PetDied;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file looked up in the working directory.
const CONFIG_PATH: &str = "petcare-config.yaml";

/// Why the engine stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    Interrupted,
    Extinction,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading or manager creation fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = SimulatorConfig::load_or_default(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("petcare-engine starting");
    info!(
        initial_stat_value = config.care.initial_stat_value,
        decay_amount = config.care.decay_amount,
        decay_interval_ms = config.care.decay_interval_ms,
        seed_pets = config.pets.len(),
        items = config.items.len(),
        "Configuration loaded"
    );

    // 3. Create the manager and the catalog.
    let manager = PetManager::new(CareConfig::from(&config.care))?;
    let catalog = ItemCatalog::new(config.items.clone());

    // 4. Death alerts. The channel also wakes the wait loop below.
    let (death_tx, mut death_rx) = mpsc::unbounded_channel::<PetDied>();
    let _ = manager.subscribe_pet_died(move |event| {
        warn!(
            pet = %event.pet_name,
            species = %event.species,
            died_at = %event.died_at,
            "[GAME ALERT] Sad news from the Pet Care Center: {} the {} has passed away",
            event.pet_name,
            event.species
        );
        let _ = death_tx.send(event.clone());
    });

    // 5. Adopt seed pets.
    for seed in &config.pets {
        match manager.adopt_new(seed.species, &seed.name) {
            Ok(pet) => {
                let usable: Vec<&str> = catalog
                    .usable_by(pet.species())
                    .iter()
                    .map(|item| item.name.as_str())
                    .collect();
                info!(pet = %pet.name(), items = ?usable, "Items available");

                if let Some(name) = &seed.welcome_item {
                    match catalog.find(name) {
                        Some(item) if item.is_compatible_with(pet.species()) => {
                            let _ = manager.use_item(&pet, item.clone());
                        }
                        Some(_) => warn!(pet = %pet.name(), item = %name, "Welcome item is not suitable for this species"),
                        None => warn!(pet = %pet.name(), item = %name, "Unknown welcome item"),
                    }
                }
            }
            Err(err) => warn!(species = %seed.species, error = %err, "Skipping seed pet"),
        }
    }

    // 6. Wait.
    let end_reason = if manager.list_living().is_empty() {
        info!("No living pets to look after");
        EndReason::Extinction
    } else {
        wait_for_end(&manager, &mut death_rx).await
    };

    // 7. Shut down and report.
    manager.shutdown();
    log_roster(&manager);

    info!(end_reason = ?end_reason, "petcare-engine shutdown complete");
    Ok(())
}

/// Block until Ctrl-C or until no registered pet is alive.
async fn wait_for_end(
    manager: &PetManager,
    deaths: &mut mpsc::UnboundedReceiver<PetDied>,
) -> EndReason {
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for Ctrl-C, shutting down");
                }
                info!("Interrupt received");
                return EndReason::Interrupted;
            }
            died = deaths.recv() => {
                if died.is_none() || manager.list_living().is_empty() {
                    info!("All pets have passed away");
                    return EndReason::Extinction;
                }
            }
        }
    }
}

/// Log the status of every pet, as text and as JSON.
fn log_roster(manager: &PetManager) {
    let statuses = manager.statuses();
    if statuses.is_empty() {
        info!("You haven't adopted any pets yet");
        return;
    }
    for status in &statuses {
        info!("{status}");
    }
    match serde_json::to_string(&statuses) {
        Ok(json) => info!(roster = %json, "Final roster"),
        Err(e) => warn!(error = %e, "failed to serialize final roster"),
    }
}
