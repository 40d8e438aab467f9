//! The recurring decay trigger.
//!
//! A [`DecayScheduler`] owns one Tokio task that invokes its callback once
//! per period. The first firing happens one full period after start, so a
//! restarted scheduler always opens a fresh window. The callback runs
//! inline on the scheduler task, which serializes firings: a slow callback
//! delays the next tick instead of overlapping it.
//!
//! Stopping is a non-blocking signal. It is safe to stop (or drop) the
//! scheduler from inside its own callback; the task exits before any
//! further firing.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

/// Handle to a running decay task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct DecayScheduler {
    generation: u64,
    period: Duration,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DecayScheduler {
    /// Spawn a scheduler on `runtime` that calls `on_tick(generation)`
    /// every `period`.
    ///
    /// `generation` identifies this scheduler to its owner, which can use
    /// it to discard a firing that raced with [`stop`](Self::stop).
    pub fn start<F>(runtime: &Handle, period: Duration, generation: u64, mut on_tick: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the immediate first tick.
            interval.reset();

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = interval.tick() => {}
                }
                if *stop_rx.borrow() {
                    break;
                }
                trace!(generation, "Decay tick");
                on_tick(generation);
            }
            debug!(generation, "Decay scheduler exited");
        });

        debug!(generation, ?period, "Decay scheduler started");
        Self {
            generation,
            period,
            stop_tx,
            task,
        }
    }

    /// Sequence number assigned at start.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Time between firings.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Signal the task to exit. Idempotent and non-blocking.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Whether the underlying task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for DecayScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
