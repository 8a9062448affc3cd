//! The periodic task loop.
//!
//! Stopping is cooperative: `stop()` flips a watch flag, the loop notices it
//! at its next select and exits. A run that is already executing is allowed
//! to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, info};

use crate::types::Job;

pub struct PeriodicTask<J: Job> {
    job: Arc<J>,
    every: Duration,
}

impl<J: Job> PeriodicTask<J> {
    pub fn new(job: Arc<J>, every: Duration) -> Self {
        Self { job, every }
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(self) -> TaskHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let name = self.job.name();
        let span = tracing::info_span!("periodic_task", job = name);

        let join = tokio::spawn(run_loop(self.job, self.every, stop_rx).instrument(span));

        TaskHandle {
            name,
            stop_tx,
            join,
        }
    }
}

async fn run_loop<J: Job>(job: Arc<J>, every: Duration, mut stop_rx: watch::Receiver<bool>) {
    info!(every_secs = every.as_secs(), "periodic task started");

    job.prepare().await;

    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if *stop_rx.borrow() {
            break;
        }

        tokio::select! {
            biased;

            changed = stop_rx.changed() => {
                // Err means the handle was dropped; treat it as a stop.
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        debug!("periodic task tick");
        job.run().await;
    }

    info!("periodic task stopped");
}

/// Owner of a spawned [`PeriodicTask`]. Dropping it also stops the task.
pub struct TaskHandle {
    name: &'static str,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask the loop to exit. The next tick will not fire; an in-flight run
    /// completes normally.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to exit. Call `stop` first or this waits forever.
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await
    }

    /// `stop` then `join`.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.stop();
        self.join().await
    }
}
