//! Shared types used by the scheduler subsystem.

use async_trait::async_trait;

/// Work driven by a [`PeriodicTask`](crate::PeriodicTask).
///
/// Jobs absorb their own failures; the runner has no notion of a failed run.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    /// One-off warm-up, awaited before the first `run`.
    async fn prepare(&self) {}

    async fn run(&self);
}
