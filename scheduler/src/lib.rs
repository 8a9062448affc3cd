//! Cancellable periodic job runner.
//!
//! A [`PeriodicTask`] runs its job's `prepare` step once, then `run`
//! immediately and on every tick of a fixed interval. Runs never overlap:
//! each one is awaited before the next tick is taken, and ticks missed while
//! a run was still going are skipped.

pub mod engine;
pub mod types;

pub use engine::{PeriodicTask, TaskHandle};
pub use types::Job;
