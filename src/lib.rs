//! # Reentrant Scheduler
//!
//! An in-process scheduler that serializes heterogeneous asynchronous work.
//!
//! Work submitted to a [`Scheduler`](core::Scheduler) runs one task at a time,
//! in submission order. Work may itself schedule more work on the same
//! scheduler; such nested work is queued one level deeper and drains before
//! the submitting task's later siblings, as if it ran in a tight sub-loop.
//!
//! ## Key Features
//!
//! - **Mutual exclusion**: at most one task of a scheduler executes at a time
//! - **Depth-aware ordering**: nested scheduling drains depth-first
//! - **Deadlock avoidance**: tasks flagged `allows_reentrant_unblock` can
//!   schedule onto their own scheduler and await the result
//! - **Completion styles**: futures, dual callbacks, callbacks with a `fail`
//!   method and error-first callbacks all settle one uniform [`TaskHandle`](core::TaskHandle)
//! - **Failure isolation**: a failing or panicking task only fails its own handle
//!
//! ## Example
//!
//! ```rust,ignore
//! use reentrant_scheduler::core::{Scheduler, Work};
//!
//! let scheduler = Scheduler::new("main");
//!
//! let first = scheduler.schedule(|| async {
//!     tokio::time::sleep(std::time::Duration::from_millis(500)).await;
//!     anyhow::Ok("slow")
//! });
//! // Does not start until `first` has settled.
//! let second = scheduler.schedule(Work::error_first(|done| done.call(None, Some("fast"))));
//!
//! scheduler.complete().await;
//! assert_eq!(first.await?, "slow");
//! assert_eq!(second.await?, "fast");
//! ```
//!
//! There is no cancellation or timeout: a task that never settles stalls its
//! scheduler, and `complete()` never resolves.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions.
pub mod core;
/// Configuration models for schedulers and registries.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure: queue storage.
pub mod infra;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;
