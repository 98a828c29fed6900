//! Core scheduling abstractions: completion adapters, the ambient context and
//! the scheduler itself.

pub mod context;
pub mod error;
pub mod scheduler;
pub mod stats;
pub mod style;
pub mod task;
pub mod work;

pub use context::carry_context;
pub use error::{AppResult, SchedulerError, TaskError};
pub use scheduler::{Scheduler, TaskOptions};
pub use stats::SchedulerStats;
pub use style::AsyncStyle;
pub use task::{Task, TaskHandle, TaskId};
pub use work::{
    marker, AsyncJob, Callback, IntoWork, NodeCallback, OnFailure, OnSuccess, Work,
};
