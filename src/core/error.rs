//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced while configuring or assembling schedulers.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation or could not be parsed.
    #[error("config invalid: {0}")]
    InvalidConfig(String),
    /// No scheduler is registered under the requested name.
    #[error("unknown scheduler: {0}")]
    UnknownScheduler(String),
    /// A run loop had to be spawned but no tokio runtime was available.
    #[error("no tokio runtime available")]
    NoRuntime,
}

/// Failure outcome of a single scheduled task.
///
/// Every variant is local to the task that produced it; the run loop never
/// sees these and keeps draining the queue.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The work signalled failure through its completion style.
    #[error("task failed: {0}")]
    Failed(anyhow::Error),
    /// The work panicked while being invoked or polled.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// An error-first callback reported success without a value.
    #[error("error-first callback completed without a value")]
    MissingValue,
    /// Every completion callback was dropped before the task settled.
    #[error("task dropped its completion callbacks without settling")]
    Abandoned,
}

impl TaskError {
    /// The user-supplied failure value, if the task failed through its callbacks
    /// or its returned future.
    pub const fn failure(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked(message)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
