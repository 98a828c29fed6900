//! Tokio runtime spawner implementation.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::runtime::Handle;

use crate::core::SchedulerError;

/// Abstraction for handing a future to a runtime to run on a later turn.
pub trait Spawn: Send + Sync + 'static {
    /// Spawn a detached future.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::NoRuntime` if there is nowhere to run it.
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<(), SchedulerError>;
}

/// Tokio-based spawner that executes futures on a tokio runtime.
///
/// Without an explicit handle it spawns onto the runtime of the calling
/// context, and refuses when called outside one.
#[derive(Clone, Default)]
pub struct TokioSpawner {
    handle: Option<Arc<Handle>>,
}

impl TokioSpawner {
    /// Create a TokioSpawner from a tokio runtime handle.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle: Some(Arc::new(handle)),
        }
    }

    /// Spawner bound to whichever runtime is current at spawn time.
    pub const fn ambient() -> Self {
        Self { handle: None }
    }
}

impl Spawn for TokioSpawner {
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> Result<(), SchedulerError> {
        let handle = match &self.handle {
            Some(handle) => Handle::clone(handle),
            None => Handle::try_current().map_err(|err| {
                tracing::warn!(error = %err, "spawn requested outside a tokio runtime");
                SchedulerError::NoRuntime
            })?,
        };
        handle.spawn(fut);
        Ok(())
    }
}
