//! Work functions and the completion callbacks handed to them.
//!
//! A [`Work`] value pairs a user function with one concrete [`AsyncStyle`].
//! The callback types all write into the same single-use result slot, so the
//! first settlement wins and every later one is ignored.
//!
//! ```rust,ignore
//! use reentrant_scheduler::core::{Scheduler, Work};
//!
//! let scheduler = Scheduler::new("io");
//!
//! // Zero-argument closure: the returned future is the result.
//! let a = scheduler.schedule(|| async { anyhow::Ok(1) });
//!
//! // Error-first callback, stated explicitly.
//! let b = scheduler.schedule(Work::error_first(|done| done.call(None, Some(2))));
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::core::{AppResult, AsyncStyle, TaskError};

/// Single-use result slot shared by every callback of one task.
struct Slot<T> {
    result: Option<oneshot::Sender<Result<T, TaskError>>>,
    settled: Option<oneshot::Sender<bool>>,
}

impl<T> Slot<T> {
    fn settle(&mut self, outcome: Result<T, TaskError>) -> bool {
        let Some(result) = self.result.take() else {
            return false;
        };
        // The caller may have dropped its handle; the task still counts as settled.
        let ok = outcome.is_ok();
        let _ = result.send(outcome);
        if let Some(settled) = self.settled.take() {
            let _ = settled.send(ok);
        }
        true
    }
}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        if self.result.is_some() {
            tracing::warn!("completion callbacks dropped before the task settled");
            self.settle(Err(TaskError::Abandoned));
        }
    }
}

/// Write side of a task result. Cloned into every callback handed to the work.
pub(crate) struct Settler<T>(Arc<Mutex<Slot<T>>>);

impl<T> Clone for Settler<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Settler<T> {
    /// Create a settler, the receiver for the outcome, and the receiver that
    /// fires once the outcome is written (carrying whether it was a success).
    pub(crate) fn new() -> (
        Self,
        oneshot::Receiver<Result<T, TaskError>>,
        oneshot::Receiver<bool>,
    ) {
        let (result_tx, result_rx) = oneshot::channel();
        let (settled_tx, settled_rx) = oneshot::channel();
        let slot = Slot {
            result: Some(result_tx),
            settled: Some(settled_tx),
        };
        (Self(Arc::new(Mutex::new(slot))), result_rx, settled_rx)
    }

    /// Settle the result. Returns `false` if it had already been settled.
    pub(crate) fn settle(&self, outcome: Result<T, TaskError>) -> bool {
        let won = self.0.lock().settle(outcome);
        if !won {
            tracing::trace!("ignoring settlement of an already settled task");
        }
        won
    }

    fn succeed(&self, value: T) {
        self.settle(Ok(value));
    }

    fn fail(&self, err: impl Into<anyhow::Error>) {
        self.settle(Err(TaskError::Failed(err.into())));
    }
}

/// Success callback of a [`AsyncStyle::DualCallback`] function.
pub struct OnSuccess<T>(pub(crate) Settler<T>);

impl<T> OnSuccess<T> {
    /// Settle the task successfully with `value`.
    pub fn call(&self, value: T) {
        self.0.succeed(value);
    }
}

impl<T> Clone for OnSuccess<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Failure callback of a [`AsyncStyle::DualCallback`] function.
pub struct OnFailure<T>(pub(crate) Settler<T>);

impl<T> OnFailure<T> {
    /// Settle the task as failed with `err`.
    pub fn call(&self, err: impl Into<anyhow::Error>) {
        self.0.fail(err);
    }
}

impl<T> Clone for OnFailure<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Callback of a [`AsyncStyle::SingleCallbackWithFailProperty`] function.
///
/// `call` is the success path; `fail` is the failure path hanging off the
/// same callback.
pub struct Callback<T>(pub(crate) Settler<T>);

impl<T> Callback<T> {
    /// Settle the task successfully with `value`.
    pub fn call(&self, value: T) {
        self.0.succeed(value);
    }

    /// Settle the task as failed with `err`.
    pub fn fail(&self, err: impl Into<anyhow::Error>) {
        self.0.fail(err);
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Callback of an [`AsyncStyle::ErrorFirstCallback`] function.
pub struct NodeCallback<T>(pub(crate) Settler<T>);

impl<T> NodeCallback<T> {
    /// Complete the task. `err` of `None` means success with `value`; any
    /// error fails the task and `value` is ignored.
    pub fn call(&self, err: Option<anyhow::Error>, value: Option<T>) {
        let outcome = match (err, value) {
            (Some(err), _) => Err(TaskError::Failed(err)),
            (None, Some(value)) => Ok(value),
            (None, None) => Err(TaskError::MissingValue),
        };
        self.0.settle(outcome);
    }
}

impl<T> Clone for NodeCallback<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

type AwaitableFn<T> = Box<dyn FnOnce() -> BoxFuture<'static, AppResult<T>> + Send>;
type DualFn<T> = Box<dyn FnOnce(OnSuccess<T>, OnFailure<T>) + Send>;
type FailPropertyFn<T> = Box<dyn FnOnce(Callback<T>) + Send>;
type ErrorFirstFn<T> = Box<dyn FnOnce(NodeCallback<T>) + Send>;

pub(crate) enum WorkKind<T> {
    Awaitable(AwaitableFn<T>),
    Dual(DualFn<T>),
    FailProperty(FailPropertyFn<T>),
    ErrorFirst(ErrorFirstFn<T>),
}

/// A user function tagged with the way it signals completion.
pub struct Work<T> {
    pub(crate) kind: WorkKind<T>,
}

impl<T: Send + 'static> Work<T> {
    /// Work that returns a future; its output settles the task.
    pub fn awaitable<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        Self {
            kind: WorkKind::Awaitable(Box::new(move || f().boxed())),
        }
    }

    /// Work that receives a success and a failure callback.
    pub fn dual_callback<F>(f: F) -> Self
    where
        F: FnOnce(OnSuccess<T>, OnFailure<T>) + Send + 'static,
    {
        Self {
            kind: WorkKind::Dual(Box::new(f)),
        }
    }

    /// Work that receives one callback carrying a `fail` method.
    pub fn with_fail_property<F>(f: F) -> Self
    where
        F: FnOnce(Callback<T>) + Send + 'static,
    {
        Self {
            kind: WorkKind::FailProperty(Box::new(f)),
        }
    }

    /// Work that receives one error-first callback.
    pub fn error_first<F>(f: F) -> Self
    where
        F: FnOnce(NodeCallback<T>) + Send + 'static,
    {
        Self {
            kind: WorkKind::ErrorFirst(Box::new(f)),
        }
    }

    /// Work backed by an [`AsyncJob`].
    pub fn from_job<J>(job: J) -> Self
    where
        J: AsyncJob<T>,
    {
        Self {
            kind: WorkKind::Awaitable(Box::new(move || job.execute())),
        }
    }
}

impl<T> Work<T> {
    /// The concrete completion style of this work. Never `AutoDetect`.
    pub fn style(&self) -> AsyncStyle {
        match self.kind {
            WorkKind::Awaitable(_) => AsyncStyle::AwaitableReturn,
            WorkKind::Dual(_) => AsyncStyle::DualCallback,
            WorkKind::FailProperty(_) => AsyncStyle::SingleCallbackWithFailProperty,
            WorkKind::ErrorFirst(_) => AsyncStyle::ErrorFirstCallback,
        }
    }
}

/// Struct-shaped asynchronous work.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use reentrant_scheduler::core::{AppResult, AsyncJob};
///
/// struct Fetch {
///     url: String,
/// }
///
/// #[async_trait]
/// impl AsyncJob<usize> for Fetch {
///     async fn execute(self) -> AppResult<usize> {
///         Ok(self.url.len())
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncJob<T: Send + 'static>: Send + 'static {
    /// Run the job to completion.
    async fn execute(self) -> AppResult<T>;
}

/// Marker types that let [`IntoWork`] pick a completion style from the shape
/// of the value being scheduled.
pub mod marker {
    /// Zero-argument closure returning a future.
    pub struct ReturnsAwaitable;
    /// Closure taking `(OnSuccess, OnFailure)`.
    pub struct TakesCallbacks;
    /// A [`Work`](super::Work) value with an explicit style.
    pub struct Explicit;
    /// An [`AsyncJob`](super::AsyncJob) implementation.
    pub struct Job;
}

/// Conversion into [`Work`], resolving [`AsyncStyle::AutoDetect`] by arity.
///
/// Zero-argument closures become [`AsyncStyle::AwaitableReturn`] work and
/// two-argument closures become [`AsyncStyle::DualCallback`] work. The other
/// styles are selected by building a [`Work`] explicitly.
pub trait IntoWork<T, Marker>: Send + 'static {
    /// Convert into tagged work.
    fn into_work(self) -> Work<T>;
}

impl<T, F, Fut> IntoWork<T, marker::ReturnsAwaitable> for F
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    fn into_work(self) -> Work<T> {
        Work::awaitable(self)
    }
}

impl<T, F> IntoWork<T, marker::TakesCallbacks> for F
where
    T: Send + 'static,
    F: FnOnce(OnSuccess<T>, OnFailure<T>) + Send + 'static,
{
    fn into_work(self) -> Work<T> {
        Work::dual_callback(self)
    }
}

impl<T: Send + 'static> IntoWork<T, marker::Explicit> for Work<T> {
    fn into_work(self) -> Work<T> {
        self
    }
}

impl<T, J> IntoWork<T, marker::Job> for J
where
    T: Send + 'static,
    J: AsyncJob<T>,
{
    fn into_work(self) -> Work<T> {
        Work::from_job(self)
    }
}
