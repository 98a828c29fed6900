//! Completion adapter: runs one unit of work under its completion style and
//! settles the task result exactly once.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::oneshot;

use crate::core::work::{Callback, NodeCallback, OnFailure, OnSuccess, Settler, WorkKind};
use crate::core::{AsyncStyle, TaskError, Work};

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier assigned to every task at construction.
pub type TaskId = u64;

/// Read side of a task result, returned by `schedule`.
///
/// Dropping the handle does not cancel the task.
#[must_use = "the handle is the only way to observe the task outcome"]
pub struct TaskHandle<T> {
    id: TaskId,
    result: oneshot::Receiver<Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
    /// Identifier of the task behind this handle.
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().result)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(Err(TaskError::Abandoned)))
    }
}

/// A scheduled unit of work plus its completion-style adapter.
///
/// Lifecycle: pending until [`Task::run`] is awaited, running while the work
/// executes, settled once any completion path fires.
pub struct Task<T> {
    id: TaskId,
    style: AsyncStyle,
    work: WorkKind<T>,
    settler: Settler<T>,
    settled: oneshot::Receiver<bool>,
    allows_reentrant_unblock: bool,
}

impl<T: Send + 'static> Task<T> {
    /// Build a task and the handle its caller awaits.
    pub fn new(work: Work<T>) -> (Self, TaskHandle<T>) {
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let (settler, result, settled) = Settler::new();
        let task = Self {
            id,
            style: work.style(),
            work: work.kind,
            settler,
            settled,
            allows_reentrant_unblock: false,
        };
        (task, TaskHandle { id, result })
    }

    /// Mark the task as one whose body may schedule onto its own scheduler
    /// and wait for the outcome.
    #[must_use]
    pub fn with_reentrant_unblock(mut self, allows: bool) -> Self {
        self.allows_reentrant_unblock = allows;
        self
    }

    /// Task identifier.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Resolved completion style.
    pub const fn style(&self) -> AsyncStyle {
        self.style
    }

    /// Whether scheduling from inside this task is redirected to a
    /// pass-through scheduler.
    pub const fn allows_reentrant_unblock(&self) -> bool {
        self.allows_reentrant_unblock
    }

    /// Invoke the work on a later turn and wait until its result settles.
    ///
    /// The returned future always completes with `()`, whether the task
    /// succeeded or failed.
    pub async fn run(self) {
        self.execute().await;
    }

    /// [`Task::run`], reporting whether the result settled as a success.
    pub(crate) async fn execute(self) -> bool {
        let Self {
            id,
            style,
            work,
            settler,
            settled,
            ..
        } = self;

        tokio::task::yield_now().await;
        tracing::trace!(task_id = id, ?style, "invoking work");

        match work {
            WorkKind::Awaitable(f) => {
                let outcome = match catch_unwind(AssertUnwindSafe(f)) {
                    Ok(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(err)) => Err(TaskError::Failed(err)),
                        Err(payload) => Err(TaskError::from_panic(&*payload)),
                    },
                    Err(payload) => Err(TaskError::from_panic(&*payload)),
                };
                if let Err(TaskError::Panicked(message)) = &outcome {
                    tracing::warn!(task_id = id, %message, "work panicked");
                }
                settler.settle(outcome);
            }
            WorkKind::Dual(f) => {
                invoke(id, settler, |s| f(OnSuccess(s.clone()), OnFailure(s)));
            }
            WorkKind::FailProperty(f) => invoke(id, settler, |s| f(Callback(s))),
            WorkKind::ErrorFirst(f) => invoke(id, settler, |s| f(NodeCallback(s))),
        }

        // The slot always reports before it goes away.
        let ok = settled.await.unwrap_or(false);
        tracing::trace!(task_id = id, ok, "task settled");
        ok
    }
}

/// Call a callback-style work function, turning a panic into a failure.
///
/// The local guard keeps the slot alive across the call, so a panic that
/// drops the callbacks still settles as a panic rather than as abandoned.
fn invoke<T>(id: TaskId, settler: Settler<T>, call: impl FnOnce(Settler<T>)) {
    let guard = settler.clone();
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| call(settler))) {
        let err = TaskError::from_panic(&*payload);
        tracing::warn!(task_id = id, error = %err, "work panicked");
        guard.settle(Err(err));
    }
}

/// Type-erased task as stored in the depth queue.
pub(crate) trait Runnable: Send {
    fn id(&self) -> TaskId;
    fn style(&self) -> AsyncStyle;
    fn allows_reentrant_unblock(&self) -> bool;
    fn run_boxed(self: Box<Self>) -> BoxFuture<'static, bool>;
}

impl<T: Send + 'static> Runnable for Task<T> {
    fn id(&self) -> TaskId {
        self.id
    }

    fn style(&self) -> AsyncStyle {
        self.style
    }

    fn allows_reentrant_unblock(&self) -> bool {
        self.allows_reentrant_unblock
    }

    fn run_boxed(self: Box<Self>) -> BoxFuture<'static, bool> {
        (*self).execute().boxed()
    }
}
