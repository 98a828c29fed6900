//! Ambient execution context.
//!
//! Each running task executes inside a [`Frame`] bound to a tokio task-local.
//! A task's frame is forked from the frame that was active when the task was
//! scheduled, so the chain follows the scheduling call path and nothing else.
//! Run loops themselves carry no frame. Lookups only consider frames owned by
//! the querying scheduler, which keeps unrelated schedulers from reading each
//! other's depth.
//!
//! Task-locals do not cross `tokio::spawn`. Work that hands its completion to
//! a spawned future should wrap that future in [`carry_context`] if it needs to
//! schedule further work from there.

use std::future::Future;
use std::sync::Arc;

use futures::future::Either;
use uuid::Uuid;

use crate::core::Scheduler;

tokio::task_local! {
    static FRAME: Arc<Frame>;
}

/// One scope established by a run loop for one task.
pub(crate) struct Frame {
    owner: Uuid,
    depth: usize,
    pass_through: Option<Scheduler>,
    parent: Option<Arc<Frame>>,
}

impl Frame {
    /// Fork a child of `parent`, the frame captured when the task was scheduled.
    pub(crate) fn fork_from(
        parent: Option<Arc<Self>>,
        owner: Uuid,
        depth: usize,
        pass_through: Option<Scheduler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            owner,
            depth,
            pass_through,
            parent,
        })
    }
}

/// What a scheduler sees of the ambient context.
pub(crate) struct Binding {
    /// Level that new tasks land on.
    pub depth: usize,
    /// Scheduler that absorbs `schedule` calls, if one is bound.
    pub pass_through: Option<Scheduler>,
}

impl Binding {
    const TOP_LEVEL: Self = Self {
        depth: 0,
        pass_through: None,
    };
}

/// The active frame, if any.
pub(crate) fn current() -> Option<Arc<Frame>> {
    FRAME.try_with(Arc::clone).ok()
}

/// Nearest binding owned by `owner`, walking outward through enclosing frames.
pub(crate) fn lookup(owner: Uuid) -> Binding {
    let mut frame = current();
    while let Some(f) = frame {
        if f.owner == owner {
            return Binding {
                depth: f.depth,
                pass_through: f.pass_through.clone(),
            };
        }
        frame = f.parent.clone();
    }
    Binding::TOP_LEVEL
}

/// Run `fut` with `frame` as the active frame.
pub(crate) fn scope<F: Future>(frame: Arc<Frame>, fut: F) -> impl Future<Output = F::Output> {
    FRAME.scope(frame, fut)
}

/// Carry the currently active context into `fut`.
///
/// Use this for futures handed to `tokio::spawn` from inside a task, so that
/// scheduling from them still lands at the right depth (and on the right
/// pass-through scheduler).
pub fn carry_context<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    match current() {
        Some(frame) => Either::Left(FRAME.scope(frame, fut)),
        None => Either::Right(fut),
    }
}
