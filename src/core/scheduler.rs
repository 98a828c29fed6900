//! Serializing scheduler with depth-aware nesting and pass-through
//! deadlock avoidance.
//!
//! A [`Scheduler`] runs at most one task at a time. Tasks scheduled from
//! inside a running task land one level deeper than that task, and the run
//! loop always drains the deepest level first, so nested work finishes before
//! the running task's later siblings get a turn.
//!
//! A task that needs to schedule onto its own scheduler *and wait for the
//! result* must be scheduled with `allows_reentrant_unblock`; otherwise it
//! waits for a slot it is itself holding.
//!
//! ```rust,ignore
//! use reentrant_scheduler::core::Scheduler;
//!
//! let scheduler = Scheduler::new("db");
//! let inner = scheduler.clone();
//! let answer = scheduler
//!     .schedule_unblocking(move || async move {
//!         // Redirected to a pass-through scheduler, so this does not deadlock.
//!         Ok(inner.schedule(|| async { anyhow::Ok(42) }).await?)
//!     })
//!     .await?;
//! scheduler.complete().await;
//! ```

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::{NestingPolicy, SchedulerConfig};
use crate::core::context::{self, Frame};
use crate::core::stats::SchedulerCounters;
use crate::core::task::Runnable;
use crate::core::{IntoWork, SchedulerStats, Task, TaskHandle};
use crate::infra::queue::DepthQueue;
use crate::runtime::{Spawn, TokioSpawner};

/// Per-task scheduling options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskOptions {
    /// The task's body may schedule onto the owning scheduler and wait for
    /// the outcome; such calls go to a pass-through scheduler instead.
    pub allows_reentrant_unblock: bool,
}

/// A queued task and the frame that was active when it was scheduled.
struct Queued {
    parent: Option<Arc<Frame>>,
    task: Box<dyn Runnable>,
}

struct State {
    queue: DepthQueue<Queued>,
    /// Present while the scheduler is busy; flips to `true` on drain.
    drain: Option<watch::Sender<bool>>,
}

struct Inner {
    id: Uuid,
    config: SchedulerConfig,
    spawner: Arc<dyn Spawn>,
    state: Mutex<State>,
    counters: SchedulerCounters,
}

/// Handle to a scheduler instance. Clones share the same queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("id", &self.inner.id)
            .field("name", &self.inner.config.name)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Scheduler with default configuration, spawning on the ambient tokio
    /// runtime.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(SchedulerConfig::named(name))
    }

    /// Scheduler with the given configuration, spawning on the ambient tokio
    /// runtime.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with_spawner(config, Arc::new(TokioSpawner::ambient()))
    }

    /// Scheduler whose run loop is started through `spawner`.
    pub fn with_spawner(config: SchedulerConfig, spawner: Arc<dyn Spawn>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                config,
                spawner,
                state: Mutex::new(State {
                    queue: DepthQueue::new(),
                    drain: None,
                }),
                counters: SchedulerCounters::default(),
            }),
        }
    }

    /// Instance identity.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Configured name.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Configuration this scheduler was built with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Schedule `work` with the configured default options.
    ///
    /// The returned handle resolves to the work's outcome. The work never
    /// starts before the calling task yields.
    ///
    /// If the scheduler is idle and its run loop cannot be spawned (the
    /// default spawner outside a tokio runtime), the queued work is dropped
    /// and its handle resolves to `TaskError::Abandoned`.
    pub fn schedule<T, M, W>(&self, work: W) -> TaskHandle<T>
    where
        T: Send + 'static,
        W: IntoWork<T, M>,
    {
        let options = TaskOptions {
            allows_reentrant_unblock: self.inner.config.unblock_by_default,
        };
        self.schedule_with(work, options)
    }

    /// Schedule `work` as a task that may schedule onto this scheduler and
    /// wait for the result without deadlocking.
    pub fn schedule_unblocking<T, M, W>(&self, work: W) -> TaskHandle<T>
    where
        T: Send + 'static,
        W: IntoWork<T, M>,
    {
        self.schedule_with(
            work,
            TaskOptions {
                allows_reentrant_unblock: true,
            },
        )
    }

    /// Schedule `work` with explicit options.
    pub fn schedule_with<T, M, W>(&self, work: W, options: TaskOptions) -> TaskHandle<T>
    where
        T: Send + 'static,
        W: IntoWork<T, M>,
    {
        let binding = context::lookup(self.inner.id);
        if let Some(target) = binding.pass_through {
            self.inner.counters.redirected.fetch_add(1, Ordering::Relaxed);
            trace!(
                scheduler = %self.inner.config.name,
                target = %target.name(),
                "redirecting to pass-through scheduler"
            );
            return target.schedule_with(work, options);
        }

        let parent = context::current();
        let (task, handle) = Task::new(work.into_work());
        let task = task.with_reentrant_unblock(options.allows_reentrant_unblock);
        let depth = match self.inner.config.nesting {
            NestingPolicy::Nested => binding.depth,
            NestingPolicy::Flat => 0,
        };
        debug!(
            scheduler = %self.inner.config.name,
            task_id = task.id(),
            depth,
            style = ?task.style(),
            unblocking = options.allows_reentrant_unblock,
            "task scheduled"
        );

        let start = {
            let mut state = self.inner.state.lock();
            state.queue.push(
                depth,
                Queued {
                    parent,
                    task: Box::new(task),
                },
            );
            self.inner.counters.record_submit(depth);
            if state.drain.is_none() {
                let (drain, _) = watch::channel(false);
                state.drain = Some(drain);
                true
            } else {
                false
            }
        };

        if start {
            let scheduler = self.clone();
            if let Err(err) = self.inner.spawner.spawn(scheduler.run_loop().boxed()) {
                warn!(
                    scheduler = %self.inner.config.name,
                    error = %err,
                    "run loop not started; abandoning queued work"
                );
                let abandoned = {
                    let mut state = self.inner.state.lock();
                    state.drain = None;
                    std::mem::take(&mut state.queue)
                };
                drop(abandoned);
            }
        }
        handle
    }

    /// Resolves once the queue, as extended by any further scheduling, is
    /// fully drained.
    ///
    /// When the scheduler is idle the future still resolves on a later turn,
    /// never on its first poll.
    pub fn complete(&self) -> impl Future<Output = ()> + Send + 'static {
        let pending = self
            .inner
            .state
            .lock()
            .drain
            .as_ref()
            .map(watch::Sender::subscribe);
        async move {
            match pending {
                Some(mut drained) => {
                    // A closed channel only happens after the drain was sent.
                    let _ = drained.wait_for(|done| *done).await;
                }
                None => tokio::task::yield_now().await,
            }
        }
    }

    /// Whether no task is queued or running.
    pub fn is_idle(&self) -> bool {
        self.inner.state.lock().drain.is_none()
    }

    /// Level that work scheduled from the current context would land on.
    ///
    /// Zero outside of this scheduler's tasks.
    pub fn current_depth(&self) -> usize {
        context::lookup(self.inner.id).depth
    }

    /// Snapshot of this scheduler's counters.
    pub fn stats(&self) -> SchedulerStats {
        let queued = self.inner.state.lock().queue.len();
        self.inner.counters.snapshot(queued)
    }

    /// Fresh child scheduler that absorbs scheduling from one task.
    fn pass_through(&self) -> Self {
        let config = SchedulerConfig {
            name: format!("{}/pass-through", self.inner.config.name),
            ..self.inner.config.clone()
        };
        Self::with_spawner(config, Arc::clone(&self.inner.spawner))
    }

    async fn run_loop(self) {
        let name = &self.inner.config.name;
        debug!(scheduler = %name, "run loop started");
        loop {
            let next = {
                let mut state = self.inner.state.lock();
                let next = state.queue.pop_deepest();
                if next.is_none() {
                    if let Some(drain) = state.drain.take() {
                        drain.send_replace(true);
                    }
                }
                next
            };
            let Some((depth, Queued { parent, task })) = next else {
                debug!(scheduler = %name, "queue drained");
                return;
            };

            let task_id = task.id();
            let pass_through = task
                .allows_reentrant_unblock()
                .then(|| self.pass_through());
            let frame = Frame::fork_from(parent, self.inner.id, depth + 1, pass_through.clone());
            debug!(scheduler = %name, task_id, depth, style = ?task.style(), "task started");

            self.inner.counters.running.store(true, Ordering::Release);
            let ok = context::scope(frame, task.run_boxed()).await;
            if let Some(pass_through) = pass_through {
                trace!(scheduler = %name, task_id, "waiting for pass-through scheduler");
                pass_through.complete().await;
            }
            self.inner.counters.running.store(false, Ordering::Release);
            self.inner.counters.record_outcome(ok);
            debug!(scheduler = %name, task_id, ok, "task finished");

            // Continue on a later turn rather than inline.
            tokio::task::yield_now().await;
        }
    }
}
