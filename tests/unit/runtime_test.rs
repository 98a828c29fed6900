//! Tests for tokio spawner utilities

use std::sync::Arc;

use futures::FutureExt;
use reentrant_scheduler::config::SchedulerConfig;
use reentrant_scheduler::core::{Scheduler, SchedulerError, TaskError};
use reentrant_scheduler::runtime::{Spawn, TokioSpawner};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(
        async move {
            tx.send(123).unwrap();
        }
        .boxed(),
    )
    .unwrap();

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_ambient_spawner_spawn() {
    let spawner = TokioSpawner::ambient();

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(
        async move {
            tx.send("ambient").unwrap();
        }
        .boxed(),
    )
    .unwrap();
    assert_eq!(rx.await.expect("oneshot result"), "ambient");
}

#[test]
fn test_ambient_spawner_outside_runtime() {
    let spawner = TokioSpawner::ambient();
    let err = spawner.spawn(async {}.boxed()).unwrap_err();
    assert!(matches!(err, SchedulerError::NoRuntime));
}

#[test]
fn test_schedule_outside_runtime_abandons_work() {
    let scheduler = Scheduler::new("no-runtime");
    let handle = scheduler.schedule(|| async { anyhow::Ok(1) });
    assert!(scheduler.is_idle());

    let outcome = futures::executor::block_on(handle);
    assert!(matches!(outcome, Err(TaskError::Abandoned)));
}

#[test]
fn test_scheduler_on_explicit_runtime_handle() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let spawner = Arc::new(TokioSpawner::new(runtime.handle().clone()));
    // Scheduling happens outside any runtime context.
    let scheduler = Scheduler::with_spawner(SchedulerConfig::named("explicit"), spawner);
    let handle = scheduler.schedule(|| async { anyhow::Ok(9) });

    let value = runtime.block_on(handle).unwrap();
    assert_eq!(value, 9);
    runtime.block_on(scheduler.complete());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scheduler_serializes_on_multi_thread_runtime() {
    let scheduler = Scheduler::new("multi");
    let active = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let overlaps = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    for _ in 0..20 {
        let (active, overlaps) = (Arc::clone(&active), Arc::clone(&overlaps));
        drop(scheduler.schedule(move || async move {
            use std::sync::atomic::Ordering;
            if active.fetch_add(1, Ordering::SeqCst) != 0 {
                overlaps.fetch_add(1, Ordering::SeqCst);
            }
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            active.fetch_sub(1, Ordering::SeqCst);
            anyhow::Ok(())
        }));
    }

    scheduler.complete().await;
    assert_eq!(overlaps.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(scheduler.stats().succeeded, 20);
}
