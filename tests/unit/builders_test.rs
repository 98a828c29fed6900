//! Tests for builder modules

use std::sync::Arc;

use reentrant_scheduler::builders::build_schedulers;
use reentrant_scheduler::config::{NestingPolicy, RegistryConfig};
use reentrant_scheduler::core::SchedulerError;
use reentrant_scheduler::runtime::TokioSpawner;

fn registry_config() -> RegistryConfig {
    RegistryConfig::from_json_str(
        r#"{"schedulers": {"db": {"name": "ignored"}, "ui": {"nesting": "flat"}}}"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_build_schedulers_uses_map_keys() {
    let registry = build_schedulers(&registry_config(), Arc::new(TokioSpawner::ambient())).unwrap();
    assert_eq!(registry.names(), vec!["db", "ui"]);

    let db = registry.get("db").unwrap();
    assert_eq!(db.name(), "db");
    assert_eq!(db.config().nesting, NestingPolicy::Nested);
    assert_eq!(registry.get("ui").unwrap().config().nesting, NestingPolicy::Flat);
}

#[tokio::test]
async fn test_registry_unknown_scheduler() {
    let registry = build_schedulers(&registry_config(), Arc::new(TokioSpawner::ambient())).unwrap();
    let err = registry.get("missing").unwrap_err();
    assert!(matches!(err, SchedulerError::UnknownScheduler(ref name) if name == "missing"));
}

#[test]
fn test_build_schedulers_rejects_empty_registry() {
    let err = build_schedulers(&RegistryConfig::default(), Arc::new(TokioSpawner::ambient()))
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_registry_schedulers_are_independent() {
    let registry = build_schedulers(&registry_config(), Arc::new(TokioSpawner::ambient())).unwrap();
    let db = registry.get("db").unwrap().clone();
    let ui = registry.get("ui").unwrap().clone();
    assert_ne!(db.id(), ui.id());

    let ui_inner = ui.clone();
    // A task on `db` may wait on `ui` without any unblocking.
    let value = db
        .schedule(move || async move { Ok(ui_inner.schedule(|| async { anyhow::Ok(5) }).await?) })
        .await
        .unwrap();
    assert_eq!(value, 5);

    registry.complete_all().await;
    assert!(db.is_idle());
    assert!(ui.is_idle());
}
