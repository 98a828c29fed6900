//! Tests for error types

use reentrant_scheduler::core::{SchedulerError, TaskError};

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("name must not be empty".to_string());
    assert_eq!(format!("{err}"), "config invalid: name must not be empty");
}

#[test]
fn test_unknown_scheduler_error() {
    let err = SchedulerError::UnknownScheduler("db".to_string());
    assert_eq!(format!("{err}"), "unknown scheduler: db");
}

#[test]
fn test_task_failed_error() {
    let err = TaskError::Failed(anyhow::anyhow!("boom"));
    assert_eq!(format!("{err}"), "task failed: boom");
    assert_eq!(err.failure().map(ToString::to_string).as_deref(), Some("boom"));
}

#[test]
fn test_task_panicked_error() {
    let err = TaskError::Panicked("index out of bounds".to_string());
    assert_eq!(format!("{err}"), "task panicked: index out of bounds");
    assert!(err.failure().is_none());
}

#[test]
fn test_task_error_converts_to_anyhow() {
    let err: anyhow::Error = TaskError::MissingValue.into();
    assert_eq!(
        err.to_string(),
        "error-first callback completed without a value"
    );
    assert!(TaskError::Abandoned.failure().is_none());
}

#[test]
fn test_no_runtime_error() {
    assert_eq!(
        format!("{}", SchedulerError::NoRuntime),
        "no tokio runtime available"
    );
}
