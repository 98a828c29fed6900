//! Tests for configuration validation

use reentrant_scheduler::config::{NestingPolicy, RegistryConfig, SchedulerConfig, CONFIG_ENV};

#[test]
fn test_scheduler_config_defaults() {
    let cfg = SchedulerConfig::default();
    assert_eq!(cfg.name, "scheduler");
    assert_eq!(cfg.nesting, NestingPolicy::Nested);
    assert!(!cfg.unblock_by_default);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_scheduler_config_builders() {
    let cfg = SchedulerConfig::named("db")
        .with_nesting(NestingPolicy::Flat)
        .with_unblock_by_default(true);
    assert_eq!(cfg.name, "db");
    assert_eq!(cfg.nesting, NestingPolicy::Flat);
    assert!(cfg.unblock_by_default);
}

#[test]
fn test_scheduler_config_invalid_name() {
    assert!(SchedulerConfig::named("").validate().is_err());
    assert!(SchedulerConfig::named("   ").validate().is_err());
}

#[test]
fn test_scheduler_config_from_json() {
    let cfg = SchedulerConfig::from_json_str(r#"{"name": "io", "nesting": "flat"}"#).unwrap();
    assert_eq!(cfg.name, "io");
    assert_eq!(cfg.nesting, NestingPolicy::Flat);
    assert!(!cfg.unblock_by_default);

    let cfg = SchedulerConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, SchedulerConfig::default());
}

#[test]
fn test_scheduler_config_from_json_rejects_bad_input() {
    let err = SchedulerConfig::from_json_str(r#"{"nesting": "sideways"}"#).unwrap_err();
    assert!(err.starts_with("parse error"));

    assert!(SchedulerConfig::from_json_str(r#"{"name": ""}"#).is_err());
}

#[test]
fn test_registry_config_validation() {
    assert!(RegistryConfig::default().validate().is_err());

    let cfg = RegistryConfig::from_json_str(
        r#"{"schedulers": {"db": {}, "ui": {"nesting": "flat", "unblock_by_default": true}}}"#,
    )
    .unwrap();
    assert_eq!(cfg.schedulers.len(), 2);
    assert!(cfg.schedulers["ui"].unblock_by_default);
    assert_eq!(cfg.schedulers["db"].nesting, NestingPolicy::Nested);
}

#[test]
fn test_registry_config_invalid_entry() {
    let err = RegistryConfig::from_json_str(r#"{"schedulers": {"db": {"name": ""}}}"#).unwrap_err();
    assert!(err.contains("`db`"), "unexpected error: {err}");
}

#[test]
fn test_registry_config_from_env() {
    std::env::set_var(
        CONFIG_ENV,
        r#"{"schedulers": {"from-env": {"nesting": "flat"}}}"#,
    );
    let cfg = RegistryConfig::from_env().unwrap();
    assert_eq!(cfg.schedulers["from-env"].nesting, NestingPolicy::Flat);

    std::env::set_var(CONFIG_ENV, "not json");
    assert!(RegistryConfig::from_env().is_err());

    std::env::remove_var(CONFIG_ENV);
    let cfg = RegistryConfig::from_env().unwrap();
    assert_eq!(cfg.schedulers.len(), 1);
    assert!(cfg.schedulers.contains_key("scheduler"));
}
