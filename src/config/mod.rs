//! Configuration models for schedulers and scheduler registries.

pub mod scheduler;

pub use scheduler::{NestingPolicy, RegistryConfig, SchedulerConfig, CONFIG_ENV};
