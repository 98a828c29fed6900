//! Builders to construct schedulers from configuration.

pub mod registry_builder;

pub use registry_builder::{build_schedulers, SchedulerRegistry};
