//! Builders to construct schedulers from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::core::{Scheduler, SchedulerError};
use crate::runtime::Spawn;

/// Named schedulers built from one [`RegistryConfig`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerRegistry {
    schedulers: HashMap<String, Scheduler>,
}

impl SchedulerRegistry {
    /// Scheduler registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::UnknownScheduler` if no such scheduler exists.
    pub fn get(&self, name: &str) -> Result<&Scheduler, SchedulerError> {
        self.schedulers
            .get(name)
            .ok_or_else(|| SchedulerError::UnknownScheduler(name.to_string()))
    }

    /// Names of all registered schedulers, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schedulers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves once every registered scheduler has drained.
    pub async fn complete_all(&self) {
        for scheduler in self.schedulers.values() {
            scheduler.complete().await;
        }
    }
}

/// Build schedulers from registry configuration, sharing one spawner.
///
/// Map keys are the scheduler names; a `name` inside an entry is overridden
/// by its key.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidConfig` if the configuration fails validation.
pub fn build_schedulers(
    cfg: &RegistryConfig,
    spawner: Arc<dyn Spawn>,
) -> Result<SchedulerRegistry, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let mut schedulers = HashMap::new();
    for (name, scheduler_cfg) in &cfg.schedulers {
        let mut scheduler_cfg = scheduler_cfg.clone();
        scheduler_cfg.name.clone_from(name);
        tracing::debug!(scheduler = %name, nesting = ?scheduler_cfg.nesting, "building scheduler");
        let scheduler = Scheduler::with_spawner(scheduler_cfg, Arc::clone(&spawner));
        schedulers.insert(name.clone(), scheduler);
    }

    Ok(SchedulerRegistry { schedulers })
}
