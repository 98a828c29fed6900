//! Scheduler configuration structures.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};

/// Environment variable holding a JSON [`RegistryConfig`].
pub const CONFIG_ENV: &str = "REENTRANT_SCHEDULER_CONFIG";

/// Where tasks scheduled from inside a running task are queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingPolicy {
    /// One level deeper than the running task; nested work drains before the
    /// running task's later siblings.
    #[default]
    Nested,
    /// A single FIFO level; nested work waits behind everything already queued.
    Flat,
}

/// Configuration of one scheduler instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Name used in logs and for pass-through children.
    #[serde(default = "default_name")]
    pub name: String,
    /// Placement of nested work.
    #[serde(default)]
    pub nesting: NestingPolicy,
    /// Whether `schedule` marks tasks as allowing reentrant unblocking.
    #[serde(default)]
    pub unblock_by_default: bool,
}

fn default_name() -> String {
    "scheduler".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            nesting: NestingPolicy::default(),
            unblock_by_default: false,
        }
    }
}

impl SchedulerConfig {
    /// Default configuration with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the nesting policy.
    #[must_use]
    pub fn with_nesting(mut self, nesting: NestingPolicy) -> Self {
        self.nesting = nesting;
        self
    }

    /// Set whether tasks allow reentrant unblocking unless told otherwise.
    #[must_use]
    pub fn with_unblock_by_default(mut self, unblock: bool) -> Self {
        self.unblock_by_default = unblock;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }

    /// Parse a scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Named set of schedulers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Map of scheduler name to configuration.
    pub schedulers: HashMap<String, SchedulerConfig>,
}

impl RegistryConfig {
    /// Validate all schedulers and ensure at least one exists.
    pub fn validate(&self) -> Result<(), String> {
        if self.schedulers.is_empty() {
            return Err("at least one scheduler must be defined".into());
        }
        for (name, cfg) in &self.schedulers {
            cfg.validate()
                .map_err(|e| format!("scheduler `{name}` invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse a registry configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `.env` (if present) and read [`CONFIG_ENV`].
    ///
    /// Without the variable, the registry holds one default scheduler.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        match env::var(CONFIG_ENV) {
            Ok(json) if !json.trim().is_empty() => Self::from_json_str(&json),
            _ => {
                let cfg = SchedulerConfig::default();
                Ok(Self {
                    schedulers: HashMap::from([(cfg.name.clone(), cfg)]),
                })
            }
        }
    }
}
