//! Completion-style tags.

use serde::{Deserialize, Serialize};

/// How a unit of work signals that it finished, whether it failed, and which
/// value it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncStyle {
    /// Work takes no arguments and returns a future.
    AwaitableReturn,
    /// Work takes a success callback and a failure callback.
    DualCallback,
    /// Work takes one callback; failure is reached through its `fail` method.
    SingleCallbackWithFailProperty,
    /// Work takes one `(error, value)` callback; no error means success.
    ErrorFirstCallback,
    /// Pick the style from the shape of the work when it is scheduled.
    #[default]
    AutoDetect,
}

impl AsyncStyle {
    /// Resolve `AutoDetect` from the number of parameters the work declares.
    ///
    /// Zero parameters means the work returns an awaitable; anything else is
    /// treated as a dual-callback function. Explicit styles are returned as-is.
    #[must_use]
    pub const fn resolve(self, arity: usize) -> Self {
        match self {
            Self::AutoDetect if arity == 0 => Self::AwaitableReturn,
            Self::AutoDetect => Self::DualCallback,
            other => other,
        }
    }

    /// Whether this style names a concrete calling convention.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::AutoDetect)
    }
}
