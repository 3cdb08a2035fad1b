//! Pity tracking: miss counters that raise an option's odds the longer it
//! goes unpicked, and force it once a threshold is reached.
//!
//! Counters live under a [`Scope`]: the global scope, or one scope per
//! preset, so switching presets switches which counters apply.

pub mod config;
pub mod ledger;

pub use config::{PityConfig, PityConfigDraft, ScopeMode};
pub use ledger::{LedgerUpdate, PityLedger};

use serde::{Deserialize, Serialize};

/// Storage key of the global scope.
pub const GLOBAL_SCOPE_KEY: &str = "global";

/// The namespace pity counters are tracked under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    /// Counters shared by every list that is not tied to a preset.
    Global,
    /// Counters belonging to one preset, by preset id.
    Preset(String),
}

impl Scope {
    /// Create a preset scope.
    pub fn preset(id: impl Into<String>) -> Self {
        Self::Preset(id.into())
    }

    /// The key this scope is stored under.
    pub fn key(&self) -> &str {
        match self {
            Self::Global => GLOBAL_SCOPE_KEY,
            Self::Preset(id) => id,
        }
    }

    /// Parse a stored key back into a scope.
    pub fn from_key(key: &str) -> Self {
        if key == GLOBAL_SCOPE_KEY {
            Self::Global
        } else {
            Self::Preset(key.to_string())
        }
    }
}

impl From<String> for Scope {
    fn from(key: String) -> Self {
        if key == GLOBAL_SCOPE_KEY {
            Self::Global
        } else {
            Self::Preset(key)
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Global => GLOBAL_SCOPE_KEY.to_string(),
            Scope::Preset(id) => id,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Preset(id) => write!(f, "preset {id}"),
        }
    }
}
