//! Pity weighting configuration.

use serde::{Deserialize, Serialize};

use crate::validate::ValidationReport;

/// Which scope a pity reset targets when none is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    /// The global scope.
    #[default]
    Global,
    /// The applied preset's scope, when a preset is applied.
    Preset,
}

impl std::fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Preset => write!(f, "preset"),
        }
    }
}

/// Settings governing soft and hard pity.
///
/// Missing fields in stored documents take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PityConfig {
    /// Whether pity weighting is applied at all.
    pub enabled: bool,
    /// Weight added per consecutive miss.
    pub soft_increment: u32,
    /// Miss count at which an option is forced.
    pub hard_threshold: u32,
    /// Upper bound on an option's weight.
    pub soft_multiplier_cap: u32,
    /// Reset a scope once every option in it has been won through hard pity.
    pub auto_reset_when_all_hard_hit: bool,
    /// Scope mode picked most recently.
    pub last_selected_scope: ScopeMode,
}

impl Default for PityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            soft_increment: 1,
            hard_threshold: 12,
            soft_multiplier_cap: 5,
            auto_reset_when_all_hard_hit: false,
            last_selected_scope: ScopeMode::Global,
        }
    }
}

impl PityConfig {
    /// Check the numeric invariants of a stored config.
    pub fn validate(&self) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();
        if self.soft_increment == 0 {
            report.field_error("soft_increment", SOFT_INCREMENT_MESSAGE);
        }
        if self.hard_threshold == 0 {
            report.field_error("hard_threshold", HARD_THRESHOLD_MESSAGE);
        }
        if self.soft_multiplier_cap == 0 {
            report.field_error("soft_multiplier_cap", CAP_MESSAGE);
        }
        report.into_result(())
    }

    /// Disable pity weighting.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the hard-pity threshold.
    pub fn with_hard_threshold(mut self, threshold: u32) -> Self {
        self.hard_threshold = threshold;
        self
    }

    /// Set the per-miss weight increment.
    pub fn with_soft_increment(mut self, increment: u32) -> Self {
        self.soft_increment = increment;
        self
    }

    /// Set the weight cap.
    pub fn with_cap(mut self, cap: u32) -> Self {
        self.soft_multiplier_cap = cap;
        self
    }

    /// Enable or disable the automatic reset after a full hard-pity round.
    pub fn with_auto_reset(mut self, auto_reset: bool) -> Self {
        self.auto_reset_when_all_hard_hit = auto_reset;
        self
    }
}

const SOFT_INCREMENT_MESSAGE: &str = "must be a whole number greater than 0";
const HARD_THRESHOLD_MESSAGE: &str = "must be a whole number of at least 1";
const CAP_MESSAGE: &str = "must be a whole number of at least 1";

/// A pity config as entered by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PityConfigDraft {
    /// Whether pity weighting is on.
    pub enabled: bool,
    /// Per-miss increment text.
    pub soft_increment: String,
    /// Hard threshold text.
    pub hard_threshold: String,
    /// Weight cap text.
    pub soft_multiplier_cap: String,
    /// Auto reset flag.
    pub auto_reset_when_all_hard_hit: bool,
    /// Scope mode.
    pub last_selected_scope: ScopeMode,
}

impl From<&PityConfig> for PityConfigDraft {
    fn from(config: &PityConfig) -> Self {
        Self {
            enabled: config.enabled,
            soft_increment: config.soft_increment.to_string(),
            hard_threshold: config.hard_threshold.to_string(),
            soft_multiplier_cap: config.soft_multiplier_cap.to_string(),
            auto_reset_when_all_hard_hit: config.auto_reset_when_all_hard_hit,
            last_selected_scope: config.last_selected_scope,
        }
    }
}

impl PityConfigDraft {
    /// Validate the draft and build the config it describes.
    pub fn validate(&self) -> Result<PityConfig, ValidationReport> {
        let mut report = ValidationReport::new();
        let soft_increment = parse_at_least(&self.soft_increment, 1);
        let hard_threshold = parse_at_least(&self.hard_threshold, 1);
        let soft_multiplier_cap = parse_at_least(&self.soft_multiplier_cap, 1);

        if soft_increment.is_none() {
            report.field_error("soft_increment", SOFT_INCREMENT_MESSAGE);
        }
        if hard_threshold.is_none() {
            report.field_error("hard_threshold", HARD_THRESHOLD_MESSAGE);
        }
        if soft_multiplier_cap.is_none() {
            report.field_error("soft_multiplier_cap", CAP_MESSAGE);
        }

        match (soft_increment, hard_threshold, soft_multiplier_cap) {
            (Some(soft_increment), Some(hard_threshold), Some(soft_multiplier_cap)) => {
                Ok(PityConfig {
                    enabled: self.enabled,
                    soft_increment,
                    hard_threshold,
                    soft_multiplier_cap,
                    auto_reset_when_all_hard_hit: self.auto_reset_when_all_hard_hit,
                    last_selected_scope: self.last_selected_scope,
                })
            }
            _ => Err(report),
        }
    }
}

fn parse_at_least(text: &str, min: u32) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|n| *n >= min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PityConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.soft_increment, 1);
        assert_eq!(cfg.hard_threshold, 12);
        assert_eq!(cfg.soft_multiplier_cap, 5);
        assert!(!cfg.auto_reset_when_all_hard_hit);
        assert_eq!(cfg.last_selected_scope, ScopeMode::Global);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let cfg = PityConfig::default()
            .with_hard_threshold(2)
            .with_soft_increment(3)
            .with_cap(4)
            .with_auto_reset(true)
            .disabled();
        assert!(!cfg.enabled);
        assert_eq!(cfg.hard_threshold, 2);
        assert_eq!(cfg.soft_increment, 3);
        assert_eq!(cfg.soft_multiplier_cap, 4);
        assert!(cfg.auto_reset_when_all_hard_hit);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let cfg: PityConfig = serde_json::from_str(r#"{"hard_threshold": 3}"#).unwrap();
        assert_eq!(cfg.hard_threshold, 3);
        assert_eq!(cfg.soft_multiplier_cap, 5);
        assert!(cfg.enabled);
    }

    #[test]
    fn scope_mode_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ScopeMode::Preset).unwrap(),
            r#""preset""#
        );
    }

    #[test]
    fn stored_zero_values_rejected() {
        let cfg = PityConfig {
            soft_increment: 0,
            hard_threshold: 0,
            ..PityConfig::default()
        };
        let report = cfg.validate().unwrap_err();
        assert!(report.field_message("soft_increment").is_some());
        assert!(report.field_message("hard_threshold").is_some());
        assert!(report.field_message("soft_multiplier_cap").is_none());
    }

    #[test]
    fn draft_round_trip() {
        let cfg = PityConfig::default().with_hard_threshold(7);
        let draft = PityConfigDraft::from(&cfg);
        assert_eq!(draft.validate().unwrap(), cfg);
    }

    #[test]
    fn draft_rejects_bad_numbers() {
        let mut draft = PityConfigDraft::from(&PityConfig::default());
        draft.soft_increment = "0".to_string();
        draft.hard_threshold = "1.5".to_string();
        draft.soft_multiplier_cap = "-2".to_string();
        let report = draft.validate().unwrap_err();
        assert_eq!(
            report.field_message("soft_increment"),
            Some("must be a whole number greater than 0")
        );
        assert!(report.field_message("hard_threshold").is_some());
        assert!(report.field_message("soft_multiplier_cap").is_some());
    }

    #[test]
    fn draft_accepts_threshold_of_one() {
        let mut draft = PityConfigDraft::from(&PityConfig::default());
        draft.hard_threshold = " 1 ".to_string();
        assert_eq!(draft.validate().unwrap().hard_threshold, 1);
    }
}
