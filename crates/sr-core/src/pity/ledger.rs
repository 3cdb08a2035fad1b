//! Per-scope miss counters and hard-pity records.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use super::Scope;
use super::config::PityConfig;
use crate::selection::SelectionMethod;

/// What [`PityLedger::apply_outcome`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// Pity is disabled; nothing was recorded.
    Disabled,
    /// The chosen index did not name an option; nothing was recorded.
    Ignored,
    /// Counters were updated.
    Updated,
    /// Counters were updated and then the whole scope was reset because
    /// every option had been won through hard pity.
    AutoReset,
}

/// Miss counters keyed by scope, then by option text.
///
/// A missing entry reads as zero. The ledger only ever touches the option
/// keys passed to the current call; counters for options that were removed
/// from a list stay in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PityLedger {
    counts: BTreeMap<String, BTreeMap<String, u32>>,
    hard_hits: BTreeMap<String, BTreeSet<String>>,
}

impl PityLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from its two stored maps.
    pub fn from_parts(
        counts: BTreeMap<String, BTreeMap<String, u32>>,
        hard_hits: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let hard_hits = hard_hits
            .into_iter()
            .map(|(scope, keys)| (scope, keys.into_iter().collect()))
            .filter(|(_, keys): &(String, BTreeSet<String>)| !keys.is_empty())
            .collect();
        Self { counts, hard_hits }
    }

    /// Stored counters for every scope.
    pub fn counts(&self) -> &BTreeMap<String, BTreeMap<String, u32>> {
        &self.counts
    }

    /// Hard-hit sets for every scope, as ordered lists.
    pub fn hard_hits(&self) -> BTreeMap<String, Vec<String>> {
        self.hard_hits
            .iter()
            .map(|(scope, keys)| (scope.clone(), keys.iter().cloned().collect()))
            .collect()
    }

    /// Miss count of one option in a scope, or 0 if never recorded.
    pub fn count_for(&self, scope: &Scope, key: &str) -> u32 {
        self.counts
            .get(scope.key())
            .and_then(|counts| counts.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// Snapshot of a scope's counters, for handing to the selection engine.
    pub fn counts_for(&self, scope: &Scope) -> BTreeMap<String, u32> {
        self.counts.get(scope.key()).cloned().unwrap_or_default()
    }

    /// Whether an option has been won through hard pity since the last reset.
    pub fn has_hard_hit(&self, scope: &Scope, key: &str) -> bool {
        self.hard_hits
            .get(scope.key())
            .is_some_and(|keys| keys.contains(key))
    }

    /// Options in a scope won through hard pity since the last reset.
    pub fn hard_hits_for(&self, scope: &Scope) -> Vec<&str> {
        self.hard_hits
            .get(scope.key())
            .map(|keys| keys.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every scope with stored counters or hard hits.
    pub fn scopes(&self) -> Vec<Scope> {
        let keys: BTreeSet<&String> = self.counts.keys().chain(self.hard_hits.keys()).collect();
        keys.into_iter().map(|k| Scope::from_key(k)).collect()
    }

    /// Record the result of one spin.
    ///
    /// The chosen option's counter drops to 0 and every other option's
    /// counter rises by 1. Options sharing the same text share one counter,
    /// which is updated once. A hard-pity win is added to the scope's
    /// hard-hit set; with auto reset on, a hard-hit set covering every option
    /// resets the scope in the same call.
    pub fn apply_outcome(
        &mut self,
        scope: &Scope,
        options: &[String],
        chosen_index: usize,
        method: SelectionMethod,
        config: &PityConfig,
    ) -> LedgerUpdate {
        if !config.enabled {
            return LedgerUpdate::Disabled;
        }
        let Some(chosen_key) = options.get(chosen_index) else {
            return LedgerUpdate::Ignored;
        };

        let counts = self.counts.entry(scope.key().to_string()).or_default();
        let mut seen = BTreeSet::new();
        for key in options {
            if !seen.insert(key.as_str()) {
                continue;
            }
            if key == chosen_key {
                counts.insert(key.clone(), 0);
            } else {
                let count = counts.entry(key.clone()).or_insert(0);
                *count = count.saturating_add(1);
            }
        }

        if method == SelectionMethod::HardPity {
            self.hard_hits
                .entry(scope.key().to_string())
                .or_default()
                .insert(chosen_key.clone());
        }

        if config.auto_reset_when_all_hard_hit && self.all_hard_hit(scope, &seen) {
            if let Some(counts) = self.counts.get_mut(scope.key()) {
                counts.values_mut().for_each(|count| *count = 0);
            }
            self.hard_hits.remove(scope.key());
            info!(%scope, "every option won through hard pity; scope reset");
            return LedgerUpdate::AutoReset;
        }

        LedgerUpdate::Updated
    }

    /// Zero the listed options' counters and clear the scope's hard hits.
    pub fn reset_scope(&mut self, scope: &Scope, options: &[String]) {
        let counts = self.counts.entry(scope.key().to_string()).or_default();
        for key in options {
            counts.insert(key.clone(), 0);
        }
        self.hard_hits.remove(scope.key());
    }

    /// Forget every scope.
    pub fn reset_all(&mut self) {
        self.counts.clear();
        self.hard_hits.clear();
    }

    fn all_hard_hit(&self, scope: &Scope, keys: &BTreeSet<&str>) -> bool {
        let Some(hits) = self.hard_hits.get(scope.key()) else {
            return false;
        };
        !keys.is_empty() && keys.iter().all(|key| hits.contains(*key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn absent_counts_read_zero() {
        let ledger = PityLedger::new();
        assert_eq!(ledger.count_for(&Scope::Global, "A"), 0);
        assert!(ledger.counts_for(&Scope::Global).is_empty());
    }

    #[test]
    fn chosen_resets_others_increment() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B", "C"]);
        let cfg = PityConfig::default();
        ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::SoftWeight, &cfg);
        ledger.apply_outcome(&Scope::Global, &options, 1, SelectionMethod::SoftWeight, &cfg);
        assert_eq!(ledger.count_for(&Scope::Global, "A"), 1);
        assert_eq!(ledger.count_for(&Scope::Global, "B"), 0);
        assert_eq!(ledger.count_for(&Scope::Global, "C"), 2);
    }

    #[test]
    fn disabled_pity_records_nothing() {
        let mut ledger = PityLedger::new();
        let update = ledger.apply_outcome(
            &Scope::Global,
            &opts(&["A", "B"]),
            0,
            SelectionMethod::None,
            &PityConfig::default().disabled(),
        );
        assert_eq!(update, LedgerUpdate::Disabled);
        assert_eq!(ledger, PityLedger::new());
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut ledger = PityLedger::new();
        let update = ledger.apply_outcome(
            &Scope::Global,
            &opts(&["A"]),
            4,
            SelectionMethod::SoftWeight,
            &PityConfig::default(),
        );
        assert_eq!(update, LedgerUpdate::Ignored);
        assert!(ledger.scopes().is_empty());
    }

    #[test]
    fn scopes_are_independent() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B"]);
        let cfg = PityConfig::default();
        let preset = Scope::preset("p1");
        ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::SoftWeight, &cfg);
        ledger.apply_outcome(&preset, &options, 1, SelectionMethod::SoftWeight, &cfg);
        assert_eq!(ledger.count_for(&Scope::Global, "B"), 1);
        assert_eq!(ledger.count_for(&preset, "B"), 0);
        assert_eq!(ledger.count_for(&preset, "A"), 1);
        assert_eq!(ledger.scopes(), vec![Scope::Global, preset]);
    }

    #[test]
    fn duplicate_texts_share_one_counter() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "A", "B"]);
        let cfg = PityConfig::default();
        ledger.apply_outcome(&Scope::Global, &options, 2, SelectionMethod::SoftWeight, &cfg);
        assert_eq!(ledger.count_for(&Scope::Global, "A"), 1);
        ledger.apply_outcome(&Scope::Global, &options, 1, SelectionMethod::SoftWeight, &cfg);
        assert_eq!(ledger.count_for(&Scope::Global, "A"), 0);
        assert_eq!(ledger.count_for(&Scope::Global, "B"), 1);
    }

    #[test]
    fn stale_keys_are_left_alone() {
        let mut ledger = PityLedger::new();
        let cfg = PityConfig::default();
        ledger.apply_outcome(
            &Scope::Global,
            &opts(&["A", "Gone"]),
            0,
            SelectionMethod::SoftWeight,
            &cfg,
        );
        ledger.apply_outcome(
            &Scope::Global,
            &opts(&["A", "New"]),
            1,
            SelectionMethod::SoftWeight,
            &cfg,
        );
        assert_eq!(ledger.count_for(&Scope::Global, "Gone"), 1);
        assert_eq!(ledger.count_for(&Scope::Global, "A"), 1);
        assert_eq!(ledger.count_for(&Scope::Global, "New"), 0);
    }

    #[test]
    fn hard_pity_wins_are_recorded() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B"]);
        let cfg = PityConfig::default();
        ledger.apply_outcome(&Scope::Global, &options, 1, SelectionMethod::HardPity, &cfg);
        ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::ManualStop, &cfg);
        assert!(ledger.has_hard_hit(&Scope::Global, "B"));
        assert!(!ledger.has_hard_hit(&Scope::Global, "A"));
        assert_eq!(ledger.hard_hits_for(&Scope::Global), vec!["B"]);
    }

    #[test]
    fn auto_reset_after_every_option_hard_hit() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B"]);
        let cfg = PityConfig::default().with_auto_reset(true);

        let first =
            ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::HardPity, &cfg);
        assert_eq!(first, LedgerUpdate::Updated);
        assert_eq!(ledger.count_for(&Scope::Global, "B"), 1);

        let second =
            ledger.apply_outcome(&Scope::Global, &options, 1, SelectionMethod::HardPity, &cfg);
        assert_eq!(second, LedgerUpdate::AutoReset);
        assert_eq!(ledger.count_for(&Scope::Global, "A"), 0);
        assert_eq!(ledger.count_for(&Scope::Global, "B"), 0);
        assert!(ledger.hard_hits_for(&Scope::Global).is_empty());
    }

    #[test]
    fn no_auto_reset_when_disabled_in_config() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B"]);
        let cfg = PityConfig::default();
        ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::HardPity, &cfg);
        let update =
            ledger.apply_outcome(&Scope::Global, &options, 1, SelectionMethod::HardPity, &cfg);
        assert_eq!(update, LedgerUpdate::Updated);
        assert_eq!(ledger.hard_hits_for(&Scope::Global).len(), 2);
        assert_eq!(ledger.count_for(&Scope::Global, "A"), 1);
    }

    #[test]
    fn reset_scope_is_idempotent() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B", "C"]);
        let cfg = PityConfig::default();
        ledger.apply_outcome(&Scope::Global, &options, 2, SelectionMethod::HardPity, &cfg);
        ledger.apply_outcome(&Scope::Global, &options, 2, SelectionMethod::SoftWeight, &cfg);

        ledger.reset_scope(&Scope::Global, &options);
        let once = ledger.clone();
        ledger.reset_scope(&Scope::Global, &options);
        assert_eq!(ledger, once);
        for key in &options {
            assert_eq!(ledger.count_for(&Scope::Global, key), 0);
        }
        assert!(ledger.hard_hits_for(&Scope::Global).is_empty());
    }

    #[test]
    fn reset_scope_leaves_other_scopes() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B"]);
        let cfg = PityConfig::default();
        let preset = Scope::preset("p");
        ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::SoftWeight, &cfg);
        ledger.apply_outcome(&preset, &options, 0, SelectionMethod::SoftWeight, &cfg);
        ledger.reset_scope(&preset, &options);
        assert_eq!(ledger.count_for(&Scope::Global, "B"), 1);
        assert_eq!(ledger.count_for(&preset, "B"), 0);
    }

    #[test]
    fn reset_all_clears_everything() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B"]);
        let cfg = PityConfig::default();
        ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::HardPity, &cfg);
        ledger.apply_outcome(&Scope::preset("p"), &options, 0, SelectionMethod::SoftWeight, &cfg);
        ledger.reset_all();
        assert_eq!(ledger, PityLedger::new());
    }

    #[test]
    fn parts_round_trip() {
        let mut ledger = PityLedger::new();
        let options = opts(&["A", "B"]);
        let cfg = PityConfig::default();
        ledger.apply_outcome(&Scope::Global, &options, 0, SelectionMethod::HardPity, &cfg);
        let rebuilt = PityLedger::from_parts(ledger.counts().clone(), ledger.hard_hits());
        assert_eq!(rebuilt, ledger);
    }
}
