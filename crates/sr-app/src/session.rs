//! Application session.
//!
//! A `Session` loads every record on open, mutates state through the core
//! types, and writes back only the records an operation touched.

use std::collections::BTreeSet;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use sr_core::{
    DecisionList, DiceFaceDraft, DiceTable, History, HistoryEntry, HistoryPage, PityConfig,
    PityConfigDraft, PityLedger, Preset, PresetList, Resolution, Scope, ScopeMode, SpinEvent,
    SpinRequest, SpinStart, Spinner,
};

use crate::config::SessionConfig;
use crate::error::{AppError, AppResult};
use crate::store::{RecordKey, Storage, load_records, save_json};

/// Which pity counters a reset applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetTarget {
    /// The scope the next spin would use.
    Active,
    /// The scope remembered in `last_selected_scope`.
    Selected,
    /// One specific scope.
    Scope(Scope),
    /// Every scope.
    All,
}

/// History export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Markdown list.
    #[default]
    Markdown,
    /// Plain text lines.
    Text,
}

/// Decision list, presets, history, dice, pity and the spin in progress.
pub struct Session {
    store: Box<dyn Storage>,
    config: SessionConfig,
    decisions: DecisionList,
    presets: PresetList,
    active_preset: Option<String>,
    history: History,
    dice: DiceTable,
    ledger: PityLedger,
    pity: PityConfig,
    spinner: Spinner,
    rng: StdRng,
}

impl Session {
    /// Open a session over `store`, loading whatever it holds.
    pub fn open(store: Box<dyn Storage>, config: SessionConfig) -> Self {
        let records = load_records(store.as_ref());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let spinner = Spinner::new(config.timing.clone());
        debug!(
            decisions = records.decisions.len(),
            presets = records.presets.len(),
            history = records.history.len(),
            "session opened"
        );

        Self {
            store,
            config,
            decisions: records.decisions,
            presets: records.presets,
            active_preset: records.active_preset,
            history: records.history,
            dice: records.dice,
            ledger: records.ledger,
            pity: records.pity,
            spinner,
            rng,
        }
    }

    /// Get the session config.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the decision list.
    pub fn decisions(&self) -> &DecisionList {
        &self.decisions
    }

    /// Get the saved presets.
    pub fn presets(&self) -> &PresetList {
        &self.presets
    }

    /// The applied preset, if any.
    pub fn active_preset(&self) -> Option<&Preset> {
        self.active_preset
            .as_deref()
            .and_then(|id| self.presets.get(id))
    }

    /// Get the history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Get the dice table.
    pub fn dice(&self) -> &DiceTable {
        &self.dice
    }

    /// Get the pity ledger.
    pub fn ledger(&self) -> &PityLedger {
        &self.ledger
    }

    /// Get the pity settings.
    pub fn pity(&self) -> &PityConfig {
        &self.pity
    }

    /// Get the spinner.
    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    // --- decisions ---

    /// Append a decision.
    pub fn add_decision(&mut self, text: &str) -> AppResult<()> {
        self.decisions.add(text)?;
        self.save_decisions();
        Ok(())
    }

    /// Remove the decision at a 1-based position and return its text.
    pub fn remove_decision(&mut self, position: usize) -> AppResult<String> {
        let removed = self.decisions.remove(position)?;
        self.save_decisions();
        Ok(removed)
    }

    /// Remove every decision.
    pub fn clear_decisions(&mut self) {
        self.decisions.clear();
        self.save_decisions();
    }

    // --- presets ---

    /// Save the current decisions as a preset and make it active.
    pub fn save_preset(&mut self, name: &str) -> AppResult<&Preset> {
        let id = self
            .presets
            .save(name, self.decisions.as_slice())?
            .id
            .clone();
        info!(preset = %id, name = name.trim(), "preset saved");
        self.active_preset = Some(id.clone());
        self.save_presets();
        self.save_active_preset();
        self.presets
            .get(&id)
            .ok_or_else(|| AppError::UnknownPreset(name.to_string()))
    }

    /// Load a preset's decisions by name or id and make it active.
    pub fn apply_preset(&mut self, id_or_name: &str) -> AppResult<&Preset> {
        let preset = self
            .presets
            .find(id_or_name)
            .ok_or_else(|| AppError::UnknownPreset(id_or_name.to_string()))?;
        let id = preset.id.clone();
        self.decisions.replace(&preset.decisions);
        info!(preset = %id, "preset applied");
        self.active_preset = Some(id.clone());
        self.save_decisions();
        self.save_active_preset();
        self.presets
            .get(&id)
            .ok_or_else(|| AppError::UnknownPreset(id_or_name.to_string()))
    }

    /// Delete a preset by name or id. Deleting the active preset falls
    /// back to the global scope.
    pub fn delete_preset(&mut self, id_or_name: &str) -> AppResult<Preset> {
        let removed = self
            .presets
            .delete(id_or_name)
            .ok_or_else(|| AppError::UnknownPreset(id_or_name.to_string()))?;
        if self.active_preset.as_deref() == Some(removed.id.as_str()) {
            self.active_preset = None;
            self.save_active_preset();
        }
        info!(preset = %removed.id, "preset deleted");
        self.save_presets();
        Ok(removed)
    }

    // --- history ---

    /// One 1-based page of history, newest first.
    pub fn history_page(&self, page: usize, page_size: usize) -> HistoryPage<'_> {
        self.history.page(page, page_size)
    }

    /// Forget every history entry.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.save_history();
    }

    /// Render the history as a document.
    pub fn export(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Markdown => self.history.export_markdown(),
            ExportFormat::Text => self.history.export_text(),
        }
    }

    // --- settings ---

    /// Validate and store an edited dice table. Nothing changes on failure.
    pub fn save_dice_table(&mut self, drafts: &[DiceFaceDraft]) -> AppResult<&DiceTable> {
        self.dice = DiceTable::from_drafts(drafts)?;
        save_json(self.store.as_mut(), RecordKey::DiceTable, &self.dice);
        Ok(&self.dice)
    }

    /// Restore the built-in dice table.
    pub fn reset_dice_table(&mut self) -> &DiceTable {
        self.dice = DiceTable::default();
        save_json(self.store.as_mut(), RecordKey::DiceTable, &self.dice);
        &self.dice
    }

    /// Validate and store edited pity settings. Nothing changes on failure.
    pub fn save_pity_config(&mut self, draft: &PityConfigDraft) -> AppResult<&PityConfig> {
        self.pity = draft.validate()?;
        self.save_pity_config_record();
        Ok(&self.pity)
    }

    /// Remember which scope a reset targets when none is named.
    pub fn set_scope_mode(&mut self, mode: ScopeMode) {
        self.pity.last_selected_scope = mode;
        self.save_pity_config_record();
    }

    /// The scope the next spin is recorded under: the applied preset's,
    /// or the global scope when no preset is applied.
    pub fn active_scope(&self) -> Scope {
        self.active_preset()
            .map_or(Scope::Global, |preset| Scope::preset(preset.id.clone()))
    }

    /// The scope `last_selected_scope` points at. Falls back to the global
    /// scope when it names the preset scope but no preset is applied.
    pub fn selected_scope(&self) -> Scope {
        match self.pity.last_selected_scope {
            ScopeMode::Global => Scope::Global,
            ScopeMode::Preset => self.active_scope(),
        }
    }

    /// Zero pity counters and hard hits.
    ///
    /// A scope reset covers every key stored under the scope plus the
    /// decisions the scope applies to.
    pub fn reset_pity(&mut self, target: ResetTarget) {
        let scope = match target {
            ResetTarget::All => {
                self.ledger.reset_all();
                info!("all pity scopes reset");
                self.save_ledger();
                return;
            }
            ResetTarget::Active => self.active_scope(),
            ResetTarget::Selected => self.selected_scope(),
            ResetTarget::Scope(scope) => scope,
        };

        let mut keys: BTreeSet<String> = self.ledger.counts_for(&scope).into_keys().collect();
        let listed = match &scope {
            Scope::Preset(id) => self
                .presets
                .get(id)
                .map(|p| p.decisions.as_slice())
                .unwrap_or_default(),
            Scope::Global => self.decisions.as_slice(),
        };
        keys.extend(listed.iter().cloned());
        let keys: Vec<String> = keys.into_iter().collect();

        self.ledger.reset_scope(&scope, &keys);
        info!(%scope, keys = keys.len(), "pity scope reset");
        self.save_ledger();
    }

    // --- spinning ---

    /// Start a spin over the current decisions. Returns `Ok(None)` when a
    /// spin is already running or there is nothing to choose from.
    pub fn start_spin(&mut self, now: Instant) -> AppResult<Option<SpinStart>> {
        let scope = self.active_scope();
        let counts = self.ledger.counts_for(&scope);
        let request = SpinRequest {
            options: self.decisions.as_slice(),
            dice: &self.dice,
            pity_counts: &counts,
            pity: &self.pity,
            scope: &scope,
        };
        let start = self.spinner.start(request, now, &mut self.rng)?;
        if let Some(start) = &start {
            info!(
                face = start.face.face,
                secs = start.face.duration_secs,
                %scope,
                "spin started"
            );
        }
        Ok(start)
    }

    /// Advance the running spin. A settled spin is recorded before the
    /// events are returned.
    pub fn poll_spin(&mut self, now: Instant) -> Vec<SpinEvent> {
        let events = self.spinner.poll(now);
        for event in &events {
            if let SpinEvent::Settled(resolution) = event {
                self.record(resolution);
            }
        }
        events
    }

    /// Stop the running spin on the option under the cursor and record it.
    pub fn stop_spin(&mut self) -> Option<Resolution> {
        let resolution = self.spinner.stop()?;
        self.record(&resolution);
        Some(resolution)
    }

    /// Abandon the running spin without recording anything.
    pub fn cancel_spin(&mut self) -> bool {
        let cancelled = self.spinner.cancel();
        if cancelled {
            debug!("spin cancelled");
        }
        cancelled
    }

    /// When [`Session::poll_spin`] should be called next.
    pub fn next_wake(&self) -> Option<Instant> {
        self.spinner.next_wake()
    }

    fn record(&mut self, resolution: &Resolution) {
        let update = self.ledger.apply_outcome(
            &resolution.scope,
            &resolution.options,
            resolution.index,
            resolution.method,
            &self.pity,
        );
        self.history.append(
            HistoryEntry::new(&resolution.decision, resolution.method)
                .with_roll(resolution.face.face, resolution.face.duration_secs),
        );
        info!(
            decision = %resolution.decision,
            method = %resolution.method,
            scope = %resolution.scope,
            ?update,
            "spin settled"
        );
        self.save_ledger();
        self.save_history();
    }

    // --- persistence ---

    fn save_decisions(&mut self) {
        save_json(self.store.as_mut(), RecordKey::Decisions, &self.decisions);
    }

    fn save_presets(&mut self) {
        save_json(self.store.as_mut(), RecordKey::Presets, &self.presets);
    }

    fn save_active_preset(&mut self) {
        save_json(
            self.store.as_mut(),
            RecordKey::ActivePreset,
            &self.active_preset,
        );
    }

    fn save_history(&mut self) {
        save_json(self.store.as_mut(), RecordKey::History, &self.history);
    }

    fn save_ledger(&mut self) {
        save_json(
            self.store.as_mut(),
            RecordKey::PityLedger,
            self.ledger.counts(),
        );
        save_json(
            self.store.as_mut(),
            RecordKey::PityHardHits,
            &self.ledger.hard_hits(),
        );
    }

    fn save_pity_config_record(&mut self) {
        save_json(self.store.as_mut(), RecordKey::PityConfig, &self.pity);
    }
}
