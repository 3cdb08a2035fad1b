//! Persistence boundary.
//!
//! Every piece of state is stored as its own JSON document under a
//! [`RecordKey`]. Reading never fails: a missing or malformed record falls
//! back to its typed default with a warning. Writing is best effort: a
//! failure is logged and the in-memory state stays authoritative.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sr_core::{
    DecisionList, DiceFace, DiceTable, History, HistoryEntry, PityConfig, PityLedger, Preset,
    PresetList,
};

use crate::error::{AppError, AppResult};

/// Names of the stored records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Current decision list.
    Decisions,
    /// Saved presets.
    Presets,
    /// Spin history.
    History,
    /// Dice duration table.
    DiceTable,
    /// Miss counters of every scope.
    PityLedger,
    /// Hard-pity wins of every scope.
    PityHardHits,
    /// Pity settings.
    PityConfig,
    /// Id of the applied preset.
    ActivePreset,
}

impl RecordKey {
    /// Every record, in load order.
    pub const ALL: [RecordKey; 8] = [
        Self::Decisions,
        Self::Presets,
        Self::History,
        Self::DiceTable,
        Self::PityLedger,
        Self::PityHardHits,
        Self::PityConfig,
        Self::ActivePreset,
    ];

    /// Stable storage name of the record.
    pub fn name(self) -> &'static str {
        match self {
            Self::Decisions => "decisions",
            Self::Presets => "presets",
            Self::History => "history",
            Self::DiceTable => "dice_table",
            Self::PityLedger => "pity_ledger",
            Self::PityHardHits => "pity_hard_hits",
            Self::PityConfig => "pity_config",
            Self::ActivePreset => "active_preset",
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A key-value store of JSON documents.
pub trait Storage {
    /// Raw document stored under `key`, or `None` if there is none.
    fn read(&self, key: RecordKey) -> AppResult<Option<String>>;

    /// Replace the document stored under `key`.
    fn write(&mut self, key: RecordKey, contents: &str) -> AppResult<()>;
}

/// Stores each record as `<name>.json` in a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Use `dir` for storage. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: RecordKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.name()))
    }
}

impl Storage for JsonDirStore {
    fn read(&self, key: RecordKey) -> AppResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: RecordKey, contents: &str) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory storage, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<RecordKey, String>,
    reject_writes: bool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn read_only() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// Seed a record.
    pub fn with_record(mut self, key: RecordKey, contents: impl Into<String>) -> Self {
        self.records.insert(key, contents.into());
        self
    }
}

impl Storage for MemoryStore {
    fn read(&self, key: RecordKey) -> AppResult<Option<String>> {
        Ok(self.records.get(&key).cloned())
    }

    fn write(&mut self, key: RecordKey, contents: &str) -> AppResult<()> {
        if self.reject_writes {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "store is read-only",
            )
            .into());
        }
        self.records.insert(key, contents.to_string());
        Ok(())
    }
}

/// Everything a session loads at startup.
#[derive(Debug, Clone, Default)]
pub struct Records {
    /// Current decision list.
    pub decisions: DecisionList,
    /// Saved presets.
    pub presets: PresetList,
    /// Spin history.
    pub history: History,
    /// Dice table.
    pub dice: DiceTable,
    /// Pity ledger.
    pub ledger: PityLedger,
    /// Pity settings.
    pub pity: PityConfig,
    /// Id of the applied preset.
    pub active_preset: Option<String>,
}

/// A preset record may be a list or, from older saves, a single preset.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Preset>),
    One(Preset),
}

/// Load every record, substituting defaults for missing or broken ones.
pub fn load_records(store: &dyn Storage) -> Records {
    let decisions = read_json::<Vec<String>>(store, RecordKey::Decisions)
        .map(|texts| normalize_decisions(RecordKey::Decisions, "current list", texts))
        .unwrap_or_default();

    let presets = match read_json::<OneOrMany>(store, RecordKey::Presets) {
        Some(OneOrMany::Many(presets)) => presets,
        Some(OneOrMany::One(preset)) => vec![preset],
        None => Vec::new(),
    };
    let presets = PresetList::from_presets(
        presets
            .into_iter()
            .map(|mut preset| {
                let texts = std::mem::take(&mut preset.decisions);
                preset.decisions =
                    normalize_decisions(RecordKey::Presets, &preset.name, texts).into_vec();
                preset
            })
            .collect(),
    );

    let history = read_json::<Vec<HistoryEntry>>(store, RecordKey::History)
        .map(History::from_entries)
        .unwrap_or_default();

    let dice = match read_json::<Vec<DiceFace>>(store, RecordKey::DiceTable) {
        Some(faces) => DiceTable::new(faces).unwrap_or_else(|report| {
            warn!(record = %RecordKey::DiceTable, %report, "invalid dice table; using default");
            DiceTable::default()
        }),
        None => DiceTable::default(),
    };

    let counts =
        read_json::<BTreeMap<String, BTreeMap<String, u32>>>(store, RecordKey::PityLedger)
            .unwrap_or_default();
    let hard_hits = read_json::<BTreeMap<String, Vec<String>>>(store, RecordKey::PityHardHits)
        .unwrap_or_default();
    let ledger = PityLedger::from_parts(counts, hard_hits);

    let pity = match read_json::<PityConfig>(store, RecordKey::PityConfig) {
        Some(config) => match config.validate() {
            Ok(()) => config,
            Err(report) => {
                warn!(
                    record = %RecordKey::PityConfig,
                    %report,
                    "invalid pity config; using defaults"
                );
                PityConfig::default()
            }
        },
        None => PityConfig::default(),
    };

    let active_preset = read_json::<Option<String>>(store, RecordKey::ActivePreset)
        .flatten()
        .filter(|id| presets.get(id).is_some());

    Records {
        decisions,
        presets,
        history,
        dice,
        ledger,
        pity,
        active_preset,
    }
}

/// Trim stored decision texts and drop blank ones. Pity counters are keyed
/// by text, so a changed text starts over with a fresh counter; that is
/// logged.
fn normalize_decisions(key: RecordKey, owner: &str, texts: Vec<String>) -> DecisionList {
    let list = DecisionList::from_texts(texts.iter().cloned());
    if list.as_slice() != texts.as_slice() {
        warn!(
            record = %key,
            owner,
            stored = texts.len(),
            kept = list.len(),
            "stored decisions normalized; changed texts no longer match their pity counters"
        );
    }
    list
}

/// Read and decode one record. Missing, unreadable or malformed records
/// come back as `None`; the latter two are logged.
pub fn read_json<T: DeserializeOwned>(store: &dyn Storage, key: RecordKey) -> Option<T> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(record = %key, "no stored record");
            return None;
        }
        Err(e) => {
            warn!(record = %key, error = %e, "could not read record; using default");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(record = %key, error = %e, "malformed record; using default");
            None
        }
    }
}

/// Encode and write one record. Failures are logged, never returned.
pub fn save_json<T: Serialize + ?Sized>(store: &mut dyn Storage, key: RecordKey, value: &T) {
    let result = serde_json::to_string_pretty(value)
        .map_err(AppError::from)
        .and_then(|json| store.write(key, &json));
    if let Err(e) = result {
        warn!(record = %key, error = %e, "could not save record");
    }
}
