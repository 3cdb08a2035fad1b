//! Selection and pity-weighting engine for Spinnrad.
//!
//! Provides the dice duration table, the per-scope pity ledger, the weighted
//! selection engine with soft and hard pity, the spin scheduler state machine,
//! the outcome history, and presets. Nothing in this crate performs I/O; the
//! application layer owns persistence and real-time driving.

pub mod decision;
pub mod dice;
pub mod error;
pub mod history;
pub mod pity;
pub mod preset;
pub mod selection;
pub mod spin;
pub mod validate;

pub use decision::DecisionList;
pub use dice::{DiceFace, DiceFaceDraft, DiceTable};
pub use error::{CoreError, CoreResult};
pub use history::{History, HistoryEntry, HistoryPage};
pub use pity::{PityConfig, PityConfigDraft, PityLedger, Scope, ScopeMode};
pub use preset::{Preset, PresetList};
pub use selection::{Selection, SelectionMethod, select_winner};
pub use spin::{Resolution, SpinEvent, SpinRequest, SpinStart, SpinState, SpinTiming, Spinner};
pub use validate::ValidationReport;
