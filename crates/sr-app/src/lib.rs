//! Application layer for Spinnrad.
//!
//! [`Session`] owns the decision list, presets, history, dice table, pity
//! ledger and pity settings, persists them through a [`Storage`] backend,
//! and records each spin's outcome exactly once. [`driver`] runs a spin in
//! real time on a tokio runtime.

pub mod config;
pub mod driver;
pub mod error;
pub mod session;
pub mod store;

pub use config::SessionConfig;
pub use driver::{SpinObserver, SpinOutcome, drive_spin};
pub use error::{AppError, AppResult};
pub use session::{ExportFormat, ResetTarget, Session};
pub use store::{JsonDirStore, MemoryStore, RecordKey, Storage};
