pub mod decisions;
pub mod dice;
pub mod history;
pub mod pity;
pub mod preset;
pub mod spin;

use std::path::PathBuf;

use sr_app::{JsonDirStore, Session, SessionConfig};

/// Global options shared by every command.
pub struct Context {
    data_dir: PathBuf,
    seed: Option<u64>,
}

impl Context {
    pub fn new(data_dir: Option<PathBuf>, seed: Option<u64>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        Self { data_dir, seed }
    }

    /// Open a session over the data directory.
    pub fn open_session(&self) -> Session {
        let mut config = SessionConfig::default();
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        tracing::debug!(dir = %self.data_dir.display(), "opening data directory");
        Session::open(Box::new(JsonDirStore::new(self.data_dir.clone())), config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("spinnrad"))
        .unwrap_or_else(|| PathBuf::from(".spinnrad"))
}
