//! Named snapshots of a decision list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// A saved decision list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Stable id; also the preset's pity scope key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Snapshot of the decisions.
    #[serde(default)]
    pub decisions: Vec<String>,
}

/// All saved presets, in save order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetList {
    presets: Vec<Preset>,
}

impl PresetList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap stored presets.
    pub fn from_presets(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    /// Save a snapshot under a name.
    ///
    /// A preset with the same name (case-insensitive) is overwritten in
    /// place and keeps its id, so its pity scope carries over.
    pub fn save(&mut self, name: &str, decisions: &[String]) -> CoreResult<&Preset> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::EmptyPresetName);
        }
        let name_lower = name.to_lowercase();
        let index = match self
            .presets
            .iter()
            .position(|p| p.name.to_lowercase() == name_lower)
        {
            Some(i) => {
                self.presets[i].decisions = decisions.to_vec();
                i
            }
            None => {
                self.presets.push(Preset {
                    id: Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    decisions: decisions.to_vec(),
                });
                self.presets.len() - 1
            }
        };
        Ok(&self.presets[index])
    }

    /// Look a preset up by id, or by name (case-insensitive).
    pub fn find(&self, id_or_name: &str) -> Option<&Preset> {
        let needle = id_or_name.trim();
        self.presets.iter().find(|p| p.id == needle).or_else(|| {
            let lower = needle.to_lowercase();
            self.presets.iter().find(|p| p.name.to_lowercase() == lower)
        })
    }

    /// Look a preset up by id only.
    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Delete a preset by id or name. Returns it if found.
    pub fn delete(&mut self, id_or_name: &str) -> Option<Preset> {
        let id = self.find(id_or_name)?.id.clone();
        let index = self.presets.iter().position(|p| p.id == id)?;
        Some(self.presets.remove(index))
    }

    /// All presets.
    pub fn all(&self) -> &[Preset] {
        &self.presets
    }

    /// Number of presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether there are no presets.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
