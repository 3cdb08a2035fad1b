//! The list of candidate decisions a spin chooses from.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Ordered list of decision texts.
///
/// Duplicate texts are allowed and occupy separate positions; the pity
/// ledger keys them by text, so duplicates share one miss counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionList {
    items: Vec<String>,
}

impl DecisionList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from existing texts, dropping blank entries.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = texts
            .into_iter()
            .map(Into::into)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self { items }
    }

    /// Append a decision. Surrounding whitespace is trimmed.
    pub fn add(&mut self, text: &str) -> CoreResult<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyDecision);
        }
        self.items.push(trimmed.to_string());
        Ok(())
    }

    /// Remove the decision at a 1-based position and return it.
    pub fn remove(&mut self, position: usize) -> CoreResult<String> {
        if position == 0 || position > self.items.len() {
            return Err(CoreError::PositionOutOfRange {
                position,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(position - 1))
    }

    /// Remove every decision.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the whole list.
    pub fn replace(&mut self, texts: &[String]) {
        *self = Self::from_texts(texts.iter().cloned());
    }

    /// All decisions in order.
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Number of decisions.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the decisions out of the list.
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}
