//! The selection engine: turns pity counters into a winner.
//!
//! With pity enabled every option starts at weight 1 and gains
//! `soft_increment` per consecutive miss, capped at `soft_multiplier_cap`.
//! An option whose miss count reaches `hard_threshold` wins outright.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::pity::PityConfig;

/// How a spin's outcome was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMethod {
    /// Weighted draw over soft-pity weights.
    SoftWeight,
    /// Forced by an option reaching the hard-pity threshold.
    HardPity,
    /// Uniform draw with pity disabled.
    None,
    /// The spin was stopped early and settled where the cursor stood.
    ManualStop,
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SoftWeight => write!(f, "soft-weight"),
            Self::HardPity => write!(f, "hard-pity"),
            Self::None => write!(f, "none"),
            Self::ManualStop => write!(f, "manual-stop"),
        }
    }
}

/// The engine's choice: an index into the option list and how it was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Index of the winning option.
    pub index: usize,
    /// Selection method.
    pub method: SelectionMethod,
}

/// Weight of an option that has missed `misses` spins in a row.
pub fn weight_for(misses: u32, config: &PityConfig) -> u32 {
    config
        .soft_increment
        .saturating_mul(misses)
        .saturating_add(1)
        .min(config.soft_multiplier_cap)
}

/// Weights for every option, in order.
pub fn weights(
    options: &[String],
    pity_counts: &BTreeMap<String, u32>,
    config: &PityConfig,
) -> Vec<u32> {
    options
        .iter()
        .map(|key| weight_for(miss_count(pity_counts, key), config))
        .collect()
}

/// Index with the highest miss count at or above the hard threshold.
/// The earliest index holding the maximum wins ties.
pub fn hard_pity_candidate(
    options: &[String],
    pity_counts: &BTreeMap<String, u32>,
    config: &PityConfig,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, key) in options.iter().enumerate() {
        let misses = miss_count(pity_counts, key);
        if misses < config.hard_threshold {
            continue;
        }
        if best.is_none_or(|(_, top)| misses > top) {
            best = Some((i, misses));
        }
    }
    best.map(|(i, _)| i)
}

/// Choose a winner. Pure: the caller records the outcome in the ledger.
///
/// Returns `None` only when `options` is empty.
pub fn select_winner<R: Rng + ?Sized>(
    options: &[String],
    pity_counts: &BTreeMap<String, u32>,
    config: &PityConfig,
    rng: &mut R,
) -> Option<Selection> {
    if options.is_empty() {
        return None;
    }

    if !config.enabled {
        return Some(Selection {
            index: rng.random_range(0..options.len()),
            method: SelectionMethod::None,
        });
    }

    if let Some(index) = hard_pity_candidate(options, pity_counts, config) {
        return Some(Selection {
            index,
            method: SelectionMethod::HardPity,
        });
    }

    let weights = weights(options, pity_counts, config);
    let total: u64 = weights.iter().map(|w| u64::from(*w)).sum();
    let index = if total == 0 {
        rng.random_range(0..options.len())
    } else {
        let mut remaining = rng.random_range(0..total);
        let mut chosen = options.len() - 1;
        for (i, w) in weights.iter().enumerate() {
            let w = u64::from(*w);
            if remaining < w {
                chosen = i;
                break;
            }
            remaining -= w;
        }
        chosen
    };

    Some(Selection {
        index,
        method: SelectionMethod::SoftWeight,
    })
}

fn miss_count(pity_counts: &BTreeMap<String, u32>, key: &str) -> u32 {
    pity_counts.get(key).copied().unwrap_or(0)
}
