//! Tally: the derived per-option vote count.
//!
//! Never persisted. It is recomputed from `votes` on every read, so it cannot
//! drift from the vote log.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::poll::Vote;

/// Count for one option. Serializes as `{"option": .., "count": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCount {
    pub option: String,
    pub count: u64,
}

/// Per-option counts in the poll's option order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tally {
    counts: Vec<VoteCount>,
}

impl Tally {
    /// Count `votes` against `options`. Every option appears, including zeros.
    pub fn count(options: &[String], votes: &[Vote]) -> Self {
        let mut counts: Vec<VoteCount> = options
            .iter()
            .map(|option| VoteCount {
                option: option.clone(),
                count: 0,
            })
            .collect();
        let index: HashMap<&str, usize> = options
            .iter()
            .enumerate()
            .map(|(i, option)| (option.as_str(), i))
            .collect();

        for vote in votes {
            if let Some(&i) = index.get(vote.option.as_str()) {
                counts[i].count += 1;
            }
        }
        Self { counts }
    }

    pub fn get(&self, option: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|c| c.option == option)
            .map(|c| c.count)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn as_slice(&self) -> &[VoteCount] {
        &self.counts
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoteCount> {
        self.counts.iter()
    }
}
