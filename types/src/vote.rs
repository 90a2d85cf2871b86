//! Vote records and choices.

use crate::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An explicit yes/no choice.
///
/// "No vote" is never stored: a voter without a record has not voted, and a
/// withdraw request is expressed as `Option::<Choice>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
        }
    }
}

/// A voter's ballot as stored inside a tier bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: Address,
    pub choice: Choice,
    /// Stake observed the last time this record was (re)computed.
    pub stake: u64,
}

impl VoteRecord {
    /// Contribution of this record to `(total_weight, yes_weight)`.
    pub fn weights(&self) -> (u128, u128) {
        let total = u128::from(self.stake);
        let yes = if self.choice.is_yes() { total } else { 0 };
        (total, yes)
    }
}

/// Scan direction for paginated range reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}
