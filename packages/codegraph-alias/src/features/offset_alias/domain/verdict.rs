//! Alias query answers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer of an alias query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AliasResult {
    NoAlias,
    MayAlias,
}

impl fmt::Display for AliasResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasResult::NoAlias => write!(f, "NoAlias"),
            AliasResult::MayAlias => write!(f, "MayAlias"),
        }
    }
}

/// Stage of the decision procedure that produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecidedBy {
    /// Disjoint offsets at the nearest common ancestor
    LocalTree,
    /// Every pair of addresses proven disjoint
    PairwiseEdges,
    /// Some pair could not be separated; the fallback answered
    Fallback,
    /// One of the pointers is not in the graph; the fallback answered
    NotInGraph,
    /// One of the pointers has no address; the fallback answered
    NoAddresses,
}

/// Answer plus the stage that decided it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasVerdict {
    pub result: AliasResult,
    pub decided_by: DecidedBy,
}

impl AliasVerdict {
    pub fn new(result: AliasResult, decided_by: DecidedBy) -> Self {
        Self { result, decided_by }
    }

    /// True if this analysis answered without help
    pub fn is_own(&self) -> bool {
        matches!(self.decided_by, DecidedBy::LocalTree | DecidedBy::PairwiseEdges)
    }
}
