//! Search strategy flags.
//!
//! An agent type explores with one of four policies, the product of how it
//! walks the neighbor ball ([`Exploration`]) and how it scores candidates
//! ([`Scoring`]).

use serde::{Deserialize, Serialize};

/// How an agent walks its neighbor ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exploration {
    /// Accept the first candidate that is at least as good, then re-sample
    /// around the new location.
    Random,
    /// Inspect a full budgeted pass, move to the best candidate found, and
    /// repeat until a pass finds nothing at least as good.
    Exhaustive,
}

/// How an agent scores a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Fitness of the configuration itself.
    NonAveraging,
    /// Mean fitness over every completion of the not-yet-decided elements.
    Averaging,
}

/// The policy pair an agent type searches with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchStrategy {
    /// Neighbor-walking rule.
    pub exploration: Exploration,
    /// Candidate scoring rule.
    pub scoring: Scoring,
}

impl SearchStrategy {
    /// Build a strategy from the two boolean flags used in case files.
    pub const fn from_flags(exhaustive: bool, averaging: bool) -> Self {
        Self {
            exploration: if exhaustive {
                Exploration::Exhaustive
            } else {
                Exploration::Random
            },
            scoring: if averaging {
                Scoring::Averaging
            } else {
                Scoring::NonAveraging
            },
        }
    }

    /// Whether the agent uses the greedy multi-pass rule.
    pub const fn is_exhaustive(self) -> bool {
        matches!(self.exploration, Exploration::Exhaustive)
    }

    /// Whether the agent scores by marginalising over future elements.
    pub const fn is_averaging(self) -> bool {
        matches!(self.scoring, Scoring::Averaging)
    }
}

impl Default for SearchStrategy {
    fn default() -> Self {
        Self::from_flags(false, false)
    }
}

impl core::fmt::Display for Exploration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Exhaustive => f.write_str("exhaustive"),
        }
    }
}

impl core::fmt::Display for Scoring {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NonAveraging => f.write_str("nonAveraging"),
            Self::Averaging => f.write_str("averaging"),
        }
    }
}

/// Renders as `{scoring}_{exploration}`, e.g. `averaging_exhaustive`.
impl core::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}_{}", self.scoring, self.exploration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_to_policies() {
        let s = SearchStrategy::from_flags(true, false);
        assert!(s.is_exhaustive());
        assert!(!s.is_averaging());
        assert_eq!(s.exploration, Exploration::Exhaustive);
        assert_eq!(s.scoring, Scoring::NonAveraging);
    }

    #[test]
    fn default_is_random_non_averaging() {
        let s = SearchStrategy::default();
        assert!(!s.is_exhaustive());
        assert!(!s.is_averaging());
    }

    #[test]
    fn display_matches_output_file_labels() {
        assert_eq!(
            SearchStrategy::from_flags(false, false).to_string(),
            "nonAveraging_random"
        );
        assert_eq!(
            SearchStrategy::from_flags(true, true).to_string(),
            "averaging_exhaustive"
        );
    }
}
