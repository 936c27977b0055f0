//! Record and collection types shared across crates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of element indices.
///
/// Ordered so that iteration, and therefore every random draw that indexes
/// into a set, is deterministic.
pub type ElementSet = BTreeSet<usize>;

/// One visited state of one individual, as written to the record sink.
///
/// Fitness, max and min are read from the fully-implemented landscape of the
/// current shock, so records of different steps are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Run index the record belongs to (not the derived seed).
    pub run: u32,
    /// Instance number of the individual within its agent type.
    pub agent: u32,
    /// Elapsed discrete time of the individual.
    pub time: u64,
    /// Shock index in force.
    pub shock: usize,
    /// Iteration index of the individual's plan.
    pub iteration: usize,
    /// Fitness of the current configuration.
    pub fitness: f64,
    /// Maximum fitness of the landscape.
    pub max: f64,
    /// Minimum fitness of the landscape.
    pub min: f64,
}

/// Tab-separated, in field declaration order.
impl core::fmt::Display for StepRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{:?}\t{:?}\t{:?}",
            self.run,
            self.agent,
            self.time,
            self.shock,
            self.iteration,
            self.fitness,
            self.max,
            self.min
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> StepRecord {
        StepRecord {
            run: 3,
            agent: 1,
            time: 17,
            shock: 2,
            iteration: 0,
            fitness: 0.5,
            max: 1.0,
            min: 0.25,
        }
    }

    #[test]
    fn display_is_tab_separated() {
        assert_eq!(sample().to_string(), "3\t1\t17\t2\t0\t0.5\t1.0\t0.25");
    }

    #[test]
    fn json_uses_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["time"], 17);
        assert_eq!(value["shock"], 2);
    }
}
