//! Error types for the `nkscape-agents` crate.

/// Errors raised while validating iteration plans and agents.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The element count is outside `1..32`.
    #[error("element count must be in [1, 31], got {n}")]
    InvalidElementCount {
        /// The rejected element count.
        n: usize,
    },

    /// A plan group names an element that does not exist.
    #[error("iteration plan names element {element}, which is outside [0, {n})")]
    ElementOutOfRange {
        /// The invalid element index.
        element: usize,
        /// Element count.
        n: usize,
    },

    /// The plan leaves some elements undecided.
    #[error("invalid iteration plan: missing element(s) {missing:?}")]
    MissingElements {
        /// Elements that appear in no group, ascending.
        missing: Vec<usize>,
    },

    /// Compact plan notation could not be parsed.
    #[error("malformed iteration plan {text:?}: {reason}")]
    MalformedPlan {
        /// The rejected input.
        text: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Processing power must allow at least one change per move.
    #[error("processing power should be positive, given {power}")]
    InvalidPower {
        /// The rejected power.
        power: usize,
    },

    /// Constraint must lie in `(0, 1]`.
    #[error("constraint must be in (0, 1], given {constraint}")]
    InvalidConstraint {
        /// The rejected constraint.
        constraint: f64,
    },

    /// The agent has already finished every iteration of its plan.
    #[error("agent {agent_type} has no iteration left to advance")]
    PlanExhausted {
        /// Type name of the agent.
        agent_type: String,
    },
}
