//! Error types for simulation runs.

use nkscape_agents::AgentError;
use nkscape_landscape::LandscapeError;

use crate::sink::SinkError;

/// Errors that abort a run or an experiment.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Building or querying a landscape failed.
    #[error("landscape error: {source}")]
    Landscape {
        /// The underlying landscape error.
        #[from]
        source: LandscapeError,
    },

    /// An agent rejected a transition.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// Writing records failed.
    #[error("sink error: {source}")]
    Sink {
        /// The underlying sink error.
        #[from]
        source: SinkError,
    },

    /// The grid has no landscape for a `(shock, step)` pair.
    #[error("no landscape for shock {shock}, step {step}")]
    MissingLandscape {
        /// Requested shock index.
        shock: usize,
        /// Requested step.
        step: usize,
    },

    /// A candidate was drawn from an empty neighbor set.
    #[error("no unvisited candidate to draw")]
    NoCandidate,

    /// A case index is not in the experiment.
    #[error("case {case} does not exist, the experiment has {cases} case(s)")]
    CaseOutOfRange {
        /// Requested case.
        case: usize,
        /// Number of cases.
        cases: usize,
    },

    /// A shock index is outside `[0, total_shocks]`.
    #[error("shock must be in [0, {total_shocks}], got {shock}")]
    ShockOutOfRange {
        /// Requested shock.
        shock: usize,
        /// Number of shocks of the case.
        total_shocks: usize,
    },

    /// A step is outside `[0, N]`.
    #[error("step must be in [0, {n}], got {step}")]
    StepOutOfRange {
        /// Requested step.
        step: usize,
        /// Element count.
        n: usize,
    },
}
