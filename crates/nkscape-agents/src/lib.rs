//! Searching agents for the nkscape simulator.
//!
//! An agent is a passive record of search progress: it knows its type,
//! how many individuals of that type to simulate, which elements it decides
//! in which order, and where it currently stands. It never reads a landscape
//! itself; the simulator does that and moves the agent.
//!
//! # Modules
//!
//! - [`agent`] -- The per-type [`Agent`] state machine.
//! - [`error`] -- Error types for plan and agent validation ([`AgentError`]).
//! - [`plan`] -- Ordered element groups ([`IterationPlan`]) and their compact notation.

pub mod agent;
pub mod error;
pub mod plan;

pub use agent::Agent;
pub use error::AgentError;
pub use plan::IterationPlan;
