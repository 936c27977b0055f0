//! Experiment configuration, exploration and run orchestration.
//!
//! This crate turns a loaded experiment into step records: it derives each
//! run's random stream, builds the run's landscapes, and drives every agent
//! through its plan with the policy its strategy selects.
//!
//! # Modules
//!
//! - [`config`] -- YAML experiment files ([`ExperimentConfig`], [`CaseSpec`]).
//! - [`error`] -- Errors that abort a run ([`SimulationError`]).
//! - [`explore`] -- The four exploration policies ([`Trajectory`]).
//! - [`runner`] -- Multi-case runner and landscape inspection.
//! - [`schedule`] -- Shock thresholds ([`ShockSchedule`]).
//! - [`seed`] -- Per-run random streams ([`RunRng`]).
//! - [`simulator`] -- One run of one case ([`Simulator`]).
//! - [`sink`] -- Record destinations ([`RecordSink`], [`FileSink`], [`MemorySink`]).

pub mod config;
pub mod error;
pub mod explore;
pub mod runner;
pub mod schedule;
pub mod seed;
pub mod simulator;
pub mod sink;

pub use config::{CaseSpec, ConfigError, ExperimentConfig};
pub use error::SimulationError;
pub use explore::Trajectory;
pub use runner::{ExperimentSummary, inspect_landscape, run_case, run_experiment};
pub use schedule::{ShockCheck, ShockSchedule};
pub use seed::RunRng;
pub use simulator::{AgentSummary, RunSummary, Simulator};
pub use sink::{FileSink, MemorySink, OutputFormat, RecordSink, SinkError};
