//! Experiment runner and landscape inspection.
//!
//! [`run_experiment`] runs cases in file order and, within a case, runs
//! `0..runs`. Each run gets a fresh [`Simulator`], so runs never share
//! agent state or random streams.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CaseSpec, ExperimentConfig};
use crate::error::SimulationError;
use crate::simulator::{RunSummary, Simulator};
use crate::sink::RecordSink;

/// Totals of a whole experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExperimentSummary {
    /// Cases simulated.
    pub cases: usize,
    /// Runs simulated across all cases.
    pub runs: u64,
    /// Records written across all runs.
    pub records: u64,
}

/// Simulate every run of every case into `sink`.
///
/// # Errors
///
/// Stops at the first failing run and returns its [`SimulationError`].
pub fn run_experiment(
    config: &ExperimentConfig,
    sink: &mut dyn RecordSink,
) -> Result<ExperimentSummary, SimulationError> {
    let mut summary = ExperimentSummary::default();
    for (index, case) in config.cases.iter().enumerate() {
        info!(
            case = index,
            runs = case.runs,
            n = case.matrix.n(),
            k = case.matrix.k(),
            bias = case.bias,
            delta = case.delta,
            shocks = case.schedule.total_shocks(),
            agent_types = case.roster.len(),
            "case started"
        );
        debug!(case = index, matrix = %case.matrix, "influence matrix");
        let mut case_records: u64 = 0;
        for run_index in 0..case.runs {
            let run = run_case(case, run_index, sink)?;
            case_records = case_records.saturating_add(run.records());
            summary.runs = summary.runs.saturating_add(1);
        }
        summary.records = summary.records.saturating_add(case_records);
        summary.cases = summary.cases.saturating_add(1);
        info!(case = index, records = case_records, "case finished");
    }
    Ok(summary)
}

/// Simulate a single run of `case`.
///
/// # Errors
///
/// Returns [`SimulationError`] if the run cannot be built or simulated.
pub fn run_case(
    case: &CaseSpec,
    run_index: u32,
    sink: &mut dyn RecordSink,
) -> Result<RunSummary, SimulationError> {
    info!(run = run_index, "run started");
    let mut simulator = Simulator::new(case, run_index)?;
    let summary = simulator.run(sink)?;
    for agent in &summary.agents {
        info!(
            run = run_index,
            agent_type = %agent.agent_type,
            individuals = agent.individuals,
            records = agent.records,
            mean_final_fitness = agent.mean_final_fitness,
            "agent type finished"
        );
    }
    Ok(summary)
}

/// Fitness of every configuration of one landscape of run `run_index`,
/// indexed by configuration id.
///
/// `shock` must be in `[0, total_shocks]` and `step` in `[0, N]`.
///
/// # Errors
///
/// Returns [`SimulationError::ShockOutOfRange`] or
/// [`SimulationError::StepOutOfRange`] for out-of-range indices, or any
/// error from building the run.
pub fn inspect_landscape(
    case: &CaseSpec,
    run_index: u32,
    shock: usize,
    step: usize,
) -> Result<Vec<f64>, SimulationError> {
    let total_shocks = case.schedule.total_shocks();
    if shock > total_shocks {
        return Err(SimulationError::ShockOutOfRange {
            shock,
            total_shocks,
        });
    }
    let n = case.matrix.n();
    if step > n {
        return Err(SimulationError::StepOutOfRange { step, n });
    }
    let simulator = Simulator::new(case, run_index)?;
    let landscape = simulator
        .grid()
        .get(shock, step)
        .ok_or(SimulationError::MissingLandscape { shock, step })?;
    Ok(landscape.fitness_values().to_vec())
}

/// The case at `index`.
///
/// # Errors
///
/// Returns [`SimulationError::CaseOutOfRange`] if there is no such case.
pub fn case_at(config: &ExperimentConfig, index: usize) -> Result<&CaseSpec, SimulationError> {
    config
        .cases
        .get(index)
        .ok_or(SimulationError::CaseOutOfRange {
            case: index,
            cases: config.cases.len(),
        })
}
