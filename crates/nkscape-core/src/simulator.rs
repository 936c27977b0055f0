//! One run of one case.
//!
//! [`Simulator::new`] derives the run's random stream, builds the fitness
//! contribution table and the full `[shock][step]` landscape grid, and
//! resets a private copy of the roster. [`Simulator::run`] then walks every
//! individual of every agent type through its plan, one type per output
//! segment.

use nkscape_agents::Agent;
use nkscape_landscape::{DependencyMatrix, FitnessContributionTable, LandscapeGrid};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::CaseSpec;
use crate::error::SimulationError;
use crate::explore::Trajectory;
use crate::schedule::{ShockCheck, ShockSchedule};
use crate::seed::RunRng;
use crate::sink::RecordSink;

/// Outcome of one agent type within a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    /// Type name.
    pub agent_type: String,
    /// Individuals simulated.
    pub individuals: u32,
    /// Records written.
    pub records: u64,
    /// Mean realized fitness of the individuals' final configurations.
    pub mean_final_fitness: f64,
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Run index.
    pub run_index: u32,
    /// Per-type outcomes in roster order.
    pub agents: Vec<AgentSummary>,
}

impl RunSummary {
    /// Records written across all agent types.
    pub fn records(&self) -> u64 {
        self.agents
            .iter()
            .fold(0_u64, |acc, agent| acc.saturating_add(agent.records))
    }
}

/// Owns everything one run reads or mutates.
#[derive(Debug)]
pub struct Simulator {
    matrix: DependencyMatrix,
    bias: f64,
    delta: f64,
    schedule: ShockSchedule,
    table: FitnessContributionTable,
    grid: LandscapeGrid,
    roster: Vec<Agent>,
    rng: RunRng,
}

impl Simulator {
    /// Prepare run `run_index` of `case`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Landscape`] if the table or a landscape
    /// cannot be built.
    pub fn new(case: &CaseSpec, run_index: u32) -> Result<Self, SimulationError> {
        let mut rng = RunRng::for_run(run_index);
        let table = FitnessContributionTable::build(
            &case.matrix,
            case.delta,
            case.schedule.total_shocks(),
            &mut rng,
        )?;
        let grid = LandscapeGrid::build(&case.matrix, case.bias, &table, &mut rng)?;
        let mut roster = case.roster.clone();
        for agent in &mut roster {
            agent.reset(&mut rng);
        }
        debug!(run = run_index, seed = rng.seed(), "simulator ready");
        Ok(Self {
            matrix: case.matrix.clone(),
            bias: case.bias,
            delta: case.delta,
            schedule: case.schedule.clone(),
            table,
            grid,
            roster,
            rng,
        })
    }

    /// The landscape grid of this run.
    pub const fn grid(&self) -> &LandscapeGrid {
        &self.grid
    }

    /// The fitness contribution table of this run.
    pub const fn table(&self) -> &FitnessContributionTable {
        &self.table
    }

    /// The run's agents, in roster order.
    pub fn roster(&self) -> &[Agent] {
        &self.roster
    }

    /// Run index.
    pub const fn run_index(&self) -> u32 {
        self.rng.run_index()
    }

    /// Simulate every individual of every agent type.
    ///
    /// At the start of each iteration the shock schedule is checked once
    /// against the current shock, the pre-move state is recorded, and the
    /// agent's policy explores the iteration. Time restarts at 0 for every
    /// individual; the shock index carries through the whole run, across
    /// individuals and agent types.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] on sink failures or inconsistent state.
    pub fn run(&mut self, sink: &mut dyn RecordSink) -> Result<RunSummary, SimulationError> {
        let run_index = self.rng.run_index();
        let Self {
            matrix,
            bias,
            delta,
            schedule,
            grid,
            roster,
            rng,
            ..
        } = self;
        let mut summaries = Vec::with_capacity(roster.len());
        let mut clamp_reported = false;
        let mut shock = 0;

        for agent in roster.iter_mut() {
            let name = segment_name(matrix, *bias, *delta, agent);
            sink.open_segment(&name)?;
            debug!(run = run_index, agent_type = agent.agent_type(), segment = %name, "segment opened");

            let mut individuals: u32 = 0;
            let mut records: u64 = 0;
            let mut fitness_total = 0.0;

            while agent.has_next_agent() {
                let mut trajectory = Trajectory::starting_at(grid, run_index, shock);
                while !agent.is_done() {
                    match schedule.check(trajectory.shock(), trajectory.time()) {
                        ShockCheck::Advance => {
                            trajectory.advance_shock();
                            debug!(
                                run = run_index,
                                individual = agent.index(),
                                time = trajectory.time(),
                                shock = trajectory.shock(),
                                "shock"
                            );
                        }
                        ShockCheck::Clamped if !clamp_reported => {
                            warn!(
                                run = run_index,
                                shock = trajectory.shock(),
                                "shock schedule exhausted, holding the last shock"
                            );
                            clamp_reported = true;
                        }
                        ShockCheck::Clamped | ShockCheck::Stay => {}
                    }
                    trajectory.record(agent, sink)?;
                    trajectory.explore(agent, rng, sink)?;
                    agent.move_to_next_iteration()?;
                }

                let final_fitness = trajectory.fitness_of(agent.loc())?;
                debug!(
                    run = run_index,
                    agent_type = agent.agent_type(),
                    individual = agent.index(),
                    final_fitness,
                    records = trajectory.records(),
                    "individual finished"
                );
                shock = trajectory.shock();
                individuals = individuals.saturating_add(1);
                records = records.saturating_add(trajectory.records());
                fitness_total += final_fitness;
                agent.next_agent(rng);
            }

            sink.close_segment()?;
            let mean_final_fitness = if individuals == 0 {
                0.0
            } else {
                fitness_total / f64::from(individuals)
            };
            summaries.push(AgentSummary {
                agent_type: agent.agent_type().to_owned(),
                individuals,
                records,
                mean_final_fitness,
            });
        }

        Ok(RunSummary {
            run_index,
            agents: summaries,
        })
    }
}

/// Output segment name for `agent` in a case, e.g.
/// `o_n6k2_b0.5d1.0c1.0_nonAveraging_random_incremental.txt`.
pub fn segment_name(matrix: &DependencyMatrix, bias: f64, delta: f64, agent: &Agent) -> String {
    let strategy = agent.strategy();
    format!(
        "o_n{}k{}_b{:?}d{:?}c{:?}_{}_{}_{}.txt",
        matrix.n(),
        matrix.k(),
        bias,
        delta,
        agent.constraint(),
        strategy.scoring,
        strategy.exploration,
        agent.agent_type()
    )
}
