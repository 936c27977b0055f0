//! Exploration policies.
//!
//! A [`Trajectory`] carries the per-individual clock and shock index and
//! moves an [`Agent`] through one iteration with the policy its strategy
//! selects:
//!
//! | exploration | scoring | acceptance | pass budget |
//! |-------------|---------|------------|-------------|
//! | random | direct | first candidate `>=` current | none, the whole unvisited ball |
//! | random | averaged | first candidate `>=` current | `ceil(constraint * unvisited)` |
//! | exhaustive | direct | best `>=` current over a pass | `ceil(constraint * unvisited)` |
//! | exhaustive | averaged | best `>=` current over a pass | `ceil(constraint * unvisited)` |
//!
//! Decisions use the landscape of the current shock at the agent's number of
//! implemented elements. Records always report the fully implemented
//! landscape of the current shock.

use std::collections::BTreeSet;

use nkscape_agents::Agent;
use nkscape_landscape::{Landscape, LandscapeGrid};
use nkscape_types::{ElementSet, Exploration, LocId, Scoring, StepRecord};
use rand::Rng;

use crate::error::SimulationError;
use crate::sink::RecordSink;

/// Clock, shock index and record count of one individual.
///
/// The clock restarts for every individual. The shock index carries over
/// from the previous individual of the same run.
#[derive(Debug, Clone)]
pub struct Trajectory<'g> {
    grid: &'g LandscapeGrid,
    run: u32,
    shock: usize,
    time: u64,
    records: u64,
}

impl<'g> Trajectory<'g> {
    /// Start at time 0 in shock 0.
    pub fn new(grid: &'g LandscapeGrid, run: u32) -> Self {
        Self::starting_at(grid, run, 0)
    }

    /// Start at time 0 in `shock`, capped at the grid's last shock.
    pub fn starting_at(grid: &'g LandscapeGrid, run: u32, shock: usize) -> Self {
        Self {
            grid,
            run,
            shock: shock.min(grid.total_shocks()),
            time: 0,
            records: 0,
        }
    }

    /// Current shock index.
    pub const fn shock(&self) -> usize {
        self.shock
    }

    /// Elapsed time (number of records written so far).
    pub const fn time(&self) -> u64 {
        self.time
    }

    /// Number of records written.
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Move to the next shock, never past the last one in the grid.
    pub fn advance_shock(&mut self) {
        self.shock = self.shock.saturating_add(1).min(self.grid.total_shocks());
    }

    /// Fitness of `loc` on the fully implemented landscape of the current shock.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the landscape or location is missing.
    pub fn fitness_of(&self, loc: LocId) -> Result<f64, SimulationError> {
        Ok(self.realized()?.score_of(loc)?)
    }

    /// Write the agent's current state and advance the clock.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Sink`] if the sink rejects the record.
    pub fn record(&mut self, agent: &Agent, sink: &mut dyn RecordSink) -> Result<(), SimulationError> {
        let realized = self.realized()?;
        let record = StepRecord {
            run: self.run,
            agent: agent.index(),
            time: self.time,
            shock: self.shock,
            iteration: agent.iteration(),
            fitness: realized.score_of(agent.loc())?,
            max: realized.max(),
            min: realized.min(),
        };
        sink.write_record(&record)?;
        self.time = self.time.saturating_add(1);
        self.records = self.records.saturating_add(1);
        Ok(())
    }

    /// Explore the agent's current iteration with its strategy's policy.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] on a missing landscape, an invalid
    /// element, or a sink failure.
    pub fn explore(
        &mut self,
        agent: &mut Agent,
        rng: &mut impl Rng,
        sink: &mut dyn RecordSink,
    ) -> Result<(), SimulationError> {
        let landscape = self.decision_landscape(agent)?;
        let strategy = agent.strategy();
        let scorer = match strategy.scoring {
            Scoring::NonAveraging => Scorer::Direct,
            Scoring::Averaging => Scorer::averaged(agent, landscape)?,
        };
        match (strategy.exploration, strategy.scoring) {
            (Exploration::Random, Scoring::NonAveraging) => {
                self.random_walk(agent, landscape, &scorer, false, rng, sink)
            }
            (Exploration::Random, Scoring::Averaging) => {
                self.random_walk(agent, landscape, &scorer, true, rng, sink)
            }
            (Exploration::Exhaustive, _) => self.exhaustive_walk(agent, landscape, &scorer, rng, sink),
        }
    }

    /// Accept the first candidate scoring at least as well as the current
    /// location, then re-sample around the new location. Every inspected
    /// candidate is recorded.
    fn random_walk(
        &mut self,
        agent: &mut Agent,
        landscape: &Landscape,
        scorer: &Scorer,
        budgeted: bool,
        rng: &mut impl Rng,
        sink: &mut dyn RecordSink,
    ) -> Result<(), SimulationError> {
        let current = agent.current_elements();
        let mut visited = BTreeSet::from([agent.loc()]);
        let mut current_score = scorer.score(landscape, agent.loc())?;
        let mut unvisited = unvisited_neighbors(landscape, agent, &current, &visited)?;
        let mut budget = pass_budget(agent, unvisited.len(), budgeted);
        let mut tried: usize = 0;

        while tried < budget && !unvisited.is_empty() {
            let candidate = draw(&unvisited, rng)?;
            visited.insert(candidate);
            tried = tried.saturating_add(1);
            let score = scorer.score(landscape, candidate)?;
            if score >= current_score {
                agent.update_loc_id(candidate);
                current_score = score;
                unvisited = unvisited_neighbors(landscape, agent, &current, &visited)?;
                budget = pass_budget(agent, unvisited.len(), budgeted);
                tried = 0;
            } else {
                unvisited.remove(&candidate);
            }
            self.record(agent, sink)?;
        }
        Ok(())
    }

    /// Inspect a budgeted pass, following every candidate that scores at
    /// least as well as the best so far. A pass that moved is recorded and
    /// followed by a fresh pass around the new location; a pass that did not
    /// move ends the iteration.
    fn exhaustive_walk(
        &mut self,
        agent: &mut Agent,
        landscape: &Landscape,
        scorer: &Scorer,
        rng: &mut impl Rng,
        sink: &mut dyn RecordSink,
    ) -> Result<(), SimulationError> {
        let current = agent.current_elements();
        let mut visited = BTreeSet::from([agent.loc()]);
        let mut current_score = scorer.score(landscape, agent.loc())?;
        let mut unvisited = unvisited_neighbors(landscape, agent, &current, &visited)?;
        let mut budget = pass_budget(agent, unvisited.len(), true);
        let mut tried: usize = 0;

        loop {
            let mut moved = false;
            while tried < budget && !unvisited.is_empty() {
                let candidate = draw(&unvisited, rng)?;
                visited.insert(candidate);
                unvisited.remove(&candidate);
                tried = tried.saturating_add(1);
                let score = scorer.score(landscape, candidate)?;
                if score >= current_score {
                    agent.update_loc_id(candidate);
                    current_score = score;
                    moved = true;
                }
            }
            if !moved {
                return Ok(());
            }
            unvisited = unvisited_neighbors(landscape, agent, &current, &visited)?;
            budget = pass_budget(agent, unvisited.len(), true);
            tried = 0;
            self.record(agent, sink)?;
        }
    }

    fn realized(&self) -> Result<&'g Landscape, SimulationError> {
        let grid: &'g LandscapeGrid = self.grid;
        grid.realized(self.shock)
            .ok_or(SimulationError::MissingLandscape {
                shock: self.shock,
                step: grid.n(),
            })
    }

    fn decision_landscape(&self, agent: &Agent) -> Result<&'g Landscape, SimulationError> {
        let grid: &'g LandscapeGrid = self.grid;
        let step = agent.implemented_count();
        grid.get(self.shock, step)
            .ok_or(SimulationError::MissingLandscape {
                shock: self.shock,
                step,
            })
    }
}

/// How candidates are compared.
enum Scorer {
    /// Fitness of the configuration itself.
    Direct,
    /// Mean fitness of the candidate's decided elements combined with every
    /// assignment of the elements decided in later iterations.
    Averaged {
        completions: BTreeSet<LocId>,
        adopted: ElementSet,
    },
}

impl Scorer {
    fn averaged(agent: &Agent, landscape: &Landscape) -> Result<Self, SimulationError> {
        let current = agent.current_elements();
        let mut adopted = agent.implemented_elements();
        adopted.extend(current.iter().copied());
        let future: ElementSet = agent
            .unimplemented_elements()
            .difference(&current)
            .copied()
            .collect();
        let completions = landscape.neighbors_inclusive(agent.loc(), &future, future.len())?;
        Ok(Self::Averaged {
            completions,
            adopted,
        })
    }

    fn score(&self, landscape: &Landscape, loc: LocId) -> Result<f64, SimulationError> {
        match self {
            Self::Direct => Ok(landscape.score_of(loc)?),
            Self::Averaged {
                completions,
                adopted,
            } => {
                let mut total = 0.0;
                for &completion in completions {
                    total += landscape.score_of(landscape.merge_on(completion, loc, adopted)?)?;
                }
                Ok(total / count_f64(completions.len()))
            }
        }
    }
}

fn unvisited_neighbors(
    landscape: &Landscape,
    agent: &Agent,
    current: &ElementSet,
    visited: &BTreeSet<LocId>,
) -> Result<BTreeSet<LocId>, SimulationError> {
    let mut ball = landscape.neighbors_inclusive(agent.loc(), current, agent.power())?;
    ball.retain(|loc| !visited.contains(loc));
    Ok(ball)
}

/// Uniform draw of the `i`-th smallest unvisited configuration.
fn draw(unvisited: &BTreeSet<LocId>, rng: &mut impl Rng) -> Result<LocId, SimulationError> {
    if unvisited.is_empty() {
        return Err(SimulationError::NoCandidate);
    }
    let index = rng.random_range(0..unvisited.len());
    unvisited
        .iter()
        .nth(index)
        .copied()
        .ok_or(SimulationError::NoCandidate)
}

fn pass_budget(agent: &Agent, unvisited: usize, budgeted: bool) -> usize {
    if budgeted {
        sampling_budget(agent.constraint(), unvisited)
    } else {
        unvisited
    }
}

/// `ceil(constraint * unvisited)`, clamped to `[0, unvisited]`.
pub fn sampling_budget(constraint: f64, unvisited: usize) -> usize {
    let len = count_f64(unvisited);
    let budget = (constraint * len).ceil().clamp(0.0, len);
    // Safe: clamped to [0, unvisited], which came from a usize.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let result = budget as usize;
    result
}

fn count_f64(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use nkscape_agents::IterationPlan;
    use nkscape_landscape::{DependencyMatrix, FitnessContributionTable};
    use nkscape_types::SearchStrategy;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::sink::MemorySink;

    fn ring_grid(n: usize, seed: u64) -> LandscapeGrid {
        let matrix = DependencyMatrix::new((0..n).map(|i| vec![(i + 1) % n]).collect()).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let table = FitnessContributionTable::build(&matrix, 0.0, 0, &mut rng).unwrap();
        LandscapeGrid::build(&matrix, 0.0, &table, &mut rng).unwrap()
    }

    fn agent(groups: &[Vec<usize>], n: usize, power: usize, constraint: f64, strategy: SearchStrategy) -> Agent {
        let plan = IterationPlan::from_lists(groups, n).unwrap();
        Agent::new("t", 1, plan, power, constraint, strategy).unwrap()
    }

    fn argmax(landscape: &Landscape) -> LocId {
        let (index, _) = landscape
            .fitness_values()
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        LocId(u32::try_from(index).unwrap())
    }

    fn records_from_peak(strategy: SearchStrategy, constraint: f64) -> usize {
        let grid = ring_grid(4, 21);
        let mut rng = StdRng::seed_from_u64(1);
        let mut agent = agent(&[vec![0, 1, 2, 3]], 4, 4, constraint, strategy);
        agent.reset(&mut rng);
        agent.update_loc_id(argmax(grid.get(0, 0).unwrap()));

        let mut sink = MemorySink::new();
        sink.open_segment("s").unwrap();
        let mut trajectory = Trajectory::new(&grid, 0);
        trajectory.explore(&mut agent, &mut rng, &mut sink).unwrap();
        assert_eq!(agent.loc(), argmax(grid.get(0, 0).unwrap()));
        sink.records().count()
    }

    #[test]
    fn budget_is_ceiling_of_fraction() {
        assert_eq!(sampling_budget(1.0, 15), 15);
        assert_eq!(sampling_budget(0.5, 15), 8);
        assert_eq!(sampling_budget(0.01, 15), 1);
        assert_eq!(sampling_budget(0.3, 10), 3);
        assert_eq!(sampling_budget(0.5, 0), 0);
    }

    #[test]
    fn random_direct_ignores_constraint() {
        // From the global peak every candidate is rejected; without a budget
        // all 15 other configurations are still inspected.
        let strategy = SearchStrategy::from_flags(false, false);
        assert_eq!(records_from_peak(strategy, 0.01), 15);
    }

    #[test]
    fn random_averaged_honors_constraint() {
        let strategy = SearchStrategy::from_flags(false, true);
        assert_eq!(records_from_peak(strategy, 0.01), 1);
        assert_eq!(records_from_peak(strategy, 1.0), 15);
    }

    #[test]
    fn exhaustive_records_nothing_at_a_peak() {
        for averaging in [false, true] {
            let strategy = SearchStrategy::from_flags(true, averaging);
            assert_eq!(records_from_peak(strategy, 1.0), 0);
        }
    }

    #[test]
    fn random_walk_never_decreases_fitness() {
        let grid = ring_grid(6, 4);
        let mut rng = StdRng::seed_from_u64(9);
        let strategy = SearchStrategy::from_flags(false, false);
        let mut agent = agent(&[vec![0, 1, 2, 3, 4, 5]], 6, 2, 1.0, strategy);
        agent.reset(&mut rng);
        let start = grid.realized(0).unwrap().score_of(agent.loc()).unwrap();

        let mut sink = MemorySink::new();
        sink.open_segment("s").unwrap();
        let mut trajectory = Trajectory::new(&grid, 0);
        trajectory.explore(&mut agent, &mut rng, &mut sink).unwrap();

        let mut previous = start;
        for record in sink.records() {
            assert!(record.fitness >= previous);
            previous = record.fitness;
        }
        assert_eq!(trajectory.time(), trajectory.records());
        assert_eq!(u64::try_from(sink.records().count()).unwrap(), trajectory.records());
    }

    #[test]
    fn exhaustive_walk_ends_at_local_optimum() {
        let grid = ring_grid(6, 5);
        let landscape = grid.get(0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(10);
        let strategy = SearchStrategy::from_flags(true, false);
        let mut agent = agent(&[vec![0, 1, 2, 3, 4, 5]], 6, 1, 1.0, strategy);
        agent.reset(&mut rng);

        let mut sink = MemorySink::new();
        sink.open_segment("s").unwrap();
        let mut trajectory = Trajectory::new(&grid, 0);
        trajectory.explore(&mut agent, &mut rng, &mut sink).unwrap();

        let all: ElementSet = (0..6).collect();
        let here = landscape.score_of(agent.loc()).unwrap();
        for neighbor in landscape.neighbors_inclusive(agent.loc(), &all, 1).unwrap() {
            assert!(landscape.score_of(neighbor).unwrap() <= here);
        }
    }

    #[test]
    fn averaged_score_marginalizes_future_elements() {
        let grid = ring_grid(3, 6);
        let landscape = grid.get(0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let strategy = SearchStrategy::from_flags(false, true);
        let mut agent = agent(&[vec![0], vec![1, 2]], 3, 1, 1.0, strategy);
        agent.reset(&mut rng);

        let scorer = Scorer::averaged(&agent, landscape).unwrap();
        for raw in 0..8_u32 {
            let loc = LocId(raw);
            let lead = raw & 0b100;
            let expected: f64 = (0..4_u32)
                .map(|rest| landscape.score_of(LocId(lead | rest)).unwrap())
                .sum::<f64>()
                / 4.0;
            let got = scorer.score(landscape, loc).unwrap();
            assert!((got - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn advance_shock_stops_at_last() {
        let matrix = DependencyMatrix::new(vec![vec![1], vec![0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(12);
        let table = FitnessContributionTable::build(&matrix, 0.5, 1, &mut rng).unwrap();
        let grid = LandscapeGrid::build(&matrix, 0.0, &table, &mut rng).unwrap();
        let mut trajectory = Trajectory::new(&grid, 0);
        trajectory.advance_shock();
        trajectory.advance_shock();
        assert_eq!(trajectory.shock(), 1);

        let resumed = Trajectory::starting_at(&grid, 0, 1);
        assert_eq!((resumed.shock(), resumed.time()), (1, 0));
        assert_eq!(Trajectory::starting_at(&grid, 0, 7).shock(), 1);
    }
}
