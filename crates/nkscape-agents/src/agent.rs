//! The per-type agent state machine.
//!
//! One [`Agent`] stands for every individual of a type: the simulator walks
//! individual `0` through the plan, calls [`Agent::next_agent`], walks
//! individual `1`, and so on until [`Agent::has_next_agent`] is false.
//!
//! Within an individual the agent moves through its plan one group at a
//! time. Before [`Agent::move_to_next_iteration`] the implemented elements,
//! the current group and the remaining unimplemented elements together cover
//! `[0, N)`; afterwards the current group has been folded into the
//! implemented set.

use std::fmt;

use nkscape_types::{ElementSet, LocId, SearchStrategy};
use rand::Rng;
use tracing::trace;

use crate::error::AgentError;
use crate::plan::IterationPlan;

/// Search state shared by all individuals of one agent type.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Type name, used in output segment names.
    agent_type: String,
    /// Number of individuals to simulate.
    num: u32,
    /// Individual currently being simulated.
    index: u32,
    plan: IterationPlan,
    /// Maximum number of elements changed in one move.
    power: usize,
    /// Fraction of the unvisited neighbors inspected per pass.
    constraint: f64,
    strategy: SearchStrategy,
    loc: LocId,
    iteration: usize,
    implemented: ElementSet,
    unimplemented: ElementSet,
}

impl Agent {
    /// Validate and create an agent type. The location is meaningless until
    /// [`Agent::reset`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidPower`] for `power == 0` and
    /// [`AgentError::InvalidConstraint`] for a constraint outside `(0, 1]`.
    pub fn new(
        agent_type: impl Into<String>,
        num: u32,
        plan: IterationPlan,
        power: usize,
        constraint: f64,
        strategy: SearchStrategy,
    ) -> Result<Self, AgentError> {
        if power == 0 {
            return Err(AgentError::InvalidPower { power });
        }
        if !(constraint > 0.0 && constraint <= 1.0) {
            return Err(AgentError::InvalidConstraint { constraint });
        }
        let unimplemented = (0..plan.n()).collect();
        Ok(Self {
            agent_type: agent_type.into(),
            num,
            index: 0,
            plan,
            power,
            constraint,
            strategy,
            loc: LocId::new(0),
            iteration: 0,
            implemented: ElementSet::new(),
            unimplemented,
        })
    }

    /// Start over from individual `0` at a uniformly random location.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.index = 0;
        self.restart(rng);
    }

    /// Move on to the next individual at a uniformly random location.
    pub fn next_agent(&mut self, rng: &mut impl Rng) {
        self.index = self.index.saturating_add(1);
        self.restart(rng);
    }

    /// Whether the current individual still has to be simulated.
    pub const fn has_next_agent(&self) -> bool {
        self.index < self.num
    }

    /// Fold the current group into the implemented elements and advance to
    /// the next iteration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::PlanExhausted`] if the plan is already done.
    pub fn move_to_next_iteration(&mut self) -> Result<(), AgentError> {
        let Some(group) = self.plan.group(self.iteration) else {
            return Err(AgentError::PlanExhausted {
                agent_type: self.agent_type.clone(),
            });
        };
        for element in group {
            self.implemented.insert(*element);
            self.unimplemented.remove(element);
        }
        self.iteration = self.iteration.saturating_add(1);
        trace!(
            agent_type = %self.agent_type,
            individual = self.index,
            iteration = self.iteration,
            "advanced iteration"
        );
        Ok(())
    }

    /// Move to `loc` without touching iteration progress.
    pub fn update_loc_id(&mut self, loc: LocId) {
        self.loc = loc;
    }

    /// Whether every iteration of the plan has been processed.
    pub fn is_done(&self) -> bool {
        self.iteration >= self.plan.len()
    }

    /// Copy of the elements decided in the current iteration (empty once done).
    pub fn current_elements(&self) -> ElementSet {
        self.plan.group(self.iteration).cloned().unwrap_or_default()
    }

    /// Copy of the elements decided in earlier iterations.
    pub fn implemented_elements(&self) -> ElementSet {
        self.implemented.clone()
    }

    /// Copy of the elements not yet implemented, current group included.
    pub fn unimplemented_elements(&self) -> ElementSet {
        self.unimplemented.clone()
    }

    /// Number of implemented elements; selects the landscape step.
    pub fn implemented_count(&self) -> usize {
        self.implemented.len()
    }

    /// Type name.
    pub fn agent_type(&self) -> &str {
        &self.agent_type
    }

    /// Number of individuals of this type.
    pub const fn num(&self) -> u32 {
        self.num
    }

    /// Individual currently being simulated.
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Current iteration index.
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current location.
    pub const fn loc(&self) -> LocId {
        self.loc
    }

    /// Maximum number of elements changed in one move.
    pub const fn power(&self) -> usize {
        self.power
    }

    /// Fraction of unvisited neighbors inspected per pass.
    pub const fn constraint(&self) -> f64 {
        self.constraint
    }

    /// Exploration and scoring flags.
    pub const fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// The iteration plan.
    pub const fn plan(&self) -> &IterationPlan {
        &self.plan
    }

    /// Element count N.
    pub const fn n(&self) -> usize {
        self.plan.n()
    }

    fn restart(&mut self, rng: &mut impl Rng) {
        let count = LocId::count(self.plan.n()).unwrap_or(1);
        self.loc = LocId::new(rng.random_range(0..count));
        self.iteration = 0;
        self.implemented.clear();
        self.unimplemented = (0..self.plan.n()).collect();
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type = {}\tnum = {}\tindividual = {}\tpower = {}\tconstraint = {}\tstrategy = {}\tplan = {}",
            self.agent_type,
            self.num,
            self.index,
            self.power,
            self.constraint,
            self.strategy,
            self.plan
        )
    }
}
