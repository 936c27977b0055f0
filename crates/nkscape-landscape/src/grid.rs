//! The `[shock][step]` table of landscapes used by one run.

use rand::Rng;
use tracing::debug;

use crate::contribution::FitnessContributionTable;
use crate::error::LandscapeError;
use crate::landscape::Landscape;
use crate::matrix::DependencyMatrix;

/// Every landscape a run can observe: one per shock in `0..=total_shocks`
/// and implementation step in `0..=N`.
#[derive(Debug, Clone)]
pub struct LandscapeGrid {
    n: usize,
    landscapes: Vec<Vec<Landscape>>,
}

impl LandscapeGrid {
    /// Build all `(total_shocks + 1) * (N + 1)` landscapes, shock-major.
    ///
    /// # Errors
    ///
    /// Propagates any [`LandscapeError`] from [`Landscape::build`].
    pub fn build(
        matrix: &DependencyMatrix,
        bias: f64,
        table: &FitnessContributionTable,
        rng: &mut impl Rng,
    ) -> Result<Self, LandscapeError> {
        let n = matrix.n();
        let total_shocks = table.total_shocks();
        let mut landscapes = Vec::with_capacity(total_shocks.saturating_add(1));
        for shock in 0..=total_shocks {
            let mut row = Vec::with_capacity(n.saturating_add(1));
            for step in 0..=n {
                row.push(Landscape::build(matrix, bias, shock, step, table, rng)?);
            }
            landscapes.push(row);
        }
        debug!(n, total_shocks, bias, "built landscape grid");
        Ok(Self { n, landscapes })
    }

    /// The landscape at `shock` after `step` elements are implemented.
    pub fn get(&self, shock: usize, step: usize) -> Option<&Landscape> {
        self.landscapes.get(shock)?.get(step)
    }

    /// The fully implemented landscape at `shock`: the one whose scores are
    /// reported as realized fitness.
    pub fn realized(&self, shock: usize) -> Option<&Landscape> {
        self.get(shock, self.n)
    }

    /// Number of shocks after the initial state.
    pub fn total_shocks(&self) -> usize {
        self.landscapes.len().saturating_sub(1)
    }

    /// Element count N.
    pub const fn n(&self) -> usize {
        self.n
    }
}
