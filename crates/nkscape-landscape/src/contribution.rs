//! Fitness contribution table.
//!
//! For every element, element value (0 or 1) and dependency pattern (one of
//! `2^K`), the table holds one contribution in `[0, 1]` per shock index
//! `0..=total_shocks`. Values before the first shock are i.i.d. uniform;
//! each later shock blends the previous value with a fresh draw:
//!
//! ```text
//! value[s] = (1 - delta) * value[s - 1] + delta * uniform()
//! ```
//!
//! so `delta = 0` freezes the table and `delta = 1` re-randomizes it at
//! every shock.

use rand::Rng;
use tracing::debug;

use crate::error::LandscapeError;
use crate::matrix::DependencyMatrix;

/// Number of values an element can take.
const ELEMENT_VALUES: usize = 2;

/// Per-(shock, element, value, pattern) fitness contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessContributionTable {
    /// Element count N.
    n: usize,
    /// Number of dependency patterns per element (`2^K`).
    patterns: usize,
    /// Drift weight applied at each shock.
    delta: f64,
    /// Highest shock index stored.
    total_shocks: usize,
    /// One series per `(element, value, pattern)` cell, indexed by shock.
    cells: Vec<Vec<f64>>,
}

impl FitnessContributionTable {
    /// Generate the table for `matrix` over `total_shocks + 1` shock indices.
    ///
    /// Draw order is element, then value, then pattern, and within a cell
    /// shock 0 first; the same generator state always yields the same table.
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::InvalidDelta`] if `delta` is outside
    /// `[0, 1]` (including NaN).
    pub fn build(
        matrix: &DependencyMatrix,
        delta: f64,
        total_shocks: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, LandscapeError> {
        if !(0.0..=1.0).contains(&delta) {
            return Err(LandscapeError::InvalidDelta { delta });
        }

        let n = matrix.n();
        let patterns = matrix.pattern_count();
        let cell_count = n
            .checked_mul(ELEMENT_VALUES)
            .and_then(|c| c.checked_mul(patterns))
            .ok_or(LandscapeError::ArithmeticOverflow)?;
        let series_len = total_shocks
            .checked_add(1)
            .ok_or(LandscapeError::ArithmeticOverflow)?;

        let mut cells = Vec::with_capacity(cell_count);
        for _ in 0..cell_count {
            let mut series = Vec::with_capacity(series_len);
            let mut previous: f64 = rng.random();
            series.push(previous);
            for _ in 1..series_len {
                let fresh: f64 = rng.random();
                previous = (1.0 - delta) * previous + delta * fresh;
                series.push(previous);
            }
            cells.push(series);
        }

        debug!(n, k = matrix.k(), delta, total_shocks, "built fitness contribution table");

        Ok(Self {
            n,
            patterns,
            delta,
            total_shocks,
            cells,
        })
    }

    /// Contribution of `element` holding `value` under dependency `pattern`
    /// at `shock`.
    ///
    /// Returns `None` if any index is out of range, including a shock beyond
    /// [`total_shocks`](Self::total_shocks).
    pub fn value_at(&self, shock: usize, element: usize, value: u8, pattern: usize) -> Option<f64> {
        if element >= self.n || pattern >= self.patterns {
            return None;
        }
        let value = usize::from(value);
        if value >= ELEMENT_VALUES {
            return None;
        }
        let cell = element
            .checked_mul(ELEMENT_VALUES)?
            .checked_add(value)?
            .checked_mul(self.patterns)?
            .checked_add(pattern)?;
        self.cells.get(cell)?.get(shock).copied()
    }

    /// Drift weight the table was built with.
    pub const fn delta(&self) -> f64 {
        self.delta
    }

    /// Highest shock index stored.
    pub const fn total_shocks(&self) -> usize {
        self.total_shocks
    }

    /// Element count N.
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Number of dependency patterns per element.
    pub const fn pattern_count(&self) -> usize {
        self.patterns
    }
}
