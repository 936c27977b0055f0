//! A single NK landscape.
//!
//! A [`Landscape`] is fixed by a shock index and an implementation step. It
//! stores the fitness of all `2^N` configurations: the mean over elements of
//! a blend between the element's table contribution and fresh noise,
//!
//! ```text
//! fitness(c) = 1/N * sum_i [(1 - u) * table(shock, i, c_i, pattern_i(c)) + u * uniform()]
//! u          = bias * (1 - step / N)
//! ```
//!
//! so uncertainty `u` decays linearly from `bias` before anything is
//! implemented to exactly 0 once all N elements are.

use std::collections::BTreeSet;

use nkscape_types::{ElementSet, LocId};
use rand::Rng;

use crate::contribution::FitnessContributionTable;
use crate::error::LandscapeError;
use crate::matrix::DependencyMatrix;

/// Dense fitness table for one `(shock, step)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    /// Element count N.
    n: usize,
    /// Noise weight at step 0.
    bias: f64,
    /// Shock index the contributions were read at.
    shock: usize,
    /// Number of implemented elements.
    step: usize,
    /// Fitness of configuration `i` at index `i`.
    fitness: Vec<f64>,
    /// Highest fitness in the table.
    max: f64,
    /// Lowest fitness in the table.
    min: f64,
}

impl Landscape {
    /// Compute the fitness of every configuration.
    ///
    /// One noise value is drawn per (configuration, element) pair, in
    /// configuration then element order, even when the uncertainty is 0.
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::InvalidBias`] if `bias` is outside `[0, 1]`,
    /// [`LandscapeError::InvalidStep`] if `step > N`, or
    /// [`LandscapeError::ShockOutOfRange`] if `shock` exceeds the table.
    pub fn build(
        matrix: &DependencyMatrix,
        bias: f64,
        shock: usize,
        step: usize,
        table: &FitnessContributionTable,
        rng: &mut impl Rng,
    ) -> Result<Self, LandscapeError> {
        if !(0.0..=1.0).contains(&bias) {
            return Err(LandscapeError::InvalidBias { bias });
        }
        let n = matrix.n();
        if step > n {
            return Err(LandscapeError::InvalidStep { step, n });
        }
        if shock > table.total_shocks() {
            return Err(LandscapeError::ShockOutOfRange {
                shock,
                total_shocks: table.total_shocks(),
            });
        }

        let count = LocId::count(n).ok_or(LandscapeError::InvalidElementCount { n })?;
        let uncertainty = uncertainty_at(bias, step, n)?;
        let n_f64 = element_count_f64(n)?;

        let mut fitness = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        let mut max: f64 = 0.0;
        let mut min: f64 = 1.0;

        for raw in 0..count {
            let loc = LocId::new(raw);
            let mut total = 0.0;
            for element in 0..n {
                let own = loc
                    .bit(element, n)
                    .ok_or(LandscapeError::ElementOutOfRange { element, n })?;
                let pattern = dependency_pattern(matrix, loc, element)?;
                let contribution = table.value_at(shock, element, own, pattern).ok_or(
                    LandscapeError::ShockOutOfRange {
                        shock,
                        total_shocks: table.total_shocks(),
                    },
                )?;
                let noise: f64 = rng.random();
                total += (1.0 - uncertainty) * contribution + uncertainty * noise;
            }
            let value = total / n_f64;
            if value > max {
                max = value;
            }
            if value < min {
                min = value;
            }
            fitness.push(value);
        }

        Ok(Self {
            n,
            bias,
            shock,
            step,
            fitness,
            max,
            min,
        })
    }

    /// Fitness of `loc`.
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::LocationOutOfRange`] if `loc >= 2^N`.
    pub fn score_of(&self, loc: LocId) -> Result<f64, LandscapeError> {
        self.fitness
            .get(loc.index())
            .copied()
            .ok_or(LandscapeError::LocationOutOfRange { loc, n: self.n })
    }

    /// Highest fitness in the landscape.
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Lowest fitness in the landscape.
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Element count N.
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Shock index of this landscape.
    pub const fn shock(&self) -> usize {
        self.shock
    }

    /// Implementation step of this landscape.
    pub const fn step(&self) -> usize {
        self.step
    }

    /// Noise weight at step 0.
    pub const fn bias(&self) -> f64 {
        self.bias
    }

    /// Noise weight used for this landscape: `bias * (1 - step / N)`.
    pub fn uncertainty(&self) -> f64 {
        uncertainty_at(self.bias, self.step, self.n).unwrap_or(self.bias)
    }

    /// Fitness of every configuration, indexed by configuration id.
    pub fn fitness_values(&self) -> &[f64] {
        &self.fitness
    }

    /// All configurations reachable from `loc` by changing at most `power`
    /// of the elements in `elements`, including `loc` itself.
    ///
    /// The result has `sum_{i=0}^{min(power, |elements|)} C(|elements|, i)`
    /// members and does not depend on the order elements are visited in.
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::ElementOutOfRange`] if an element is not
    /// below N.
    pub fn neighbors_inclusive(
        &self,
        loc: LocId,
        elements: &ElementSet,
        power: usize,
    ) -> Result<BTreeSet<LocId>, LandscapeError> {
        let remaining: Vec<usize> = elements.iter().copied().collect();
        let mut out = BTreeSet::new();
        collect_neighbors(loc, &remaining, power, self.n, &mut out)?;
        Ok(out)
    }

    /// `loc` with the values of `elements` copied from `mask`.
    ///
    /// Used to ask "what if only these elements were adopted from `mask`".
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::ElementOutOfRange`] if an element is not
    /// below N.
    pub fn merge_on(
        &self,
        loc: LocId,
        mask: LocId,
        elements: &ElementSet,
    ) -> Result<LocId, LandscapeError> {
        loc.merged_with(mask, elements, self.n)
            .ok_or_else(|| self.first_invalid_element(elements))
    }

    /// `loc` with `element` flipped.
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::ElementOutOfRange`] if `element >= N`.
    pub fn toggle(&self, loc: LocId, element: usize) -> Result<LocId, LandscapeError> {
        loc.toggled(element, self.n)
            .ok_or(LandscapeError::ElementOutOfRange { element, n: self.n })
    }

    fn first_invalid_element(&self, elements: &ElementSet) -> LandscapeError {
        let element = elements
            .iter()
            .copied()
            .find(|&e| e >= self.n)
            .unwrap_or(self.n);
        LandscapeError::ElementOutOfRange { element, n: self.n }
    }
}

/// Recursive ball enumeration: either flip the first remaining element and
/// spend one unit of power, or leave it and keep the power.
fn collect_neighbors(
    loc: LocId,
    remaining: &[usize],
    power: usize,
    n: usize,
    out: &mut BTreeSet<LocId>,
) -> Result<(), LandscapeError> {
    let Some((&element, rest)) = remaining.split_first() else {
        out.insert(loc);
        return Ok(());
    };
    let Some(reduced_power) = power.checked_sub(1) else {
        out.insert(loc);
        return Ok(());
    };
    let toggled = loc
        .toggled(element, n)
        .ok_or(LandscapeError::ElementOutOfRange { element, n })?;
    collect_neighbors(toggled, rest, reduced_power, n, out)?;
    collect_neighbors(loc, rest, power, n, out)
}

/// Dependency pattern of `element` in `loc`: the dependencies' values read
/// as a binary number, first dependency most significant.
fn dependency_pattern(
    matrix: &DependencyMatrix,
    loc: LocId,
    element: usize,
) -> Result<usize, LandscapeError> {
    let n = matrix.n();
    let deps = matrix
        .dependencies_of(element)
        .ok_or(LandscapeError::ElementOutOfRange { element, n })?;
    let mut pattern: usize = 0;
    for &dependency in deps {
        let bit = loc
            .bit(dependency, n)
            .ok_or(LandscapeError::ElementOutOfRange { element: dependency, n })?;
        pattern = pattern
            .checked_mul(2)
            .ok_or(LandscapeError::ArithmeticOverflow)?
            | usize::from(bit);
    }
    Ok(pattern)
}

fn element_count_f64(n: usize) -> Result<f64, LandscapeError> {
    u32::try_from(n)
        .map(f64::from)
        .map_err(|_err| LandscapeError::InvalidElementCount { n })
}

fn uncertainty_at(bias: f64, step: usize, n: usize) -> Result<f64, LandscapeError> {
    let step_f64 = u32::try_from(step)
        .map(f64::from)
        .map_err(|_err| LandscapeError::InvalidStep { step, n })?;
    Ok((1.0 - step_f64 / element_count_f64(n)?) * bias)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn ring(n: usize) -> DependencyMatrix {
        DependencyMatrix::new((0..n).map(|i| vec![(i + 1) % n]).collect()).unwrap()
    }

    fn build(n: usize, bias: f64, step: usize, seed: u64) -> Landscape {
        let matrix = ring(n);
        let mut rng = StdRng::seed_from_u64(seed);
        let table = FitnessContributionTable::build(&matrix, 0.5, 1, &mut rng).unwrap();
        Landscape::build(&matrix, bias, 0, step, &table, &mut rng).unwrap()
    }

    fn binomial(n: usize, k: usize) -> usize {
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    #[test]
    fn fitness_is_mean_of_contributions_without_noise() {
        let matrix = ring(3);
        let mut rng = StdRng::seed_from_u64(11);
        let table = FitnessContributionTable::build(&matrix, 0.0, 0, &mut rng).unwrap();
        let landscape = Landscape::build(&matrix, 0.0, 0, 0, &table, &mut rng).unwrap();

        for raw in 0..8 {
            let loc = LocId(raw);
            let expected: f64 = (0..3)
                .map(|i| {
                    let own = loc.bit(i, 3).unwrap();
                    let pattern = usize::from(loc.bit((i + 1) % 3, 3).unwrap());
                    table.value_at(0, i, own, pattern).unwrap()
                })
                .sum::<f64>()
                / 3.0;
            assert!((landscape.score_of(loc).unwrap() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn uncertainty_decays_linearly_to_zero() {
        let n = 4;
        assert_eq!(build(n, 0.8, 0, 1).uncertainty(), 0.8);
        assert!((build(n, 0.8, 2, 1).uncertainty() - 0.4).abs() < 1e-12);
        assert_eq!(build(n, 0.8, n, 1).uncertainty(), 0.0);
        assert_eq!(build(n, 1.0, n, 1).uncertainty(), 0.0);
    }

    #[test]
    fn max_and_min_bound_every_score() {
        let landscape = build(6, 0.5, 2, 7);
        let values = landscape.fitness_values();
        assert_eq!(values.len(), 64);
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        assert_eq!(landscape.max(), max);
        assert_eq!(landscape.min(), min);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let matrix = ring(3);
        let mut rng = StdRng::seed_from_u64(2);
        let table = FitnessContributionTable::build(&matrix, 0.5, 1, &mut rng).unwrap();

        let bias = Landscape::build(&matrix, 1.2, 0, 0, &table, &mut rng).unwrap_err();
        assert!(matches!(bias, LandscapeError::InvalidBias { .. }));

        let step = Landscape::build(&matrix, 0.5, 0, 4, &table, &mut rng).unwrap_err();
        assert!(matches!(step, LandscapeError::InvalidStep { step: 4, n: 3 }));

        let shock = Landscape::build(&matrix, 0.5, 2, 0, &table, &mut rng).unwrap_err();
        assert!(matches!(shock, LandscapeError::ShockOutOfRange { shock: 2, total_shocks: 1 }));
    }

    #[test]
    fn score_of_rejects_out_of_range_location() {
        let landscape = build(3, 0.0, 0, 3);
        assert!(landscape.score_of(LocId(7)).is_ok());
        assert!(matches!(
            landscape.score_of(LocId(8)),
            Err(LandscapeError::LocationOutOfRange { .. })
        ));
    }

    #[test]
    fn zero_power_or_empty_set_yields_only_self() {
        let landscape = build(5, 0.0, 0, 4);
        let loc = LocId(0b10110);
        let all: ElementSet = (0..5).collect();
        let expected: BTreeSet<LocId> = [loc].into_iter().collect();
        assert_eq!(landscape.neighbors_inclusive(loc, &all, 0).unwrap(), expected);
        assert_eq!(
            landscape.neighbors_inclusive(loc, &ElementSet::new(), 3).unwrap(),
            expected
        );
    }

    #[test]
    fn neighbor_ball_size_is_binomial_sum() {
        let n = 6;
        let landscape = build(n, 0.0, 0, 5);
        let subsets: [&[usize]; 4] = [&[0], &[1, 3], &[0, 2, 4, 5], &[0, 1, 2, 3, 4, 5]];
        for subset in subsets {
            let elements: ElementSet = subset.iter().copied().collect();
            for power in 0..=7 {
                for raw in [0_u32, 21, 63] {
                    let ball = landscape
                        .neighbors_inclusive(LocId(raw), &elements, power)
                        .unwrap();
                    let expected: usize = (0..=power.min(elements.len()))
                        .map(|i| binomial(elements.len(), i))
                        .sum();
                    assert_eq!(ball.len(), expected);
                    for member in &ball {
                        let distance = member.distance_within(LocId(raw), &elements, n).unwrap();
                        assert!(distance <= power);
                        let all: ElementSet = (0..n).collect();
                        let outside = member.distance_within(LocId(raw), &all, n).unwrap();
                        assert_eq!(distance, outside, "changed an element outside the set");
                    }
                }
            }
        }
    }

    #[test]
    fn neighbors_of_documented_example() {
        // N = 4, [1,0,0,0], elements {0,1,2}, power 1.
        let landscape = build(4, 0.0, 0, 6);
        let loc = LocId::from_location(&[1, 0, 0, 0]).unwrap();
        let elements: ElementSet = [0, 1, 2].into_iter().collect();
        let ball = landscape.neighbors_inclusive(loc, &elements, 1).unwrap();
        let expected: BTreeSet<LocId> = [
            [1, 0, 0, 0],
            [0, 0, 0, 0],
            [1, 1, 0, 0],
            [1, 0, 1, 0],
        ]
        .iter()
        .map(|l| LocId::from_location(l).unwrap())
        .collect();
        assert_eq!(ball, expected);
    }

    #[test]
    fn neighbors_reject_out_of_range_elements() {
        let landscape = build(3, 0.0, 0, 8);
        let elements: ElementSet = [1, 5].into_iter().collect();
        assert!(matches!(
            landscape.neighbors_inclusive(LocId(0), &elements, 2),
            Err(LandscapeError::ElementOutOfRange { element: 5, n: 3 })
        ));
    }

    #[test]
    fn merge_on_copies_masked_elements() {
        let landscape = build(4, 0.0, 0, 9);
        let source = LocId::from_location(&[1, 0, 1, 0]).unwrap();
        let mask = LocId::from_location(&[0, 1, 1, 1]).unwrap();
        let elements: ElementSet = [0, 3].into_iter().collect();
        let merged = landscape.merge_on(source, mask, &elements).unwrap();
        assert_eq!(merged.to_location(4), Some(vec![0, 0, 1, 1]));

        let bad: ElementSet = [4].into_iter().collect();
        assert!(matches!(
            landscape.merge_on(source, mask, &bad),
            Err(LandscapeError::ElementOutOfRange { element: 4, n: 4 })
        ));
    }

    #[test]
    fn toggle_round_trips() {
        let landscape = build(4, 0.0, 0, 10);
        let toggled = landscape.toggle(LocId(13), 1).unwrap();
        assert_eq!(toggled, LocId(9));
        assert_eq!(landscape.toggle(toggled, 1).unwrap(), LocId(13));
    }
}
