//! Shock schedule.
//!
//! A schedule is the ascending, duplicate-free list of time thresholds
//! ("tau"). The shock index advances by at most one per check: when the
//! elapsed time exceeds the threshold of the current shock. Once every
//! threshold has been passed there is nothing left to compare against and
//! the index stays at the last shock. A schedule without thresholds never
//! leaves shock 0 and never reports a clamp.

use std::collections::BTreeSet;

/// Outcome of one shock-boundary check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShockCheck {
    /// The current threshold has not been exceeded.
    Stay,
    /// The current threshold was exceeded; move to the next shock.
    Advance,
    /// No threshold is left for the current shock; it is held.
    Clamped,
}

/// Ordered shock thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShockSchedule {
    taus: Vec<u64>,
}

impl ShockSchedule {
    /// Sort and deduplicate `taus`.
    pub fn new(taus: impl IntoIterator<Item = u64>) -> Self {
        let unique: BTreeSet<u64> = taus.into_iter().collect();
        Self {
            taus: unique.into_iter().collect(),
        }
    }

    /// Number of shocks after the initial state.
    pub fn total_shocks(&self) -> usize {
        self.taus.len()
    }

    /// Threshold that ends `shock`, if any.
    pub fn threshold(&self, shock: usize) -> Option<u64> {
        self.taus.get(shock).copied()
    }

    /// The thresholds in ascending order.
    pub fn taus(&self) -> &[u64] {
        &self.taus
    }

    /// Compare `time` against the threshold of `shock` only.
    pub fn check(&self, shock: usize, time: u64) -> ShockCheck {
        match self.threshold(shock) {
            Some(tau) if time > tau => ShockCheck::Advance,
            Some(_) => ShockCheck::Stay,
            None if self.taus.is_empty() => ShockCheck::Stay,
            None => ShockCheck::Clamped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_and_deduplicates() {
        let schedule = ShockSchedule::new([120, 40, 120, 7]);
        assert_eq!(schedule.taus(), &[7, 40, 120]);
        assert_eq!(schedule.total_shocks(), 3);
    }

    #[test]
    fn advances_only_past_current_threshold() {
        let schedule = ShockSchedule::new([10, 20]);
        assert_eq!(schedule.check(0, 10), ShockCheck::Stay);
        assert_eq!(schedule.check(0, 11), ShockCheck::Advance);
        // Crossing several thresholds at once still moves one shock per check.
        assert_eq!(schedule.check(0, 500), ShockCheck::Advance);
        assert_eq!(schedule.check(1, 20), ShockCheck::Stay);
        assert_eq!(schedule.check(1, 21), ShockCheck::Advance);
    }

    #[test]
    fn clamps_at_last_shock() {
        let schedule = ShockSchedule::new([5]);
        assert_eq!(schedule.check(1, 1_000), ShockCheck::Clamped);
        assert_eq!(schedule.check(9, 0), ShockCheck::Clamped);
    }

    #[test]
    fn empty_schedule_stays_in_first_shock() {
        let schedule = ShockSchedule::new([]);
        assert_eq!(schedule.total_shocks(), 0);
        assert_eq!(schedule.check(0, 0), ShockCheck::Stay);
        assert_eq!(schedule.check(0, u64::MAX), ShockCheck::Stay);
    }
}
