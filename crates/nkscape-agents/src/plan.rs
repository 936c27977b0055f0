//! Iteration plans.
//!
//! A plan is the ordered list of element groups an agent decides, one group
//! per iteration. Together the groups must cover every element. A repeated
//! element is tolerated: it is simply decided again in a later iteration.

use std::fmt;

use nkscape_types::{ElementSet, MAX_ELEMENTS};
use serde::Serialize;

use crate::error::AgentError;

/// Ordered element groups covering `[0, N)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationPlan {
    #[serde(skip)]
    n: usize,
    groups: Vec<ElementSet>,
}

impl IterationPlan {
    /// Validate `groups` against an element count.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidElementCount`] for `n` outside `1..32`,
    /// [`AgentError::ElementOutOfRange`] for an element `>= n`, or
    /// [`AgentError::MissingElements`] if some element is in no group.
    pub fn new(groups: Vec<ElementSet>, n: usize) -> Result<Self, AgentError> {
        if n == 0 || n >= MAX_ELEMENTS {
            return Err(AgentError::InvalidElementCount { n });
        }
        let mut covered = ElementSet::new();
        for group in &groups {
            for &element in group {
                if element >= n {
                    return Err(AgentError::ElementOutOfRange { element, n });
                }
                covered.insert(element);
            }
        }
        let missing: Vec<usize> = (0..n).filter(|e| !covered.contains(e)).collect();
        if !missing.is_empty() {
            return Err(AgentError::MissingElements { missing });
        }
        Ok(Self { n, groups })
    }

    /// Build a plan from plain index lists, e.g. `[[0, 1], [2]]`.
    ///
    /// # Errors
    ///
    /// Same as [`IterationPlan::new`].
    pub fn from_lists(lists: &[Vec<usize>], n: usize) -> Result<Self, AgentError> {
        let groups = lists
            .iter()
            .map(|list| list.iter().copied().collect())
            .collect();
        Self::new(groups, n)
    }

    /// Parse compact notation such as `(0,1,2)(3,4)(5)`. Whitespace is
    /// ignored and `()` is an empty group.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MalformedPlan`] for text outside the grammar,
    /// otherwise the same errors as [`IterationPlan::new`].
    pub fn parse_compact(text: &str, n: usize) -> Result<Self, AgentError> {
        let malformed = |reason: &str| AgentError::MalformedPlan {
            text: text.to_owned(),
            reason: reason.to_owned(),
        };
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut rest = compact.as_str();
        let mut groups = Vec::new();

        while !rest.is_empty() {
            let Some(open) = rest.strip_prefix('(') else {
                return Err(malformed("expected '('"));
            };
            let Some((body, tail)) = open.split_once(')') else {
                return Err(malformed("unclosed group"));
            };
            if body.contains('(') {
                return Err(malformed("nested '('"));
            }
            let mut group = ElementSet::new();
            if !body.is_empty() {
                for token in body.split(',') {
                    let element = token
                        .parse::<usize>()
                        .map_err(|_err| malformed(&format!("invalid element index {token:?}")))?;
                    group.insert(element);
                }
            }
            groups.push(group);
            rest = tail;
        }

        if groups.is_empty() {
            return Err(malformed("no groups"));
        }
        Self::new(groups, n)
    }

    /// Element count the plan was validated against.
    pub const fn n(&self) -> usize {
        self.n
    }

    /// Number of iterations.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the plan has no iterations (only possible for `N = 0`, which
    /// is rejected, so always `false` for a constructed plan).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Elements decided in `iteration`.
    pub fn group(&self, iteration: usize) -> Option<&ElementSet> {
        self.groups.get(iteration)
    }

    /// All groups in order.
    pub fn groups(&self) -> &[ElementSet] {
        &self.groups
    }
}

impl fmt::Display for IterationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            write!(f, "(")?;
            for (i, element) in group.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{element}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_partition() {
        let plan = IterationPlan::from_lists(&[vec![0, 1], vec![2]], 3).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.n(), 3);
        assert_eq!(plan.group(1).unwrap().iter().copied().collect::<Vec<_>>(), vec![2]);
        assert!(plan.group(2).is_none());
    }

    #[test]
    fn tolerates_repeated_elements() {
        let plan = IterationPlan::from_lists(&[vec![0, 1], vec![1, 2]], 3).unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn reports_missing_elements() {
        let err = IterationPlan::from_lists(&[vec![0], vec![3]], 5).unwrap_err();
        assert!(
            matches!(&err, AgentError::MissingElements { missing } if *missing == [1, 2, 4]),
            "{err}"
        );
    }

    #[test]
    fn rejects_out_of_range_and_bad_n() {
        assert!(matches!(
            IterationPlan::from_lists(&[vec![0, 1, 2, 3]], 3),
            Err(AgentError::ElementOutOfRange { element: 3, n: 3 })
        ));
        assert!(matches!(
            IterationPlan::from_lists(&[vec![0]], 0),
            Err(AgentError::InvalidElementCount { n: 0 })
        ));
        assert!(matches!(
            IterationPlan::from_lists(&[vec![0]], 32),
            Err(AgentError::InvalidElementCount { n: 32 })
        ));
    }

    #[test]
    fn parses_compact_notation() {
        let plan = IterationPlan::parse_compact(" (0, 1,2)(3)\n(4,5) ", 6).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.to_string(), "(0,1,2)(3)(4,5)");
        assert_eq!(
            plan,
            IterationPlan::from_lists(&[vec![0, 1, 2], vec![3], vec![4, 5]], 6).unwrap()
        );
    }

    #[test]
    fn empty_group_is_allowed() {
        let plan = IterationPlan::parse_compact("(0,1)()", 2).unwrap();
        assert_eq!(plan.len(), 2);
        assert!(plan.group(1).unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_notation() {
        for text in ["", "0,1", "(0,1", "(0,(1))", "(0,x)", "(0,,1)", "(0)1"] {
            let err = IterationPlan::parse_compact(text, 2).unwrap_err();
            assert!(
                matches!(err, AgentError::MalformedPlan { .. }),
                "{text:?} gave {err}"
            );
        }
    }

    #[test]
    fn serializes_as_group_lists() {
        let plan = IterationPlan::parse_compact("(1,0)(2)", 3).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(json, r#"{"groups":[[0,1],[2]]}"#);
    }
}
