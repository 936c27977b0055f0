//! Dependency (influence) matrix.
//!
//! Each of the N elements depends on exactly K other elements. The matrix is
//! usually read from an adjacency table: one comma-separated row per element,
//! where an `x` in column `j` of row `i` means element `i` depends on element
//! `j`. The diagonal describes the element itself and is ignored.

use std::path::Path;

use nkscape_types::{ElementSet, MAX_ELEMENTS};

use crate::error::LandscapeError;

/// Token marking a dependency in an adjacency table.
const DEPENDENCY_MARK: &str = "x";

/// Immutable description of which elements each element depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyMatrix {
    /// Dependency count shared by every element.
    k: usize,
    /// `dependencies[i]` is the ordered dependency list of element `i`.
    dependencies: Vec<Vec<usize>>,
}

impl DependencyMatrix {
    /// Build a matrix from per-element dependency lists.
    ///
    /// The number of lists is N. Every list must have the same length K,
    /// contain only indices in `[0, N)` other than its own element, and
    /// contain no index twice. List order is preserved: it fixes the bit
    /// order of each element's dependency pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`LandscapeError`] describing the first violated rule.
    pub fn new(dependencies: Vec<Vec<usize>>) -> Result<Self, LandscapeError> {
        let n = dependencies.len();
        if n == 0 || n >= MAX_ELEMENTS {
            return Err(LandscapeError::InvalidElementCount { n });
        }
        let k = dependencies.first().map_or(0, Vec::len);

        for (element, deps) in dependencies.iter().enumerate() {
            if deps.len() != k {
                return Err(LandscapeError::InconsistentDependencyCount {
                    element,
                    expected: k,
                    found: deps.len(),
                });
            }
            let mut seen = ElementSet::new();
            for &dependency in deps {
                if dependency >= n {
                    return Err(LandscapeError::DependencyOutOfRange {
                        element,
                        dependency,
                        n,
                    });
                }
                if dependency == element {
                    return Err(LandscapeError::SelfDependency { element });
                }
                if !seen.insert(dependency) {
                    return Err(LandscapeError::DuplicateDependency {
                        element,
                        dependency,
                    });
                }
            }
        }

        Ok(Self { k, dependencies })
    }

    /// Build a matrix from a boolean adjacency table (`rows[i][j]` is true
    /// when element `i` depends on element `j`). Diagonal entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::NonSquareMatrix`] if a row length differs
    /// from the row count, or any error of [`DependencyMatrix::new`].
    pub fn from_adjacency(rows: &[Vec<bool>]) -> Result<Self, LandscapeError> {
        let n = rows.len();
        let mut dependencies = Vec::with_capacity(n);
        for (element, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(LandscapeError::NonSquareMatrix {
                    row: element,
                    expected: n,
                    found: row.len(),
                });
            }
            let deps: Vec<usize> = row
                .iter()
                .enumerate()
                .filter(|&(column, &marked)| marked && column != element)
                .map(|(column, _)| column)
                .collect();
            dependencies.push(deps);
        }
        Self::new(dependencies)
    }

    /// Parse a comma-separated adjacency table.
    ///
    /// A cell equal to `x` after trimming marks a dependency; anything else
    /// does not. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns any error of [`DependencyMatrix::from_adjacency`].
    pub fn parse_table(text: &str) -> Result<Self, LandscapeError> {
        let rows: Vec<Vec<bool>> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.split(',')
                    .map(|cell| cell.trim() == DEPENDENCY_MARK)
                    .collect()
            })
            .collect();
        Self::from_adjacency(&rows)
    }

    /// Read and parse an adjacency table file.
    ///
    /// # Errors
    ///
    /// Returns [`LandscapeError::Io`] if the file cannot be read, or any
    /// error of [`DependencyMatrix::parse_table`].
    pub fn from_file(path: &Path) -> Result<Self, LandscapeError> {
        let text = std::fs::read_to_string(path).map_err(|source| LandscapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_table(&text)
    }

    /// Number of elements N.
    pub fn n(&self) -> usize {
        self.dependencies.len()
    }

    /// Number of dependencies per element K.
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Ordered dependency list of `element`, or `None` if out of range.
    pub fn dependencies_of(&self, element: usize) -> Option<&[usize]> {
        self.dependencies.get(element).map(Vec::as_slice)
    }

    /// Number of distinct dependency patterns per element (`2^K`).
    pub fn pattern_count(&self) -> usize {
        u32::try_from(self.k)
            .ok()
            .and_then(|k| 1_usize.checked_shl(k))
            .unwrap_or(usize::MAX)
    }
}

impl core::fmt::Display for DependencyMatrix {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "N = {}, K = {}", self.n(), self.k)?;
        for (element, deps) in self.dependencies.iter().enumerate() {
            writeln!(f, "d({element}) <- {deps:?}")?;
        }
        Ok(())
    }
}
