//! Error types for the `nkscape-landscape` crate.
//!
//! Construction-time validation failures are configuration errors: callers
//! propagate them and abort the experiment rather than recovering.

use std::path::PathBuf;

use nkscape_types::LocId;

/// Errors that can occur while building or querying landscapes.
#[derive(Debug, thiserror::Error)]
pub enum LandscapeError {
    /// The element count is outside `1..32`.
    #[error("element count must be in [1, 31], got {n}")]
    InvalidElementCount {
        /// The rejected element count.
        n: usize,
    },

    /// An element does not have the same number of dependencies as element 0.
    #[error("element {element} has {found} dependencies, expected {expected}")]
    InconsistentDependencyCount {
        /// The offending element.
        element: usize,
        /// Dependency count of element 0.
        expected: usize,
        /// Dependency count of this element.
        found: usize,
    },

    /// A dependency index is not a valid element.
    #[error("element {element} depends on {dependency}, which is outside [0, {n})")]
    DependencyOutOfRange {
        /// The dependent element.
        element: usize,
        /// The invalid dependency index.
        dependency: usize,
        /// Element count.
        n: usize,
    },

    /// An element lists itself as a dependency.
    #[error("element {element} lists itself as a dependency")]
    SelfDependency {
        /// The offending element.
        element: usize,
    },

    /// An element lists the same dependency twice.
    #[error("element {element} lists dependency {dependency} more than once")]
    DuplicateDependency {
        /// The offending element.
        element: usize,
        /// The repeated dependency.
        dependency: usize,
    },

    /// An adjacency table row has the wrong number of columns.
    #[error("adjacency row {row} has {found} columns, expected {expected}")]
    NonSquareMatrix {
        /// Zero-based row number (blank lines excluded).
        row: usize,
        /// Number of rows in the table.
        expected: usize,
        /// Number of columns in this row.
        found: usize,
    },

    /// Failed to read an adjacency table from disk.
    #[error("failed to read adjacency table {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Bias is outside `[0, 1]`.
    #[error("bias must be in [0, 1], got {bias}")]
    InvalidBias {
        /// The rejected bias.
        bias: f64,
    },

    /// Delta is outside `[0, 1]`.
    #[error("delta must be in [0, 1], got {delta}")]
    InvalidDelta {
        /// The rejected delta.
        delta: f64,
    },

    /// Implementation step is outside `[0, N]`.
    #[error("step must be in [0, {n}], got {step}")]
    InvalidStep {
        /// The rejected step.
        step: usize,
        /// Element count.
        n: usize,
    },

    /// A shock index beyond the contribution table was requested.
    #[error("shock {shock} is beyond the last shock {total_shocks}")]
    ShockOutOfRange {
        /// The requested shock index.
        shock: usize,
        /// Highest valid shock index.
        total_shocks: usize,
    },

    /// A configuration id is not below `2^N`.
    #[error("configuration {loc} is outside a landscape of {n} elements")]
    LocationOutOfRange {
        /// The rejected configuration.
        loc: LocId,
        /// Element count.
        n: usize,
    },

    /// An element index is not below N.
    #[error("element {element} is outside [0, {n})")]
    ElementOutOfRange {
        /// The rejected element index.
        element: usize,
        /// Element count.
        n: usize,
    },

    /// Arithmetic overflow while sizing a table.
    #[error("arithmetic overflow in landscape calculation")]
    ArithmeticOverflow,
}
