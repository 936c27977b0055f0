//! Dependency structure, fitness contributions, and NK landscapes.
//!
//! This crate models the payoff side of the simulation: which elements
//! depend on which ([`DependencyMatrix`]), how much each element contributes
//! given its own value and its dependencies' values, and how that drifts
//! from shock to shock ([`FitnessContributionTable`]), and the fitness of
//! every configuration at a given shock and implementation step
//! ([`Landscape`], collected in a [`LandscapeGrid`]).
//!
//! # Modules
//!
//! - [`contribution`] -- AR(1) fitness contribution table across shocks.
//! - [`error`] -- Error types for landscape construction and lookups.
//! - [`grid`] -- The `[shock][step]` table of landscapes owned by one run.
//! - [`landscape`] -- Dense fitness table, neighbor enumeration, merging.
//! - [`matrix`] -- Dependency matrix and its adjacency-table parser.
//!
//! All randomness is drawn from a caller-supplied [`rand::Rng`], so the same
//! generator state always produces the same table and landscapes.

pub mod contribution;
pub mod error;
pub mod grid;
pub mod landscape;
pub mod matrix;

pub use contribution::FitnessContributionTable;
pub use error::LandscapeError;
pub use grid::LandscapeGrid;
pub use landscape::Landscape;
pub use matrix::DependencyMatrix;
