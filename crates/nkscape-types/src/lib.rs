//! Shared type definitions for the nkscape landscape-search simulator.
//!
//! Types here are used by every other crate in the workspace and carry no
//! simulation logic beyond bit-level configuration arithmetic.
//!
//! # Modules
//!
//! - [`ids`] -- [`LocId`], the N-bit configuration identifier, and its bit
//!   helpers (toggle, decode, encode, restricted Hamming distance).
//! - [`enums`] -- [`SearchStrategy`] and its two policy flags.
//! - [`structs`] -- [`StepRecord`], the per-step research record, and the
//!   [`ElementSet`] alias.

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{Exploration, Scoring, SearchStrategy};
pub use ids::{LocId, MAX_ELEMENTS};
pub use structs::{ElementSet, StepRecord};
