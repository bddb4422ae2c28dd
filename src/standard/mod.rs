//! Greedy single-step neighbour selection.
//!
//! The baseline strategy of iterative forward search: pick one variable,
//! pick one value for it, and propose the single-variable reassignment as
//! a neighbour. Both choices are pluggable criteria
//! ([`VariableSelection`](crate::selection::VariableSelection) /
//! [`ValueSelection`](crate::selection::ValueSelection)); the general
//! criteria shipped here cover random selection, minimal-perturbation
//! weighting, and dead-end recovery.
//!
//! # References
//!
//! Müller, Barták & Rudová (2004), "Iterative Forward Search Algorithm:
//! Combining Local Search with Maintaining Arc Consistency and a
//! Conflict-based Statistics"

mod config;
mod runner;

pub use config::StandardConfig;
pub use runner::{GeneralValueSelection, GeneralVariableSelection, StandardNeighbourSelection};
