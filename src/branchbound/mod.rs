//! Branch-and-bound neighbour selection.
//!
//! Schedules one entity (e.g. one student) at a time: given the entity's
//! ordered list of requests, an exhaustive search with admissible bounds
//! finds the cost-minimal vector of per-request values — or, in penalty
//! mode, the vector with the most assigned requests at the lowest summed
//! penalty — without retracting anything that belongs to other entities.
//! Alternative requests participate only while non-alternative requests
//! leave a slot open for them.
//!
//! # References
//!
//! Müller, Murray & Rudová (2005), "Student Sectioning for Minimizing
//! Potential Conflicts" — incremental per-student branch & bound on top
//! of a shared assignment.

mod config;
mod runner;
mod types;

pub use config::BranchBoundConfig;
pub use runner::{BranchBoundSelection, Selection};
pub use types::{BranchBoundNeighbour, Entity, Request};
