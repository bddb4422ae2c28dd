//! Round-robin neighbour selection.
//!
//! A meta-strategy that owns a list of registered selections and always
//! delegates to the active one, advancing the rotation whenever the
//! active selection has nothing to propose. Useful for phased searches
//! (construction first, then repair, then polish) where each phase
//! naturally exhausts itself.

mod runner;

pub use runner::RoundRobinNeighbourSelection;
