//! Pluggable selection interfaces.
//!
//! Every search strategy in this crate implements [`NeighbourSelection`];
//! single-step strategies compose a [`VariableSelection`] with a
//! [`ValueSelection`]. All three return `None` to signal "nothing to
//! propose this round" — a normal negative result, not an error; callers
//! (the round-robin meta-strategy, an outer solver loop) move on to the
//! next candidate source.

use crate::context::SolverContext;
use crate::model::{ValueId, VariableId};
use crate::solution::{Neighbour, Solution};

/// A strategy proposing candidate moves.
pub trait NeighbourSelection<P> {
    /// Called once before the strategy is used, with the solver context
    /// carrying configuration, extensions, and listeners.
    fn init(&mut self, _ctx: &SolverContext<P>) {}

    /// Proposes the next move, or `None` when the strategy has nothing to
    /// offer this round.
    fn select_neighbour(&mut self, solution: &mut Solution<P>) -> Option<Box<dyn Neighbour<P>>>;
}

/// A criterion picking the variable to (re)assign next.
pub trait VariableSelection<P> {
    /// Called once before the criterion is used.
    fn init(&mut self, _ctx: &SolverContext<P>) {}

    /// Picks a variable, or `None` when no variable qualifies.
    fn select_variable(&mut self, solution: &Solution<P>) -> Option<VariableId>;
}

/// A criterion picking a value for a chosen variable.
pub trait ValueSelection<P> {
    /// Called once before the criterion is used.
    fn init(&mut self, _ctx: &SolverContext<P>) {}

    /// Picks a value from the variable's domain, or `None` when no value
    /// qualifies.
    fn select_value(&mut self, solution: &Solution<P>, variable: VariableId)
        -> Option<ValueId>;
}

/// Instrumentation hook consulted after a variable or value has been
/// chosen. Returning `false` vetoes the choice, which makes the selection
/// report "no candidate" for this round.
pub trait SelectionListener<P>: Send + Sync {
    /// Consulted after a variable was chosen.
    fn variable_selected(&self, _iteration: u64, _variable: VariableId) -> bool {
        true
    }

    /// Consulted after a value was chosen.
    fn value_selected(&self, _iteration: u64, _variable: VariableId, _value: ValueId) -> bool {
        true
    }
}
