//! The constraint trait.

use rustc_hash::FxHashSet;

use super::{Model, Value, ValueId, VariableId};

/// Set of currently assigned values that would have to be retracted for a
/// candidate value to hold.
pub type ConflictSet = FxHashSet<ValueId>;

/// A relation over a subset of the model's variables.
///
/// The one method every constraint has to implement is
/// [`compute_conflicts`](Constraint::compute_conflicts): given a candidate
/// value, add to the conflict set every currently assigned value that is
/// incompatible with it. The conflict set is shared across the constraints
/// of the candidate's variable, so a constraint can see what earlier
/// constraints already selected for retraction and avoid retracting more
/// than necessary. Conflicts on the candidate's own variable need not be
/// reported; the assignment transaction replaces the current value anyway.
///
/// A constraint may keep incremental per-assignment state (for instance an
/// occupancy table keyed by time slot) via the
/// [`assigned`](Constraint::assigned)/[`unassigned`](Constraint::unassigned)
/// hooks, which the model invokes for every assignment change of a touched
/// variable. The hooks must keep that state reflecting exactly the
/// currently assigned values; conflict computation may then look up the
/// table instead of rescanning all variables.
///
/// Only hard constraints participate in conflict computation. Soft
/// constraints contribute to the model's total value through
/// [`penalty`](Constraint::penalty).
pub trait Constraint<P>: Send {
    /// Constraint's name, for diagnostics.
    fn name(&self) -> &str;

    /// Variables this constraint ranges over. A constraint registered as
    /// global (see [`Model::add_global_constraint`]) is checked against
    /// every value regardless of what it returns here.
    fn variables(&self) -> &[VariableId];

    /// Hard constraints identify conflicts; soft constraints only carry a
    /// penalty.
    fn is_hard(&self) -> bool {
        true
    }

    /// Adds to `conflicts` every currently assigned value that would have
    /// to be retracted for `value` to be assigned. Must not mutate any
    /// state and must be deterministic for a fixed model state.
    fn compute_conflicts(&self, model: &Model<P>, value: &Value<P>, conflicts: &mut ConflictSet);

    /// Pairwise consistency of two values under this constraint, regardless
    /// of the current assignment. Used to vet tentative pairs that are not
    /// both committed to the model yet.
    fn is_consistent(&self, _a: &Value<P>, _b: &Value<P>) -> bool {
        true
    }

    /// Called after `value` was assigned to its variable.
    fn assigned(&mut self, _iteration: u64, _value: &Value<P>) {}

    /// Called after `value` was unassigned from its variable.
    fn unassigned(&mut self, _iteration: u64, _value: &Value<P>) {}

    /// Contribution to the model's total value, derived from the
    /// constraint's incremental state.
    fn penalty(&self) -> f64 {
        0.0
    }

    /// Whether assigning `value` would violate this constraint.
    fn in_conflict(&self, model: &Model<P>, value: &Value<P>) -> bool {
        let mut conflicts = ConflictSet::default();
        self.compute_conflicts(model, value, &mut conflicts);
        !conflicts.is_empty()
    }
}
