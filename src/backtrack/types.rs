//! The composite neighbour produced by backtracking search.

use std::sync::Arc;

use crate::context::ConflictStatistics;
use crate::model::{Model, ValueId, VariableId};
use crate::solution::Neighbour;

/// A joint reassignment of several variables found by backtracking
/// search.
///
/// Applying the neighbour first retracts every touched variable's current
/// assignment, then assigns the recorded values, so the whole change
/// lands as one transaction. Displacements after the first are reported
/// to the [`ConflictStatistics`] extension when one is registered.
#[derive(Clone)]
pub struct BackTrackNeighbour {
    assignments: Vec<(VariableId, ValueId)>,
    total_value: f64,
    delta: f64,
    stats: Option<Arc<ConflictStatistics>>,
}

impl BackTrackNeighbour {
    pub(crate) fn new(
        assignments: Vec<(VariableId, ValueId)>,
        total_value: f64,
        delta: f64,
        stats: Option<Arc<ConflictStatistics>>,
    ) -> Self {
        Self {
            assignments,
            total_value,
            delta,
            stats,
        }
    }

    /// The (variable, value) pairs this neighbour reassigns.
    pub fn assignments(&self) -> &[(VariableId, ValueId)] {
        &self.assignments
    }

    /// Total value of the model at the point this resolution was found.
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Change of the total value caused by applying this neighbour.
    pub fn value(&self) -> f64 {
        self.delta
    }
}

impl<P> Neighbour<P> for BackTrackNeighbour {
    fn value(&self) -> f64 {
        self.delta
    }

    fn assign(&self, model: &mut Model<P>, iteration: u64) {
        for (i, &(variable, _)) in self.assignments.iter().enumerate() {
            if let Some(old) = model.assignment(variable) {
                if i > 0 {
                    if let Some(stats) = &self.stats {
                        stats.record(
                            iteration,
                            model.value(old),
                            model.value(self.assignments[0].1),
                        );
                    }
                }
                model.unassign(iteration, variable);
            }
        }
        for &(_, value) in &self.assignments {
            model.assign(iteration, value);
        }
    }
}

impl std::fmt::Debug for BackTrackNeighbour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackTrackNeighbour")
            .field("assignments", &self.assignments)
            .field("total_value", &self.total_value)
            .field("delta", &self.delta)
            .finish()
    }
}
