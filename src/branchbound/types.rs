//! Entities, requests, and the branch-and-bound neighbour.

use crate::model::{Model, ValueId, VariableId};
use crate::solution::Neighbour;

/// One sub-request of an entity: a variable to schedule, plus the
/// bookkeeping flags the branch-and-bound search consults.
#[derive(Debug, Clone)]
pub struct Request {
    /// The variable to schedule.
    pub variable: VariableId,

    /// An alternative request only activates while unassigned
    /// non-alternative requests of the entity leave a slot open.
    pub alternative: bool,

    /// A wait-listed request holds its slot in the alternative accounting
    /// even while unassigned.
    pub waitlisted: bool,

    /// Previously selected values, tried before the rest of the domain;
    /// when any of them fits without conflicts, the rest of the domain is
    /// not explored.
    pub selected: Vec<ValueId>,
}

impl Request {
    /// Creates a plain (non-alternative) request over a variable.
    pub fn new(variable: VariableId) -> Self {
        Self {
            variable,
            alternative: false,
            waitlisted: false,
            selected: Vec::new(),
        }
    }

    pub fn with_alternative(mut self, alternative: bool) -> Self {
        self.alternative = alternative;
        self
    }

    pub fn with_waitlisted(mut self, waitlisted: bool) -> Self {
        self.waitlisted = waitlisted;
        self
    }

    pub fn with_selected(mut self, selected: Vec<ValueId>) -> Self {
        self.selected = selected;
        self
    }
}

/// One entity: an ordered list of requests scheduled together, without
/// disturbing any other entity's assignments.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Entity's name, for diagnostics.
    pub name: String,
    /// Ordered requests; the order is the branching order of the search.
    pub requests: Vec<Request>,
}

impl Entity {
    /// Creates an entity over an ordered request list.
    pub fn new(name: impl Into<String>, requests: Vec<Request>) -> Self {
        Self {
            name: name.into(),
            requests,
        }
    }
}

/// The per-entity schedule found by branch-and-bound search.
///
/// Applying the neighbour commits every scheduled entry; a request left
/// without an entry keeps whatever it currently holds. Entries that
/// already hold a different value are retracted and reassigned within the
/// assignment transaction.
#[derive(Debug, Clone)]
pub struct BranchBoundNeighbour {
    assignments: Vec<(VariableId, Option<ValueId>)>,
    value: f64,
}

impl BranchBoundNeighbour {
    pub(crate) fn new(assignments: Vec<(VariableId, Option<ValueId>)>, value: f64) -> Self {
        Self { assignments, value }
    }

    /// The per-request schedule; `None` entries are left untouched.
    pub fn assignments(&self) -> &[(VariableId, Option<ValueId>)] {
        &self.assignments
    }

    /// Number of scheduled requests.
    pub fn nr_assigned(&self) -> usize {
        self.assignments.iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Value (or, in penalty mode, penalty) of the schedule.
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl<P> Neighbour<P> for BranchBoundNeighbour {
    fn value(&self) -> f64 {
        self.value
    }

    fn assign(&self, model: &mut Model<P>, iteration: u64) {
        for &(variable, value) in &self.assignments {
            let Some(value) = value else { continue };
            if model.assignment(variable) != Some(value) {
                model.assign(iteration, value);
            }
        }
    }
}
