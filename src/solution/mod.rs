//! The solution wrapper: a model plus iteration bookkeeping and the best
//! assignment found so far.
//!
//! A [`Solution`] owns a [`Model`] together with a monotonically
//! increasing iteration counter and a snapshot of the best assignment
//! reached during search. The snapshot is only replaced by a strictly
//! better assignment (fewer unassigned variables, or the same number with
//! a lower total value), and it is the one piece of state that survives an
//! interrupted search.

mod neighbour;

pub use neighbour::{Neighbour, SimpleNeighbour};

use crate::model::{Model, ModelInfo};

/// A model under search.
///
/// # Examples
///
/// ```
/// use ifsearch::model::Model;
/// use ifsearch::solution::{SimpleNeighbour, Solution};
///
/// let mut model: Model<()> = Model::new();
/// let x = model.add_variable("x");
/// let x0 = model.add_value(x, "x0", 1.0, ());
/// let mut solution = Solution::new(model);
///
/// solution.apply(&SimpleNeighbour::new(x, x0, 1.0));
/// assert_eq!(solution.iteration(), 1);
/// assert!(solution.save_best());
/// ```
pub struct Solution<P> {
    model: Model<P>,
    iteration: u64,
    best_value: Option<f64>,
    best_iteration: Option<u64>,
    best_unassigned: usize,
    best_complete: bool,
}

impl<P> Solution<P> {
    /// Wraps a model into a fresh solution at iteration zero.
    pub fn new(model: Model<P>) -> Self {
        Self {
            model,
            iteration: 0,
            best_value: None,
            best_iteration: None,
            best_unassigned: usize::MAX,
            best_complete: false,
        }
    }

    /// The wrapped model.
    pub fn model(&self) -> &Model<P> {
        &self.model
    }

    /// Mutable access to the wrapped model.
    pub fn model_mut(&mut self) -> &mut Model<P> {
        &mut self.model
    }

    /// Consumes the solution, returning the model.
    pub fn into_model(self) -> Model<P> {
        self.model
    }

    /// Current iteration. Never decreases.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Applies a neighbour, advancing the iteration counter.
    pub fn apply(&mut self, neighbour: &dyn Neighbour<P>) {
        self.iteration += 1;
        neighbour.assign(&mut self.model, self.iteration);
    }

    /// Total value of the best assignment saved so far.
    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Iteration at which the best assignment was saved.
    pub fn best_iteration(&self) -> Option<u64> {
        self.best_iteration
    }

    /// Whether the best assignment saved so far is complete.
    pub fn is_best_complete(&self) -> bool {
        self.best_complete
    }

    /// Saves the current assignment as the best one if it is strictly
    /// better than the saved snapshot: fewer unassigned variables, or the
    /// same number with a lower total value. Returns whether the snapshot
    /// was replaced.
    pub fn save_best(&mut self) -> bool {
        let unassigned = self.model.nr_unassigned();
        let value = self.model.total_value();
        let better = match self.best_value {
            None => true,
            Some(best) => {
                unassigned < self.best_unassigned
                    || (unassigned == self.best_unassigned && value < best)
            }
        };
        if better {
            self.model.save_best();
            self.best_value = Some(value);
            self.best_iteration = Some(self.iteration);
            self.best_unassigned = unassigned;
            self.best_complete = unassigned == 0;
        }
        better
    }

    /// Discards the saved best assignment.
    pub fn clear_best(&mut self) {
        self.model.clear_best();
        self.best_value = None;
        self.best_iteration = None;
        self.best_unassigned = usize::MAX;
        self.best_complete = false;
    }

    /// Restores the saved best assignment into the current assignment. A
    /// no-op if nothing was saved yet.
    pub fn restore_best(&mut self) {
        if self.best_value.is_some() {
            self.model.restore_best();
        }
    }

    /// Summary of the current model state.
    pub fn info(&self) -> ModelInfo {
        self.model.info()
    }
}
