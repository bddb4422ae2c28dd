//! Round-robin rotation over registered selections.

use log::debug;

use crate::context::SolverContext;
use crate::selection::NeighbourSelection;
use crate::solution::{Neighbour, Solution};

/// Meta-strategy cycling through a list of registered selections.
///
/// Each call delegates to the currently active selection. When it comes
/// back empty, the rotation advances to the next one, re-initializes it,
/// and retries — looping until some delegate produces a neighbour. The
/// call therefore never returns `None` itself; the contract is that at
/// least one registered delegate is eventually productive, and guarding
/// against all delegates being permanently exhausted is the caller's
/// concern.
pub struct RoundRobinNeighbourSelection<P> {
    selections: Vec<Box<dyn NeighbourSelection<P>>>,
    index: usize,
    context: Option<SolverContext<P>>,
}

impl<P: 'static> RoundRobinNeighbourSelection<P> {
    /// Creates the rotation over the given selections.
    pub fn new(selections: Vec<Box<dyn NeighbourSelection<P>>>) -> Self {
        assert!(
            !selections.is_empty(),
            "at least one neighbour selection required"
        );
        Self {
            selections,
            index: 0,
            context: None,
        }
    }

    /// Appends another selection to the rotation.
    pub fn register(&mut self, selection: Box<dyn NeighbourSelection<P>>) {
        self.selections.push(selection);
    }

    /// Index of the currently active selection.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Number of registered selections.
    pub fn nr_selections(&self) -> usize {
        self.selections.len()
    }

    fn change_selection(&mut self) {
        self.index = (self.index + 1) % self.selections.len();
        debug!("round robin advanced to selection {}", self.index);
        if let Some(ctx) = self.context.clone() {
            self.selections[self.index].init(&ctx);
        }
    }
}

impl<P: 'static> NeighbourSelection<P> for RoundRobinNeighbourSelection<P> {
    fn init(&mut self, ctx: &SolverContext<P>) {
        self.context = Some(ctx.clone());
        self.index = 0;
        self.selections[0].init(ctx);
    }

    fn select_neighbour(&mut self, solution: &mut Solution<P>) -> Option<Box<dyn Neighbour<P>>> {
        loop {
            if let Some(neighbour) = self.selections[self.index].select_neighbour(solution) {
                return Some(neighbour);
            }
            self.change_selection();
        }
    }
}
