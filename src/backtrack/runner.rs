//! Depth-bounded backtracking search around one seed variable.
//!
//! # Algorithm
//!
//! 1. Snapshot the number of assigned variables and the total value as the
//!    baseline to beat
//! 2. Starting from a list holding just the seed variable, depth-first:
//!    a. Try every candidate value of the variable at the current index
//!    b. Reject a candidate whose conflicts would overflow the remaining
//!    depth, displace a constant variable, or reopen an already settled
//!    variable
//!    c. Otherwise retract the conflicts, assign the candidate, append the
//!    conflicting variables to a copy of the list, and recurse
//!    d. On return, restore the previous assignments exactly, so sibling
//!    branches start from a clean baseline
//! 3. A state with every listed variable resolved that beats the baseline
//!    (more variables assigned, or equally many at a lower total value)
//!    becomes the candidate neighbour; the best such state wins
//!
//! The wall-clock timeout and the iteration cap are polled at recursion
//! entry: they stop further exploration but never skip restoration, and
//! the best resolution found before the limit is still returned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use super::config::BacktrackConfig;
use super::types::BackTrackNeighbour;
use crate::config::{ConfigError, SolverConfig};
use crate::context::{ConflictStatistics, SolverContext};
use crate::model::{ConflictSet, Model, ValueId, VariableId};
use crate::selection::{NeighbourSelection, VariableSelection};
use crate::solution::{Neighbour, Solution};
use crate::standard::GeneralVariableSelection;

/// Backtracking-based neighbour selection: the best joint reassignment
/// found by a depth-limited backtracking search from a selected variable.
pub struct BacktrackNeighbourSelection<P> {
    config: BacktrackConfig,
    variable_selection: Box<dyn VariableSelection<P>>,
    stats: Option<Arc<ConflictStatistics>>,
    timeout_reached: bool,
    max_iters_reached: bool,
    last_duration: Option<Duration>,
}

impl<P: 'static> BacktrackNeighbourSelection<P> {
    /// Creates the selection with an explicit seed-variable criterion.
    pub fn new(
        config: BacktrackConfig,
        variable_selection: Box<dyn VariableSelection<P>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            variable_selection,
            stats: None,
            timeout_reached: false,
            max_iters_reached: false,
            last_duration: None,
        })
    }

    /// Creates the selection with the general variable criterion.
    pub fn from_config(config: &SolverConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.backtrack.clone(),
            Box::new(GeneralVariableSelection::new(config.standard.clone())?),
        )
    }

    /// Whether the last selection call hit the wall-clock budget.
    pub fn is_timeout_reached(&self) -> bool {
        self.timeout_reached
    }

    /// Whether the last selection call hit the iteration budget.
    pub fn is_max_iters_reached(&self) -> bool {
        self.max_iters_reached
    }

    /// Time the last selection call took.
    pub fn last_duration(&self) -> Option<Duration> {
        self.last_duration
    }

    /// Runs the backtracking search from the given seed variable. The
    /// model is explored in place and restored to its entry state before
    /// the call returns.
    pub fn select_neighbour_from(
        &mut self,
        solution: &mut Solution<P>,
        variable: VariableId,
    ) -> Option<BackTrackNeighbour> {
        let t0 = Instant::now();
        let model = solution.model_mut();
        let baseline_assigned = model.nr_assigned();
        let baseline_value = model.total_value();
        debug!(
            "before backtrack({}): nr_assigned={baseline_assigned}, value={baseline_value}",
            model.variable(variable).name(),
        );

        let mut search = Search {
            model,
            config: &self.config,
            stats: self.stats.clone(),
            t0,
            iters: 0,
            timeout_reached: false,
            max_iters_reached: false,
            baseline_assigned,
            baseline_value,
            best: None,
        };
        search.backtrack(&[variable], 0, self.config.depth);

        self.timeout_reached = search.timeout_reached;
        self.max_iters_reached = search.max_iters_reached;
        let best = search.best;
        self.last_duration = Some(t0.elapsed());
        debug!(
            "after backtrack({}): nr_assigned={}, value={}, neighbour={:?}",
            solution.model().variable(variable).name(),
            solution.model().nr_assigned(),
            solution.model().total_value(),
            best
        );
        best
    }
}

impl<P: 'static> NeighbourSelection<P> for BacktrackNeighbourSelection<P> {
    fn init(&mut self, ctx: &SolverContext<P>) {
        self.variable_selection.init(ctx);
        self.stats = ctx.extensions().get::<ConflictStatistics>();
    }

    fn select_neighbour(&mut self, solution: &mut Solution<P>) -> Option<Box<dyn Neighbour<P>>> {
        let variable = self.variable_selection.select_variable(solution)?;
        self.select_neighbour_from(solution, variable)
            .map(|n| Box::new(n) as Box<dyn Neighbour<P>>)
    }
}

struct Search<'a, P> {
    model: &'a mut Model<P>,
    config: &'a BacktrackConfig,
    stats: Option<Arc<ConflictStatistics>>,
    t0: Instant,
    iters: u64,
    timeout_reached: bool,
    max_iters_reached: bool,
    baseline_assigned: usize,
    baseline_value: f64,
    best: Option<BackTrackNeighbour>,
}

impl<P> Search<'_, P> {
    fn can_continue_evaluation(&self) -> bool {
        !self.timeout_reached && !self.max_iters_reached
    }

    /// A candidate is worth committing only if its conflicts fit the
    /// remaining depth, displace no constant variable, and reopen no
    /// variable settled at or before the current index.
    fn check_bound(
        &self,
        to_resolve: &[VariableId],
        idx: usize,
        depth: u32,
        conflicts: &ConflictSet,
    ) -> bool {
        let nr_unresolved = to_resolve.len() - idx;
        if nr_unresolved + conflicts.len() > depth as usize {
            debug!("  too deep: {} unresolved + {} conflicts", nr_unresolved, conflicts.len());
            return false;
        }
        for &conflict in conflicts {
            let conflict_variable = self.model.value(conflict).variable();
            if self.model.variable(conflict_variable).is_constant() {
                debug!("  conflicts with a constant variable");
                return false;
            }
            if let Some(pos) = to_resolve.iter().position(|&v| v == conflict_variable) {
                if pos <= idx {
                    debug!(
                        "  conflicts with already resolved variable {}",
                        self.model.variable(conflict_variable).name()
                    );
                    return false;
                }
            }
        }
        true
    }

    fn record_if_better(&mut self, to_resolve: &[VariableId]) {
        let assigned = self.model.nr_assigned();
        let value = self.model.total_value();
        let beats_baseline = assigned > self.baseline_assigned
            || (assigned == self.baseline_assigned && value < self.baseline_value);
        if !beats_baseline {
            return;
        }
        let beats_best = match &self.best {
            None => true,
            Some(best) => best.total_value() >= value,
        };
        if beats_best {
            let assignments: Vec<(VariableId, ValueId)> = to_resolve
                .iter()
                .filter_map(|&v| self.model.assignment(v).map(|value| (v, value)))
                .collect();
            self.best = Some(BackTrackNeighbour::new(
                assignments,
                value,
                value - self.baseline_value,
                self.stats.clone(),
            ));
        }
    }

    fn backtrack(&mut self, to_resolve: &[VariableId], idx: usize, depth: u32) {
        if !self.timeout_reached
            && self.config.timeout_ms > 0
            && self.t0.elapsed().as_millis() as u64 > self.config.timeout_ms
        {
            debug!("timeout reached");
            self.timeout_reached = true;
        }
        self.iters += 1;
        if let Some(max_iters) = self.config.max_iters {
            if !self.max_iters_reached && self.iters > max_iters {
                debug!("max iterations reached");
                self.max_iters_reached = true;
            }
        }

        if to_resolve.len() == idx {
            self.record_if_better(to_resolve);
            return;
        }
        if depth == 0 || !self.can_continue_evaluation() {
            return;
        }

        let variable = to_resolve[idx];
        let domain: Vec<ValueId> = self.model.variable(variable).domain().to_vec();
        let current = self.model.assignment(variable);
        for value in domain {
            if !self.can_continue_evaluation() {
                break;
            }
            if Some(value) == current {
                continue;
            }
            let conflicts = self.model.conflict_values(value);
            if !self.check_bound(to_resolve, idx, depth, &conflicts) {
                continue;
            }

            // fixed exploration order for a fixed model state
            let mut conflict_values: Vec<ValueId> = conflicts.into_iter().collect();
            conflict_values.sort_unstable();

            let mut extended = to_resolve.to_vec();
            for &conflict in &conflict_values {
                let conflict_variable = self.model.value(conflict).variable();
                self.model.unassign(0, conflict_variable);
                if !extended.contains(&conflict_variable) {
                    extended.push(conflict_variable);
                }
            }
            if current.is_some() {
                self.model.unassign(0, variable);
            }
            self.model.assign(0, value);

            self.backtrack(&extended, idx + 1, depth - 1);

            // restore the exact entry state for the next sibling
            match current {
                Some(previous) => self.model.assign(0, previous),
                None => self.model.unassign(0, variable),
            }
            for &conflict in &conflict_values {
                self.model.assign(0, conflict);
            }
        }
    }
}
