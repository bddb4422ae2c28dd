//! Greedy single-step selection.
//!
//! # Algorithm
//!
//! 1. Pick a variable via the composed [`VariableSelection`]
//! 2. Pick a value for it via the composed [`ValueSelection`]
//! 3. Package the pair as a [`SimpleNeighbour`]
//!
//! Either step may come back empty (or be vetoed by a listener), in which
//! case the whole selection reports "no candidate this round".

use std::sync::Arc;

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use super::config::StandardConfig;
use crate::config::ConfigError;
use crate::context::SolverContext;
use crate::model::{ValueId, VariableId};
use crate::selection::{
    NeighbourSelection, SelectionListener, ValueSelection, VariableSelection,
};
use crate::solution::{Neighbour, SimpleNeighbour, Solution};

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::seed_from_u64(rand::random()),
    }
}

/// General variable selection criterion.
///
/// With every variable assigned, one of the perturbation variables is
/// picked at random (falling back to any assigned variable). Otherwise an
/// unassigned variable is picked uniformly at random, or — with
/// `random_selection` off — through the minimal-perturbation roulette
/// wheel. With `unassign_when_no_good`, an unassigned variable with an
/// empty domain redirects the choice to an assigned variable so the dead
/// end can be opened up.
pub struct GeneralVariableSelection {
    config: StandardConfig,
    rng: SmallRng,
}

impl GeneralVariableSelection {
    /// Creates the criterion from a validated configuration.
    pub fn new(config: StandardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = make_rng(config.seed);
        Ok(Self { config, rng })
    }

    fn select_for_dead_end<P>(
        &mut self,
        solution: &Solution<P>,
        dead_ends: &[VariableId],
    ) -> Option<VariableId> {
        let model = solution.model();
        if self.rng.random_bool(self.config.no_good_random_walk) {
            let assigned: Vec<VariableId> = model.assigned_variables().collect();
            if let Some(&v) = assigned.choose(&mut self.rng) {
                return Some(v);
            }
        }
        for _ in 0..10 {
            let Some(&dead) = dead_ends.choose(&mut self.rng) else {
                break;
            };
            let linked: Vec<VariableId> = model
                .variable(dead)
                .constraints()
                .iter()
                .flat_map(|&c| model.constraint(c).variables().iter().copied())
                .filter(|&v| v != dead && model.assignment(v).is_some())
                .collect();
            if let Some(&v) = linked.choose(&mut self.rng) {
                return Some(v);
            }
        }
        None
    }
}

impl<P> VariableSelection<P> for GeneralVariableSelection {
    fn select_variable(&mut self, solution: &Solution<P>) -> Option<VariableId> {
        let model = solution.model();
        if model.nr_variables() == 0 {
            return None;
        }
        if model.nr_unassigned() == 0 {
            let perturbed = model.perturb_variables();
            if let Some(&v) = perturbed.choose(&mut self.rng) {
                return Some(v);
            }
            let assigned: Vec<VariableId> = model.assigned_variables().collect();
            return assigned.choose(&mut self.rng).copied();
        }

        let unassigned: Vec<VariableId> = model.unassigned_variables().collect();
        if self.config.unassign_when_no_good {
            let dead_ends: Vec<VariableId> = unassigned
                .iter()
                .copied()
                .filter(|&v| !model.variable(v).has_values())
                .collect();
            if !dead_ends.is_empty() {
                if let Some(v) = self.select_for_dead_end(solution, &dead_ends) {
                    return Some(v);
                }
            }
        }

        if self.config.random_selection {
            return unassigned.choose(&mut self.rng).copied();
        }

        // minimal-perturbation roulette wheel
        let weights: Vec<u64> = unassigned
            .iter()
            .map(|&v| match model.variable(v).initial() {
                Some(initial) => 3 * (1 + model.conflict_values(initial).len() as u64),
                None => 1,
            })
            .collect();
        let total: u64 = weights.iter().sum();
        let mut roll = self.rng.random_range(0..total);
        for (&v, &w) in unassigned.iter().zip(&weights) {
            if roll < w {
                return Some(v);
            }
            roll -= w;
        }
        unassigned.last().copied()
    }
}

/// General value selection criterion.
///
/// With `random_walk_prob` probability a random domain value is picked;
/// otherwise the candidate causing the fewest conflicts wins, ties broken
/// by lower cost and then at random. The variable's current assignment is
/// never proposed again.
pub struct GeneralValueSelection {
    config: StandardConfig,
    rng: SmallRng,
}

impl GeneralValueSelection {
    /// Creates the criterion from a validated configuration.
    pub fn new(config: StandardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = make_rng(config.seed);
        Ok(Self { config, rng })
    }
}

impl<P> ValueSelection<P> for GeneralValueSelection {
    fn select_value(
        &mut self,
        solution: &Solution<P>,
        variable: VariableId,
    ) -> Option<ValueId> {
        let model = solution.model();
        let domain = model.variable(variable).domain();
        if domain.is_empty() {
            return None;
        }
        let current = model.assignment(variable);

        if self.rng.random_bool(self.config.random_walk_prob) {
            return domain.choose(&mut self.rng).copied();
        }

        let mut best: Vec<ValueId> = Vec::new();
        let mut best_conflicts = usize::MAX;
        let mut best_cost = f64::INFINITY;
        for &candidate in domain {
            if Some(candidate) == current {
                continue;
            }
            let conflicts = model.conflict_values(candidate).len();
            let cost = model.value(candidate).cost();
            if conflicts < best_conflicts
                || (conflicts == best_conflicts && cost < best_cost - 1e-12)
            {
                best.clear();
                best.push(candidate);
                best_conflicts = conflicts;
                best_cost = cost;
            } else if conflicts == best_conflicts && (cost - best_cost).abs() <= 1e-12 {
                best.push(candidate);
            }
        }
        best.choose(&mut self.rng).copied()
    }
}

/// Greedy single-step neighbour selection composing a variable criterion
/// with a value criterion.
pub struct StandardNeighbourSelection<P> {
    variable_selection: Box<dyn VariableSelection<P>>,
    value_selection: Box<dyn ValueSelection<P>>,
    listeners: Vec<Arc<dyn SelectionListener<P>>>,
}

impl<P: 'static> StandardNeighbourSelection<P> {
    /// Composes explicit variable and value criteria.
    pub fn new(
        variable_selection: Box<dyn VariableSelection<P>>,
        value_selection: Box<dyn ValueSelection<P>>,
    ) -> Self {
        Self {
            variable_selection,
            value_selection,
            listeners: Vec::new(),
        }
    }

    /// Composes the general criteria from a configuration.
    pub fn from_config(config: StandardConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Box::new(GeneralVariableSelection::new(config.clone())?),
            Box::new(GeneralValueSelection::new(config)?),
        ))
    }

    /// Picks the variable to reassign: delegates to the variable
    /// criterion, rejects variables with an empty domain, and lets
    /// listeners veto the choice.
    pub fn select_variable(&mut self, solution: &Solution<P>) -> Option<VariableId> {
        let variable = self.variable_selection.select_variable(solution)?;
        if !solution.model().variable(variable).has_values() {
            debug!(
                "variable {} has no values in its domain",
                solution.model().variable(variable).name()
            );
            return None;
        }
        for listener in &self.listeners {
            if !listener.variable_selected(solution.iteration(), variable) {
                return None;
            }
        }
        Some(variable)
    }

    /// Picks a value for the chosen variable: delegates to the value
    /// criterion and lets listeners veto the choice.
    pub fn select_value(
        &mut self,
        solution: &Solution<P>,
        variable: VariableId,
    ) -> Option<ValueId> {
        let Some(value) = self.value_selection.select_value(solution, variable) else {
            debug!(
                "no value selected for variable {}",
                solution.model().variable(variable).name()
            );
            return None;
        };
        for listener in &self.listeners {
            if !listener.value_selected(solution.iteration(), variable, value) {
                return None;
            }
        }
        Some(value)
    }
}

impl<P: 'static> NeighbourSelection<P> for StandardNeighbourSelection<P> {
    fn init(&mut self, ctx: &SolverContext<P>) {
        self.variable_selection.init(ctx);
        self.value_selection.init(ctx);
        self.listeners = ctx.listeners().to_vec();
    }

    fn select_neighbour(&mut self, solution: &mut Solution<P>) -> Option<Box<dyn Neighbour<P>>> {
        let variable = self.select_variable(solution)?;
        let value = self.select_value(solution, variable)?;
        let model = solution.model();
        let old_cost = model.assigned_value(variable).map_or(0.0, |v| v.cost());
        let delta = model.value(value).cost() - old_cost;
        Some(Box::new(SimpleNeighbour::new(variable, value, delta)))
    }
}
