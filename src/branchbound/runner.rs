//! Per-entity branch-and-bound search.
//!
//! # Algorithm
//!
//! Entities are visited in a shuffled order; for each entity the search
//! walks its ordered request list depth-first, tentatively committing one
//! candidate value per request:
//!
//! 1. Prune a branch when its admissible bound cannot beat the incumbent
//!    (in penalty mode: when it cannot reach more assigned requests, nor
//!    equal count at a lower penalty)
//! 2. Reject a candidate that conflicts with an assignment outside the
//!    entity, with a global veto, or pairwise with an entry committed
//!    earlier in the schedule
//! 3. Prefer previously selected values; when one of them fits without
//!    conflicts, the rest of the domain is not explored
//! 4. When no candidate is conflict-free, recurse with the request left
//!    unassigned, so partial schedules stay reachable
//!
//! The search never mutates the model; only applying the returned
//! neighbour commits the best schedule, leaving other entities untouched.

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::FxHashSet;

use super::config::BranchBoundConfig;
use super::types::{BranchBoundNeighbour, Entity, Request};
use crate::config::ConfigError;
use crate::context::{DistanceConflicts, SolverContext};
use crate::model::{Model, ValueId, VariableId};
use crate::selection::NeighbourSelection;
use crate::solution::{Neighbour, Solution};

/// Branch-and-bound neighbour selection: schedules one entity at a time,
/// each to its optimal per-entity schedule, without unassigning anything
/// belonging to other entities.
pub struct BranchBoundSelection<P> {
    config: BranchBoundConfig,
    entities: Vec<Entity>,
    cursor: usize,
    distance: Option<Arc<DistanceConflicts<P>>>,
    timeout_reached: bool,
}

impl<P: Send + Sync + 'static> BranchBoundSelection<P> {
    /// Creates the selection over the given entities.
    pub fn new(config: BranchBoundConfig, entities: Vec<Entity>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            entities,
            cursor: 0,
            distance: None,
            timeout_reached: false,
        })
    }

    /// Whether the last entity search hit the wall-clock budget.
    pub fn is_timeout_reached(&self) -> bool {
        self.timeout_reached
    }

    /// Builds the search for a single entity against the given model.
    pub fn selection<'a>(&'a self, model: &'a Model<P>, entity: &'a Entity) -> Selection<'a, P> {
        Selection::new(&self.config, model, entity, self.distance.clone())
    }
}

impl<P: Send + Sync + 'static> NeighbourSelection<P> for BranchBoundSelection<P> {
    fn init(&mut self, ctx: &SolverContext<P>) {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::seed_from_u64(rand::random()),
        };
        self.entities.shuffle(&mut rng);
        self.cursor = 0;
        self.distance = ctx.extensions().get::<DistanceConflicts<P>>();
    }

    fn select_neighbour(&mut self, solution: &mut Solution<P>) -> Option<Box<dyn Neighbour<P>>> {
        while self.cursor < self.entities.len() {
            let entity = self.entities[self.cursor].clone();
            self.cursor += 1;
            let mut search = Selection::new(
                &self.config,
                solution.model(),
                &entity,
                self.distance.clone(),
            );
            let neighbour = search.select();
            self.timeout_reached = search.timeout_reached;
            if let Some(neighbour) = neighbour {
                debug!(
                    "branch & bound scheduled entity {} ({} of {} requests)",
                    entity.name,
                    neighbour.nr_assigned(),
                    entity.requests.len()
                );
                return Some(Box::new(neighbour));
            }
        }
        None
    }
}

/// Branch-and-bound search over one entity's ordered request list.
pub struct Selection<'a, P> {
    config: &'a BranchBoundConfig,
    model: &'a Model<P>,
    requests: &'a [Request],
    distance: Option<Arc<DistanceConflicts<P>>>,
    entity_variables: FxHashSet<VariableId>,
    assignment: Vec<Option<ValueId>>,
    best_assignment: Option<Vec<Option<ValueId>>>,
    best_nr_assigned: usize,
    best_value: f64,
    bounds: Vec<f64>,
    t0: Instant,
    timeout_reached: bool,
}

impl<'a, P> Selection<'a, P> {
    fn new(
        config: &'a BranchBoundConfig,
        model: &'a Model<P>,
        entity: &'a Entity,
        distance: Option<Arc<DistanceConflicts<P>>>,
    ) -> Self {
        let entity_variables: FxHashSet<VariableId> =
            entity.requests.iter().map(|r| r.variable).collect();
        // a skipped request contributes nothing, so the per-request bound
        // is the cheaper of zero and the cheapest candidate
        let bounds: Vec<f64> = entity
            .requests
            .iter()
            .map(|request| {
                model
                    .variable(request.variable)
                    .domain()
                    .iter()
                    .map(|&v| {
                        if config.minimize_penalty {
                            model.value(v).penalty()
                        } else {
                            model.value(v).cost()
                        }
                    })
                    .fold(0.0_f64, f64::min)
            })
            .collect();
        Self {
            config,
            model,
            requests: &entity.requests,
            distance,
            entity_variables,
            assignment: vec![None; entity.requests.len()],
            best_assignment: None,
            best_nr_assigned: 0,
            best_value: 0.0,
            bounds,
            t0: Instant::now(),
            timeout_reached: false,
        }
    }

    /// Runs the search, returning the best schedule found.
    pub fn select(&mut self) -> Option<BranchBoundNeighbour> {
        self.t0 = Instant::now();
        self.timeout_reached = false;
        self.back_track(0);
        let best = self.best_assignment.take()?;
        let assignments: Vec<(VariableId, Option<ValueId>)> = self
            .requests
            .iter()
            .zip(best)
            .map(|(request, value)| (request.variable, value))
            .collect();
        Some(BranchBoundNeighbour::new(assignments, self.best_value))
    }

    /// Whether the search hit the wall-clock budget.
    pub fn is_timeout_reached(&self) -> bool {
        self.timeout_reached
    }

    /// Value of the best schedule found.
    pub fn best_value(&self) -> f64 {
        self.best_value
    }

    fn distance_term(&self, idx: usize, value: ValueId) -> f64 {
        let Some(distance) = &self.distance else {
            return 0.0;
        };
        let value = self.model.value(value);
        let mut term = distance.conflicts(value);
        for x in 0..idx {
            if let Some(committed) = self.assignment[x] {
                term += distance.pair_conflicts(self.model.value(committed), value);
            }
        }
        self.config.distance_weight * term
    }

    fn contribution(&self, idx: usize, value: ValueId) -> f64 {
        let intrinsic = if self.config.minimize_penalty {
            self.model.value(value).penalty()
        } else {
            self.model.value(value).cost()
        };
        intrinsic + self.distance_term(idx, value)
    }

    /// Summed value (or penalty) of the committed schedule.
    fn current_value(&self) -> f64 {
        (0..self.assignment.len())
            .filter_map(|i| self.assignment[i].map(|v| self.contribution(i, v)))
            .sum()
    }

    fn nr_assigned(&self) -> usize {
        self.assignment.iter().flatten().count()
    }

    /// Admissible lower bound on the schedule value reachable from `idx`:
    /// the committed prefix at face value, plus each remaining request's
    /// cheapest contribution — alternatives counted only while open
    /// non-alternative slots remain.
    fn bound(&self, idx: usize) -> f64 {
        let mut bound = 0.0;
        let mut open_alternatives = 0i32;
        for (i, request) in self.requests.iter().enumerate() {
            if i < idx {
                if let Some(value) = self.assignment[i] {
                    bound += self.contribution(i, value);
                }
                if request.alternative {
                    if self.assignment[i].is_some() || request.waitlisted {
                        open_alternatives -= 1;
                    }
                } else if !request.waitlisted && self.assignment[i].is_none() {
                    open_alternatives += 1;
                }
            } else if !request.alternative {
                bound += self.bounds[i];
            } else if open_alternatives > 0 {
                bound += self.bounds[i];
                open_alternatives -= 1;
            }
        }
        bound
    }

    /// Upper bound on the number of assigned requests reachable from
    /// `idx`, with the same alternative accounting.
    fn assigned_upper_bound(&self, idx: usize) -> usize {
        let mut count = 0;
        let mut open_alternatives = 0i32;
        for (i, request) in self.requests.iter().enumerate() {
            if i < idx {
                if self.assignment[i].is_some() {
                    count += 1;
                }
                if request.alternative {
                    if self.assignment[i].is_some() || request.waitlisted {
                        open_alternatives -= 1;
                    }
                } else if !request.waitlisted && self.assignment[i].is_none() {
                    open_alternatives += 1;
                }
            } else if self.model.variable(request.variable).has_values() {
                if !request.alternative {
                    count += 1;
                } else if open_alternatives > 0 {
                    count += 1;
                    open_alternatives -= 1;
                }
            }
        }
        count
    }

    fn prune(&self, idx: usize) -> bool {
        if self.best_assignment.is_none() {
            return false;
        }
        if self.config.minimize_penalty {
            let reachable = self.assigned_upper_bound(idx);
            reachable < self.best_nr_assigned
                || (reachable == self.best_nr_assigned && self.bound(idx) >= self.best_value)
        } else {
            self.bound(idx) >= self.best_value
        }
    }

    /// First reason the candidate cannot join the schedule: a global veto
    /// (the candidate conflicts with itself), a conflict escaping the
    /// entity, or a pairwise clash with an already committed entry.
    fn first_conflict(&self, value: ValueId) -> Option<ValueId> {
        let conflicts = self.model.conflict_values(value);
        if conflicts.contains(&value) {
            return Some(value);
        }
        for &conflict in &conflicts {
            if !self
                .entity_variables
                .contains(&self.model.value(conflict).variable())
            {
                return Some(conflict);
            }
        }
        for &committed in self.assignment.iter().flatten() {
            if !self.model.is_pairwise_consistent(committed, value) {
                return Some(committed);
            }
        }
        None
    }

    /// An alternative request activates only while open non-alternative
    /// slots remain.
    fn can_assign(&self, request: &Request, idx: usize) -> bool {
        if !request.alternative || self.assignment[idx].is_some() {
            return true;
        }
        let mut open = 0i32;
        for (i, other) in self.requests.iter().enumerate() {
            if i == idx {
                continue;
            }
            if other.alternative {
                if self.assignment[i].is_some() || other.waitlisted {
                    open -= 1;
                }
            } else if !other.waitlisted && self.assignment[i].is_none() {
                open += 1;
            }
        }
        open > 0
    }

    fn save_best(&mut self) {
        self.best_value = self.current_value();
        self.best_nr_assigned = self.nr_assigned();
        self.best_assignment = Some(self.assignment.clone());
    }

    fn leaf_is_better(&self) -> bool {
        if self.best_assignment.is_none() {
            return true;
        }
        if self.config.minimize_penalty {
            let assigned = self.nr_assigned();
            assigned > self.best_nr_assigned
                || (assigned == self.best_nr_assigned && self.current_value() < self.best_value)
        } else {
            self.current_value() < self.best_value
        }
    }

    fn back_track(&mut self, idx: usize) {
        if self.config.timeout_ms > 0
            && self.t0.elapsed().as_millis() as u64 > self.config.timeout_ms
        {
            self.timeout_reached = true;
            return;
        }
        if self.prune(idx) {
            return;
        }
        if idx == self.requests.len() {
            if self.leaf_is_better() {
                self.save_best();
            }
            return;
        }

        let requests = self.requests;
        let request = &requests[idx];
        if !self.can_assign(request, idx) {
            self.back_track(idx + 1);
            return;
        }

        if !request.selected.is_empty() {
            let mut has_no_conflict_value = false;
            for &value in &request.selected {
                if self.timeout_reached {
                    break;
                }
                if self.first_conflict(value).is_some() {
                    continue;
                }
                has_no_conflict_value = true;
                self.assignment[idx] = Some(value);
                self.back_track(idx + 1);
                self.assignment[idx] = None;
            }
            if has_no_conflict_value {
                return;
            }
        }

        let domain: &[ValueId] = self.model.variable(request.variable).domain();
        let mut has_no_conflict_value = false;
        for &value in domain {
            if self.timeout_reached {
                break;
            }
            if self.first_conflict(value).is_some() {
                continue;
            }
            has_no_conflict_value = true;
            self.assignment[idx] = Some(value);
            self.back_track(idx + 1);
            self.assignment[idx] = None;
        }
        // partial schedules stay reachable: always when maximizing the
        // assigned count, otherwise only once no candidate fits
        if !has_no_conflict_value || self.config.minimize_penalty {
            self.back_track(idx + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::context::PairwiseMetric;
    use crate::model::{ConflictSet, Constraint, Value};
    use rustc_hash::FxHashMap;

    // One room shared by all its variables: two assignments may not use
    // the same slot.
    struct OneRoom {
        variables: Vec<VariableId>,
        occupancy: FxHashMap<u32, ValueId>,
    }

    impl OneRoom {
        fn over(variables: Vec<VariableId>) -> Self {
            Self {
                variables,
                occupancy: FxHashMap::default(),
            }
        }
    }

    impl Constraint<u32> for OneRoom {
        fn name(&self) -> &str {
            "room"
        }

        fn variables(&self) -> &[VariableId] {
            &self.variables
        }

        fn compute_conflicts(
            &self,
            model: &Model<u32>,
            value: &Value<u32>,
            conflicts: &mut ConflictSet,
        ) {
            if let Some(&occupant) = self.occupancy.get(value.payload()) {
                if model.value(occupant).variable() != value.variable() {
                    conflicts.insert(occupant);
                }
            }
        }

        fn is_consistent(&self, a: &Value<u32>, b: &Value<u32>) -> bool {
            a.variable() == b.variable() || a.payload() != b.payload()
        }

        fn assigned(&mut self, _iteration: u64, value: &Value<u32>) {
            self.occupancy.insert(*value.payload(), value.id());
        }

        fn unassigned(&mut self, _iteration: u64, value: &Value<u32>) {
            self.occupancy.remove(value.payload());
        }
    }

    struct Fixture {
        model: Model<u32>,
        vars: Vec<VariableId>,
    }

    /// `candidates[i]` lists `(slot, cost)` pairs for variable `i`; every
    /// variable shares one room, so equal slots clash.
    fn fixture(candidates: &[&[(u32, f64)]]) -> Fixture {
        let mut model: Model<u32> = Model::new();
        let vars: Vec<VariableId> = (0..candidates.len())
            .map(|i| model.add_variable(format!("r{i}")))
            .collect();
        for (i, &var_candidates) in candidates.iter().enumerate() {
            for &(slot, cost) in var_candidates {
                model.add_value(vars[i], format!("r{i}s{slot}"), cost, slot);
            }
        }
        model.add_constraint(OneRoom::over(vars.clone()));
        Fixture { model, vars }
    }

    fn entity_of(vars: &[VariableId]) -> Entity {
        Entity::new("student", vars.iter().map(|&v| Request::new(v)).collect())
    }

    #[test]
    fn test_finds_minimal_cost_combination() {
        // r0: cost 1 (slot 0) or cost 5 (slot 9)
        // r1: cost 2 (slot 9) or cost 3 (slot 3)
        // the (5, 2) pair collides on slot 9, so the optimum is (1, 2)
        let Fixture { model, vars } = fixture(&[
            &[(0, 1.0), (9, 5.0)],
            &[(9, 2.0), (3, 3.0)],
        ]);
        let mut solution = Solution::new(model);

        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity_of(&vars)],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        assert!((neighbour.value() - 3.0).abs() < 1e-12);
        solution.apply(neighbour.as_ref());
        let r0 = solution.model().assigned_value(vars[0]).unwrap();
        let r1 = solution.model().assigned_value(vars[1]).unwrap();
        assert!((r0.cost() - 1.0).abs() < 1e-12);
        assert!((r1.cost() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_degrades_to_partial_schedule_on_external_conflict() {
        // an external (constant) lecture pins slot 5, which is r1's only
        // candidate; r1 must be left unscheduled
        let Fixture { mut model, vars } = fixture(&[
            &[(0, 1.0), (1, 5.0)],
            &[(5, 2.0)],
            &[(5, 0.0)],
        ]);
        let external = model.variable(vars[2]).domain()[0];
        model.assign(0, external);
        model.set_constant(vars[2], true);
        let mut solution = Solution::new(model);

        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity_of(&vars[0..2])],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        solution.apply(neighbour.as_ref());
        assert_eq!(solution.model().assignment(vars[1]), None);
        assert_eq!(solution.model().assignment(vars[2]), Some(external));
        let r0 = solution.model().assigned_value(vars[0]).unwrap();
        assert!((r0.cost() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_never_disturbs_other_entities() {
        // both of r0's slots are taken by another entity's lectures
        let Fixture { mut model, vars } = fixture(&[
            &[(0, 1.0), (1, 1.0)],
            &[(0, 0.0)],
            &[(1, 0.0)],
        ]);
        let other_a = model.variable(vars[1]).domain()[0];
        let other_b = model.variable(vars[2]).domain()[0];
        model.assign(0, other_a);
        model.assign(0, other_b);
        let mut solution = Solution::new(model);

        let neighbour = {
            let mut selection = BranchBoundSelection::new(
                BranchBoundConfig::default().with_seed(42),
                vec![entity_of(&vars[0..1])],
            )
            .unwrap();
            let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
            selection.init(&ctx);
            selection.select_neighbour(&mut solution)
        };

        // the only leaf leaves r0 unscheduled; applying it changes nothing
        if let Some(neighbour) = neighbour {
            solution.apply(neighbour.as_ref());
        }
        assert_eq!(solution.model().assignment(vars[1]), Some(other_a));
        assert_eq!(solution.model().assignment(vars[2]), Some(other_b));
        assert_eq!(solution.model().assignment(vars[0]), None);
    }

    #[test]
    fn test_penalty_mode_maximizes_assignments_first() {
        // r0 and r1 clash on slot 0; value mode keeps the cheaper one,
        // penalty mode also keeps one but picks the lower penalty
        let Fixture { mut model, vars } = fixture(&[&[(0, 1.0)], &[(0, 2.0)]]);
        let r0v = model.variable(vars[0]).domain()[0];
        let r1v = model.variable(vars[1]).domain()[0];
        model.set_value_penalty(r0v, 3.0);
        model.set_value_penalty(r1v, 1.0);
        let mut solution = Solution::new(model);

        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_minimize_penalty(true).with_seed(42),
            vec![entity_of(&vars)],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        assert!((neighbour.value() - 1.0).abs() < 1e-12);
        solution.apply(neighbour.as_ref());
        assert_eq!(solution.model().assignment(vars[1]), Some(r1v));
        assert_eq!(solution.model().assignment(vars[0]), None);
    }

    #[test]
    fn test_value_mode_on_same_clash_keeps_cheapest() {
        let Fixture { model, vars } = fixture(&[&[(0, 1.0)], &[(0, 2.0)]]);
        let mut solution = Solution::new(model);

        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity_of(&vars)],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        solution.apply(neighbour.as_ref());
        let r0 = solution.model().assignment(vars[0]);
        assert!(r0.is_some());
        assert_eq!(solution.model().assignment(vars[1]), None);
    }

    #[test]
    fn test_alternative_activates_only_when_primary_fails() {
        // the primary's only candidate clashes with an external constant;
        // the alternative steps in
        let Fixture { mut model, vars } = fixture(&[
            &[(5, 1.0)],
            &[(1, 2.0)],
            &[(5, 0.0)],
        ]);
        let external = model.variable(vars[2]).domain()[0];
        model.assign(0, external);
        model.set_constant(vars[2], true);
        let mut solution = Solution::new(model);

        let entity = Entity::new(
            "student",
            vec![
                Request::new(vars[0]),
                Request::new(vars[1]).with_alternative(true),
            ],
        );
        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        solution.apply(neighbour.as_ref());
        assert_eq!(solution.model().assignment(vars[0]), None);
        assert!(solution.model().assignment(vars[1]).is_some());
    }

    #[test]
    fn test_alternative_stays_idle_when_primary_succeeds() {
        let Fixture { model, vars } = fixture(&[&[(0, 1.0)], &[(1, 2.0)]]);
        let mut solution = Solution::new(model);

        let entity = Entity::new(
            "student",
            vec![
                Request::new(vars[0]),
                Request::new(vars[1]).with_alternative(true),
            ],
        );
        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        solution.apply(neighbour.as_ref());
        assert!(solution.model().assignment(vars[0]).is_some());
        assert_eq!(solution.model().assignment(vars[1]), None);
    }

    #[test]
    fn test_selected_values_short_circuit_the_domain() {
        let Fixture { model, vars } = fixture(&[&[(0, 1.0), (1, 9.0)]]);
        let preferred = model.variable(vars[0]).domain()[1];
        let mut solution = Solution::new(model);

        let entity = Entity::new(
            "student",
            vec![Request::new(vars[0]).with_selected(vec![preferred])],
        );
        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        // the conflict-free selected value wins even though a cheaper
        // candidate exists
        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        solution.apply(neighbour.as_ref());
        assert_eq!(solution.model().assignment(vars[0]), Some(preferred));
    }

    #[test]
    fn test_distance_conflicts_steer_the_schedule() {
        struct SlotGap;
        impl PairwiseMetric<u32> for SlotGap {
            fn pair_conflicts(&self, a: &Value<u32>, b: &Value<u32>) -> f64 {
                // slots 0 and 2 together are penalized
                if (*a.payload(), *b.payload()) == (0, 2) || (*a.payload(), *b.payload()) == (2, 0)
                {
                    5.0
                } else {
                    0.0
                }
            }
        }

        let Fixture { model, vars } = fixture(&[&[(0, 0.0), (1, 0.0)], &[(2, 0.0)]]);
        let expected = model.variable(vars[0]).domain()[1];
        let mut solution = Solution::new(model);

        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity_of(&vars)],
        )
        .unwrap();
        let mut ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        ctx.register_extension(Arc::new(DistanceConflicts::new(Arc::new(SlotGap))));
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        assert!(neighbour.value().abs() < 1e-12);
        solution.apply(neighbour.as_ref());
        assert_eq!(solution.model().assignment(vars[0]), Some(expected));
    }

    #[test]
    fn test_entities_are_scheduled_one_per_call() {
        let Fixture { model, vars } = fixture(&[&[(0, 1.0)], &[(1, 1.0)]]);
        let mut solution = Solution::new(model);

        let entities = vec![entity_of(&vars[0..1]), entity_of(&vars[1..2])];
        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            entities,
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let first = selection.select_neighbour(&mut solution).unwrap();
        solution.apply(first.as_ref());
        let second = selection.select_neighbour(&mut solution).unwrap();
        solution.apply(second.as_ref());
        assert!(selection.select_neighbour(&mut solution).is_none());
        assert!(!selection.is_timeout_reached());
        assert_eq!(solution.model().nr_assigned(), 2);
    }

    #[test]
    fn test_bound_prunes_but_keeps_the_optimum() {
        // negative costs engage the bound: the first leaf is already
        // good, and the bound must still let the true optimum through
        let Fixture { model, vars } = fixture(&[
            &[(0, -1.0), (1, -4.0)],
            &[(2, -2.0), (3, -1.0)],
        ]);
        let mut solution = Solution::new(model);

        let mut selection = BranchBoundSelection::new(
            BranchBoundConfig::default().with_seed(42),
            vec![entity_of(&vars)],
        )
        .unwrap();
        let ctx: SolverContext<u32> = SolverContext::new(SolverConfig::default()).unwrap();
        selection.init(&ctx);

        let neighbour = selection.select_neighbour(&mut solution).unwrap();
        assert!((neighbour.value() - (-6.0)).abs() < 1e-12);
        solution.apply(neighbour.as_ref());
        assert!((solution.model().total_value() - (-6.0)).abs() < 1e-12);
    }
}
