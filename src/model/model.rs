//! Problem definition and conflict computation.

use std::collections::VecDeque;

use log::warn;

use super::constraint::{ConflictSet, Constraint};
use super::variable::{ConstraintId, Value, ValueId, Variable, VariableId};

/// Summary of the model's current state.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// Number of variables.
    pub nr_variables: usize,
    /// Number of currently assigned variables.
    pub nr_assigned: usize,
    /// Current total value.
    pub total_value: f64,
    /// Number of perturbation variables.
    pub nr_perturbations: usize,
}

/// A problem definition: variables, their values, and constraints.
///
/// The model is the single owner of all search state. Assignments change
/// only through [`assign`](Model::assign) and [`unassign`](Model::unassign);
/// both notify every touching constraint so incremental structures stay
/// consistent. [`assign`](Model::assign) is transactional: currently
/// assigned values in conflict with the incoming value are retracted first,
/// so after the call every hard constraint touching the new value holds.
///
/// # Examples
///
/// ```
/// use ifsearch::model::Model;
///
/// let mut model: Model<u32> = Model::new();
/// let a = model.add_variable("lecture A");
/// let a0 = model.add_value(a, "slot 0", 1.0, 0);
/// let a1 = model.add_value(a, "slot 1", 2.0, 1);
/// model.assign(0, a0);
/// assert_eq!(model.assignment(a), Some(a0));
/// model.assign(1, a1);
/// assert_eq!(model.assignment(a), Some(a1));
/// assert_eq!(model.nr_assigned(), 1);
/// ```
pub struct Model<P> {
    variables: Vec<Variable>,
    values: Vec<Value<P>>,
    constraints: Vec<Box<dyn Constraint<P>>>,
    globals: Vec<Box<dyn Constraint<P>>>,
    nr_assigned: usize,
}

impl<P> Default for Model<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Model<P> {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            values: Vec::new(),
            constraints: Vec::new(),
            globals: Vec::new(),
            nr_assigned: 0,
        }
    }

    /// Adds an unassigned variable with an empty domain.
    pub fn add_variable(&mut self, name: impl Into<String>) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(Variable {
            id,
            name: name.into(),
            domain: Vec::new(),
            constant: false,
            initial: None,
            assigned: None,
            best: None,
            constraints: Vec::new(),
        });
        id
    }

    /// Adds a value to a variable's domain.
    pub fn add_value(
        &mut self,
        variable: VariableId,
        name: impl Into<String>,
        cost: f64,
        payload: P,
    ) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(Value {
            id,
            variable,
            name: name.into(),
            cost,
            penalty: 0.0,
            payload,
        });
        self.variables[variable.index()].domain.push(id);
        id
    }

    /// Sets a value's intrinsic penalty.
    pub fn set_value_penalty(&mut self, value: ValueId, penalty: f64) {
        self.values[value.index()].penalty = penalty;
    }

    /// Marks a variable as constant: search strategies will not displace
    /// its assignment to resolve a conflict.
    pub fn set_constant(&mut self, variable: VariableId, constant: bool) {
        self.variables[variable.index()].constant = constant;
    }

    /// Sets a variable's initial assignment (minimal-perturbation problems).
    pub fn set_initial(&mut self, variable: VariableId, value: ValueId) {
        self.variables[variable.index()].initial = Some(value);
    }

    /// Adds an ordinary constraint and registers it with each of its
    /// variables. Already-assigned touched variables are replayed into the
    /// constraint's `assigned` hook so its incremental state starts
    /// consistent.
    pub fn add_constraint<C: Constraint<P> + 'static>(&mut self, constraint: C) -> ConstraintId {
        let id = ConstraintId(self.constraints.len() as u32);
        let mut constraint: Box<dyn Constraint<P>> = Box::new(constraint);
        let touched: Vec<VariableId> = constraint.variables().to_vec();
        for &v in &touched {
            self.variables[v.index()].constraints.push(id);
            if let Some(value) = self.variables[v.index()].assigned {
                constraint.assigned(0, &self.values[value.index()]);
            }
        }
        self.constraints.push(constraint);
        id
    }

    /// Adds a global constraint, checked against every value regardless of
    /// variable. Already-assigned variables are replayed into its
    /// `assigned` hook.
    pub fn add_global_constraint<C: Constraint<P> + 'static>(&mut self, constraint: C) {
        let mut constraint: Box<dyn Constraint<P>> = Box::new(constraint);
        for var in &self.variables {
            if let Some(value) = var.assigned {
                constraint.assigned(0, &self.values[value.index()]);
            }
        }
        self.globals.push(constraint);
    }

    /// All variables.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// A variable by handle.
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()]
    }

    /// All values.
    pub fn values(&self) -> &[Value<P>] {
        &self.values
    }

    /// A value by handle.
    pub fn value(&self, id: ValueId) -> &Value<P> {
        &self.values[id.index()]
    }

    /// An ordinary constraint by handle.
    pub fn constraint(&self, id: ConstraintId) -> &dyn Constraint<P> {
        self.constraints[id.index()].as_ref()
    }

    /// Number of ordinary constraints.
    pub fn nr_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Number of variables.
    pub fn nr_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of currently assigned variables.
    pub fn nr_assigned(&self) -> usize {
        self.nr_assigned
    }

    /// Number of currently unassigned variables.
    pub fn nr_unassigned(&self) -> usize {
        self.variables.len() - self.nr_assigned
    }

    /// Current assignment of a variable.
    pub fn assignment(&self, variable: VariableId) -> Option<ValueId> {
        self.variables[variable.index()].assigned
    }

    /// Current assignment of a variable, as a value reference.
    pub fn assigned_value(&self, variable: VariableId) -> Option<&Value<P>> {
        self.variables[variable.index()]
            .assigned
            .map(|v| &self.values[v.index()])
    }

    /// Currently assigned variables.
    pub fn assigned_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.variables
            .iter()
            .filter(|v| v.assigned.is_some())
            .map(|v| v.id)
    }

    /// Currently unassigned variables.
    pub fn unassigned_variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.variables
            .iter()
            .filter(|v| v.assigned.is_none())
            .map(|v| v.id)
    }

    /// Perturbation variables: variables with an initial assignment that
    /// are either assigned a different value, or unassigned and unable to
    /// take their initial value without conflicts.
    pub fn perturb_variables(&self) -> Vec<VariableId> {
        let mut out = Vec::new();
        for var in &self.variables {
            let Some(initial) = var.initial else { continue };
            match var.assigned {
                Some(current) => {
                    if current != initial {
                        out.push(var.id);
                    }
                }
                None => {
                    if !self.conflict_values(initial).is_empty() {
                        out.push(var.id);
                    }
                }
            }
        }
        out
    }

    /// The set of currently assigned values that are incompatible with
    /// `value` under every hard constraint touching its variable, plus
    /// every hard global constraint. Pure: does not mutate any state, and
    /// is deterministic for a fixed model state.
    pub fn conflict_values(&self, value: ValueId) -> ConflictSet {
        let value = &self.values[value.index()];
        let mut conflicts = ConflictSet::default();
        for &cid in &self.variables[value.variable.index()].constraints {
            let constraint = &self.constraints[cid.index()];
            if constraint.is_hard() {
                constraint.compute_conflicts(self, value, &mut conflicts);
            }
        }
        for global in &self.globals {
            if global.is_hard() {
                global.compute_conflicts(self, value, &mut conflicts);
            }
        }
        conflicts
    }

    /// Whether assigning `value` would require retracting other
    /// assignments.
    pub fn in_conflict(&self, value: ValueId) -> bool {
        !self.conflict_values(value).is_empty()
    }

    /// Pairwise consistency of two values under the hard constraints that
    /// range over both variables, plus the hard global constraints. Neither
    /// value needs to be assigned.
    pub fn is_pairwise_consistent(&self, a: ValueId, b: ValueId) -> bool {
        let va = &self.values[a.index()];
        let vb = &self.values[b.index()];
        for &cid in &self.variables[va.variable.index()].constraints {
            let constraint = &self.constraints[cid.index()];
            if constraint.is_hard()
                && constraint.variables().contains(&vb.variable)
                && !constraint.is_consistent(va, vb)
            {
                return false;
            }
        }
        for global in &self.globals {
            if global.is_hard() && !global.is_consistent(va, vb) {
                return false;
            }
        }
        true
    }

    /// Sum of the costs of all assigned values plus every constraint's
    /// penalty contribution.
    pub fn total_value(&self) -> f64 {
        let assigned: f64 = self
            .variables
            .iter()
            .filter_map(|v| v.assigned)
            .map(|v| self.values[v.index()].cost)
            .sum();
        let penalties: f64 = self
            .constraints
            .iter()
            .map(|c| c.penalty())
            .chain(self.globals.iter().map(|c| c.penalty()))
            .sum();
        assigned + penalties
    }

    /// Assigns `value` to its variable. Conflicting assignments of other
    /// variables are retracted first, then the variable's own previous
    /// value, so the transaction leaves every hard constraint touching
    /// `value` satisfied. All touched constraints are notified.
    pub fn assign(&mut self, iteration: u64, value: ValueId) {
        let variable = self.values[value.index()].variable;
        let conflicts = self.conflict_values(value);
        let mut conflict_variables: Vec<VariableId> = conflicts
            .into_iter()
            .map(|c| self.values[c.index()].variable)
            .filter(|&v| v != variable)
            .collect();
        conflict_variables.sort_unstable();
        conflict_variables.dedup();
        for v in conflict_variables {
            self.unassign(iteration, v);
        }
        self.unassign(iteration, variable);

        self.variables[variable.index()].assigned = Some(value);
        self.nr_assigned += 1;
        let val = &self.values[value.index()];
        for &cid in &self.variables[variable.index()].constraints {
            self.constraints[cid.index()].assigned(iteration, val);
        }
        for global in self.globals.iter_mut() {
            global.assigned(iteration, val);
        }
    }

    /// Unassigns a variable, notifying all touched constraints. A no-op if
    /// the variable is not assigned.
    pub fn unassign(&mut self, iteration: u64, variable: VariableId) {
        let Some(old) = self.variables[variable.index()].assigned.take() else {
            return;
        };
        self.nr_assigned -= 1;
        let val = &self.values[old.index()];
        for &cid in &self.variables[variable.index()].constraints {
            self.constraints[cid.index()].unassigned(iteration, val);
        }
        for global in self.globals.iter_mut() {
            global.unassigned(iteration, val);
        }
    }

    /// Saves the current assignment as the best one found so far.
    pub fn save_best(&mut self) {
        for var in &mut self.variables {
            var.best = var.assigned;
        }
    }

    /// Clears the best assignment.
    pub fn clear_best(&mut self) {
        for var in &mut self.variables {
            var.best = None;
        }
    }

    /// Restores the best assignment into the current assignment.
    ///
    /// Entries that conflict on first placement are retried after the rest
    /// of the snapshot is in place, with a bounded number of attempts; a
    /// snapshot saved from a consistent state restores without retries.
    pub fn restore_best(&mut self) {
        for i in 0..self.variables.len() {
            self.unassign(0, VariableId(i as u32));
        }
        let mut problems: VecDeque<ValueId> = VecDeque::new();
        for i in 0..self.variables.len() {
            let Some(best) = self.variables[i].best else {
                continue;
            };
            if self.conflict_values(best).is_empty() {
                self.assign(0, best);
            } else {
                problems.push_back(best);
            }
        }
        let mut attempt = 0;
        while let Some(value) = problems.pop_front() {
            attempt += 1;
            if attempt > 100 {
                warn!(
                    "restore best: giving up on {} remaining conflicting assignments",
                    problems.len() + 1
                );
                break;
            }
            let conflicts = self.conflict_values(value);
            if !conflicts.is_empty() {
                warn!(
                    "restore best: assignment {} = {} still conflicts",
                    self.variables[self.values[value.index()].variable.index()].name,
                    self.values[value.index()].name
                );
                for c in conflicts {
                    problems.push_back(c);
                }
            }
            self.assign(0, value);
        }
    }

    /// Summary of the model's current state.
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            nr_variables: self.nr_variables(),
            nr_assigned: self.nr_assigned(),
            total_value: self.total_value(),
            nr_perturbations: self.perturb_variables().len(),
        }
    }
}
