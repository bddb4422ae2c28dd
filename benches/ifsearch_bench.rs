//! Criterion benchmarks for the iterative forward search engine.
//!
//! Uses a synthetic room/slot timetable to measure conflict computation
//! and backtracking search overhead independent of any real domain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rustc_hash::FxHashMap;

use ifsearch::backtrack::{BacktrackConfig, BacktrackNeighbourSelection};
use ifsearch::config::SolverConfig;
use ifsearch::model::{ConflictSet, Constraint, Model, Value, ValueId, VariableId};
use ifsearch::solution::Solution;

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

    fn assigned(&mut self, _iteration: u64, value: &Value<u32>) {
        self.occupancy.insert(*value.payload(), value.id());
    }

    fn unassigned(&mut self, _iteration: u64, value: &Value<u32>) {
        self.occupancy.remove(value.payload());
    }
}

/// `nr_lectures` lectures compete for `nr_lectures + 1` slots in one
/// room; all but one lecture start assigned to consecutive slots.
fn timetable(nr_lectures: usize) -> (Model<u32>, Vec<VariableId>) {
    let mut model: Model<u32> = Model::new();
    let vars: Vec<VariableId> = (0..nr_lectures)
        .map(|i| model.add_variable(format!("lecture {i}")))
        .collect();
    for (i, &var) in vars.iter().enumerate() {
        for slot in 0..=nr_lectures as u32 {
            model.add_value(var, format!("l{i}s{slot}"), slot as f64, slot);
        }
    }
    model.add_constraint(OneRoom::over(vars.clone()));
    for (i, &var) in vars.iter().enumerate().skip(1) {
        let value = model.variable(var).domain()[i];
        model.assign(0, value);
    }
    (model, vars)
}

fn bench_conflict_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("conflict_values");
    for size in [10, 50, 200] {
        let (model, vars) = timetable(size);
        let probe = model.variable(vars[0]).domain()[1];
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(model.conflict_values(black_box(probe))));
        });
    }
    group.finish();
}

fn bench_backtrack_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtrack_select");
    for depth in [1u32, 2, 4] {
        let (model, vars) = timetable(20);
        let mut solution = Solution::new(model);
        let config = SolverConfig::default()
            .with_backtrack(BacktrackConfig::default().with_depth(depth).with_timeout_ms(0));
        let mut selection: BacktrackNeighbourSelection<u32> =
            BacktrackNeighbourSelection::from_config(&config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(selection.select_neighbour_from(&mut solution, vars[0])));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_conflict_values, bench_backtrack_selection);
criterion_main!(benches);
