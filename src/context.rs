//! Solver context: configuration, extensions, and listeners shared with
//! every strategy at initialization.
//!
//! Extensions are optional capabilities registered by type; strategies
//! look them up during [`init`](crate::selection::NeighbourSelection::init)
//! and simply leave the feature unused when the lookup comes back empty.

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;

use crate::config::SolverConfig;
use crate::model::{Value, VariableId};
use crate::selection::SelectionListener;

/// An optional capability shared between strategies.
pub trait Extension<P>: Send + Sync + 'static {
    /// Extension's name, for diagnostics.
    fn name(&self) -> &str;
}

struct ExtensionEntry<P> {
    any: Arc<dyn Any + Send + Sync>,
    ext: Arc<dyn Extension<P>>,
}

impl<P> Clone for ExtensionEntry<P> {
    fn clone(&self) -> Self {
        Self {
            any: Arc::clone(&self.any),
            ext: Arc::clone(&self.ext),
        }
    }
}

/// By-type registry of extensions.
///
/// Lookup is by concrete type; a missing extension yields `None`, never an
/// error.
pub struct Extensions<P> {
    entries: Vec<ExtensionEntry<P>>,
}

impl<P> Default for Extensions<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P> Clone for Extensions<P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<P: 'static> Extensions<P> {
    /// Registers an extension.
    pub fn register<T: Extension<P>>(&mut self, extension: Arc<T>) {
        self.entries.push(ExtensionEntry {
            any: extension.clone(),
            ext: extension,
        });
    }

    /// Looks up an extension by type.
    pub fn get<T: Extension<P>>(&self) -> Option<Arc<T>> {
        self.entries
            .iter()
            .find_map(|e| Arc::clone(&e.any).downcast::<T>().ok())
    }

    /// Registered extensions, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Extension<P>>> {
        self.entries.iter().map(|e| &e.ext)
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no extension is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Configuration, extensions, and listeners handed to every strategy at
/// initialization.
pub struct SolverContext<P> {
    config: SolverConfig,
    extensions: Extensions<P>,
    listeners: Vec<Arc<dyn SelectionListener<P>>>,
}

impl<P> Clone for SolverContext<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            extensions: self.extensions.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<P: 'static> SolverContext<P> {
    /// Creates a context from a validated configuration.
    pub fn new(config: SolverConfig) -> Result<Self, crate::config::ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            extensions: Extensions::default(),
            listeners: Vec::new(),
        })
    }

    /// The aggregate configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The extension registry.
    pub fn extensions(&self) -> &Extensions<P> {
        &self.extensions
    }

    /// Registers an extension.
    pub fn register_extension<T: Extension<P>>(&mut self, extension: Arc<T>) {
        self.extensions.register(extension);
    }

    /// Registers a selection listener.
    pub fn add_listener(&mut self, listener: Arc<dyn SelectionListener<P>>) {
        self.listeners.push(listener);
    }

    /// Registered selection listeners.
    pub fn listeners(&self) -> &[Arc<dyn SelectionListener<P>>] {
        &self.listeners
    }
}

/// Records how often each variable lost its assignment to another
/// assignment.
///
/// Strategies that retract assignments as part of a composite move (the
/// backtracking neighbour) report each displacement here; the counters can
/// then drive diagnostics or conflict-directed heuristics.
pub struct ConflictStatistics {
    counts: Mutex<FxHashMap<VariableId, u64>>,
}

impl Default for ConflictStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl ConflictStatistics {
    /// Creates an empty statistic.
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(FxHashMap::default()),
        }
    }

    /// Records that `displaced` was unassigned because `because_of` was
    /// assigned.
    pub fn record<P>(&self, _iteration: u64, displaced: &Value<P>, _because_of: &Value<P>) {
        let mut counts = self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *counts.entry(displaced.variable()).or_insert(0) += 1;
    }

    /// How often the given variable lost its assignment.
    pub fn nr_unassignments(&self, variable: VariableId) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&variable)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of recorded displacements.
    pub fn total(&self) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

impl<P: 'static> Extension<P> for ConflictStatistics {
    fn name(&self) -> &str {
        "conflict-statistics"
    }
}

/// Domain-supplied penalty between values held by the same entity, e.g.
/// back-to-back sections on distant campuses. Penalties must be
/// non-negative; search bounds rely on the distance term never improving
/// a schedule.
pub trait PairwiseMetric<P>: Send + Sync {
    /// Penalty intrinsic to a single value.
    fn conflicts(&self, _value: &Value<P>) -> f64 {
        0.0
    }

    /// Penalty incurred when both values are held at once.
    fn pair_conflicts(&self, a: &Value<P>, b: &Value<P>) -> f64;
}

/// Extension wrapping a [`PairwiseMetric`]; consumed by the
/// branch-and-bound selection when weighing an entity's combined schedule.
pub struct DistanceConflicts<P> {
    metric: Arc<dyn PairwiseMetric<P>>,
}

impl<P> DistanceConflicts<P> {
    /// Wraps a metric.
    pub fn new(metric: Arc<dyn PairwiseMetric<P>>) -> Self {
        Self { metric }
    }

    /// Penalty intrinsic to a single value.
    pub fn conflicts(&self, value: &Value<P>) -> f64 {
        self.metric.conflicts(value)
    }

    /// Penalty incurred when both values are held at once.
    pub fn pair_conflicts(&self, a: &Value<P>, b: &Value<P>) -> f64 {
        self.metric.pair_conflicts(a, b)
    }
}

impl<P: Send + Sync + 'static> Extension<P> for DistanceConflicts<P> {
    fn name(&self) -> &str {
        "distance-conflicts"
    }
}
