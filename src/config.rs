//! Aggregate configuration and the strategy registry.
//!
//! Each strategy module owns its config struct (defaults, builder methods,
//! `validate()`); [`SolverConfig`] bundles them so a whole engine setup can
//! be validated, serialized, and handed around as one value. The
//! [`SelectionRegistry`] maps strategy names to constructor closures —
//! strategies are constructed explicitly from configuration, and an
//! unknown name fails construction outright.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::backtrack::{BacktrackConfig, BacktrackNeighbourSelection};
use crate::branchbound::BranchBoundConfig;
use crate::selection::NeighbourSelection;
use crate::standard::{StandardConfig, StandardNeighbourSelection};

/// A configuration or strategy-construction error. Fatal at
/// initialization: the engine cannot operate with an invalid setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config field is out of its valid range.
    #[error("{field} must be {requirement}, got {value}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// What the field must satisfy.
        requirement: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A strategy name has no registered constructor.
    #[error("unknown neighbour selection strategy `{0}`")]
    UnknownStrategy(String),
}

/// Aggregate of all strategy configurations.
///
/// # Examples
///
/// ```
/// use ifsearch::config::SolverConfig;
/// use ifsearch::backtrack::BacktrackConfig;
///
/// let config = SolverConfig::default()
///     .with_backtrack(BacktrackConfig::default().with_depth(2).with_timeout_ms(1000));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Single-step selection options.
    pub standard: StandardConfig,
    /// Backtracking search options.
    pub backtrack: BacktrackConfig,
    /// Branch-and-bound options.
    pub branch_bound: BranchBoundConfig,
}

impl SolverConfig {
    /// Replaces the single-step selection options.
    pub fn with_standard(mut self, standard: StandardConfig) -> Self {
        self.standard = standard;
        self
    }

    /// Replaces the backtracking search options.
    pub fn with_backtrack(mut self, backtrack: BacktrackConfig) -> Self {
        self.backtrack = backtrack;
        self
    }

    /// Replaces the branch-and-bound options.
    pub fn with_branch_bound(mut self, branch_bound: BranchBoundConfig) -> Self {
        self.branch_bound = branch_bound;
        self
    }

    /// Validates every contained configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.standard.validate()?;
        self.backtrack.validate()?;
        self.branch_bound.validate()?;
        Ok(())
    }
}

/// Constructor closure for a named strategy.
pub type SelectionFactory<P> =
    Box<dyn Fn(&SolverConfig) -> Result<Box<dyn NeighbourSelection<P>>, ConfigError>>;

/// Explicit mapping from strategy names to constructors.
///
/// The built-in names are `"standard"` and `"backtrack"`; consumers
/// register their own strategies alongside. Creating an unregistered name
/// is a fatal [`ConfigError::UnknownStrategy`].
pub struct SelectionRegistry<P> {
    factories: FxHashMap<String, SelectionFactory<P>>,
}

impl<P: 'static> Default for SelectionRegistry<P> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl<P: 'static> SelectionRegistry<P> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Creates a registry with the built-in strategies registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("standard", |config: &SolverConfig| {
            Ok(Box::new(StandardNeighbourSelection::from_config(
                config.standard.clone(),
            )?) as Box<dyn NeighbourSelection<P>>)
        });
        registry.register("backtrack", |config: &SolverConfig| {
            Ok(
                Box::new(BacktrackNeighbourSelection::from_config(config)?)
                    as Box<dyn NeighbourSelection<P>>,
            )
        });
        registry
    }

    /// Registers a constructor under a name, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&SolverConfig) -> Result<Box<dyn NeighbourSelection<P>>, ConfigError> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Constructs the named strategy from the given configuration.
    pub fn create(
        &self,
        name: &str,
        config: &SolverConfig,
    ) -> Result<Box<dyn NeighbourSelection<P>>, ConfigError> {
        match self.factories.get(name) {
            Some(factory) => factory(config),
            None => Err(ConfigError::UnknownStrategy(name.to_string())),
        }
    }

    /// Registered strategy names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_subconfig() {
        let config = SolverConfig::default()
            .with_standard(StandardConfig::default().with_no_good_random_walk(1.5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_registry_builtins() {
        let registry: SelectionRegistry<()> = SelectionRegistry::with_builtins();
        let config = SolverConfig::default();
        assert!(registry.create("standard", &config).is_ok());
        assert!(registry.create("backtrack", &config).is_ok());
    }

    #[test]
    fn test_registry_unknown_strategy_is_fatal() {
        let registry: SelectionRegistry<()> = SelectionRegistry::with_builtins();
        let err = registry
            .create("simulated-annealing", &SolverConfig::default())
            .err();
        assert!(matches!(err, Some(ConfigError::UnknownStrategy(name)) if name == "simulated-annealing"));
    }

    #[test]
    fn test_registry_custom_strategy() {
        use crate::solution::{Neighbour, Solution};

        struct Idle;
        impl NeighbourSelection<()> for Idle {
            fn select_neighbour(
                &mut self,
                _solution: &mut Solution<()>,
            ) -> Option<Box<dyn Neighbour<()>>> {
                None
            }
        }

        let mut registry: SelectionRegistry<()> = SelectionRegistry::new();
        registry.register("idle", |_config| {
            Ok(Box::new(Idle) as Box<dyn NeighbourSelection<()>>)
        });
        assert!(registry.create("idle", &SolverConfig::default()).is_ok());
        assert_eq!(registry.names().count(), 1);
    }

    #[test]
    fn test_registry_propagates_invalid_config() {
        let registry: SelectionRegistry<()> = SelectionRegistry::with_builtins();
        let config = SolverConfig::default()
            .with_standard(StandardConfig::default().with_random_walk_prob(-0.1));
        assert!(registry.create("standard", &config).is_err());
    }
}
