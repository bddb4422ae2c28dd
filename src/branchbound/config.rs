//! Branch-and-bound configuration.

use crate::config::ConfigError;

/// Configuration for the per-entity branch-and-bound selection.
///
/// # Examples
///
/// ```
/// use ifsearch::branchbound::BranchBoundConfig;
///
/// let config = BranchBoundConfig::default()
///     .with_minimize_penalty(true)
///     .with_timeout_ms(2000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchBoundConfig {
    /// Wall-clock budget for one entity's search, in milliseconds. Zero
    /// disables the timeout.
    pub timeout_ms: u64,

    /// Comparison mode. `false` minimizes the summed value of the
    /// schedule; `true` first maximizes the number of assigned requests
    /// and then minimizes the summed penalty.
    pub minimize_penalty: bool,

    /// Weight of the pairwise distance term contributed by the
    /// [`DistanceConflicts`](crate::context::DistanceConflicts) extension.
    pub distance_weight: f64,

    /// Random seed for the entity ordering.
    pub seed: Option<u64>,
}

impl Default for BranchBoundConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            minimize_penalty: false,
            distance_weight: 1.0,
            seed: None,
        }
    }
}

impl BranchBoundConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_minimize_penalty(mut self, minimize_penalty: bool) -> Self {
        self.minimize_penalty = minimize_penalty;
        self
    }

    pub fn with_distance_weight(mut self, weight: f64) -> Self {
        self.distance_weight = weight;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.distance_weight < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "distance_weight",
                requirement: "non-negative",
                value: self.distance_weight,
            });
        }
        Ok(())
    }
}
