//! Single-step selection configuration.

use crate::config::ConfigError;

/// Configuration for the standard (greedy single-step) selection and its
/// general variable/value criteria.
///
/// # Examples
///
/// ```
/// use ifsearch::standard::StandardConfig;
///
/// let config = StandardConfig::default()
///     .with_random_selection(false)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardConfig {
    /// Pick an unassigned variable uniformly at random. When false, the
    /// minimal-perturbation roulette wheel is used instead: a variable
    /// with an initial assignment weighs `3 * (1 + conflicts of the
    /// initial value)`, a variable without weighs 1.
    pub random_selection: bool,

    /// When an unassigned variable has an empty domain, reselect an
    /// assigned variable for reassignment instead of staying stuck on the
    /// dead end.
    pub unassign_when_no_good: bool,

    /// Probability of picking an arbitrary assigned variable (rather than
    /// one linked to the dead end by a constraint) when
    /// `unassign_when_no_good` applies.
    pub no_good_random_walk: f64,

    /// Probability that value selection picks a random domain value
    /// instead of the least-conflicting one.
    pub random_walk_prob: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for StandardConfig {
    fn default() -> Self {
        Self {
            random_selection: true,
            unassign_when_no_good: false,
            no_good_random_walk: 0.02,
            random_walk_prob: 0.02,
            seed: None,
        }
    }
}

impl StandardConfig {
    pub fn with_random_selection(mut self, random: bool) -> Self {
        self.random_selection = random;
        self
    }

    pub fn with_unassign_when_no_good(mut self, unassign: bool) -> Self {
        self.unassign_when_no_good = unassign;
        self
    }

    pub fn with_no_good_random_walk(mut self, probability: f64) -> Self {
        self.no_good_random_walk = probability;
        self
    }

    pub fn with_random_walk_prob(mut self, probability: f64) -> Self {
        self.random_walk_prob = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.no_good_random_walk) {
            return Err(ConfigError::InvalidValue {
                field: "no_good_random_walk",
                requirement: "in [0, 1]",
                value: self.no_good_random_walk,
            });
        }
        if !(0.0..=1.0).contains(&self.random_walk_prob) {
            return Err(ConfigError::InvalidValue {
                field: "random_walk_prob",
                requirement: "in [0, 1]",
                value: self.random_walk_prob,
            });
        }
        Ok(())
    }
}
