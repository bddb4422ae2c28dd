//! Backtracking search configuration.

use crate::config::ConfigError;

/// Configuration for the backtracking neighbour selection.
///
/// # Examples
///
/// ```
/// use ifsearch::backtrack::BacktrackConfig;
///
/// let config = BacktrackConfig::default()
///     .with_depth(2)
///     .with_timeout_ms(1000)
///     .with_max_iters(10_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktrackConfig {
    /// Wall-clock budget for one selection call, in milliseconds. Zero
    /// disables the timeout. The deadline is polled at recursion entry, so
    /// a call may overrun it by the cost of one recursive frame.
    pub timeout_ms: u64,

    /// Maximum search depth: the number of variables a single neighbour
    /// may reassign.
    pub depth: u32,

    /// Budget of recursive calls per selection; `None` is unlimited.
    pub max_iters: Option<u64>,
}

impl Default for BacktrackConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            depth: 4,
            max_iters: None,
        }
    }
}

impl BacktrackConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = Some(max_iters);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "depth",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        Ok(())
    }
}
