//! Engine configuration.

use crate::hit_test::HitTestStrategy;
use crate::host::Transition;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Minimum time between two collision checks.
pub const DEFAULT_COLLISION_INTERVAL_MS: u64 = 150;
/// Duration of the slide into a new slot after a reorder.
pub const DEFAULT_TRANSITION_MS: u64 = 250;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Drop target detection policy.
    pub hit_test: HitTestStrategy,
    /// Collision checks run at most once per this many milliseconds.
    pub collision_interval_ms: u64,
    /// Transition applied when a displaced sibling settles.
    pub transition_ms: u64,
    /// Ignore the slot the dragged item just left until the pointer
    /// leaves every target, so a neighbour that is still animating does
    /// not bounce straight back.
    pub suppress_bounce: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hit_test: HitTestStrategy::default(),
            collision_interval_ms: DEFAULT_COLLISION_INTERVAL_MS,
            transition_ms: DEFAULT_TRANSITION_MS,
            suppress_bounce: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Use the given hit-test strategy.
    pub fn with_hit_test(mut self, hit_test: HitTestStrategy) -> Self {
        self.hit_test = hit_test;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collision_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "collision_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn collision_interval(&self) -> Duration {
        Duration::from_millis(self.collision_interval_ms)
    }

    pub fn transition(&self) -> Transition {
        Transition {
            duration_ms: self.transition_ms,
        }
    }
}
