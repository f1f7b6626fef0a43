//! # Runtime Configuration
//!
//! Plain data structures with sensible defaults. They deserialize with `serde`, so a host
//! application can embed them in its own configuration file and leave out any field it does
//! not care about.

use crate::backoff::{BackOff, ExponentialBackOff, FixedBackOff};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Top-level configuration for one process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub runner: RunnerConfig,
    pub invoker: InvokerConfig,
    pub placement_cache: PlacementCacheConfig,
}

/// Settings for every instance runner of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Capacity of a runner's event channel. Callers wait when it is full.
    pub mailbox_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// Hard ceiling on attempts per invocation, on top of back-off exhaustion.
    pub max_attempts: u32,
    pub backoff: BackOffConfig,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff: BackOffConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementCacheConfig {
    /// Entry count that triggers eviction.
    pub capacity: usize,
    /// Entry count eviction shrinks the cache to.
    pub capacity_low: usize,
}

impl Default for PlacementCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            capacity_low: 950,
        }
    }
}

/// Serializable description of a [`BackOff`] policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum BackOffConfig {
    Fixed {
        delay_ms: u64,
        count: u32,
        #[serde(default)]
        hysteresis: f64,
    },
    Exponential {
        base_delay_ms: u64,
        count: u32,
        factor: f64,
        #[serde(default)]
        hysteresis: f64,
    },
}

impl Default for BackOffConfig {
    fn default() -> Self {
        BackOffConfig::Exponential {
            base_delay_ms: 10,
            count: 8,
            factor: 4.0,
            hysteresis: 0.25,
        }
    }
}

impl BackOffConfig {
    pub fn build(&self) -> Arc<dyn BackOff> {
        match *self {
            BackOffConfig::Fixed {
                delay_ms,
                count,
                hysteresis,
            } => Arc::new(FixedBackOff::new(
                Duration::from_millis(delay_ms),
                count,
                hysteresis,
            )),
            BackOffConfig::Exponential {
                base_delay_ms,
                count,
                factor,
                hysteresis,
            } => Arc::new(ExponentialBackOff::new(
                Duration::from_millis(base_delay_ms),
                count,
                factor,
                hysteresis,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "invoker": { "backoff": { "policy": "fixed", "delay_ms": 5, "count": 2 } } }"#;
        let config: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.runner, RunnerConfig::default());
        assert_eq!(config.invoker.max_attempts, 10);
        assert_eq!(
            config.invoker.backoff,
            BackOffConfig::Fixed {
                delay_ms: 5,
                count: 2,
                hysteresis: 0.0
            }
        );
        assert_eq!(config.placement_cache.capacity_low, 950);
    }
}
